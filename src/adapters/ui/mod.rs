pub mod tui;

pub use tui::TuiPrompt;
