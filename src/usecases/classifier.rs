//! Classify an enquiry into a `Category` with one completion call.
//!
//! The model answers in free text; the answer is reduced to a category by a
//! first-match-wins substring search (venta, then alquiler), falling back to `Other`.

use crate::domain::{Category, DomainError, NonEmptyText};
use crate::ports::CompletionPort;
use std::sync::Arc;
use tracing::debug;

/// Categories searched for in the model output, highest priority first. `Other` is the fallback.
const PRIORITY: [Category; 2] = [Category::Sale, Category::Rental];

pub struct Classifier {
    completion: Arc<dyn CompletionPort>,
}

impl Classifier {
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Classify `text`. Every successful completion maps to exactly one category.
    ///
    /// # Errors
    /// Propagates `Configuration` / `ClassificationService` errors from the completion port.
    pub async fn classify(&self, text: &NonEmptyText) -> Result<Category, DomainError> {
        let prompt = classification_prompt(text);
        let raw = self.completion.complete(&prompt).await?;
        let category = category_from_output(&raw);
        debug!(raw_len = raw.len(), category = %category, "classified");
        Ok(category)
    }
}

fn classification_prompt(text: &NonEmptyText) -> String {
    format!(
        "Clasifica el mensaje como \"{}\", \"{}\" o \"{}\": {}",
        Category::Sale.token(),
        Category::Rental.token(),
        Category::Other.token(),
        text
    )
}

/// Reduce raw model output to a category. Total.
pub fn category_from_output(raw: &str) -> Category {
    let lower = raw.to_lowercase();
    PRIORITY
        .iter()
        .find(|c| lower.contains(c.token()))
        .copied()
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedCompletion {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionPort for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(DomainError::ClassificationService)
        }
    }

    #[test]
    fn test_priority_tie_break_prefers_sale() {
        assert_eq!(
            category_from_output("podría ser venta o alquiler"),
            Category::Sale
        );
        assert_eq!(
            category_from_output("alquiler, aunque también venta"),
            Category::Sale
        );
    }

    #[test]
    fn test_fallback_to_other() {
        assert_eq!(category_from_output("no estoy seguro"), Category::Other);
        assert_eq!(category_from_output(""), Category::Other);
        assert_eq!(category_from_output("这是一个问题"), Category::Other);
    }

    #[test]
    fn test_case_insensitive_and_substring() {
        assert_eq!(category_from_output("ALQUILER"), Category::Rental);
        assert_eq!(category_from_output("\"Venta\"."), Category::Sale);
        assert_eq!(category_from_output("Categoría: otro"), Category::Other);
        // Substring match: "ventana" contains "venta".
        assert_eq!(category_from_output("ventana"), Category::Sale);
    }

    #[tokio::test]
    async fn test_classify_sends_fixed_prompt_with_text() {
        let completion = Arc::new(ScriptedCompletion::ok("alquiler"));
        let classifier = Classifier::new(completion.clone());
        let text = NonEmptyText::new("Quiero información sobre alquiler").unwrap();

        let category = classifier.classify(&text).await.unwrap();

        assert_eq!(category, Category::Rental);
        let prompts = completion.prompts.lock().unwrap();
        assert_eq!(
            prompts.as_slice(),
            [
                "Clasifica el mensaje como \"venta\", \"alquiler\" o \"otro\": Quiero información sobre alquiler"
            ]
        );
    }

    #[tokio::test]
    async fn test_classify_propagates_service_error() {
        let classifier = Classifier::new(Arc::new(ScriptedCompletion::failing("timeout")));
        let text = NonEmptyText::new("hola").unwrap();

        let err = classifier.classify(&text).await.unwrap_err();
        assert!(matches!(err, DomainError::ClassificationService(_)));
    }
}
