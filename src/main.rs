//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the listener.
//! No business logic here; login is delegated to AuthService, triage to DispatchService.

use dotenv::dotenv;
use lead_triage::adapters::ai::{MockAiAdapter, OpenAiAdapter};
use lead_triage::adapters::telegram::{GrammersAuthAdapter, GrammersTransport, session};
use lead_triage::adapters::ui::TuiPrompt;
use lead_triage::ports::{AuthPort, CompletionPort, InboundSource, MessageHandler, MessengerPort};
use lead_triage::shared::config::AppConfig;
use lead_triage::usecases::{AuthService, Classifier, DispatchService, Listener, LoginMethod};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load()?;

    // Fail fast: a missing key would otherwise fail every single message.
    if !cfg.is_ai_configured() {
        anyhow::bail!("Set TRIAGE_AI_API_KEY or OPENAI_API_KEY (or TRIAGE_AI_MOCK=true for a dry run)");
    }
    let api_id = cfg.api_id.unwrap_or(0);
    if api_id == 0 {
        anyhow::bail!(
            "Set TRIAGE_API_ID (and TRIAGE_API_HASH) in .env. Get from https://my.telegram.org"
        );
    }
    let api_hash = cfg.api_hash.clone().unwrap_or_default();
    if api_hash.is_empty() {
        anyhow::bail!("Set TRIAGE_API_HASH (env or .env). Get from https://my.telegram.org");
    }

    // --- Telegram client + update stream (client cloned for auth and transport) ---
    let session_path = PathBuf::from(cfg.session_path_or_default());
    let (tg_client, updates) =
        session::connect(&session_path, api_id, cfg.catch_up_or_default()).await?;

    // --- Auth: adapter + service, then run flow ---
    let auth_adapter: Arc<dyn AuthPort> = Arc::new(GrammersAuthAdapter::new(tg_client.clone()));
    let auth_service = AuthService::new(auth_adapter, Arc::new(TuiPrompt::new()), api_hash);
    let login = match cfg.bot_token() {
        Some(token) => LoginMethod::BotToken(token),
        None => LoginMethod::User,
    };
    auth_service.ensure_authenticated(&login).await?;

    let transport = Arc::new(GrammersTransport::new(tg_client, updates));
    let messenger: Arc<dyn MessengerPort> = Arc::clone(&transport) as Arc<dyn MessengerPort>;
    let source: Arc<dyn InboundSource> = Arc::clone(&transport) as Arc<dyn InboundSource>;

    let self_id = match messenger.self_id().await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "could not resolve own account id; relying on outgoing flag");
            None
        }
    };

    // --- Classifier ---
    let completion: Arc<dyn CompletionPort> = if cfg.ai_mock_enabled() {
        warn!("TRIAGE_AI_MOCK set, using mock completion adapter");
        Arc::new(MockAiAdapter::new())
    } else {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            timeout_secs = cfg.ai_timeout().as_secs(),
            "classifier enabled with OpenAI adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key(),
            cfg.ai_model_or_default(),
            cfg.ai_timeout(),
        )?)
    };

    let handler: Arc<dyn MessageHandler> = Arc::new(DispatchService::new(
        Classifier::new(completion),
        messenger,
        self_id,
    ));

    // --- Run until Ctrl-C or a fatal error ---
    let listener = Listener::new(source, handler, cfg.max_in_flight_or_default());
    listener
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("bye");
    Ok(())
}
