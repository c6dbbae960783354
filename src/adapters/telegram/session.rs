//! Session bootstrap: persistent session file, sender pool and update stream.
//!
//! Uses grammers-session's SqliteSession so authorization survives restarts.

use crate::domain::DomainError;
use grammers_client::client::{UpdateStream, UpdatesConfiguration};
use grammers_client::{Client, SenderPool};
use grammers_session::storages::SqliteSession;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Opens a persistent session storage at the given path, creating parent directories.
pub async fn open_file_session(path: impl AsRef<Path>) -> Result<SqliteSession, DomainError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::TgGateway(format!("create session directory: {}", e)))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| DomainError::TgGateway(format!("open session file: {}", e)))
}

/// Connect: spawn the sender pool runner and return the client plus its update stream.
///
/// With `catch_up`, updates missed while offline are replayed on start.
pub async fn connect(
    session_path: &Path,
    api_id: i32,
    catch_up: bool,
) -> Result<(Client, UpdateStream), DomainError> {
    let session = Arc::new(open_file_session(session_path).await?);
    let SenderPool {
        runner,
        updates,
        handle,
    } = SenderPool::new(session, api_id);
    let client = Client::new(handle);
    tokio::spawn(async move {
        runner.run().await;
    });
    debug!(path = %session_path.display(), catch_up, "telegram client started");

    let updates = client
        .stream_updates(
            updates,
            UpdatesConfiguration {
                catch_up,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| DomainError::TgGateway(format!("stream updates: {}", e)))?;
    Ok((client, updates))
}
