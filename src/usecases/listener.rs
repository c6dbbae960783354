//! Listener: drain the inbound subscription and run the handler for each message on its own task.
//!
//! Handlers may overlap. A failing handler is logged and never affects the others;
//! a fatal (configuration) error stops the listener.

use crate::domain::{DispatchOutcome, DomainError};
use crate::ports::{InboundSource, MessageHandler};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Default cap on concurrently running handlers.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

/// Why the receive loop ended.
enum Stop {
    Shutdown,
    Fatal(DomainError),
    Closed,
}

pub struct Listener {
    source: Arc<dyn InboundSource>,
    handler: Arc<dyn MessageHandler>,
    max_in_flight: usize,
}

impl Listener {
    pub fn new(
        source: Arc<dyn InboundSource>,
        handler: Arc<dyn MessageHandler>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            source,
            handler,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Run until `shutdown` resolves, the inbound stream ends, or a handler hits a fatal error.
    ///
    /// When the stream ends, in-flight handlers are awaited (until `shutdown`).
    /// On shutdown or a fatal error they are detached and left to finish on their own.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<(), DomainError> {
        let mut subscription = self.source.subscribe().await?;
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let (fatal_tx, mut fatal_rx) = mpsc::channel::<DomainError>(1);
        let mut handlers = JoinSet::new();
        info!(max_in_flight = self.max_in_flight, "listening for messages");

        tokio::pin!(shutdown);
        let stop = loop {
            while handlers.try_join_next().is_some() {}

            // Permit first, then the message: handlers start in arrival order, and a
            // saturated pool still observes shutdown and fatal errors.
            let permit = tokio::select! {
                _ = &mut shutdown => break Stop::Shutdown,
                Some(err) = fatal_rx.recv() => break Stop::Fatal(err),
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break Stop::Closed,
                },
            };
            let msg = tokio::select! {
                _ = &mut shutdown => break Stop::Shutdown,
                Some(err) = fatal_rx.recv() => break Stop::Fatal(err),
                next = subscription.recv() => match next {
                    Some(msg) => msg,
                    None => break Stop::Closed,
                },
            };

            let handler = Arc::clone(&self.handler);
            let fatal_tx = fatal_tx.clone();
            handlers.spawn(async move {
                let _permit = permit;
                let chat_id = msg.chat_id;
                let result = handler.on_inbound_message(msg).await;
                if let Some(fatal) = report(chat_id, result) {
                    let _ = fatal_tx.try_send(fatal);
                }
            });
        };

        subscription.cancel();
        let result = match stop {
            Stop::Shutdown => {
                info!("shutdown requested; stopping listener");
                Ok(())
            }
            Stop::Fatal(err) => {
                error!(error = %err, "fatal error; stopping listener");
                Err(err)
            }
            Stop::Closed => {
                info!(in_flight = handlers.len(), "inbound stream closed");
                tokio::select! {
                    _ = async { while handlers.join_next().await.is_some() {} } => {}
                    _ = &mut shutdown => info!("shutdown requested while draining handlers"),
                }
                match fatal_rx.try_recv() {
                    Ok(err) => {
                        error!(error = %err, "fatal error; stopping listener");
                        Err(err)
                    }
                    Err(_) => Ok(()),
                }
            }
        };

        if !handlers.is_empty() {
            warn!(
                in_flight = handlers.len(),
                "listener stopped with handlers still running"
            );
            handlers.detach_all();
        }
        result
    }
}

/// Log the outcome of one handler: one `error!` per dropped or partially answered message.
/// Hands fatal errors back so the listener can stop.
fn report(chat_id: i64, result: Result<DispatchOutcome, DomainError>) -> Option<DomainError> {
    match result {
        Ok(DispatchOutcome::Replied(_)) => None,
        Ok(DispatchOutcome::Ignored(reason)) => {
            debug!(chat_id, ?reason, "message ignored");
            None
        }
        Err(DomainError::Send { stage, reason }) => {
            error!(chat_id, %stage, error = %reason, "reply send failed");
            None
        }
        Err(e) => {
            error!(chat_id, error = %e, "message dropped");
            e.is_fatal().then_some(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, IgnoreReason, InboundMessage, OutboundPayload, SendStage};
    use crate::ports::{CompletionPort, MessengerPort, Subscription};
    use crate::usecases::{Classifier, DispatchService};
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Hands out a pre-filled subscription once.
    struct QueuedSource {
        rx: Mutex<Option<mpsc::Receiver<InboundMessage>>>,
    }

    impl QueuedSource {
        fn new(
            messages: Vec<InboundMessage>,
            keep_open: bool,
        ) -> (Self, Option<mpsc::Sender<InboundMessage>>) {
            let (tx, rx) = mpsc::channel(messages.len().max(1));
            for m in messages {
                tx.try_send(m).unwrap();
            }
            let source = Self {
                rx: Mutex::new(Some(rx)),
            };
            (source, keep_open.then_some(tx))
        }
    }

    #[async_trait::async_trait]
    impl InboundSource for QueuedSource {
        async fn subscribe(&self) -> Result<Subscription, DomainError> {
            let rx = self
                .rx
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| DomainError::TgGateway("already subscribed".into()))?;
            Ok(Subscription::from_channel(rx))
        }
    }

    /// Fails chat 1 with a service error, chat 2 with a media send error, replies otherwise.
    #[derive(Default)]
    struct ScriptedHandler {
        seen: Mutex<Vec<i64>>,
    }

    #[async_trait::async_trait]
    impl MessageHandler for ScriptedHandler {
        async fn on_inbound_message(
            &self,
            msg: InboundMessage,
        ) -> Result<DispatchOutcome, DomainError> {
            self.seen.lock().unwrap().push(msg.chat_id);
            match msg.chat_id {
                1 => Err(DomainError::ClassificationService("503".into())),
                2 => Err(DomainError::Send {
                    stage: SendStage::Media,
                    reason: "upload failed".into(),
                }),
                3 => Ok(DispatchOutcome::Ignored(IgnoreReason::EmptyBody)),
                666 => Err(DomainError::Configuration("missing API key".into())),
                _ => Ok(DispatchOutcome::Replied(Category::Other)),
            }
        }
    }

    /// Never finishes; stands in for a send stuck on the network.
    #[derive(Default)]
    struct StuckHandler {
        started: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MessageHandler for StuckHandler {
        async fn on_inbound_message(
            &self,
            _msg: InboundMessage,
        ) -> Result<DispatchOutcome, DomainError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<Result<DispatchOutcome, DomainError>>().await
        }
    }

    struct NetworkDown;

    #[async_trait::async_trait]
    impl CompletionPort for NetworkDown {
        async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
            Err(DomainError::ClassificationService(
                "HTTP request failed: connection refused".into(),
            ))
        }
    }

    #[derive(Default)]
    struct CountingMessenger {
        sends: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MessengerPort for CountingMessenger {
        async fn send(&self, _chat_id: i64, _payload: &OutboundPayload) -> Result<(), DomainError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn self_id(&self) -> Result<i64, DomainError> {
            Ok(0)
        }
    }

    /// In-memory sink for formatted log lines.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn error_lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .filter(|l| l.contains("ERROR"))
                .map(String::from)
                .collect()
        }
    }

    fn msg(chat_id: i64) -> InboundMessage {
        InboundMessage {
            chat_id,
            sender_id: chat_id,
            is_from_self: false,
            body_text: Some("hola".into()),
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_other_messages() {
        let (source, _) = QueuedSource::new(vec![msg(1), msg(2), msg(3), msg(4)], false);
        let handler = Arc::new(ScriptedHandler::default());
        let listener = Listener::new(Arc::new(source), handler.clone(), 4);

        // Stream ends after four messages; run returns once their handlers are done.
        listener.run(std::future::pending()).await.unwrap();

        let mut seen = handler.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_classifier_network_error_logs_one_error_and_sends_nothing() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let messenger = Arc::new(CountingMessenger::default());
        let dispatch = DispatchService::new(
            Classifier::new(Arc::new(NetworkDown)),
            messenger.clone(),
            None,
        );
        let (source, _) = QueuedSource::new(vec![msg(42)], false);
        let listener = Listener::new(Arc::new(source), Arc::new(dispatch), 4);

        listener.run(std::future::pending()).await.unwrap();

        assert_eq!(messenger.sends.load(Ordering::SeqCst), 0);
        let errors = logs.error_lines();
        assert_eq!(errors.len(), 1, "expected exactly one error record: {errors:?}");
        assert!(errors[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_configuration_error_stops_listener() {
        let (source, _tx) = QueuedSource::new(vec![msg(666)], true);
        let listener = Listener::new(
            Arc::new(source),
            Arc::new(ScriptedHandler::default()),
            DEFAULT_MAX_IN_FLIGHT,
        );

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            listener.run(std::future::pending()),
        )
        .await
        .expect("listener should stop on fatal error");

        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_shutdown_stops_open_stream() {
        let (source, _tx) = QueuedSource::new(vec![], true);
        let listener = Listener::new(
            Arc::new(source),
            Arc::new(ScriptedHandler::default()),
            1,
        );

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            listener.run(tokio::time::sleep(Duration::from_millis(20))),
        )
        .await
        .expect("listener should honor shutdown");

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_honored_while_all_handlers_are_stuck() {
        let (source, _tx) = QueuedSource::new(vec![msg(10), msg(11)], true);
        let handler = Arc::new(StuckHandler::default());
        let listener = Listener::new(Arc::new(source), handler.clone(), 1);

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            listener.run(tokio::time::sleep(Duration::from_millis(20))),
        )
        .await
        .expect("shutdown should not wait for a free handler slot");

        assert!(result.is_ok());
        // The second message never got a permit.
        assert_eq!(handler.started.load(Ordering::SeqCst), 1);
    }
}
