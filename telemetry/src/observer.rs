use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// How an observed operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    Success,
    Failure { error: &'a str },
}

/// Hook notified around every service operation.
pub trait OperationObserver: Send + Sync {
    fn on_start(&self, operation: &'static str);

    fn on_finish(&self, operation: &'static str, elapsed: Duration, outcome: Outcome<'_>);
}

/// Run `fut` as the named operation under `observer`.
pub async fn observe<T, E, F>(
    observer: &dyn OperationObserver,
    operation: &'static str,
    fut: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let span = tracing::info_span!("operation", name = operation);

    async move {
        observer.on_start(operation);
        let started = Instant::now();

        let result = fut.await;

        let elapsed = started.elapsed();
        match &result {
            Ok(_) => observer.on_finish(operation, elapsed, Outcome::Success),
            Err(e) => {
                let error = e.to_string();
                observer.on_finish(operation, elapsed, Outcome::Failure { error: &error });
            }
        }
        result
    }
    .instrument(span)
    .await
}

/// Default observer: structured logs plus `metrics` counters and latency histograms.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl OperationObserver for TracingObserver {
    fn on_start(&self, operation: &'static str) {
        tracing::debug!(operation, "operation started");
    }

    fn on_finish(&self, operation: &'static str, elapsed: Duration, outcome: Outcome<'_>) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let status = match outcome {
            Outcome::Success => {
                tracing::debug!(operation, elapsed_ms, "operation completed");
                "success"
            }
            Outcome::Failure { error } => {
                tracing::warn!(operation, elapsed_ms, error, "operation failed");
                "failure"
            }
        };

        metrics::counter!(
            "identity_operations_total",
            "operation" => operation,
            "outcome" => status
        )
        .increment(1);
        metrics::histogram!("identity_operation_duration_seconds", "operation" => operation)
            .record(elapsed.as_secs_f64());
    }
}

/// Observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl OperationObserver for NoopObserver {
    fn on_start(&self, _operation: &'static str) {}

    fn on_finish(&self, _operation: &'static str, _elapsed: Duration, _outcome: Outcome<'_>) {}
}

/// Event captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Started(&'static str),
    Finished {
        operation: &'static str,
        error: Option<String>,
    },
}

/// In-memory observer for tests and development
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Error annotations of every failed operation, in order
    pub fn failures(&self) -> Vec<(&'static str, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObservedEvent::Finished {
                    operation,
                    error: Some(error),
                } => Some((*operation, error.clone())),
                _ => None,
            })
            .collect()
    }
}

impl OperationObserver for RecordingObserver {
    fn on_start(&self, operation: &'static str) {
        self.events.lock().push(ObservedEvent::Started(operation));
    }

    fn on_finish(&self, operation: &'static str, _elapsed: Duration, outcome: Outcome<'_>) {
        let error = match outcome {
            Outcome::Success => None,
            Outcome::Failure { error } => Some(error.to_string()),
        };
        self.events
            .lock()
            .push(ObservedEvent::Finished { operation, error });
    }
}
