use crate::error::{IdentityError, Result};
use std::future::Future;
use tokio::sync::watch;
use uuid::Uuid;

/// Per-request context handed to every service operation and every adapter call.
///
/// Carries the request id for log correlation and the caller's cancellation
/// signal. Once cancelled, [`RequestContext::run`] refuses to start further
/// adapter calls and aborts the one in flight.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    cancelled: watch::Receiver<bool>,
}

/// Owner side of a [`RequestContext`] cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// New cancellable context
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                request_id: Uuid::new_v4(),
                cancelled: rx,
            },
            CancelHandle { tx },
        )
    }

    /// Context that can never be cancelled
    pub fn background() -> Self {
        Self::new().0
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(IdentityError::Cancelled);
        }
        Ok(())
    }

    /// Resolves once the context is cancelled; never resolves for a background context.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.clone();
        loop {
            let cancelled = *rx.borrow_and_update();
            if cancelled {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run one adapter call under this context's cancellation signal.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        self.ensure_active()?;
        tokio::select! {
            biased;
            () = self.cancelled() => Err(IdentityError::Cancelled),
            output = fut => Ok(output),
        }
    }
}
