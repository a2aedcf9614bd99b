//! Cancellable in-flight operations.
//!
//! A `CancellableOperation` runs a unit of work on the tokio runtime and
//! exposes its state to any number of observers. Cancellation is a separate
//! channel from failure: a canceled operation settles as
//! `OperationState::Canceled`, never as `Rejected`.

use crate::error::QueryError;
use std::future::Future;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Observable state of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    /// Work is still in flight
    Pending,
    /// Work completed successfully
    Resolved,
    /// Work completed with an error
    Rejected(QueryError),
    /// Work was abandoned after a cancel request
    Canceled,
}

impl OperationState {
    /// Check if the operation is still in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Pending)
    }

    /// Check if the operation has reached a final state.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }
}

/// Handle to an in-flight operation.
///
/// Handles are cheap to clone; every clone observes and cancels the same
/// operation.
#[derive(Debug, Clone)]
pub struct CancellableOperation {
    state: watch::Receiver<OperationState>,
    token: CancellationToken,
}

impl CancellableOperation {
    /// Spawn `work` onto the current tokio runtime.
    ///
    /// If a cancel is requested before `work` completes, `work` is dropped and
    /// `on_cancel` runs to completion before the operation settles as
    /// `Canceled`. A cancel that races with completion favors the cancel.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn spawn<W, C>(work: W, on_cancel: C) -> Self
    where
        W: Future<Output = Result<(), QueryError>> + Send + 'static,
        C: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = watch::channel(OperationState::Pending);
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            let state = tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    on_cancel.await;
                    OperationState::Canceled
                }
                result = work => match result {
                    Ok(()) => OperationState::Resolved,
                    Err(e) => OperationState::Rejected(e),
                },
            };
            tx.send_replace(state);
        });

        Self { state: rx, token }
    }

    /// Current state, without waiting.
    pub fn state(&self) -> OperationState {
        self.state.borrow().clone()
    }

    /// Check if the operation has settled.
    pub fn is_settled(&self) -> bool {
        self.state.borrow().is_settled()
    }

    /// Request cancellation without waiting for it to take effect.
    pub fn request_cancel(&self) {
        self.token.cancel();
    }

    /// Wait until the operation settles and return the final state.
    pub async fn settled(&self) -> OperationState {
        let mut state = self.state.clone();
        let result = state.wait_for(|s| s.is_settled()).await.map(|s| s.clone());
        // The sender only goes away without publishing if the task was torn down.
        result.unwrap_or(OperationState::Rejected(QueryError::OperationDropped))
    }

    /// Request cancellation and wait for the operation to settle.
    ///
    /// The returned state is whatever the operation actually ended in, which
    /// is `Resolved` or `Rejected` if the work finished before the request.
    pub async fn cancel(&self) -> OperationState {
        self.request_cancel();
        self.settled().await
    }
}
