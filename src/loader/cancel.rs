use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use crate::core::error::{Error, ErrorKind, Result};

/// Cloneable abort signal shared between a caller and in-flight loads
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Caller-supplied deadline and abort signal for a load
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl LoadOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Runs `fut` until it completes, the token fires or the deadline passes.
    /// The future is dropped on abort, abandoning any in-flight fetches.
    pub async fn guard<F, T>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(Error::new(ErrorKind::LoadCancelled, format!("{} cancelled", what)));
        }

        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        let deadline = async {
            match self.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = fut => result,
            _ = cancelled => Err(Error::new(
                ErrorKind::LoadCancelled,
                format!("{} cancelled", what),
            )),
            _ = deadline => Err(Error::new(
                ErrorKind::LoadCancelled,
                format!("{} timed out after {:?}", what, self.timeout.unwrap_or_default()),
            )),
        }
    }
}
