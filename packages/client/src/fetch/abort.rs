//! Abort controller and signal pair
//!
//! The controller side fires once; every clone of the signal observes it.
//! A signal whose controller is dropped without firing never resolves.

use tokio::sync::watch;

/// Owner side: fires the abort
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
}

/// Observer side handed to the fetcher
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortController {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the abort; idempotent
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    /// A signal that can never fire
    #[must_use]
    pub fn never() -> Self {
        AbortController::new().signal()
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the controller aborts
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            // Controller dropped without aborting
            std::future::pending::<()>().await;
        }
    }
}
