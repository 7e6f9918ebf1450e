//! Background scan execution with supersede-on-submit semantics
//!
//! A session runs at most one live scan. Submitting a new request cancels the
//! token of the previous one, which then stops at its next check and resolves
//! to `ScanError::Cancelled`.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::cancel::CancelToken;
use crate::engine::{OfflineEngine, ScanProvider, ScanRequest};
use crate::error::{Result, ScanError};
use crate::result::ScanResult;

/// Runs scans on tokio's blocking pool, one live scan at a time
pub struct ScanSession<P: ScanProvider + 'static = OfflineEngine> {
    provider: Arc<P>,
    current: Mutex<Option<CancelToken>>,
}

impl Default for ScanSession<OfflineEngine> {
    fn default() -> Self {
        Self::new(Arc::new(OfflineEngine::default()))
    }
}

impl<P: ScanProvider + 'static> ScanSession<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            current: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Start a scan in the background, cancelling any scan still running
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: ScanRequest) -> JoinHandle<Result<ScanResult>> {
        let token = CancelToken::new();
        {
            let mut current = self.lock_current();
            if let Some(previous) = current.replace(token.clone()) {
                if !previous.is_cancelled() {
                    tracing::debug!("superseding in-flight scan");
                }
                previous.cancel();
            }
        }

        let provider = Arc::clone(&self.provider);
        tokio::task::spawn_blocking(move || provider.scan(&request, &token))
    }

    /// Submit and wait for the result
    ///
    /// A scan that was superseded, or whose task was aborted, resolves to
    /// `ScanError::Cancelled`. A panic inside the provider is propagated.
    pub async fn run(&self, request: ScanRequest) -> Result<ScanResult> {
        match self.submit(request).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ScanError::Cancelled),
        }
    }

    /// Cancel the live scan, if any
    pub fn cancel(&self) {
        if let Some(token) = self.lock_current().take() {
            token.cancel();
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<CancelToken>> {
        // The guarded value is a plain token; a poisoned lock is still usable
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
