//! Local bookkeeping for cases this machine currently holds the claim on.
//! Independent of the worker pool's own per-job cancellation tokens: this
//! tracks the *heartbeat* task's lifetime, which must stop the moment the
//! job finishes (successfully, with failure, or by claim loss) rather than
//! only when the scheduler itself shuts down.

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;

use gc_core::CaseId;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct ActiveClaims {
    heartbeats: StdMutex<HashMap<CaseId, CancellationToken>>,
}

impl ActiveClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly claimed case and returns the token its heartbeat
    /// task should watch for its own shutdown.
    pub fn register(&self, id: CaseId) -> CancellationToken {
        let token = CancellationToken::new();
        self.heartbeats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, token.clone());
        token
    }

    /// Stops the heartbeat task for `id`, if one is running, and forgets it.
    pub fn finish(&self, id: &CaseId) {
        if let Some(token) = self.heartbeats.lock().unwrap_or_else(|e| e.into_inner()).remove(id) {
            token.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.heartbeats.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_active(&self, id: &CaseId) -> bool {
        self.heartbeats.lock().unwrap_or_else(|e| e.into_inner()).contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_finish_cancels_the_token() {
        let active = ActiveClaims::new();
        let id = CaseId::new();
        let token = active.register(id.clone());
        assert!(active.is_active(&id));
        assert!(!token.is_cancelled());

        active.finish(&id);
        assert!(!active.is_active(&id));
        assert!(token.is_cancelled());
    }
}
