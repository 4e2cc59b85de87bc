use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellable handle for a timer trigger.
///
/// Cloned into every timer-triggered invocation; the scheduler checks it
/// before each fire, and any interceptor in the chain may cancel it to stop
/// further firing.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
