use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel carrying invocation lifecycle events to an optional observer.
#[derive(Debug, Clone)]
pub struct InvocationEventChannel {
    pub channel_id: Arc<String>,
    sender: mpsc::UnboundedSender<InvocationEvent>,
}

impl InvocationEventChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InvocationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let channel_id = Uuid::new_v4().to_string();

        (
            Self {
                channel_id: Arc::new(channel_id),
                sender,
            },
            receiver,
        )
    }

    /// Emit an event. A dropped receiver just means nobody is watching.
    pub fn emit(&self, kind: InvocationEventKind) {
        let event = InvocationEvent {
            id: Uuid::new_v4().to_string(),
            channel_id: self.channel_id.to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            kind,
        };
        let _ = self.sender.send(event);
    }
}

/// Events emitted while an invocation walks its chain
#[derive(Debug, Clone, Serialize)]
pub struct InvocationEvent {
    pub id: String,
    pub channel_id: String,
    pub timestamp: u64,
    pub kind: InvocationEventKind,
}

#[derive(Debug, Clone, Serialize)]
pub enum InvocationEventKind {
    // Lifecycle Events
    InvocationStarted {
        method: String,
        trigger: String,
    },
    InvocationCompleted {
        method: String,
        success: bool,
        duration_ms: u64,
    },

    // Chain Events
    InterceptorTriggered {
        interceptor: String,
        kind: String, // "bound", "global", "target"
        priority: i32,
    },
    ChainShortCircuited {
        interceptor: String,
    },

    // Timer Events
    TimerFired {
        method: String,
    },
    TimerCancelled {
        method: String,
    },
}

impl InvocationEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            InvocationEventKind::InvocationCompleted { success: false, .. }
        )
    }

    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self.kind,
            InvocationEventKind::InvocationStarted { .. }
                | InvocationEventKind::InvocationCompleted { .. }
        )
    }
}
