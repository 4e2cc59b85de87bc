use std::sync::Arc;
use derive_more::Display;
use uuid::Uuid;
use crate::error::{TreadleError, TreadleResult};
use crate::timer::TimerHandle;
use crate::types::ArgValue;

/// Identity of a registered business method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{component}#{method}")]
pub struct MethodRef {
    pub component: Arc<str>,
    pub method: Arc<str>,
}

impl MethodRef {
    pub fn new(component: impl Into<Arc<str>>, method: impl Into<Arc<str>>) -> Self {
        Self {
            component: component.into(),
            method: method.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TriggerKind {
    #[display("call")]
    Call,
    #[display("timer")]
    Timer,
}

/// What caused an invocation.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// A caller invoked the method synchronously with explicit arguments.
    Call,
    /// The scheduler fired the method; the handle cancels further firing.
    Timer(TimerHandle),
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Call => TriggerKind::Call,
            Self::Timer(_) => TriggerKind::Timer,
        }
    }

    pub fn timer_handle(&self) -> Option<&TimerHandle> {
        match self {
            Self::Timer(handle) => Some(handle),
            Self::Call => None,
        }
    }
}

/// One invocation attempt. Created per attempt, immutable, discarded once
/// the chain completes.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: Uuid,
    pub method: MethodRef,
    pub args: Vec<ArgValue>,
    pub trigger: Trigger,
}

impl Invocation {
    pub fn new(method: MethodRef, args: Vec<ArgValue>, trigger: Trigger) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            args,
            trigger,
        }
    }

    /// Positional argument access for target adapters.
    pub fn arg(&self, index: usize) -> TreadleResult<ArgValue> {
        self.args.get(index).cloned().ok_or_else(|| {
            TreadleError::argument(
                format!("an argument at position {index}"),
                format!("{} arguments", self.args.len()),
            )
        })
    }
}
