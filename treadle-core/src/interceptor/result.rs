use std::collections::HashMap;
use crate::types::ArgValue;

/// What flows back up the chain once the target, or a short-circuiting
/// interceptor, has produced a value.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome {
    pub value: ArgValue,
    pub metadata: HashMap<String, String>,
}

impl InvocationOutcome {
    pub fn empty() -> Self {
        Self::of(ArgValue::Empty)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::of(ArgValue::Text(value.into()))
    }

    pub fn of(value: ArgValue) -> Self {
        Self {
            value,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
