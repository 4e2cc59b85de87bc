use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use crate::event::channel::InvocationEventChannel;
use crate::invocation::Invocation;

/// Per-invocation context handed to every link of the chain.
///
/// The invocation record itself is immutable; `metadata` is the shared
/// scratch space an interceptor may write for the links after it.
#[derive(Clone)]
pub struct InvocationContext<'a> {
    pub invocation: &'a Invocation,
    pub metadata: Arc<RwLock<HashMap<String, String>>>,
    pub channel: InvocationEventChannel,
}

impl<'a> InvocationContext<'a> {
    pub fn new(invocation: &'a Invocation, channel: InvocationEventChannel) -> Self {
        Self {
            invocation,
            metadata: Arc::new(RwLock::new(HashMap::new())),
            channel,
        }
    }

    pub fn put_metadata(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut metadata) = self.metadata.write() {
            metadata.insert(key.into(), value.into());
        }
    }

    pub fn metadata(&self, key: &str) -> Option<String> {
        self.metadata
            .read()
            .ok()
            .and_then(|metadata| metadata.get(key).cloned())
    }
}
