use std::collections::HashMap;
use regex::Regex;
use smart_default::SmartDefault;
use crate::binding::BindingFacts;
use crate::invocation::TriggerKind;

/// Configuration attached to an interceptor when it joins a chain.
#[derive(Debug, Clone, SmartDefault)]
pub struct InterceptorConfig {
    /// Whether the interceptor takes part in chains at all
    #[default = true]
    pub enabled: bool,
    /// Execution order: lower runs first
    pub priority: i32,
    /// Conditions a binding must satisfy for a global interceptor to attach
    pub conditions: Vec<ActivationCondition>,
    /// Free-form configuration parameters
    pub parameters: HashMap<String, serde_json::Value>,
    /// Whether the user may toggle the interceptor at runtime
    pub user_overridable: bool,
}

impl InterceptorConfig {
    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }
}

/// Conditions controlling where a global interceptor attaches.
///
/// Evaluated once per (component, method) when the chain is built, against
/// static binding facts only.
#[derive(Debug, Clone)]
pub enum ActivationCondition {
    /// Only for bindings wired to these trigger kinds
    Trigger(Vec<TriggerKind>),
    /// Only for these components
    Component(Vec<String>),
    /// Only for methods whose qualified name matches the pattern
    MethodPattern(Regex),
    /// Only in these environments (TREADLE_ENV / ENVIRONMENT)
    Environment(Vec<String>),
}

impl ActivationCondition {
    pub fn holds(&self, facts: &BindingFacts) -> bool {
        match self {
            Self::Trigger(kinds) => kinds.contains(&facts.trigger_kind()),
            Self::Component(components) => components
                .iter()
                .any(|component| component.as_str() == facts.method.component.as_ref()),
            Self::MethodPattern(pattern) => pattern.is_match(&facts.method.to_string()),
            Self::Environment(envs) => {
                const DEVELOPMENT: &str = "development";
                let current = std::env::var("TREADLE_ENV")
                    .or_else(|_| std::env::var("ENVIRONMENT"))
                    .unwrap_or_else(|_| DEVELOPMENT.to_string());
                envs.contains(&current)
            }
        }
    }
}
