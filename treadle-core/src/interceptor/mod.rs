use std::pin::Pin;
use std::sync::Arc;
use crate::error::TreadleResult;
use crate::interceptor::config::InterceptorConfig;
use crate::interceptor::context::InvocationContext;
use crate::interceptor::result::InvocationOutcome;
use crate::interceptor::traits::{MethodInterceptor, TargetOperation};

pub mod config;
pub mod context;
pub mod engine;
pub mod global;
pub mod priority;
pub mod result;
pub mod traits;

/// The proceed continuation handed to each interceptor: invoking it runs
/// the rest of the chain; returning without invoking it short-circuits.
pub type ProceedChain<'a> = dyn FnOnce(InvocationContext<'a>)
    -> Pin<Box<dyn Future<Output = InterceptorResult> + Send + 'a>> + Send + 'a;

pub type InterceptorResult = TreadleResult<InvocationOutcome>;

/// Where an interceptor came from when it joined a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorKind {
    /// Declared on the method binding itself.
    Bound,
    /// Attached by activation condition from the global registry.
    Global,
}

/// An interceptor instantiated into a chain with its effective config.
#[derive(Clone)]
pub struct ActiveInterceptor {
    pub interceptor: Arc<dyn MethodInterceptor>,
    pub config: InterceptorConfig,
    pub name: String,
    pub kind: InterceptorKind,
}

/// The terminal link: the business method itself.
#[derive(Clone)]
pub struct ActiveTarget {
    pub target: Arc<dyn TargetOperation>,
    pub name: String,
}

/// One link of a built chain.
#[derive(Clone)]
pub enum ChainLink {
    Interceptor(ActiveInterceptor),
    Target(ActiveTarget),
}

impl ChainLink {
    /// Lower priority runs first; the target always runs last.
    pub fn priority(&self) -> i32 {
        match self {
            Self::Interceptor(active) => active.config.priority,
            Self::Target(_) => i32::MAX,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Interceptor(active) => &active.name,
            Self::Target(target) => &target.name,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Interceptor(active) => match active.kind {
                InterceptorKind::Bound => "bound",
                InterceptorKind::Global => "global",
            },
            Self::Target(_) => "target",
        }
    }

    pub fn sort(a: &ChainLink, b: &ChainLink) -> std::cmp::Ordering {
        a.priority().cmp(&b.priority())
    }
}
