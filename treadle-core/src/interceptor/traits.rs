use crate::binding::BindingFacts;
use crate::interceptor::config::InterceptorConfig;
use crate::interceptor::context::InvocationContext;
use crate::interceptor::{InterceptorResult, ProceedChain};

#[async_trait::async_trait]
/// A cross-cutting wrapper around a target operation.
pub trait MethodInterceptor: Send + Sync {
    /// Interceptor name, unique within a registry
    fn name(&self) -> &str;

    /// Short description for diagnostics
    fn description(&self) -> &str;

    /// Configuration used when none is given at registration
    fn default_config(&self) -> InterceptorConfig;

    /// Whether this interceptor attaches to the given binding
    fn should_activate(&self, facts: &BindingFacts, config: &InterceptorConfig) -> bool {
        if !config.enabled {
            return false;
        }
        config.conditions.iter().all(|condition| condition.holds(facts))
    }

    /// Wrap the invocation. Call `next` to proceed down the chain; return
    /// without calling it to short-circuit.
    async fn intercept<'a>(
        &'a self,
        context: InvocationContext<'a>,
        config: &'a InterceptorConfig,
        next: Box<ProceedChain<'a>>,
    ) -> InterceptorResult;
}

#[async_trait::async_trait]
/// The business method at the end of the chain.
pub trait TargetOperation: Send + Sync {
    /// Qualified method name, e.g. `UserService::do_action`
    fn name(&self) -> &str;

    async fn invoke<'a>(&'a self, context: InvocationContext<'a>) -> InterceptorResult;
}
