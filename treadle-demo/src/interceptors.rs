use treadle_core::event::channel::InvocationEventKind;
use treadle_core::interceptor::config::InterceptorConfig;
use treadle_core::interceptor::context::InvocationContext;
use treadle_core::interceptor::traits::MethodInterceptor;
use treadle_core::interceptor::{InterceptorResult, ProceedChain};

pub const TIMEOUT_LOGGER_PRIORITY: i32 = 1;
pub const LOGIN_PRIORITY: i32 = 2;

/// Authentication guard for the user operations it is bound to.
pub struct LoginInterceptor;

#[async_trait::async_trait]
impl MethodInterceptor for LoginInterceptor {
    fn name(&self) -> &str {
        "login"
    }

    fn description(&self) -> &str {
        "checks the caller's login status before proceeding"
    }

    fn default_config(&self) -> InterceptorConfig {
        InterceptorConfig::with_priority(LOGIN_PRIORITY)
    }

    async fn intercept<'a>(
        &'a self,
        context: InvocationContext<'a>,
        _config: &'a InterceptorConfig,
        next: Box<ProceedChain<'a>>,
    ) -> InterceptorResult {
        log::info!("Checking login status...");
        next(context).await
    }
}

/// Logs around timer invocations and cancels the handle before
/// proceeding, so the schedule fires once and then stays quiet.
pub struct TimeoutLoggerInterceptor;

#[async_trait::async_trait]
impl MethodInterceptor for TimeoutLoggerInterceptor {
    fn name(&self) -> &str {
        "timeout-logger"
    }

    fn description(&self) -> &str {
        "logs around timer invocations and disables further firing"
    }

    fn default_config(&self) -> InterceptorConfig {
        InterceptorConfig::with_priority(TIMEOUT_LOGGER_PRIORITY)
    }

    async fn intercept<'a>(
        &'a self,
        context: InvocationContext<'a>,
        _config: &'a InterceptorConfig,
        next: Box<ProceedChain<'a>>,
    ) -> InterceptorResult {
        let method = context.invocation.method.clone();
        log::info!("Timer method is about to be invoked: {}", method.method);

        if let Some(handle) = context.invocation.trigger.timer_handle() {
            handle.cancel();
            context.channel.emit(InvocationEventKind::TimerCancelled {
                method: method.to_string(),
            });
        }

        let result = next(context).await?;
        log::info!("Timer method has been invoked: {}", method.method);
        Ok(result)
    }
}
