use treadle_core::interceptor::context::InvocationContext;
use treadle_core::interceptor::result::InvocationOutcome;
use treadle_core::interceptor::traits::TargetOperation;
use treadle_core::interceptor::InterceptorResult;

/// Stateless user component. A fresh value is built for every invocation;
/// nothing survives between calls.
pub struct UserService;

impl UserService {
    pub fn do_action(&self) -> String {
        "Executing action without parameters".to_string()
    }

    pub fn do_action_with(&self, name: &str, age: i64) {
        log::info!("Executing action with name: {name} and age: {age}");
    }
}

/// Stateless timer component.
pub struct TimerService;

impl TimerService {
    pub fn do_timer_action(&self) {
        log::info!("Executing timer action");
    }
}

/// `UserService::do_action` - parameterless, no interceptors bound.
pub struct UserAction;

#[async_trait::async_trait]
impl TargetOperation for UserAction {
    fn name(&self) -> &str {
        "UserService::do_action"
    }

    async fn invoke<'a>(&'a self, _context: InvocationContext<'a>) -> InterceptorResult {
        let service = UserService;
        Ok(InvocationOutcome::text(service.do_action()))
    }
}

/// `UserService::do_action_with(name, age)`.
pub struct UserActionWithArgs;

#[async_trait::async_trait]
impl TargetOperation for UserActionWithArgs {
    fn name(&self) -> &str {
        "UserService::do_action_with"
    }

    async fn invoke<'a>(&'a self, context: InvocationContext<'a>) -> InterceptorResult {
        let name: String = context.invocation.arg(0)?.try_into()?;
        let age: i64 = context.invocation.arg(1)?.try_into()?;

        let service = UserService;
        service.do_action_with(&name, age);
        Ok(InvocationOutcome::empty())
    }
}

/// `TimerService::do_timer_action` - fired by the scheduler.
pub struct TimerAction;

#[async_trait::async_trait]
impl TargetOperation for TimerAction {
    fn name(&self) -> &str {
        "TimerService::do_timer_action"
    }

    async fn invoke<'a>(&'a self, _context: InvocationContext<'a>) -> InterceptorResult {
        let service = TimerService;
        service.do_timer_action();
        Ok(InvocationOutcome::empty())
    }
}
