use std::sync::Arc;
use treadle_core::binding::MethodBinding;
use treadle_core::error::TreadleResult;
use treadle_core::interceptor::engine::InterceptorEngine;
use treadle_core::schedule::Schedule;
use crate::components::{TimerAction, UserAction, UserActionWithArgs};
use crate::interceptors::{LoginInterceptor, TimeoutLoggerInterceptor};

/// The registration table: every business method, its interceptors and,
/// for the timer method, its schedule.
pub fn build_engine() -> TreadleResult<InterceptorEngine> {
    let mut engine = InterceptorEngine::new();

    engine.register(MethodBinding::new(
        "UserService",
        "do_action",
        Arc::new(UserAction),
    ))?;

    engine.register(
        MethodBinding::new("UserService", "do_action_with", Arc::new(UserActionWithArgs))
            .intercept(Arc::new(LoginInterceptor)),
    )?;

    engine.register(
        MethodBinding::new("TimerService", "do_timer_action", Arc::new(TimerAction))
            .intercept(Arc::new(TimeoutLoggerInterceptor))
            .scheduled(Schedule::calendar("*", "*", "*/10")?),
    )?;

    Ok(engine)
}
