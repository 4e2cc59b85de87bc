use std::sync::Arc;
use crate::interceptor::config::InterceptorConfig;
use crate::interceptor::traits::{MethodInterceptor, TargetOperation};
use crate::invocation::{MethodRef, TriggerKind};
use crate::schedule::Schedule;

/// One row of the registration table: a business method, its bound
/// interceptors and, for timer methods, the schedule.
pub struct MethodBinding {
    pub method: MethodRef,
    pub target: Arc<dyn TargetOperation>,
    pub interceptors: Vec<BoundInterceptor>,
    pub schedule: Option<Schedule>,
}

/// An interceptor declared directly on a binding.
pub struct BoundInterceptor {
    pub interceptor: Arc<dyn MethodInterceptor>,
    pub config: InterceptorConfig,
    pub name: String,
}

impl MethodBinding {
    pub fn new(
        component: impl Into<Arc<str>>,
        method: impl Into<Arc<str>>,
        target: Arc<dyn TargetOperation>,
    ) -> Self {
        Self {
            method: MethodRef::new(component, method),
            target,
            interceptors: Vec::new(),
            schedule: None,
        }
    }

    /// Attach an interceptor with its default configuration.
    pub fn intercept(self, interceptor: Arc<dyn MethodInterceptor>) -> Self {
        let config = interceptor.default_config();
        self.intercept_with(interceptor, config)
    }

    /// Attach an interceptor with an explicit configuration.
    pub fn intercept_with(
        mut self,
        interceptor: Arc<dyn MethodInterceptor>,
        config: InterceptorConfig,
    ) -> Self {
        let name = interceptor.name().to_string();
        self.interceptors.push(BoundInterceptor {
            interceptor,
            config,
            name,
        });
        self
    }

    /// Mark the method as timer-triggered.
    pub fn scheduled(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn facts(&self) -> BindingFacts {
        BindingFacts {
            method: self.method.clone(),
            scheduled: self.schedule.is_some(),
        }
    }
}

/// Static facts about a binding, used to evaluate activation conditions
/// when its chain is built.
#[derive(Debug, Clone)]
pub struct BindingFacts {
    pub method: MethodRef,
    pub scheduled: bool,
}

impl BindingFacts {
    /// The trigger kind the binding is wired for.
    pub fn trigger_kind(&self) -> TriggerKind {
        if self.scheduled {
            TriggerKind::Timer
        } else {
            TriggerKind::Call
        }
    }
}
