use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::mpsc;
use crate::binding::MethodBinding;
use crate::error::{TreadleError, TreadleResult};
use crate::event::channel::{InvocationEvent, InvocationEventChannel, InvocationEventKind};
use crate::interceptor::config::InterceptorConfig;
use crate::interceptor::context::InvocationContext;
use crate::interceptor::global::{validate_priority, GlobalInterceptorManager};
use crate::interceptor::traits::MethodInterceptor;
use crate::interceptor::{
    ActiveInterceptor, ActiveTarget, ChainLink, InterceptorKind, InterceptorResult, ProceedChain,
};
use crate::invocation::{Invocation, MethodRef, Trigger};
use crate::schedule::Schedule;
use crate::timer::TimerHandle;
use crate::types::ArgValue;

/// Middleware pattern (filter chain): a business method runs only at the
/// end of the ordered interceptor chain built for it.
///
/// Registration happens at startup; dispatch is `&self` and chains are
/// memoized, one per (component, method).
pub struct InterceptorEngine {
    bindings: HashMap<MethodRef, MethodBinding>,
    global_manager: GlobalInterceptorManager,
    chains: RwLock<HashMap<MethodRef, Arc<[ChainLink]>>>,
    channel: InvocationEventChannel,
}

impl InterceptorEngine {
    pub fn new() -> Self {
        let (channel, _receiver) = InvocationEventChannel::new();
        Self {
            bindings: HashMap::new(),
            global_manager: GlobalInterceptorManager::new(),
            chains: RwLock::new(HashMap::new()),
            channel,
        }
    }

    /// Swap in a fresh event channel and hand back its receiving end.
    /// Events emitted before this call are gone.
    pub fn observe_events(&mut self) -> mpsc::UnboundedReceiver<InvocationEvent> {
        let (channel, receiver) = InvocationEventChannel::new();
        self.channel = channel;
        receiver
    }

    /// Register a method binding. Rejects duplicate methods and
    /// out-of-range priorities.
    pub fn register(&mut self, binding: MethodBinding) -> TreadleResult<()> {
        if self.bindings.contains_key(&binding.method) {
            return Err(TreadleError::registration(format!(
                "method '{}' is already bound",
                binding.method
            )));
        }
        for bound in &binding.interceptors {
            validate_priority(bound.config.priority)?;
        }
        log::debug!("registered binding for {}", binding.method);
        self.bindings.insert(binding.method.clone(), binding);
        Ok(())
    }

    /// Register a global interceptor with its default configuration.
    pub fn register_global(&mut self, interceptor: Arc<dyn MethodInterceptor>) -> TreadleResult<()> {
        self.global_manager.register(interceptor)
    }

    /// Replace a global interceptor's configuration.
    pub fn configure_global(&mut self, name: &str, config: InterceptorConfig) -> TreadleResult<()> {
        self.global_manager.configure(name, config)
    }

    /// User-level enable/disable override for a global interceptor.
    pub fn override_global(&mut self, name: &str, enabled: bool) -> TreadleResult<()> {
        self.global_manager.set_user_override(name, enabled)
    }

    /// The bindings a scheduler must drive.
    pub fn scheduled_bindings(&self) -> Vec<(MethodRef, Schedule)> {
        self.bindings
            .values()
            .filter_map(|binding| {
                binding
                    .schedule
                    .clone()
                    .map(|schedule| (binding.method.clone(), schedule))
            })
            .collect()
    }

    /// Direct invocation with explicit arguments.
    pub async fn invoke(
        &self,
        component: &str,
        method: &str,
        args: Vec<ArgValue>,
    ) -> InterceptorResult {
        self.dispatch(MethodRef::new(component, method), args, Trigger::Call)
            .await
    }

    /// Timer-triggered invocation carrying the cancellable handle.
    pub async fn fire_timer(&self, method: &MethodRef, handle: TimerHandle) -> InterceptorResult {
        self.channel.emit(InvocationEventKind::TimerFired {
            method: method.to_string(),
        });
        self.dispatch(method.clone(), Vec::new(), Trigger::Timer(handle))
            .await
    }

    async fn dispatch(
        &self,
        method: MethodRef,
        args: Vec<ArgValue>,
        trigger: Trigger,
    ) -> InterceptorResult {
        let chain = self.chain_for(&method)?;
        let invocation = Invocation::new(method, args, trigger);
        let context = InvocationContext::new(&invocation, self.channel.clone());

        self.channel.emit(InvocationEventKind::InvocationStarted {
            method: invocation.method.to_string(),
            trigger: invocation.trigger.kind().to_string(),
        });
        let started = Instant::now();

        let result = Self::execute_chain(context, &chain).await;

        self.channel.emit(InvocationEventKind::InvocationCompleted {
            method: invocation.method.to_string(),
            success: result.is_ok(),
            duration_ms: started.elapsed().as_millis() as u64,
        });
        if let Err(err) = &result {
            log::debug!("invocation of {} failed: {}", invocation.method, err);
        }
        result
    }

    /// The memoized chain for a method, built on first use.
    fn chain_for(&self, method: &MethodRef) -> TreadleResult<Arc<[ChainLink]>> {
        if let Some(chain) = self
            .chains
            .read()
            .expect("chain cache poisoned")
            .get(method)
        {
            return Ok(chain.clone());
        }

        let binding = self
            .bindings
            .get(method)
            .ok_or_else(|| TreadleError::unknown_method(method.to_string()))?;
        let chain: Arc<[ChainLink]> = self.build_chain(binding).into();

        self.chains
            .write()
            .expect("chain cache poisoned")
            .insert(method.clone(), chain.clone());
        Ok(chain)
    }

    /// Globals that activate, then bound interceptors, sorted ascending by
    /// priority (stable, so equal priorities keep registration order), with
    /// the target plugged at the end.
    fn build_chain(&self, binding: &MethodBinding) -> Vec<ChainLink> {
        let facts = binding.facts();
        let mut chain: Vec<ChainLink> = Vec::new();

        for active in self.global_manager.get_active(&facts) {
            chain.push(ChainLink::Interceptor(active));
        }
        for bound in &binding.interceptors {
            chain.push(ChainLink::Interceptor(ActiveInterceptor {
                interceptor: bound.interceptor.clone(),
                config: bound.config.clone(),
                name: bound.name.clone(),
                kind: InterceptorKind::Bound,
            }));
        }

        chain.sort_by(ChainLink::sort);

        chain.push(ChainLink::Target(ActiveTarget {
            target: binding.target.clone(),
            name: binding.target.name().to_string(),
        }));
        chain
    }

    /// Walk a built chain from its first link.
    pub async fn execute_chain<'a>(
        context: InvocationContext<'a>,
        chain: &'a [ChainLink],
    ) -> InterceptorResult {
        Self::execute_from(context, chain, 0).await
    }

    async fn execute_from<'a>(
        context: InvocationContext<'a>,
        chain: &'a [ChainLink],
        index: usize,
    ) -> InterceptorResult {
        let Some(link) = chain.get(index) else {
            return Err(TreadleError::execution(
                "proceed called past the end of the chain",
            ));
        };

        let channel = context.channel.clone();
        channel.emit(InvocationEventKind::InterceptorTriggered {
            interceptor: link.name().to_string(),
            kind: link.kind_label().to_string(),
            priority: link.priority(),
        });

        match link {
            ChainLink::Target(target) => {
                log::trace!("invoking target {}", target.name);
                target.target.invoke(context).await
            }
            ChainLink::Interceptor(active) => {
                let proceeded = Arc::new(AtomicBool::new(false));
                let next = Self::proceed_from(chain, index + 1, proceeded.clone());

                let result = active
                    .interceptor
                    .intercept(context, &active.config, next)
                    .await;

                if result.is_ok() && !proceeded.load(Ordering::SeqCst) {
                    channel.emit(InvocationEventKind::ChainShortCircuited {
                        interceptor: active.name.clone(),
                    });
                }
                result.map_err(|err| err.through_interceptor(&active.name))
            }
        }
    }

    fn proceed_from<'a>(
        chain: &'a [ChainLink],
        next_index: usize,
        proceeded: Arc<AtomicBool>,
    ) -> Box<ProceedChain<'a>> {
        Box::new(move |context: InvocationContext<'a>| {
            proceeded.store(true, Ordering::SeqCst);
            Box::pin(Self::execute_from(context, chain, next_index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use crate::interceptor::result::InvocationOutcome;
    use crate::interceptor::traits::TargetOperation;
    use crate::interceptor::config::ActivationCondition;

    fn trace(context: &InvocationContext<'_>, tag: &str) {
        let so_far = context.metadata("trace").unwrap_or_default();
        let joined = if so_far.is_empty() {
            tag.to_string()
        } else {
            format!("{so_far},{tag}")
        };
        context.put_metadata("trace", joined);
    }

    fn triggered(receiver: &mut mpsc::UnboundedReceiver<InvocationEvent>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let InvocationEventKind::InterceptorTriggered { interceptor, .. } = event.kind {
                names.push(interceptor);
            }
        }
        names
    }

    struct TraceInterceptor {
        name: &'static str,
        priority: i32,
    }

    #[async_trait::async_trait]
    impl MethodInterceptor for TraceInterceptor {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "records its position in the chain"
        }
        fn default_config(&self) -> InterceptorConfig {
            InterceptorConfig::with_priority(self.priority)
        }
        async fn intercept<'a>(
            &'a self,
            context: InvocationContext<'a>,
            _config: &'a InterceptorConfig,
            next: Box<ProceedChain<'a>>,
        ) -> InterceptorResult {
            trace(&context, self.name);
            next(context).await
        }
    }

    struct GateInterceptor {
        priority: i32,
    }

    #[async_trait::async_trait]
    impl MethodInterceptor for GateInterceptor {
        fn name(&self) -> &str {
            "gate"
        }
        fn description(&self) -> &str {
            "short-circuits without proceeding"
        }
        fn default_config(&self) -> InterceptorConfig {
            InterceptorConfig::with_priority(self.priority)
        }
        async fn intercept<'a>(
            &'a self,
            _context: InvocationContext<'a>,
            _config: &'a InterceptorConfig,
            _next: Box<ProceedChain<'a>>,
        ) -> InterceptorResult {
            Ok(InvocationOutcome::text("blocked by gate"))
        }
    }

    struct RecoveringInterceptor;

    #[async_trait::async_trait]
    impl MethodInterceptor for RecoveringInterceptor {
        fn name(&self) -> &str {
            "recover"
        }
        fn description(&self) -> &str {
            "turns downstream failures into a fallback outcome"
        }
        fn default_config(&self) -> InterceptorConfig {
            InterceptorConfig::with_priority(100)
        }
        async fn intercept<'a>(
            &'a self,
            context: InvocationContext<'a>,
            _config: &'a InterceptorConfig,
            next: Box<ProceedChain<'a>>,
        ) -> InterceptorResult {
            match next(context).await {
                Ok(outcome) => Ok(outcome),
                Err(_) => Ok(InvocationOutcome::text("recovered")),
            }
        }
    }

    struct UserScopedInterceptor;

    #[async_trait::async_trait]
    impl MethodInterceptor for UserScopedInterceptor {
        fn name(&self) -> &str {
            "user-scoped"
        }
        fn description(&self) -> &str {
            "attaches to UserService methods only"
        }
        fn default_config(&self) -> InterceptorConfig {
            InterceptorConfig {
                priority: 500,
                conditions: vec![ActivationCondition::MethodPattern(
                    Regex::new("^UserService#").unwrap(),
                )],
                ..InterceptorConfig::default()
            }
        }
        async fn intercept<'a>(
            &'a self,
            context: InvocationContext<'a>,
            _config: &'a InterceptorConfig,
            next: Box<ProceedChain<'a>>,
        ) -> InterceptorResult {
            trace(&context, "user-scoped");
            next(context).await
        }
    }

    struct TraceTarget;

    #[async_trait::async_trait]
    impl TargetOperation for TraceTarget {
        fn name(&self) -> &str {
            "Trace::run"
        }
        async fn invoke<'a>(&'a self, context: InvocationContext<'a>) -> InterceptorResult {
            trace(&context, "target");
            let full = context.metadata("trace").unwrap_or_default();
            Ok(InvocationOutcome::text("done").with_metadata("trace", full))
        }
    }

    struct FailingTarget;

    #[async_trait::async_trait]
    impl TargetOperation for FailingTarget {
        fn name(&self) -> &str {
            "Failing::run"
        }
        async fn invoke<'a>(&'a self, _context: InvocationContext<'a>) -> InterceptorResult {
            Err(TreadleError::execution("target exploded"))
        }
    }

    fn outcome_trace(outcome: &InvocationOutcome) -> &str {
        outcome.metadata.get("trace").map(String::as_str).unwrap_or("")
    }

    #[tokio::test]
    async fn interceptors_run_in_ascending_priority_order() {
        let mut engine = InterceptorEngine::new();
        // Declared high-priority first; order must come from priorities.
        engine
            .register(
                MethodBinding::new("Svc", "run", Arc::new(TraceTarget))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "late",
                        priority: 2000,
                    }))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "early",
                        priority: 1000,
                    })),
            )
            .unwrap();

        let outcome = engine.invoke("Svc", "run", Vec::new()).await.unwrap();
        assert_eq!(outcome_trace(&outcome), "early,late,target");
    }

    #[tokio::test]
    async fn equal_priorities_keep_registration_order() {
        let mut engine = InterceptorEngine::new();
        engine
            .register(
                MethodBinding::new("Svc", "run", Arc::new(TraceTarget))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "first",
                        priority: 1000,
                    }))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "second",
                        priority: 1000,
                    })),
            )
            .unwrap();

        let outcome = engine.invoke("Svc", "run", Vec::new()).await.unwrap();
        assert_eq!(outcome_trace(&outcome), "first,second,target");
    }

    #[tokio::test]
    async fn not_proceeding_short_circuits_the_chain() {
        let mut engine = InterceptorEngine::new();
        let mut events = engine.observe_events();
        engine
            .register(
                MethodBinding::new("Svc", "run", Arc::new(TraceTarget))
                    .intercept(Arc::new(GateInterceptor { priority: 1000 }))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "late",
                        priority: 2000,
                    })),
            )
            .unwrap();

        let outcome = engine.invoke("Svc", "run", Vec::new()).await.unwrap();
        assert_eq!(outcome.value, ArgValue::Text("blocked by gate".to_string()));

        // Neither the later interceptor nor the target ever ran.
        assert_eq!(triggered(&mut events), vec!["gate".to_string()]);
    }

    #[tokio::test]
    async fn short_circuit_is_reported_on_the_event_channel() {
        let mut engine = InterceptorEngine::new();
        let mut events = engine.observe_events();
        engine
            .register(
                MethodBinding::new("Svc", "run", Arc::new(TraceTarget))
                    .intercept(Arc::new(GateInterceptor { priority: 1000 })),
            )
            .unwrap();

        engine.invoke("Svc", "run", Vec::new()).await.unwrap();

        let mut short_circuited = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let InvocationEventKind::ChainShortCircuited { interceptor } = event.kind {
                short_circuited.push(interceptor);
            }
        }
        assert_eq!(short_circuited, vec!["gate".to_string()]);
    }

    #[tokio::test]
    async fn method_without_interceptors_runs_unwrapped() {
        let mut engine = InterceptorEngine::new();
        let mut events = engine.observe_events();
        engine
            .register(MethodBinding::new("Svc", "run", Arc::new(TraceTarget)))
            .unwrap();

        let outcome = engine.invoke("Svc", "run", Vec::new()).await.unwrap();
        assert_eq!(outcome_trace(&outcome), "target");
        assert_eq!(triggered(&mut events), vec!["Trace::run".to_string()]);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let engine = InterceptorEngine::new();
        let result = engine.invoke("Svc", "missing", Vec::new()).await;
        assert!(matches!(result, Err(TreadleError::UnknownMethod { .. })));
    }

    #[tokio::test]
    async fn duplicate_binding_is_rejected() {
        let mut engine = InterceptorEngine::new();
        engine
            .register(MethodBinding::new("Svc", "run", Arc::new(TraceTarget)))
            .unwrap();
        let result = engine.register(MethodBinding::new("Svc", "run", Arc::new(TraceTarget)));
        assert!(matches!(
            result,
            Err(TreadleError::RegistrationError { .. })
        ));
    }

    #[tokio::test]
    async fn out_of_range_priority_is_rejected() {
        let mut engine = InterceptorEngine::new();
        let result = engine.register(
            MethodBinding::new("Svc", "run", Arc::new(TraceTarget)).intercept(Arc::new(
                TraceInterceptor {
                    name: "overflow",
                    priority: 10_000,
                },
            )),
        );
        assert!(matches!(
            result,
            Err(TreadleError::RegistrationError { .. })
        ));
    }

    #[tokio::test]
    async fn target_errors_propagate_to_the_caller() {
        let mut engine = InterceptorEngine::new();
        engine
            .register(
                MethodBinding::new("Svc", "boom", Arc::new(FailingTarget)).intercept(Arc::new(
                    TraceInterceptor {
                        name: "observer",
                        priority: 1000,
                    },
                )),
            )
            .unwrap();

        let result = engine.invoke("Svc", "boom", Vec::new()).await;
        assert!(matches!(result, Err(TreadleError::ExecutionError { .. })));
    }

    #[tokio::test]
    async fn interceptor_faults_collect_the_traversal_stack() {
        struct FaultingTarget;

        #[async_trait::async_trait]
        impl TargetOperation for FaultingTarget {
            fn name(&self) -> &str {
                "Faulting::run"
            }
            async fn invoke<'a>(&'a self, _context: InvocationContext<'a>) -> InterceptorResult {
                Err(TreadleError::target_fault("Faulting::run", "no database"))
            }
        }

        let mut engine = InterceptorEngine::new();
        engine
            .register(
                MethodBinding::new("Svc", "fault", Arc::new(FaultingTarget))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "outer",
                        priority: 1000,
                    }))
                    .intercept(Arc::new(TraceInterceptor {
                        name: "inner",
                        priority: 2000,
                    })),
            )
            .unwrap();

        let err = engine.invoke("Svc", "fault", Vec::new()).await.unwrap_err();
        match err {
            TreadleError::InterceptorError {
                interceptor_stack, ..
            } => {
                // Innermost first: the error passed back through both.
                assert_eq!(interceptor_stack, vec!["inner".to_string(), "outer".to_string()]);
            }
            other => panic!("expected an interceptor error, got {other}"),
        }
    }

    #[tokio::test]
    async fn interceptor_can_recover_a_downstream_failure() {
        let mut engine = InterceptorEngine::new();
        engine
            .register(
                MethodBinding::new("Svc", "boom", Arc::new(FailingTarget))
                    .intercept(Arc::new(RecoveringInterceptor)),
            )
            .unwrap();

        let outcome = engine.invoke("Svc", "boom", Vec::new()).await.unwrap();
        assert_eq!(outcome.value, ArgValue::Text("recovered".to_string()));
    }

    #[tokio::test]
    async fn global_interceptors_attach_by_activation_condition() {
        let mut engine = InterceptorEngine::new();
        engine.register_global(Arc::new(UserScopedInterceptor)).unwrap();
        engine
            .register(MethodBinding::new("UserService", "run", Arc::new(TraceTarget)))
            .unwrap();
        engine
            .register(MethodBinding::new("BatchService", "run", Arc::new(TraceTarget)))
            .unwrap();

        let outcome = engine
            .invoke("UserService", "run", Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome_trace(&outcome), "user-scoped,target");

        let outcome = engine
            .invoke("BatchService", "run", Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome_trace(&outcome), "target");
    }

    #[tokio::test]
    async fn chains_are_built_once_per_method() {
        let mut engine = InterceptorEngine::new();
        engine
            .register(MethodBinding::new("UserService", "run", Arc::new(TraceTarget)))
            .unwrap();

        let outcome = engine
            .invoke("UserService", "run", Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome_trace(&outcome), "target");

        // Registered after the first dispatch: the memoized chain must not
        // pick it up.
        engine.register_global(Arc::new(UserScopedInterceptor)).unwrap();

        let outcome = engine
            .invoke("UserService", "run", Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome_trace(&outcome), "target");
    }

    #[tokio::test]
    async fn timer_trigger_carries_the_handle_into_the_chain() {
        struct HandleInspectingTarget;

        #[async_trait::async_trait]
        impl TargetOperation for HandleInspectingTarget {
            fn name(&self) -> &str {
                "Inspect::run"
            }
            async fn invoke<'a>(&'a self, context: InvocationContext<'a>) -> InterceptorResult {
                let seen = context.invocation.trigger.timer_handle().is_some();
                Ok(InvocationOutcome::text(seen.to_string()))
            }
        }

        let mut engine = InterceptorEngine::new();
        engine
            .register(
                MethodBinding::new("TimerService", "tick", Arc::new(HandleInspectingTarget))
                    .scheduled(Schedule::every_seconds(10).unwrap()),
            )
            .unwrap();

        let method = MethodRef::new("TimerService", "tick");
        let outcome = engine
            .fire_timer(&method, TimerHandle::new())
            .await
            .unwrap();
        assert_eq!(outcome.value, ArgValue::Text("true".to_string()));
    }
}
