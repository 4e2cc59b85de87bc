use std::collections::HashMap;
use std::sync::Arc;
use crate::binding::BindingFacts;
use crate::error::{TreadleError, TreadleResult};
use crate::interceptor::config::InterceptorConfig;
use crate::interceptor::priority::PriorityRanges;
use crate::interceptor::traits::MethodInterceptor;
use crate::interceptor::{ActiveInterceptor, InterceptorKind};
use crate::registration_error;

/// Registry for interceptors that attach by activation condition instead
/// of per-binding declaration.
pub struct GlobalInterceptorManager {
    interceptors: HashMap<String, Arc<dyn MethodInterceptor>>,
    configs: HashMap<String, InterceptorConfig>,
    user_overrides: HashMap<String, bool>,
    // Registration order is the tie-break for equal priorities
    order: Vec<String>,
}

impl GlobalInterceptorManager {
    pub fn new() -> Self {
        Self {
            interceptors: HashMap::new(),
            configs: HashMap::new(),
            user_overrides: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, interceptor: Arc<dyn MethodInterceptor>) -> TreadleResult<()> {
        let name = interceptor.name().to_string();
        if self.interceptors.contains_key(&name) {
            return registration_error!("global interceptor '{}' is already registered", name);
        }
        let config = interceptor.default_config();
        validate_priority(config.priority)?;

        self.interceptors.insert(name.clone(), interceptor);
        self.configs.insert(name.clone(), config);
        self.order.push(name);
        Ok(())
    }

    pub fn configure(&mut self, name: &str, config: InterceptorConfig) -> TreadleResult<()> {
        if !self.interceptors.contains_key(name) {
            return registration_error!("global interceptor '{}' not found", name);
        }
        validate_priority(config.priority)?;
        self.configs.insert(name.to_string(), config);
        Ok(())
    }

    pub fn set_user_override(&mut self, name: &str, enabled: bool) -> TreadleResult<()> {
        let config = self.configs.get(name).ok_or_else(|| {
            TreadleError::registration(format!("global interceptor '{name}' not found"))
        })?;

        if !config.user_overridable {
            return registration_error!("global interceptor '{}' cannot be overridden", name);
        }

        self.user_overrides.insert(name.to_string(), enabled);
        Ok(())
    }

    /// Interceptors whose conditions hold for the given binding, in
    /// registration order.
    pub fn get_active(&self, facts: &BindingFacts) -> Vec<ActiveInterceptor> {
        let mut active = Vec::new();

        for name in &self.order {
            let (Some(interceptor), Some(config)) =
                (self.interceptors.get(name), self.configs.get(name))
            else {
                continue;
            };
            let mut config = config.clone();

            if let Some(&user_enabled) = self.user_overrides.get(name) {
                config.enabled = user_enabled;
            }

            if interceptor.should_activate(facts, &config) {
                active.push(ActiveInterceptor {
                    interceptor: interceptor.clone(),
                    config,
                    name: name.clone(),
                    kind: InterceptorKind::Global,
                });
            }
        }

        active
    }
}

pub(crate) fn validate_priority(priority: i32) -> TreadleResult<()> {
    if !PriorityRanges::ACCEPTED.contains(&priority) {
        return registration_error!(
            "interceptor priority {} is outside the accepted range {}..{}",
            priority,
            PriorityRanges::ACCEPTED.start,
            PriorityRanges::ACCEPTED.end
        );
    }
    Ok(())
}
