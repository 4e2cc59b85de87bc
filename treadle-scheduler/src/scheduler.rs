use std::sync::Arc;
use tokio::task::JoinHandle;
use treadle_core::error::{TreadleError, TreadleResult};
use treadle_core::interceptor::engine::InterceptorEngine;
use treadle_core::invocation::MethodRef;
use treadle_core::schedule::Schedule;
use treadle_core::timer::TimerHandle;

/// Drives the timer-triggered bindings of an engine: one task per
/// schedule, each firing its method when the calendar matches.
///
/// Schedules are not persistent; they exist only while the scheduler runs.
pub struct TimerScheduler {
    engine: Arc<InterceptorEngine>,
    timers: Vec<ScheduledTimer>,
}

/// A running timer: its cancellable handle plus the task driving it.
pub struct ScheduledTimer {
    pub method: MethodRef,
    pub handle: TimerHandle,
    task: JoinHandle<()>,
}

impl TimerScheduler {
    pub fn new(engine: Arc<InterceptorEngine>) -> Self {
        Self {
            engine,
            timers: Vec::new(),
        }
    }

    /// Spawn one timer task per scheduled binding.
    pub fn start(&mut self) -> TreadleResult<()> {
        if !self.timers.is_empty() {
            return Err(TreadleError::registration("scheduler is already started"));
        }
        for (method, schedule) in self.engine.scheduled_bindings() {
            let handle = TimerHandle::new();
            let task = tokio::spawn(Self::run_timer(
                self.engine.clone(),
                method.clone(),
                schedule,
                handle.clone(),
            ));
            log::debug!("scheduled timer started for {method}");
            self.timers.push(ScheduledTimer {
                method,
                handle,
                task,
            });
        }
        Ok(())
    }

    /// Cancel every timer and abort the driving tasks.
    pub fn stop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.handle.cancel();
            timer.task.abort();
            log::debug!("scheduled timer stopped for {}", timer.method);
        }
    }

    /// The currently running timers.
    pub fn timers(&self) -> &[ScheduledTimer] {
        &self.timers
    }

    async fn run_timer(
        engine: Arc<InterceptorEngine>,
        method: MethodRef,
        schedule: Schedule,
        handle: TimerHandle,
    ) {
        loop {
            let wait = schedule.until_next(chrono::Local::now().naive_local());
            tokio::time::sleep(wait).await;

            if handle.is_cancelled() {
                log::debug!("timer for {method} cancelled, stopping");
                break;
            }
            if let Err(err) = engine.fire_timer(&method, handle.clone()).await {
                log::error!("scheduled invocation of {method} failed: {err}");
            }
            // An interceptor may have cancelled the handle mid-chain.
            if handle.is_cancelled() {
                log::debug!("timer for {method} cancelled during invocation, stopping");
                break;
            }
        }
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
