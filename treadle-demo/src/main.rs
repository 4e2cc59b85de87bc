mod components;
mod interceptors;
mod registry;

use std::sync::Arc;
use std::time::Duration;
use treadle_core::error::TreadleError;
use treadle_core::types::ArgValue;
use treadle_scheduler::TimerScheduler;

#[tokio::main]
async fn main() -> Result<(), TreadleError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let engine = Arc::new(registry::build_engine()?);

    let outcome = engine.invoke("UserService", "do_action", Vec::new()).await?;
    log::info!("{}", outcome.value.stringify());

    engine
        .invoke(
            "UserService",
            "do_action_with",
            vec![ArgValue::Text("Ada".to_string()), ArgValue::Number(30)],
        )
        .await?;

    let mut scheduler = TimerScheduler::new(engine.clone());
    scheduler.start()?;
    log::info!("timer scheduler running; the scheduled method disables itself after its first fire");

    // Long enough for at least one */10 calendar match.
    tokio::time::sleep(Duration::from_secs(25)).await;

    scheduler.stop();
    Ok(())
}
