pub mod scheduler;

pub use scheduler::{ScheduledTimer, TimerScheduler};
