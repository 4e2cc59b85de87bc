use std::time::Duration;
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use crate::error::{TreadleError, TreadleResult};

/// One calendar field: `*`, `*/step` or a literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleField {
    Every,
    Step(u32),
    At(u32),
}

impl ScheduleField {
    fn parse(text: &str, max: u32) -> TreadleResult<Self> {
        let text = text.trim();
        if text == "*" {
            return Ok(Self::Every);
        }
        if let Some(step) = text.strip_prefix("*/") {
            let step: u32 = step
                .parse()
                .map_err(|_| TreadleError::schedule_expr("step is not a number", text))?;
            if step == 0 || step > max {
                return Err(TreadleError::schedule_expr(
                    format!("step must be within 1..={max}"),
                    text,
                ));
            }
            return Ok(Self::Step(step));
        }
        let value: u32 = text
            .parse()
            .map_err(|_| TreadleError::schedule_expr("field is not a number", text))?;
        if value > max {
            return Err(TreadleError::schedule_expr(
                format!("value must be within 0..={max}"),
                text,
            ));
        }
        Ok(Self::At(value))
    }

    fn matches(&self, value: u32) -> bool {
        match self {
            Self::Every => true,
            Self::Step(step) => value % step == 0,
            Self::At(at) => value == *at,
        }
    }
}

/// Calendar schedule over hour, minute and second, evaluated against local
/// wall-clock time. Non-persistent: lives only for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub hour: ScheduleField,
    pub minute: ScheduleField,
    pub second: ScheduleField,
}

impl Schedule {
    /// Parse the three calendar fields, e.g. `("*", "*", "*/10")`.
    pub fn calendar(hour: &str, minute: &str, second: &str) -> TreadleResult<Self> {
        Ok(Self {
            hour: ScheduleField::parse(hour, 23)?,
            minute: ScheduleField::parse(minute, 59)?,
            second: ScheduleField::parse(second, 59)?,
        })
    }

    /// Wildcard hours and minutes with a stepped second field: the shape
    /// of "every N seconds".
    pub fn every_seconds(step: u32) -> TreadleResult<Self> {
        if step == 0 || step > 59 {
            return Err(TreadleError::schedule(format!(
                "second step must be within 1..=59, got {step}"
            )));
        }
        Ok(Self {
            hour: ScheduleField::Every,
            minute: ScheduleField::Every,
            second: ScheduleField::Step(step),
        })
    }

    pub fn matches(&self, time: NaiveTime) -> bool {
        self.hour.matches(time.hour())
            && self.minute.matches(time.minute())
            && self.second.matches(time.second())
    }

    /// Delay from `now` until the next matching whole second.
    pub fn until_next(&self, now: NaiveDateTime) -> Duration {
        // Validated fields always match at least one second per day, so a
        // bounded forward scan is enough.
        let base = now.with_nanosecond(0).unwrap_or(now);
        let mut candidate = base + chrono::Duration::seconds(1);
        for _ in 0..86_400 {
            if self.matches(candidate.time()) {
                let delta = candidate - now;
                return delta.to_std().unwrap_or(Duration::from_secs(1));
            }
            candidate += chrono::Duration::seconds(1);
        }
        Duration::from_secs(1)
    }
}
