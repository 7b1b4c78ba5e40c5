//! Clock abstraction
//!
//! Expiration checks and opening-hours logic read time through this trait so
//! tests can drive them without touching the wall clock.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveTime, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant, UTC
    fn now(&self) -> DateTime<Utc>;

    /// Local wall-clock time of day, for warehouse opening hours
    fn time_of_day(&self) -> NaiveTime;
}

/// Production clock backed by the system time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Manually advanced clock for tests
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    time_of_day: Mutex<Option<NaiveTime>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            time_of_day: Mutex::new(None),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Pin the local time of day independently of `now`
    pub fn set_time_of_day(&self, time: NaiveTime) {
        *self.time_of_day.lock().unwrap_or_else(|e| e.into_inner()) = Some(time);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn time_of_day(&self) -> NaiveTime {
        let pinned = *self.time_of_day.lock().unwrap_or_else(|e| e.into_inner());
        pinned.unwrap_or_else(|| self.now().time())
    }
}
