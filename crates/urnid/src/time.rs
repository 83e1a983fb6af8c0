use chrono::{Local, NaiveDateTime};
use core::time::Duration;

/// Format of the timestamp body: `yyyyMMddHHmmss`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A trait for wall-clock sources used by the timestamp generation method.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use urnid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> chrono::NaiveDateTime {
///         NaiveDate::from_ymd_opt(2024, 5, 17)
///             .unwrap()
///             .and_hms_opt(9, 3, 7)
///             .unwrap()
///     }
/// }
///
/// assert_eq!(urnid::format_timestamp(&FixedTime), "20240517090307");
/// ```
pub trait TimeSource {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Local wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Renders the current time of `clock` as a timestamp body.
pub fn format_timestamp<T: TimeSource + ?Sized>(clock: &T) -> String {
    clock.now().format(TIMESTAMP_FORMAT).to_string()
}

/// A trait that abstracts over how the calling thread waits between
/// duplicate-avoidance attempts.
pub trait SleepProvider {
    fn sleep_for(&self, dur: Duration);
}

impl<P: SleepProvider + ?Sized> SleepProvider for &P {
    fn sleep_for(&self, dur: Duration) {
        (**self).sleep_for(dur);
    }
}

/// Blocks the current thread with [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl SleepProvider for ThreadSleep {
    fn sleep_for(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}
