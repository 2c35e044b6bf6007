//! Time units for expressing a maximum age.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AddressCacheError;

/// Unit in which a cache's maximum age is expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// 10^-9 seconds
    Nanoseconds,
    /// 10^-6 seconds
    Microseconds,
    /// 10^-3 seconds
    Milliseconds,
    /// One second
    Seconds,
    /// 60 seconds
    Minutes,
    /// 3600 seconds
    Hours,
    /// 86400 seconds
    Days,
}

impl TimeUnit {
    /// All units, finest first.
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Nanoseconds,
        TimeUnit::Microseconds,
        TimeUnit::Milliseconds,
        TimeUnit::Seconds,
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
    ];

    /// Converts `amount` of this unit into a [`Duration`].
    ///
    /// Returns `None` if the result does not fit.
    pub fn to_duration(self, amount: u64) -> Option<Duration> {
        match self {
            TimeUnit::Nanoseconds => Some(Duration::from_nanos(amount)),
            TimeUnit::Microseconds => Some(Duration::from_micros(amount)),
            TimeUnit::Milliseconds => Some(Duration::from_millis(amount)),
            TimeUnit::Seconds => Some(Duration::from_secs(amount)),
            TimeUnit::Minutes => amount.checked_mul(60).map(Duration::from_secs),
            TimeUnit::Hours => amount.checked_mul(3_600).map(Duration::from_secs),
            TimeUnit::Days => amount.checked_mul(86_400).map(Duration::from_secs),
        }
    }

    /// Lowercase name, as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = AddressCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "us" | "micros" | "microseconds" => Ok(TimeUnit::Microseconds),
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "sec" | "secs" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "mins" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "d" | "day" | "days" => Ok(TimeUnit::Days),
            other => Err(AddressCacheError::ConfigError(format!(
                "unknown time unit '{other}'"
            ))),
        }
    }
}
