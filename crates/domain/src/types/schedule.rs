//! Daily schedule time

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::HoyoSignError;

/// Local time of day for the daily run, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleTime {
    hour: u8,
    minute: u8,
}

impl ScheduleTime {
    /// # Errors
    /// Returns [`HoyoSignError::Validation`] when out of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, HoyoSignError> {
        if hour > 23 || minute > 59 {
            return Err(HoyoSignError::Validation(format!(
                "schedule time out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// True when `now` falls inside this hour:minute.
    pub fn matches(self, now: NaiveDateTime) -> bool {
        now.hour() == u32::from(self.hour) && now.minute() == u32::from(self.minute)
    }

    /// Next occurrence strictly after `now`: today if still ahead, else tomorrow.
    pub fn next_after(self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.as_naive_time());
        if today > now {
            today
        } else {
            today.checked_add_days(Days::new(1)).unwrap_or(today)
        }
    }

    fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl Default for ScheduleTime {
    fn default() -> Self {
        Self { hour: 8, minute: 0 }
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ScheduleTime {
    type Err = HoyoSignError;

    /// Parses `HH:MM` (a single-digit hour such as `8:05` is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || HoyoSignError::Validation(format!("invalid time format: {s}, expected HH:MM"));

        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ScheduleTime {
    type Error = HoyoSignError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScheduleTime> for String {
    fn from(value: ScheduleTime) -> Self {
        value.to_string()
    }
}
