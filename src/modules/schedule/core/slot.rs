// Slot identity, slot states and the working-hours tick list.
//
// Slot identity is (calendar date, time of day) truncated to the minute. Both the
// grid and the appointment index build keys through `SlotKey::of`, so a slot and
// an appointment at the same wall-clock minute always meet.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time: truncate_to_minute(time),
        }
    }

    pub fn of(instant: NaiveDateTime) -> Self {
        Self::new(instant.date(), instant.time())
    }

    /// Local wall-clock instant at which the slot starts.
    pub fn instant(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"))
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Past,
    Booked,
    Available,
    /// Never produced by classification. Views fall back to it for slots the
    /// grid did not enumerate.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotGranularity {
    Hourly,
    HalfHourly,
}

impl SlotGranularity {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            60 => Some(Self::Hourly),
            30 => Some(Self::HalfHourly),
            _ => None,
        }
    }

    pub fn minutes(self) -> i64 {
        match self {
            Self::Hourly => 60,
            Self::HalfHourly => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkingHoursError {
    #[error("hour {0} is outside 0..=23")]
    InvalidHour(u32),

    #[error("working hours end ({end}) before they start ({start})")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },
}

/// Ordered, duplicate-free list of slot start times within one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingHours {
    ticks: Vec<NaiveTime>,
}

impl WorkingHours {
    /// Ticks from `first` to `last`, both inclusive, every `granularity`.
    pub fn new(
        first: NaiveTime,
        last: NaiveTime,
        granularity: SlotGranularity,
    ) -> Result<Self, WorkingHoursError> {
        if last < first {
            return Err(WorkingHoursError::EndBeforeStart {
                start: first,
                end: last,
            });
        }
        let step = Duration::minutes(granularity.minutes());
        let mut ticks = Vec::new();
        let mut tick = truncate_to_minute(first);
        while tick <= last {
            ticks.push(tick);
            let (next, wrapped) = tick.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            tick = next;
        }
        Ok(Self { ticks })
    }

    pub fn between_hours(
        first_hour: u32,
        last_hour: u32,
        granularity: SlotGranularity,
    ) -> Result<Self, WorkingHoursError> {
        let first = NaiveTime::from_hms_opt(first_hour, 0, 0)
            .ok_or(WorkingHoursError::InvalidHour(first_hour))?;
        let last = NaiveTime::from_hms_opt(last_hour, 0, 0)
            .ok_or(WorkingHoursError::InvalidHour(last_hour))?;
        Self::new(first, last, granularity)
    }

    pub fn from_ticks(ticks: impl IntoIterator<Item = NaiveTime>) -> Self {
        let mut ticks: Vec<NaiveTime> = ticks.into_iter().map(truncate_to_minute).collect();
        ticks.sort();
        ticks.dedup();
        Self { ticks }
    }

    pub fn ticks(&self) -> &[NaiveTime] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.ticks.binary_search(&truncate_to_minute(time)).is_ok()
    }
}

/// "HH:MM" on the way out, "HH:MM" or "HH:MM:SS" on the way in.
pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
