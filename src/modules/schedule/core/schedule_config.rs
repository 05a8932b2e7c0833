use crate::modules::schedule::core::slot::WorkingHours;
use crate::modules::schedule::core::week_window::{WeekAnchor, WeekNavigator};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    /// Books on behalf of a member picked from the member list.
    PersonalTrainer,
}

impl Role {
    pub fn books_for_member(self) -> bool {
        self == Self::PersonalTrainer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub role: Role,
    pub working_hours: WorkingHours,
    pub week_anchor: WeekAnchor,
    /// Offset that turns local wall clock into absolute instants and back.
    pub utc_offset: FixedOffset,
}

impl ScheduleConfig {
    pub fn navigator(&self) -> WeekNavigator {
        WeekNavigator::new(self.week_anchor)
    }
}
