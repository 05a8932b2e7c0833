// Lifecycle of one schedule instance.
//
// Idle -> Loading -> Ready -> (Booking | Cancelling) -> Loading -> Ready
// Error is entered when a load fails and left by the next load or navigation.
//
// Loading may be superseded by a newer load or navigation. Booking and
// Cancelling may not be interrupted.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePhase {
    Idle,
    Loading,
    Ready,
    Booking,
    Cancelling,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Load,
    Navigate,
    Select,
    Book,
    Cancel,
}

impl SchedulePhase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Booking | Self::Cancelling)
    }

    pub fn accepts(self, intent: Intent) -> bool {
        match intent {
            Intent::Load | Intent::Navigate => !matches!(self, Self::Booking | Self::Cancelling),
            Intent::Select | Intent::Book | Intent::Cancel => self == Self::Ready,
        }
    }
}
