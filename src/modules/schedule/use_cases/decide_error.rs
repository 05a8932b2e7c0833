use crate::modules::schedule::core::slot::SlotKey;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecideError {
    #[error("no slot is selected")]
    NoSelection,

    #[error("slot {0} is not available")]
    SlotNotAvailable(SlotKey),

    #[error("a member must be chosen before booking")]
    MemberRequired,

    #[error("slot {0} has no absolute time in the configured offset")]
    UnrepresentableTime(SlotKey),

    #[error("slot {0} has no booking to cancel")]
    NothingToCancel(SlotKey),

    #[error("appointment {0} can no longer be cancelled")]
    NotCancellable(String),

    #[error("moving {0} weeks leaves the calendar")]
    WeekOutOfRange(i32),
}
