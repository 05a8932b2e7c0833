use crate::modules::schedule::core::phase::SchedulePhase;
use crate::modules::schedule::use_cases::decide_error::DecideError;
use crate::shared::infrastructure::appointment_service::AppointmentServiceError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("could not load appointments: {0}")]
    FetchFailure(AppointmentServiceError),

    #[error("slot was taken in the meantime: {0}")]
    BookingConflict(String),

    #[error("booking failed: {0}")]
    Booking(AppointmentServiceError),

    #[error("cancellation failed: {0}")]
    Cancellation(AppointmentServiceError),

    #[error("schedule is busy ({0:?})")]
    Busy(SchedulePhase),

    #[error("schedule is not ready ({0:?})")]
    NotReady(SchedulePhase),

    #[error(transparent)]
    Rejected(#[from] DecideError),

    #[error("unknown member: {0}")]
    UnknownMember(String),
}
