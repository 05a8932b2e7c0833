use crate::modules::schedule::core::appointment::{AppointmentId, AppointmentStatus};
use crate::modules::schedule::core::appointment_index::AppointmentIndex;
use crate::modules::schedule::core::slot::SlotState;
use crate::modules::schedule::core::time_slot_grid::SlotGrid;
use crate::modules::schedule::use_cases::cancel_appointment::command::CancelAppointment;
use crate::modules::schedule::use_cases::decide_error::DecideError;
use chrono::NaiveDateTime;

/// Only upcoming, still scheduled appointments can be cancelled.
pub fn decide_cancellation(
    grid: &SlotGrid,
    index: &AppointmentIndex<'_>,
    command: CancelAppointment,
    now: NaiveDateTime,
) -> Result<AppointmentId, DecideError> {
    let slot = command.slot;
    if grid.state(&slot) != SlotState::Booked {
        return Err(DecideError::NothingToCancel(slot));
    }
    let appointment = index
        .lookup(&slot)
        .ok_or(DecideError::NothingToCancel(slot))?;
    if appointment.status != AppointmentStatus::Scheduled || slot.instant() <= now {
        return Err(DecideError::NotCancellable(appointment.id.to_string()));
    }
    Ok(appointment.id.clone())
}
