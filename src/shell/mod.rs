// Composition root for the schedule.
//
// Responsibilities
// - Read settings from the environment.
// - Instantiate the REST adapter and the system clock.
// - Wire them into one ScheduleController and run the first load.

pub mod config;
pub mod http;
pub mod state;

use crate::modules::schedule::controller::schedule_controller::ScheduleController;
use crate::modules::schedule::core::schedule_config::Role;
use crate::shared::core::clock::{Clock, SystemClock};
use crate::shared::infrastructure::appointment_service::AppointmentService;
use crate::shared::infrastructure::appointment_service::rest::RestAppointmentService;
use crate::shell::config::Settings;
use crate::shell::state::AppState;
use std::sync::Arc;

pub async fn bootstrap(settings: &Settings) -> anyhow::Result<AppState> {
    let rest = Arc::new(RestAppointmentService::new(
        settings.api_base_url.clone(),
        settings.credentials.clone(),
        settings.appointments_path(),
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(settings.schedule.utc_offset));
    let service: Arc<dyn AppointmentService> = rest.clone();
    let schedule = Arc::new(ScheduleController::new(
        settings.schedule.clone(),
        service,
        clock,
    ));

    if settings.schedule.role == Role::PersonalTrainer {
        // The schedule still works without members, booking just stays blocked.
        if let Err(e) = schedule.load_members(rest.as_ref()).await {
            tracing::warn!(error = %e, "starting without a member list");
        }
    }

    // A failed first load leaves the schedule in Error; the view can retry.
    if let Err(e) = schedule.load().await {
        tracing::warn!(error = %e, "initial load failed");
    }

    Ok(AppState { schedule })
}
