use crate::modules::schedule::controller::schedule_controller::ScheduleController;
use crate::shared::core::clock::Clock;
use crate::shared::infrastructure::appointment_service::AppointmentService;
use std::sync::Arc;

pub type SharedSchedule = ScheduleController<dyn AppointmentService, dyn Clock>;

#[derive(Clone)]
pub struct AppState {
    pub schedule: Arc<SharedSchedule>,
}
