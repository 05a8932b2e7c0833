use crate::modules::schedule::core::slot::SlotKey;
use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAppointment {
    pub slot: Option<SlotKey>,
    pub member_id: Option<String>,
}

/// A booking that passed local validation and can be sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub slot: SlotKey,
    pub appointment_time: DateTime<FixedOffset>,
    pub member_id: Option<String>,
}
