use crate::modules::schedule::core::slot::SlotKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelAppointment {
    pub slot: SlotKey,
}
