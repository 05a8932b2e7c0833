use crate::modules::schedule::core::appointment::Appointment;
use crate::modules::schedule::core::slot::SlotKey;
use std::collections::HashMap;

/// Appointments keyed by slot identity.
///
/// When the server returns more than one appointment for the same slot the
/// one that appears last in the list wins.
#[derive(Debug, Clone, Default)]
pub struct AppointmentIndex<'a> {
    by_slot: HashMap<SlotKey, &'a Appointment>,
}

impl<'a> AppointmentIndex<'a> {
    pub fn build(appointments: &'a [Appointment]) -> Self {
        let mut by_slot = HashMap::with_capacity(appointments.len());
        for appointment in appointments {
            by_slot.insert(SlotKey::of(appointment.appointment_time), appointment);
        }
        Self { by_slot }
    }

    pub fn lookup(&self, key: &SlotKey) -> Option<&'a Appointment> {
        self.by_slot.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }
}
