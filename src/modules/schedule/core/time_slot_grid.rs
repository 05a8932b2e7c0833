// Weekly slot classification.
//
// Purpose
// - For every (day in window) x (working-hours tick), decide Past, Booked or Available.
//
// Rules, in precedence order
// - Past: the slot starts at or before `now`. A slot starting exactly at `now` is past.
// - Booked: an appointment that still occupies the slot sits at the same key.
// - Available: everything else that was enumerated.
// Slots outside the window or the working hours are never emitted.
//
// Boundaries
// - Pure. `now` is a parameter, never read from the system clock.

use crate::modules::schedule::core::appointment::Appointment;
use crate::modules::schedule::core::appointment_index::AppointmentIndex;
use crate::modules::schedule::core::slot::{SlotKey, SlotState, WorkingHours};
use crate::modules::schedule::core::week_window::WeekWindow;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotGrid {
    states: BTreeMap<SlotKey, SlotState>,
}

impl SlotGrid {
    /// State of a slot, `Unavailable` if the grid never enumerated it.
    pub fn state(&self, key: &SlotKey) -> SlotState {
        self.states
            .get(key)
            .copied()
            .unwrap_or(SlotState::Unavailable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &SlotState)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn count(&self, state: SlotState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }
}

pub fn candidate_slots<'a>(
    window: &WeekWindow,
    working_hours: &'a WorkingHours,
) -> impl Iterator<Item = SlotKey> + use<'a> {
    window.dates().flat_map(move |date| {
        working_hours
            .ticks()
            .iter()
            .map(move |time| SlotKey::new(date, *time))
    })
}

pub fn classify_slot(key: &SlotKey, index: &AppointmentIndex<'_>, now: NaiveDateTime) -> SlotState {
    if key.instant() <= now {
        return SlotState::Past;
    }
    match index.lookup(key) {
        Some(appointment) if appointment.status.occupies_slot() => SlotState::Booked,
        _ => SlotState::Available,
    }
}

pub fn classify_with_index(
    window: &WeekWindow,
    working_hours: &WorkingHours,
    index: &AppointmentIndex<'_>,
    now: NaiveDateTime,
) -> SlotGrid {
    let states = candidate_slots(window, working_hours)
        .map(|key| {
            let state = classify_slot(&key, index, now);
            (key, state)
        })
        .collect();
    SlotGrid { states }
}

pub fn classify(
    window: &WeekWindow,
    working_hours: &WorkingHours,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> SlotGrid {
    let index = AppointmentIndex::build(appointments);
    classify_with_index(window, working_hours, &index, now)
}
