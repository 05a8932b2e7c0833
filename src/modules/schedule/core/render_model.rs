// Render model: a plain data snapshot of the schedule for any view technology.
//
// Responsibilities
// - Lay the classified grid out as time rows x day columns.
// - Say per cell what the view may offer (select, cancel) so views stay dumb.
//
// Boundaries
// - No markup and no styling. Everything here serialises to JSON.

use crate::modules::schedule::core::appointment::{Appointment, AppointmentStatus};
use crate::modules::schedule::core::appointment_index::AppointmentIndex;
use crate::modules::schedule::core::member::Member;
use crate::modules::schedule::core::phase::SchedulePhase;
use crate::modules::schedule::core::schedule_config::Role;
use crate::modules::schedule::core::slot::{SlotKey, SlotState, WorkingHours, hh_mm};
use crate::modules::schedule::core::time_slot_grid::SlotGrid;
use crate::modules::schedule::core::week_window::WeekWindow;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayHeader {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCell {
    #[serde(flatten)]
    pub key: SlotKey,
    pub state: SlotState,
    pub selected: bool,
    pub selectable: bool,
    pub cancellable: bool,
    pub appointment: Option<Appointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRow {
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub cells: Vec<SlotCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    pub role: Role,
    pub phase: SchedulePhase,
    pub window: WeekWindow,
    pub week_label: String,
    pub days: Vec<DayHeader>,
    pub rows: Vec<TimeRow>,
    pub selection: Option<SlotKey>,
    pub members: Vec<Member>,
    pub selected_member: Option<String>,
    pub notice: Option<Notice>,
}

pub struct RenderInput<'a> {
    pub role: Role,
    pub phase: SchedulePhase,
    pub window: WeekWindow,
    pub working_hours: &'a WorkingHours,
    pub grid: &'a SlotGrid,
    pub appointments: &'a [Appointment],
    pub today: NaiveDate,
    pub selection: Option<SlotKey>,
    pub members: &'a [Member],
    pub selected_member: Option<&'a str>,
    pub notice: Option<&'a Notice>,
}

impl RenderModel {
    pub fn build(input: RenderInput<'_>) -> Self {
        let index = AppointmentIndex::build(input.appointments);
        let dates: Vec<NaiveDate> = input.window.dates().collect();

        let days = dates
            .iter()
            .map(|date| DayHeader {
                date: *date,
                weekday: date.format("%a").to_string(),
                is_today: *date == input.today,
            })
            .collect();

        let rows = input
            .working_hours
            .ticks()
            .iter()
            .map(|time| TimeRow {
                time: *time,
                cells: dates
                    .iter()
                    .map(|date| {
                        let key = SlotKey::new(*date, *time);
                        let state = input.grid.state(&key);
                        let appointment = index.lookup(&key).cloned();
                        let cancellable = state == SlotState::Booked
                            && appointment
                                .as_ref()
                                .is_some_and(|a| a.status == AppointmentStatus::Scheduled);
                        SlotCell {
                            key,
                            state,
                            selected: input.selection == Some(key),
                            selectable: state == SlotState::Available,
                            cancellable,
                            appointment,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            role: input.role,
            phase: input.phase,
            window: input.window,
            week_label: input.window.label(),
            days,
            rows,
            selection: input.selection,
            members: input.members.to_vec(),
            selected_member: input.selected_member.map(str::to_string),
            notice: input.notice.cloned(),
        }
    }

    pub fn cell(&self, key: &SlotKey) -> Option<&SlotCell> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .find(|cell| cell.key == *key)
    }
}
