// Shared builders for appointments and wire records used across unit tests.

use crate::modules::schedule::core::appointment::{Appointment, AppointmentId, AppointmentStatus};
use crate::shared::infrastructure::appointment_service::AppointmentRecord;
use chrono::{NaiveDate, NaiveDateTime};

pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid fixture timestamp")
}

pub struct AppointmentBuilder {
    inner: Appointment,
}

impl Default for AppointmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl AppointmentBuilder {
    pub fn new() -> Self {
        Self {
            inner: Appointment {
                id: AppointmentId("apt-0001".to_string()),
                appointment_time: local(2024, 6, 11, 14, 0),
                status: AppointmentStatus::Scheduled,
                member_name: None,
                check_in_time: None,
            },
        }
    }

    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.inner.id = AppointmentId(v.into());
        self
    }

    pub fn at(mut self, y: i32, m: u32, d: u32, h: u32, min: u32) -> Self {
        self.inner.appointment_time = local(y, m, d, h, min);
        self
    }

    pub fn at_time(mut self, v: NaiveDateTime) -> Self {
        self.inner.appointment_time = v;
        self
    }

    pub fn status(mut self, v: AppointmentStatus) -> Self {
        self.inner.status = v;
        self
    }

    pub fn member_name(mut self, v: impl Into<String>) -> Self {
        self.inner.member_name = Some(v.into());
        self
    }

    pub fn build(self) -> Appointment {
        self.inner
    }

    /// Wire shape of the same appointment, with an offset-less timestamp.
    pub fn build_record(self) -> AppointmentRecord {
        let status = match self.inner.status {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        };
        AppointmentRecord {
            id: serde_json::Value::String(self.inner.id.0),
            appointment_time: Some(
                self.inner
                    .appointment_time
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string(),
            ),
            status: Some(status.to_string()),
            member_name: self.inner.member_name,
            check_in_time: None,
        }
    }
}
