// Appointment as the schedule sees it, parsed from the service's wire record.
//
// Purpose
// - Turn loosely typed records into values the grid can trust.
//
// Responsibilities
// - Normalise the appointment time to local wall clock using the configured offset.
// - Reject a single bad record without affecting the rest of the batch.
//
// Timestamps
// - Offset-carrying strings are converted into the configured offset.
// - Offset-less strings are taken as local wall clock as-is.
// - A bare integer is milliseconds since the Unix epoch.

use crate::shared::infrastructure::appointment_service::{AppointmentRecord, wire_id};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" | "BOOKED" => Some(Self::Scheduled),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether an appointment with this status still occupies its slot.
    pub fn occupies_slot(self) -> bool {
        self != Self::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub member_name: Option<String>,
    pub check_in_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedAppointment {
    #[error("appointment record has no usable id")]
    MissingId,

    #[error("appointment {id} has no appointment time")]
    MissingTime { id: String },

    #[error("appointment {id} has an unparsable appointment time: {raw}")]
    InvalidTime { id: String, raw: String },

    #[error("appointment {id} has an unknown status: {raw}")]
    UnknownStatus { id: String, raw: String },
}

impl Appointment {
    pub fn from_record(
        record: &AppointmentRecord,
        offset: FixedOffset,
    ) -> Result<Self, MalformedAppointment> {
        let id = wire_id(&record.id).ok_or(MalformedAppointment::MissingId)?;

        let raw_time = record
            .appointment_time
            .as_deref()
            .ok_or_else(|| MalformedAppointment::MissingTime { id: id.clone() })?;
        let appointment_time =
            parse_timestamp(raw_time, offset).ok_or_else(|| MalformedAppointment::InvalidTime {
                id: id.clone(),
                raw: raw_time.to_string(),
            })?;

        // The server leaves status out on freshly booked slots.
        let status = match record.status.as_deref() {
            None => AppointmentStatus::Scheduled,
            Some(raw) => {
                AppointmentStatus::parse(raw).ok_or_else(|| MalformedAppointment::UnknownStatus {
                    id: id.clone(),
                    raw: raw.to_string(),
                })?
            }
        };

        // A broken check-in time does not make the appointment itself unusable.
        let check_in_time = record
            .check_in_time
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, offset));

        Ok(Self {
            id: AppointmentId(id),
            appointment_time,
            status,
            member_name: record.member_name.clone(),
            check_in_time,
        })
    }
}

/// Parse a batch, keeping every good record and collecting the bad ones.
pub fn parse_records(
    records: &[AppointmentRecord],
    offset: FixedOffset,
) -> (Vec<Appointment>, Vec<MalformedAppointment>) {
    let mut appointments = Vec::with_capacity(records.len());
    let mut malformed = Vec::new();
    for record in records {
        match Appointment::from_record(record, offset) {
            Ok(appointment) => appointments.push(appointment),
            Err(e) => malformed.push(e),
        }
    }
    (appointments, malformed)
}

pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&offset).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset).naive_local());
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").ok())
}

#[cfg(test)]
mod appointment_tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[fixture]
    fn record() -> AppointmentRecord {
        AppointmentRecord {
            id: json!(42),
            appointment_time: Some("2024-06-11T14:00:00".into()),
            status: Some("SCHEDULED".into()),
            member_name: Some("Deniz".into()),
            check_in_time: None,
        }
    }

    #[rstest]
    fn it_should_parse_a_complete_record(record: AppointmentRecord) {
        let appointment = Appointment::from_record(&record, utc()).unwrap();
        assert_eq!(appointment.id, AppointmentId("42".into()));
        assert_eq!(appointment.appointment_time, at(11, 14, 0));
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.member_name.as_deref(), Some("Deniz"));
    }

    #[rstest]
    #[case("2024-06-11T14:00:00", 0, at(11, 14, 0))]
    #[case("2024-06-11T14:00", 0, at(11, 14, 0))]
    #[case("2024-06-11 14:00:00", 0, at(11, 14, 0))]
    #[case("2024-06-11T14:00:00.000", 0, at(11, 14, 0))]
    #[case("2024-06-11T11:00:00Z", 3 * 3600, at(11, 14, 0))]
    #[case("2024-06-11T11:00:00.000Z", 3 * 3600, at(11, 14, 0))]
    #[case("2024-06-11T14:00:00+03:00", 3 * 3600, at(11, 14, 0))]
    #[case("2024-06-11T00:30:00Z", -3600, at(10, 23, 30))]
    #[case("1718114400000", 0, at(11, 14, 0))]
    #[case("1718114400000", 3 * 3600, at(11, 17, 0))]
    fn it_should_normalise_timestamps_to_local_wall_clock(
        #[case] raw: &str,
        #[case] offset_seconds: i32,
        #[case] expected: NaiveDateTime,
    ) {
        let offset = FixedOffset::east_opt(offset_seconds).unwrap();
        assert_eq!(parse_timestamp(raw, offset), Some(expected));
    }

    #[rstest]
    #[case("scheduled", AppointmentStatus::Scheduled)]
    #[case("Cancelled", AppointmentStatus::Cancelled)]
    #[case("CANCELED", AppointmentStatus::Cancelled)]
    #[case("COMPLETED", AppointmentStatus::Completed)]
    fn it_should_parse_status_case_insensitively(
        #[case] raw: &str,
        #[case] expected: AppointmentStatus,
    ) {
        assert_eq!(AppointmentStatus::parse(raw), Some(expected));
    }

    #[rstest]
    fn it_should_default_a_missing_status_to_scheduled(mut record: AppointmentRecord) {
        record.status = None;
        let appointment = Appointment::from_record(&record, utc()).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    }

    #[rstest]
    fn it_should_reject_a_record_without_time(mut record: AppointmentRecord) {
        record.appointment_time = None;
        assert_eq!(
            Appointment::from_record(&record, utc()),
            Err(MalformedAppointment::MissingTime { id: "42".into() })
        );
    }

    #[rstest]
    fn it_should_reject_a_record_with_garbage_time(mut record: AppointmentRecord) {
        record.appointment_time = Some("next tuesday".into());
        assert!(matches!(
            Appointment::from_record(&record, utc()),
            Err(MalformedAppointment::InvalidTime { .. })
        ));
    }

    #[rstest]
    fn it_should_read_an_epoch_millisecond_time(mut record: AppointmentRecord) {
        record.appointment_time = Some("1718114400000".into());
        let appointment = Appointment::from_record(&record, utc()).unwrap();
        assert_eq!(appointment.appointment_time, at(11, 14, 0));
    }

    #[rstest]
    fn it_should_reject_a_record_without_id(mut record: AppointmentRecord) {
        record.id = serde_json::Value::Null;
        assert_eq!(
            Appointment::from_record(&record, utc()),
            Err(MalformedAppointment::MissingId)
        );
    }

    #[rstest]
    fn it_should_reject_an_unknown_status(mut record: AppointmentRecord) {
        record.status = Some("PENDING".into());
        assert!(matches!(
            Appointment::from_record(&record, utc()),
            Err(MalformedAppointment::UnknownStatus { .. })
        ));
    }

    #[rstest]
    fn it_should_keep_good_records_when_one_is_malformed(record: AppointmentRecord) {
        let mut broken = record.clone();
        broken.appointment_time = None;
        let mut second = record.clone();
        second.id = json!("abc");

        let (appointments, malformed) = parse_records(&[record, broken, second], utc());

        assert_eq!(appointments.len(), 2);
        assert_eq!(malformed.len(), 1);
        assert_eq!(appointments[1].id, AppointmentId("abc".into()));
    }

    #[rstest]
    fn cancelled_appointments_do_not_occupy_a_slot() {
        assert!(AppointmentStatus::Scheduled.occupies_slot());
        assert!(AppointmentStatus::Completed.occupies_slot());
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
    }
}
