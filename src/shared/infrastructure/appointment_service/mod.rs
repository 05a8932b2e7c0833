// Appointment Service port: what the schedule needs from the remote API.
//
// Responsibilities
// - Describe fetch, book and cancel as an async trait, plus the member list the
//   PT view books on behalf of.
// - Carry the wire shape of appointments and members loosely typed, so one bad
//   record never fails a whole response. Validation happens in the schedule core.
//
// Boundaries
// - No transport here. See `rest` for HTTP and `in_memory` for tests.

pub mod in_memory;
pub mod rest;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentServiceError {
    #[error("slot already taken: {0}")]
    Conflict(String),

    #[error("not authorised by the appointment service")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub appointment_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub member_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub check_in_time: Option<String>,
}

impl AppointmentRecord {
    /// Reads one entry of a fetch response. An entry that is not an object
    /// becomes a record without id, which the schedule reports as malformed.
    pub fn from_wire(entry: serde_json::Value) -> Self {
        serde_json::from_value(entry).unwrap_or_default()
    }
}

// Keeps any JSON scalar as text so a wrongly typed field fails one record in
// the schedule core rather than the whole response here.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Ids arrive as numbers or strings depending on the endpoint.
pub fn wire_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Appointments whose time falls on a day in `window_start..=window_end`.
    async fn fetch_appointments(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<AppointmentRecord>, AppointmentServiceError>;

    async fn book_appointment(
        &self,
        appointment_time: DateTime<FixedOffset>,
        member_id: Option<&str>,
    ) -> Result<AppointmentRecord, AppointmentServiceError>;

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<(), AppointmentServiceError>;
}

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn list_members(&self) -> Result<Vec<MemberRecord>, AppointmentServiceError>;
}
