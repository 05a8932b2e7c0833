// REST adapter for the AppointmentService and MemberDirectory ports.
//
// Responsibilities
// - Authenticate every call with the credentials it was constructed with.
// - Send booking times as UTC ISO-8601 with milliseconds.
// - Map HTTP failures onto AppointmentServiceError, keeping the server's message.

use crate::shared::infrastructure::appointment_service::{
    AppointmentRecord, AppointmentService, AppointmentServiceError, MemberDirectory, MemberRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

pub const MEMBER_APPOINTMENTS_PATH: &str = "/api/appointments/member/appointments";
pub const PT_APPOINTMENTS_PATH: &str = "/api/appointments/pt";
const BOOK_PATH: &str = "/api/appointments/book";
const MEMBERS_PATH: &str = "/api/users";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RestAppointmentService {
    client: Client,
    base_url: String,
    credentials: Credentials,
    appointments_path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookAppointmentBody<'a> {
    appointment_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    member_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MembersResponse {
    List(Vec<MemberRecord>),
    Members { members: Vec<MemberRecord> },
    Users { users: Vec<MemberRecord> },
}

impl MembersResponse {
    fn into_records(self) -> Vec<MemberRecord> {
        match self {
            Self::List(records) => records,
            Self::Members { members } => members,
            Self::Users { users } => users,
        }
    }
}

impl RestAppointmentService {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        appointments_path: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            appointments_path: appointments_path.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppointmentServiceError> {
        let response = request
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| AppointmentServiceError::Backend(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        tracing::warn!(%status, reason = %message, "appointment service rejected request");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppointmentServiceError::Unauthorized
            }
            StatusCode::NOT_FOUND => AppointmentServiceError::NotFound(message),
            StatusCode::CONFLICT => AppointmentServiceError::Conflict(message),
            _ => AppointmentServiceError::Backend(message),
        })
    }
}

fn decode_error(e: reqwest::Error) -> AppointmentServiceError {
    AppointmentServiceError::Backend(format!("unreadable response: {e}"))
}

#[async_trait]
impl AppointmentService for RestAppointmentService {
    async fn fetch_appointments(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<AppointmentRecord>, AppointmentServiceError> {
        let request = self.client.get(self.url(&self.appointments_path)).query(&[
            ("start", window_start.to_string()),
            ("end", window_end.to_string()),
        ]);
        let response = self.send(request).await?;
        // Some deployments answer with `null` when there is nothing to show.
        let entries: Option<Vec<serde_json::Value>> =
            response.json().await.map_err(decode_error)?;
        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .map(AppointmentRecord::from_wire)
            .collect())
    }

    async fn book_appointment(
        &self,
        appointment_time: DateTime<FixedOffset>,
        member_id: Option<&str>,
    ) -> Result<AppointmentRecord, AppointmentServiceError> {
        let body = BookAppointmentBody {
            appointment_time: appointment_time
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            member_id,
        };
        let request = self.client.post(self.url(BOOK_PATH)).json(&body);
        let response = self.send(request).await?;
        response.json().await.map_err(decode_error)
    }

    async fn cancel_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<(), AppointmentServiceError> {
        let path = format!("/api/appointments/{appointment_id}/cancel");
        self.send(self.client.post(self.url(&path))).await?;
        Ok(())
    }
}

#[async_trait]
impl MemberDirectory for RestAppointmentService {
    async fn list_members(&self) -> Result<Vec<MemberRecord>, AppointmentServiceError> {
        let response = self.send(self.client.get(self.url(MEMBERS_PATH))).await?;
        let members: MembersResponse = response.json().await.map_err(decode_error)?;
        Ok(members.into_records())
    }
}
