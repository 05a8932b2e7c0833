use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::modules::schedule::controller::errors::ScheduleError;
use crate::modules::schedule::core::render_model::RenderModel;
use crate::modules::schedule::core::slot::{SlotKey, hh_mm};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct NavigateBody {
    pub delta_weeks: i32,
}

#[derive(Deserialize)]
pub struct SlotBody {
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
}

impl SlotBody {
    fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.time)
    }
}

#[derive(Deserialize)]
pub struct MemberBody {
    pub member_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub schedule: RenderModel,
}

fn status_for(error: &ScheduleError) -> StatusCode {
    match error {
        ScheduleError::Busy(_)
        | ScheduleError::NotReady(_)
        | ScheduleError::BookingConflict(_) => StatusCode::CONFLICT,
        ScheduleError::Rejected(_) | ScheduleError::UnknownMember(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScheduleError::FetchFailure(_)
        | ScheduleError::Booking(_)
        | ScheduleError::Cancellation(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn respond<T>(state: &AppState, result: Result<T, ScheduleError>) -> Response {
    let schedule = state.schedule.render().await;
    match result {
        Ok(_) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
                schedule,
            }),
        )
            .into_response(),
    }
}

pub async fn get_schedule(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.schedule.render().await)
}

pub async fn navigate(
    State(state): State<AppState>,
    body: Result<Json<NavigateBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    let result = state.schedule.navigate(body.delta_weeks).await;
    respond(&state, result).await
}

pub async fn reload(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.schedule.reload().await;
    respond(&state, result).await
}

pub async fn select_slot(
    State(state): State<AppState>,
    body: Result<Json<SlotBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    let result = state.schedule.select_slot(body.key()).await;
    respond(&state, result).await
}

pub async fn clear_selection(State(state): State<AppState>) -> impl IntoResponse {
    state.schedule.clear_selection().await;
    Json(state.schedule.render().await)
}

pub async fn select_member(
    State(state): State<AppState>,
    body: Result<Json<MemberBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    let result = state.schedule.select_member(&body.member_id).await;
    respond(&state, result).await
}

pub async fn confirm_booking(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.schedule.confirm_booking().await;
    respond(&state, result).await
}

pub async fn cancel(
    State(state): State<AppState>,
    body: Result<Json<SlotBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    let result = state.schedule.cancel_slot(body.key()).await;
    respond(&state, result).await
}
