use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::modules::schedule::adapters::inbound::http as schedule_http;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/schedule", get(schedule_http::get_schedule))
        .route("/schedule/navigate", post(schedule_http::navigate))
        .route("/schedule/reload", post(schedule_http::reload))
        .route(
            "/schedule/selection",
            post(schedule_http::select_slot).delete(schedule_http::clear_selection),
        )
        .route("/schedule/member", post(schedule_http::select_member))
        .route("/schedule/booking", post(schedule_http::confirm_booking))
        .route("/schedule/cancellation", post(schedule_http::cancel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
