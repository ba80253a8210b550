pub mod calorie;
pub mod dto;
mod handlers;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onboarding/complete", post(handlers::complete_onboarding))
        .route("/onboarding/status", get(handlers::get_status))
        .route(
            "/user/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
}
