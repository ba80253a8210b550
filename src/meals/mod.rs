pub mod dto;
mod handlers;
pub mod repo;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/meals",
            get(handlers::list_meals).post(handlers::create_meal),
        )
        .route("/meals/daily/:date", get(handlers::daily_totals))
        .route(
            "/meals/:id",
            get(handlers::get_meal)
                .put(handlers::update_meal)
                .delete(handlers::delete_meal),
        )
        .route(
            "/favorites",
            get(handlers::list_favorites).post(handlers::add_favorite),
        )
        .route("/favorites/:food_id", delete(handlers::remove_favorite))
        .route(
            "/custom-foods",
            get(handlers::list_custom_foods).post(handlers::create_custom_food),
        )
        .route("/custom-foods/:id", delete(handlers::delete_custom_food))
}
