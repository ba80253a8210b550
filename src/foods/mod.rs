pub mod cache;
pub mod catalog;
pub mod dto;
mod handlers;
pub mod normalize;
pub mod off;
pub mod service;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/foods/search", get(handlers::search_foods))
        .route("/foods/catalog", get(handlers::list_catalog))
        .route("/foods/barcode/:barcode", get(handlers::lookup_barcode))
        .route("/foods/categories", get(handlers::get_categories))
}
