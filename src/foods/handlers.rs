use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::foods::dto::{CatalogQuery, FoodCategory, FoodItem, SearchQuery, SearchResult};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResult>, ApiError> {
    let result = state
        .foods
        .search_foods(&params.q, params.page, &params.category)
        .await?;
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn lookup_barcode(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(barcode): Path<String>,
) -> Result<Json<FoodItem>, ApiError> {
    let food = state.foods.lookup_barcode(&barcode).await?;
    Ok(Json(food))
}

#[instrument(skip(state))]
pub async fn list_catalog(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<CatalogQuery>,
) -> Result<Json<Vec<FoodItem>>, ApiError> {
    let foods = state.foods.list_catalog(&params.category).await?;
    Ok(Json(foods))
}

pub async fn get_categories(State(state): State<AppState>) -> Json<&'static [FoodCategory]> {
    Json(state.foods.categories())
}
