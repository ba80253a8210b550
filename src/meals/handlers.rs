use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::{macros::format_description, Date, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::meals::dto::{
    AddFavoriteRequest, CreateCustomFoodRequest, CreateMealRequest, MealListQuery, UpdateMealRequest,
};
use crate::meals::repo::{CustomFood, DailyTotals, FavoriteFood, Meal};
use crate::state::AppState;

fn parse_date(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::InvalidInput("date must be YYYY-MM-DD".into()))
}

// --- meals ---

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<MealListQuery>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let date = params.date.as_deref().map(parse_date).transpose()?;
    let meals = Meal::list_by_user(&state.db, user_id, date).await?;
    Ok(Json(meals))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<Meal>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("name is required".into()));
    }
    if body.calories < 0 || body.grams < 0.0 {
        return Err(ApiError::InvalidInput(
            "calories and grams must be non-negative".into(),
        ));
    }

    let date = body.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let meal = Meal::create(&state.db, user_id, &body, date).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Meal>, ApiError> {
    let meal = Meal::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("meal not found".into()))?;
    Ok(Json(meal))
}

#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<Json<Meal>, ApiError> {
    let meal = Meal::update(&state.db, user_id, id, &body)
        .await?
        .ok_or_else(|| ApiError::NotFound("meal not found".into()))?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Meal::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("meal not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn daily_totals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DailyTotals>, ApiError> {
    let date = parse_date(&date)?;
    let totals = Meal::daily_totals(&state.db, user_id, date).await?;
    Ok(Json(totals))
}

// --- favorites ---

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FavoriteFood>>, ApiError> {
    let favorites = FavoriteFood::list(&state.db, user_id).await?;
    Ok(Json(favorites))
}

#[instrument(skip(state, body))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteFood>), ApiError> {
    if body.food_id.trim().is_empty() || body.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("food_id and name are required".into()));
    }
    let fav = FavoriteFood::add(&state.db, user_id, &body)
        .await?
        .ok_or_else(|| ApiError::Conflict("food is already a favorite".into()))?;
    Ok((StatusCode::CREATED, Json(fav)))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(food_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !FavoriteFood::remove(&state.db, user_id, &food_id).await? {
        return Err(ApiError::NotFound("favorite not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- custom foods ---

#[instrument(skip(state))]
pub async fn list_custom_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CustomFood>>, ApiError> {
    let foods = CustomFood::list(&state.db, user_id).await?;
    Ok(Json(foods))
}

#[instrument(skip(state, body))]
pub async fn create_custom_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateCustomFoodRequest>,
) -> Result<(StatusCode, Json<CustomFood>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("name is required".into()));
    }
    if body.calories < 0 || body.serving_size <= 0.0 {
        return Err(ApiError::InvalidInput(
            "calories must be non-negative and serving_size positive".into(),
        ));
    }
    let food = CustomFood::create(&state.db, user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state))]
pub async fn delete_custom_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !CustomFood::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("custom food not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
