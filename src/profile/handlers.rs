use axum::{extract::State, Json};
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::profile::calorie::profile_targets;
use crate::profile::dto::{OnboardingRequest, OnboardingResponse, OnboardingStatus};
use crate::profile::repo::UserProfile;
use crate::state::AppState;

fn validate_onboarding(req: &OnboardingRequest) -> Result<(), ApiError> {
    if !(18..=100).contains(&req.age) {
        return Err(ApiError::InvalidInput(
            "age must be between 18 and 100".into(),
        ));
    }
    if !(100.0..=250.0).contains(&req.height) {
        return Err(ApiError::InvalidInput(
            "height must be between 100 and 250 cm".into(),
        ));
    }
    if !(30.0..=300.0).contains(&req.weight) {
        return Err(ApiError::InvalidInput(
            "weight must be between 30 and 300 kg".into(),
        ));
    }
    if let Some(goal_weight) = req.goal_weight {
        if !(30.0..=300.0).contains(&goal_weight) {
            return Err(ApiError::InvalidInput(
                "goal weight must be between 30 and 300 kg".into(),
            ));
        }
    }
    Ok(())
}

#[instrument(skip(state, req))]
pub async fn complete_onboarding(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, ApiError> {
    validate_onboarding(&req)?;
    let targets = profile_targets(&req);
    let profile = UserProfile::upsert(&state.db, user_id, &req, &targets).await?;
    Ok(Json(OnboardingResponse {
        user_id: profile.user_id,
        bmr: profile.bmr,
        tdee: profile.tdee,
        target_calories: profile.target_calories,
        protein_target: profile.protein_target,
        carbs_target: profile.carbs_target,
        fat_target: profile.fat_target,
    }))
}

#[instrument(skip(state))]
pub async fn get_status(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<OnboardingStatus>, ApiError> {
    let profile = UserProfile::find_by_user_id(&state.db, user_id).await?;
    Ok(Json(OnboardingStatus {
        completed_onboarding: profile.is_some(),
        profile,
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = UserProfile::find_by_user_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
    Ok(Json(profile))
}

/// Replaces the profile and recomputes all calorie and macro targets from
/// the submitted values.
#[instrument(skip(state, req))]
pub async fn update_profile(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    validate_onboarding(&req)?;
    let targets = profile_targets(&req);
    let profile = UserProfile::upsert(&state.db, user_id, &req, &targets).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::dto::{ActivityLevel, Gender, Goal};

    fn request() -> OnboardingRequest {
        OnboardingRequest {
            age: 25,
            gender: Gender::Male,
            height: 175.0,
            weight: 70.0,
            goal_weight: Some(65.0),
            activity_level: ActivityLevel::Moderate,
            goal: Goal::Lose,
        }
    }

    #[test]
    fn onboarding_bounds() {
        assert!(validate_onboarding(&request()).is_ok());

        let mut req = request();
        req.age = 17;
        assert!(validate_onboarding(&req).is_err());

        let mut req = request();
        req.height = 99.0;
        assert!(validate_onboarding(&req).is_err());

        let mut req = request();
        req.weight = 310.0;
        assert!(validate_onboarding(&req).is_err());

        let mut req = request();
        req.goal_weight = Some(10.0);
        assert!(validate_onboarding(&req).is_err());
    }
}
