use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::calorie::ProfileTargets;
use crate::profile::dto::OnboardingRequest;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub age: i32,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub goal_weight: Option<f64>,
    pub activity_level: String,
    pub goal: String,
    pub bmr: i32,
    pub tdee: i32,
    pub target_calories: i32,
    pub protein_target: i32,
    pub carbs_target: i32,
    pub fat_target: i32,
    pub protein_calories: i32,
    pub carbs_calories: i32,
    pub fat_calories: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const PROFILE_COLUMNS: &str = "user_id, age, gender, height, weight, goal_weight, \
     activity_level, goal, bmr, tdee, target_calories, protein_target, carbs_target, \
     fat_target, protein_calories, carbs_calories, fat_calories, created_at, updated_at";

impl UserProfile {
    pub async fn find_by_user_id(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM user_profiles
            WHERE user_id = $1
            "#
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Insert or fully replace the caller's profile with freshly computed
    /// targets.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        req: &OnboardingRequest,
        targets: &ProfileTargets,
    ) -> anyhow::Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO user_profiles (user_id, age, gender, height, weight, goal_weight,
                activity_level, goal, bmr, tdee, target_calories, protein_target,
                carbs_target, fat_target, protein_calories, carbs_calories, fat_calories)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (user_id) DO UPDATE SET
                age = EXCLUDED.age,
                gender = EXCLUDED.gender,
                height = EXCLUDED.height,
                weight = EXCLUDED.weight,
                goal_weight = EXCLUDED.goal_weight,
                activity_level = EXCLUDED.activity_level,
                goal = EXCLUDED.goal,
                bmr = EXCLUDED.bmr,
                tdee = EXCLUDED.tdee,
                target_calories = EXCLUDED.target_calories,
                protein_target = EXCLUDED.protein_target,
                carbs_target = EXCLUDED.carbs_target,
                fat_target = EXCLUDED.fat_target,
                protein_calories = EXCLUDED.protein_calories,
                carbs_calories = EXCLUDED.carbs_calories,
                fat_calories = EXCLUDED.fat_calories,
                updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(req.age)
        .bind(req.gender.as_str())
        .bind(req.height)
        .bind(req.weight)
        .bind(req.goal_weight)
        .bind(req.activity_level.as_str())
        .bind(req.goal.as_str())
        .bind(targets.bmr)
        .bind(targets.tdee)
        .bind(targets.target_calories)
        .bind(targets.macros.protein)
        .bind(targets.macros.carbs)
        .bind(targets.macros.fat)
        .bind(targets.macros.protein_calories)
        .bind(targets.macros.carbs_calories)
        .bind(targets.macros.fat_calories)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }
}
