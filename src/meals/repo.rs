use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meals::dto::{AddFavoriteRequest, CreateCustomFoodRequest, CreateMealRequest, UpdateMealRequest};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub name_en: Option<String>,
    pub calories: i32,
    pub grams: f64,
    pub meal_type: String,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<i32>,
    pub image_url: Option<String>,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

const MEAL_COLUMNS: &str = "id, user_id, name, name_en, calories, grams, meal_type, \
     protein, carbs, fat, fiber, sugar, sodium, image_url, date, created_at, updated_at";

impl Meal {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        req: &CreateMealRequest,
        date: Date,
    ) -> anyhow::Result<Meal> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            r#"
            INSERT INTO meals (id, user_id, name, name_en, calories, grams, meal_type,
                protein, carbs, fat, fiber, sugar, sodium, image_url, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.name_en)
        .bind(req.calories)
        .bind(req.grams)
        .bind(req.meal_type.as_str())
        .bind(req.protein)
        .bind(req.carbs)
        .bind(req.fat)
        .bind(req.fiber)
        .bind(req.sugar)
        .bind(req.sodium)
        .bind(&req.image_url)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(meal)
    }

    pub async fn find_by_id(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        date: Option<Date>,
    ) -> anyhow::Result<Vec<Meal>> {
        let meals = match date {
            Some(date) => {
                sqlx::query_as::<_, Meal>(&format!(
                    r#"
                    SELECT {MEAL_COLUMNS}
                    FROM meals
                    WHERE user_id = $1 AND date = $2
                    ORDER BY date DESC, created_at DESC
                    "#
                ))
                .bind(user_id)
                .bind(date)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Meal>(&format!(
                    r#"
                    SELECT {MEAL_COLUMNS}
                    FROM meals
                    WHERE user_id = $1
                    ORDER BY date DESC, created_at DESC
                    "#
                ))
                .bind(user_id)
                .fetch_all(db)
                .await?
            }
        };
        Ok(meals)
    }

    /// Partial update: absent fields keep their current value.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateMealRequest,
    ) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            r#"
            UPDATE meals
            SET name = COALESCE($3, name),
                name_en = COALESCE($4, name_en),
                calories = COALESCE($5, calories),
                grams = COALESCE($6, grams),
                meal_type = COALESCE($7, meal_type),
                protein = COALESCE($8, protein),
                carbs = COALESCE($9, carbs),
                fat = COALESCE($10, fat),
                fiber = COALESCE($11, fiber),
                sugar = COALESCE($12, sugar),
                sodium = COALESCE($13, sodium),
                image_url = COALESCE($14, image_url),
                date = COALESCE($15, date),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.name_en)
        .bind(req.calories)
        .bind(req.grams)
        .bind(req.meal_type.map(|t| t.as_str()))
        .bind(req.protein)
        .bind(req.carbs)
        .bind(req.fat)
        .bind(req.fiber)
        .bind(req.sugar)
        .bind(req.sodium)
        .bind(&req.image_url)
        .bind(req.date)
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn daily_totals(db: &PgPool, user_id: Uuid, date: Date) -> anyhow::Result<DailyTotals> {
        let totals = sqlx::query_as::<_, DailyTotals>(
            r#"
            SELECT
                COALESCE(SUM(calories), 0)::BIGINT AS calories,
                COALESCE(SUM(protein), 0)::DOUBLE PRECISION AS protein,
                COALESCE(SUM(carbs), 0)::DOUBLE PRECISION AS carbs,
                COALESCE(SUM(fat), 0)::DOUBLE PRECISION AS fat
            FROM meals
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(totals)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FavoriteFood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub category: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<i32>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub emoji: Option<String>,
    pub created_at: OffsetDateTime,
}

impl FavoriteFood {
    /// Returns `None` when the food is already a favorite of this user.
    pub async fn add(
        db: &PgPool,
        user_id: Uuid,
        req: &AddFavoriteRequest,
    ) -> anyhow::Result<Option<FavoriteFood>> {
        let fav = sqlx::query_as::<_, FavoriteFood>(
            r#"
            INSERT INTO favorite_foods (id, user_id, food_id, name, name_en, category, calories,
                protein, carbs, fat, fiber, sugar, sodium, serving_size, serving_unit, emoji)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (user_id, food_id) DO NOTHING
            RETURNING id, user_id, food_id, name, name_en, category, calories,
                protein, carbs, fat, fiber, sugar, sodium, serving_size, serving_unit, emoji, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&req.food_id)
        .bind(&req.name)
        .bind(&req.name_en)
        .bind(&req.category)
        .bind(req.calories)
        .bind(req.protein)
        .bind(req.carbs)
        .bind(req.fat)
        .bind(req.fiber)
        .bind(req.sugar)
        .bind(req.sodium)
        .bind(req.serving_size)
        .bind(&req.serving_unit)
        .bind(&req.emoji)
        .fetch_optional(db)
        .await?;
        Ok(fav)
    }

    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FavoriteFood>> {
        let favorites = sqlx::query_as::<_, FavoriteFood>(
            r#"
            SELECT id, user_id, food_id, name, name_en, category, calories,
                protein, carbs, fat, fiber, sugar, sodium, serving_size, serving_unit, emoji, created_at
            FROM favorite_foods
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(favorites)
    }

    pub async fn remove(db: &PgPool, user_id: Uuid, food_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM favorite_foods WHERE user_id = $1 AND food_id = $2")
            .bind(user_id)
            .bind(food_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomFood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<i32>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl CustomFood {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        req: &CreateCustomFoodRequest,
    ) -> anyhow::Result<CustomFood> {
        let food = sqlx::query_as::<_, CustomFood>(
            r#"
            INSERT INTO custom_foods (id, user_id, name, calories, protein, carbs, fat,
                fiber, sugar, sodium, serving_size, serving_unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, user_id, name, calories, protein, carbs, fat,
                fiber, sugar, sodium, serving_size, serving_unit, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&req.name)
        .bind(req.calories)
        .bind(req.protein)
        .bind(req.carbs)
        .bind(req.fat)
        .bind(req.fiber)
        .bind(req.sugar)
        .bind(req.sodium)
        .bind(req.serving_size)
        .bind(&req.serving_unit)
        .fetch_one(db)
        .await?;
        Ok(food)
    }

    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CustomFood>> {
        let foods = sqlx::query_as::<_, CustomFood>(
            r#"
            SELECT id, user_id, name, calories, protein, carbs, fat,
                fiber, sugar, sodium, serving_size, serving_unit, created_at, updated_at
            FROM custom_foods
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(foods)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM custom_foods WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
