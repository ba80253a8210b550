use axum::async_trait;
use sqlx::{FromRow, PgPool};

use crate::foods::dto::{FoodItem, FoodSource, NutritionInfo};

/// Row shape of the curated local catalog.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogFood {
    pub id: String,
    pub name: String,
    pub name_en: String,
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
}

impl CatalogFood {
    pub fn into_food_item(self) -> FoodItem {
        FoodItem {
            id: self.id,
            name: self.name,
            name_en: self.name_en,
            brand: None,
            category: self.category,
            nutrition: NutritionInfo {
                calories: self.calories,
                protein: self.protein,
                carbs: self.carbs,
                fat: self.fat,
                fiber: self.fiber,
                sugar: self.sugar,
                sodium: self.sodium,
                serving_size: self.serving_size,
                serving_unit: self.serving_unit,
            },
            image: None,
            barcode: None,
            source: FoodSource::Local,
            emoji: self.emoji,
        }
    }
}

/// Read interface over the curated catalog. The search orchestrator only
/// ever talks to this trait, so tests can swap in an in-memory stub.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Case-insensitive substring match on localized or English name,
    /// capped at the top 50 by name.
    async fn search(&self, query: &str) -> anyhow::Result<Vec<CatalogFood>>;

    /// Exact category match; `"all"` or empty returns everything.
    async fn list(&self, category: &str) -> anyhow::Result<Vec<CatalogFood>>;
}

pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<CatalogFood>> {
        let rows = sqlx::query_as::<_, CatalogFood>(
            r#"
            SELECT id, name, name_en, category, calories, protein, carbs, fat,
                   fiber, sugar, sodium, serving_size, serving_unit, emoji
            FROM catalog_foods
            WHERE name ILIKE '%' || $1 || '%' OR name_en ILIKE '%' || $1 || '%'
            ORDER BY name
            LIMIT 50
            "#,
        )
        .bind(query)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list(&self, category: &str) -> anyhow::Result<Vec<CatalogFood>> {
        let rows = if category.is_empty() || category == "all" {
            sqlx::query_as::<_, CatalogFood>(
                r#"
                SELECT id, name, name_en, category, calories, protein, carbs, fat,
                       fiber, sugar, sodium, serving_size, serving_unit, emoji
                FROM catalog_foods
                ORDER BY category, name
                "#,
            )
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, CatalogFood>(
                r#"
                SELECT id, name, name_en, category, calories, protein, carbs, fat,
                       fiber, sugar, sodium, serving_size, serving_unit, emoji
                FROM catalog_foods
                WHERE category = $1
                ORDER BY name
                "#,
            )
            .bind(category)
            .fetch_all(&self.db)
            .await?
        };
        Ok(rows)
    }
}
