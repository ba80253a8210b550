use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    pub calories: i32,
    pub grams: f64,
    pub meal_type: MealType,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub calories: Option<i32>,
    pub grams: Option<f64>,
    pub meal_type: Option<MealType>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<i32>,
    pub image_url: Option<String>,
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct MealListQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub food_id: String,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    pub calories: i32,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<i32>,
    pub serving_size: f64,
    pub serving_unit: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomFoodRequest {
    pub name: String,
    pub calories: i32,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<i32>,
    pub serving_size: f64,
    pub serving_unit: String,
}

fn default_category() -> String {
    "other".into()
}
