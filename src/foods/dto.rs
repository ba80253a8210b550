use serde::{Deserialize, Serialize};

/// Where a food record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodSource {
    Local,
    Openfoodfacts,
}

/// Nutritional values for one serving of a food.
///
/// Gram and kcal fields are non-negative. Optional fields are absent, not
/// zero, when the source did not report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    /// Milligrams.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<i32>,
    pub serving_size: f64,
    pub serving_unit: String,
}

/// Canonical food record. Every source is normalized into this shape; a
/// fresh value is built per lookup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Source-prefixed: the catalog's own id for local foods,
    /// `off_<barcode>` for provider results.
    pub id: String,
    pub name: String,
    pub name_en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub category: String,
    pub nutrition: NutritionInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub source: FoodSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// One page of merged search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub foods: Vec<FoodItem>,
    /// Best-effort count for the returned page, not a global total.
    pub total: usize,
    pub page: u32,
    /// Heuristic hint; the provider gives no cheap exact remaining count.
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub name_en: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_category")]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_page() -> u32 {
    1
}

fn default_category() -> String {
    "all".into()
}
