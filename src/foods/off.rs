use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Sent on every call so the provider can identify the client.
const USER_AGENT: &str = concat!("mealtrack/", env!("CARGO_PKG_VERSION"));

/// Fields requested from the search endpoint; anything else is dead weight
/// on the wire.
const SEARCH_FIELDS: &str =
    "code,product_name,product_name_en,brands,categories,image_url,nutriments,serving_size,serving_quantity";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure or timeout; the provider could not be reached.
    #[error("open food facts unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The provider answered but has no product for the barcode.
    #[error("product not found")]
    NotFound,
}

/// Raw product payload as Open Food Facts returns it. Normalization into a
/// [`FoodItem`](crate::foods::dto::FoodItem) happens in `normalize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffProduct {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_name_en: String,
    #[serde(default)]
    pub brands: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub serving_size: String,
    #[serde(default)]
    pub nutriments: OffNutriments,
}

/// Nutrition block offering both per-100g and per-serving values. Missing
/// fields decode as zero; the normalizer treats zero as "not reported".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffNutriments {
    #[serde(rename = "energy-kcal_100g", default)]
    pub energy_kcal_100g: f64,
    #[serde(rename = "energy-kcal_serving", default)]
    pub energy_kcal_serving: f64,
    #[serde(default)]
    pub proteins_100g: f64,
    #[serde(default)]
    pub proteins_serving: f64,
    #[serde(default)]
    pub carbohydrates_100g: f64,
    #[serde(default)]
    pub carbohydrates_serving: f64,
    #[serde(default)]
    pub fat_100g: f64,
    #[serde(default)]
    pub fat_serving: f64,
    #[serde(default)]
    pub fiber_100g: f64,
    #[serde(default)]
    pub sugars_100g: f64,
    #[serde(default)]
    pub sodium_100g: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OffSearchResponse {
    #[serde(default)]
    products: Vec<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProductResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: OffProduct,
}

/// HTTP client for the Open Food Facts API. Stateless per request; safe to
/// clone and share across handlers.
#[derive(Clone)]
pub struct OffClient {
    http: reqwest::Client,
    base_url: String,
}

impl OffClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Text search. An undecodable body degrades to an empty product list;
    /// only transport failures surface as errors.
    pub async fn search_products(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
    ) -> Result<Vec<OffProduct>, ProviderError> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page", &page.to_string()),
                ("page_size", &page_size.to_string()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await?;

        match resp.json::<OffSearchResponse>().await {
            Ok(body) => Ok(body.products),
            Err(err) => {
                debug!(error = %err, "undecodable search response, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Single-product lookup. A non-success status flag or an undecodable
    /// body both mean the product does not exist as far as callers care.
    pub async fn product_by_barcode(&self, barcode: &str) -> Result<OffProduct, ProviderError> {
        let url = format!("{}/api/v2/product/{}.json", self.base_url, barcode);
        let resp = self.http.get(&url).send().await?;

        let body = match resp.json::<OffProductResponse>().await {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, %barcode, "undecodable product response");
                return Err(ProviderError::NotFound);
            }
        };
        if body.status != 1 {
            return Err(ProviderError::NotFound);
        }
        Ok(body.product)
    }
}
