use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Settings for the food lookup subsystem: the Open Food Facts client and
/// the barcode cache in front of it.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodsConfig {
    pub provider_base_url: String,
    pub provider_timeout: Duration,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub foods: FoodsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mealtrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mealtrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let foods = FoodsConfig {
            provider_base_url: std::env::var("FOOD_PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://world.openfoodfacts.org".into()),
            provider_timeout: Duration::from_secs(
                std::env::var("FOOD_PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(10),
            ),
            cache_enabled: std::env::var("FOOD_CACHE_ENABLED")
                .map(|v| v != "false")
                .unwrap_or(true),
            cache_ttl: Duration::from_secs(
                std::env::var("FOOD_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(7 * 24 * 60 * 60),
            ),
            page_size: std::env::var("FOOD_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(20),
        };
        Ok(Self {
            database_url,
            jwt,
            foods,
        })
    }
}
