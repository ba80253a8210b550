use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::foods::catalog::{CatalogSource, PgCatalog};
use crate::foods::off::OffClient;
use crate::foods::service::FoodService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub foods: FoodService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        let provider = OffClient::new(
            &config.foods.provider_base_url,
            config.foods.provider_timeout,
        )?;
        let catalog = Arc::new(PgCatalog::new(db.clone())) as Arc<dyn CatalogSource>;
        let foods = FoodService::new(catalog, provider, &config.foods);

        Ok(Self { db, config, foods })
    }
}
