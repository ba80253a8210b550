use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::FoodsConfig;
use crate::error::ApiError;
use crate::foods::cache::BarcodeCache;
use crate::foods::catalog::CatalogSource;
use crate::foods::dto::{FoodCategory, FoodItem, SearchResult};
use crate::foods::normalize;
use crate::foods::off::OffClient;

/// Curated category list shown by the food picker. `id` matches the
/// `category` column of the catalog.
const CATEGORIES: &[FoodCategory] = &[
    FoodCategory { id: "all", name: "ทั้งหมด", name_en: "All", icon: "🍽️" },
    FoodCategory { id: "rice", name: "ข้าว", name_en: "Rice & Grains", icon: "🍚" },
    FoodCategory { id: "noodles", name: "เส้น", name_en: "Noodles", icon: "🍜" },
    FoodCategory { id: "curry", name: "แกง", name_en: "Curry", icon: "🍛" },
    FoodCategory { id: "stir-fry", name: "ผัด", name_en: "Stir-fry", icon: "🥘" },
    FoodCategory { id: "soup", name: "ต้ม", name_en: "Soup", icon: "🍲" },
    FoodCategory { id: "salad", name: "ยำ", name_en: "Salad", icon: "🥗" },
    FoodCategory { id: "grilled", name: "ย่าง", name_en: "Grilled", icon: "🍖" },
    FoodCategory { id: "dessert", name: "ของหวาน", name_en: "Dessert", icon: "🍮" },
];

/// Orchestrates the local catalog, the external provider and the barcode
/// cache into the three food lookup operations. Cheap to clone; one value
/// is built at startup and shared through `AppState`.
#[derive(Clone)]
pub struct FoodService {
    catalog: Arc<dyn CatalogSource>,
    provider: OffClient,
    cache: Option<Arc<BarcodeCache>>,
    page_size: usize,
    cache_ttl: Duration,
}

impl FoodService {
    pub fn new(catalog: Arc<dyn CatalogSource>, provider: OffClient, config: &FoodsConfig) -> Self {
        Self {
            catalog,
            provider,
            cache: config.cache_enabled.then(|| Arc::new(BarcodeCache::new())),
            page_size: config.page_size,
            cache_ttl: config.cache_ttl,
        }
    }

    /// One page of merged results: catalog first, provider filling the
    /// remainder. Provider failures degrade to local-only results; a
    /// catalog failure is fatal to the call since the catalog is the
    /// higher-trust source.
    pub async fn search_foods(
        &self,
        query: &str,
        page: u32,
        category: &str,
    ) -> Result<SearchResult, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidInput("search query is required".into()));
        }
        if page < 1 {
            return Err(ApiError::InvalidInput("page must be at least 1".into()));
        }

        let mut foods: Vec<FoodItem> = self
            .catalog
            .search(query)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .filter(|f| category.is_empty() || category == "all" || f.category == category)
            .map(|f| f.into_food_item())
            .collect();

        // A full first page of catalog hits answers the request outright;
        // the provider is not consulted.
        if page == 1 && foods.len() >= self.page_size {
            let total = foods.len();
            foods.truncate(self.page_size);
            return Ok(SearchResult {
                foods,
                total,
                page,
                has_more: total > self.page_size,
            });
        }

        // The catalog has no cursor past its first page, so later pages
        // are served from the provider alone.
        let wanted = if page == 1 {
            self.page_size - foods.len()
        } else {
            self.page_size
        };
        let external = match self.provider.search_products(query, page, wanted).await {
            Ok(products) => products
                .iter()
                .filter_map(normalize::product_to_food_item)
                .collect::<Vec<_>>(),
            Err(err) => {
                warn!(error = %err, %query, "provider search failed, returning local results only");
                Vec::new()
            }
        };
        debug!(local = foods.len(), external = external.len(), page, "search merged");

        let has_more = external.len() >= wanted;
        if page == 1 {
            foods.extend(external);
        } else {
            foods = external;
        }
        let total = foods.len();
        Ok(SearchResult {
            foods,
            total,
            page,
            has_more,
        })
    }

    /// Cache-aside barcode lookup. Both "provider down" and "no such
    /// product" surface as not-found; nothing negative is ever cached.
    pub async fn lookup_barcode(&self, barcode: &str) -> Result<FoodItem, ApiError> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(ApiError::InvalidInput("barcode is required".into()));
        }

        if let Some(cache) = &self.cache {
            if let Some(food) = cache.get(barcode) {
                debug!(%barcode, "barcode cache hit");
                return Ok(food);
            }
        }

        let product = self.provider.product_by_barcode(barcode).await.map_err(|err| {
            warn!(error = %err, %barcode, "barcode lookup failed");
            ApiError::NotFound("product not found".into())
        })?;
        let food = normalize::product_to_food_item(&product)
            .ok_or_else(|| ApiError::NotFound("product not found".into()))?;

        if let Some(cache) = &self.cache {
            cache.set(barcode, food.clone(), self.cache_ttl);
        }
        Ok(food)
    }

    /// Catalog listing, optionally filtered to one category.
    pub async fn list_catalog(&self, category: &str) -> Result<Vec<FoodItem>, ApiError> {
        let rows = self
            .catalog
            .list(category)
            .await
            .map_err(ApiError::Internal)?;
        Ok(rows.into_iter().map(|f| f.into_food_item()).collect())
    }

    pub fn categories(&self) -> &'static [FoodCategory] {
        CATEGORIES
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> Option<&BarcodeCache> {
        self.cache.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::foods::catalog::CatalogFood;
    use crate::foods::dto::FoodSource;

    struct StubCatalog {
        foods: Vec<CatalogFood>,
        calls: AtomicUsize,
    }

    impl StubCatalog {
        fn new(foods: Vec<CatalogFood>) -> Arc<Self> {
            Arc::new(Self {
                foods,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CatalogSource for StubCatalog {
        async fn search(&self, query: &str) -> anyhow::Result<Vec<CatalogFood>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let q = query.to_lowercase();
            Ok(self
                .foods
                .iter()
                .filter(|f| {
                    f.name.to_lowercase().contains(&q) || f.name_en.to_lowercase().contains(&q)
                })
                .take(50)
                .cloned()
                .collect())
        }

        async fn list(&self, category: &str) -> anyhow::Result<Vec<CatalogFood>> {
            Ok(self
                .foods
                .iter()
                .filter(|f| category.is_empty() || category == "all" || f.category == category)
                .cloned()
                .collect())
        }
    }

    struct DownCatalog;

    #[async_trait]
    impl CatalogSource for DownCatalog {
        async fn search(&self, _query: &str) -> anyhow::Result<Vec<CatalogFood>> {
            anyhow::bail!("connection refused")
        }
        async fn list(&self, _category: &str) -> anyhow::Result<Vec<CatalogFood>> {
            anyhow::bail!("connection refused")
        }
    }

    fn catalog_food(id: &str, name_en: &str, category: &str) -> CatalogFood {
        CatalogFood {
            id: id.into(),
            name: name_en.into(),
            name_en: name_en.into(),
            category: category.into(),
            calories: 200,
            protein: 10.0,
            carbs: 20.0,
            fat: 5.0,
            fiber: None,
            sugar: None,
            sodium: Some(400),
            serving_size: 100.0,
            serving_unit: "g".into(),
            emoji: Some("🍛".into()),
        }
    }

    fn off_product_json(code: &str, name: &str) -> serde_json::Value {
        json!({
            "code": code,
            "product_name": name,
            "categories": "Curries, Ready meals",
            "nutriments": {
                "energy-kcal_100g": 150.0,
                "proteins_100g": 6.0,
                "carbohydrates_100g": 18.0,
                "fat_100g": 7.0
            }
        })
    }

    fn test_config(base_url: &str, cache_enabled: bool) -> FoodsConfig {
        FoodsConfig {
            provider_base_url: base_url.to_string(),
            provider_timeout: Duration::from_secs(2),
            cache_enabled,
            cache_ttl: Duration::from_secs(60),
            page_size: 20,
        }
    }

    fn service(catalog: Arc<dyn CatalogSource>, config: &FoodsConfig) -> FoodService {
        let provider =
            OffClient::new(&config.provider_base_url, config.provider_timeout).expect("client");
        FoodService::new(catalog, provider, config)
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_source_is_queried() {
        let catalog = StubCatalog::new(vec![]);
        let svc = service(catalog.clone(), &test_config("http://127.0.0.1:1", true));

        let err = svc.search_foods("   ", 1, "all").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn full_local_first_page_never_consults_the_provider() {
        let foods = (0..25)
            .map(|i| catalog_food(&format!("curry_{i:02}"), &format!("Curry {i:02}"), "curry"))
            .collect();
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi/search.pl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
            .expect(0)
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(foods), &test_config(&mock_server.uri(), true));
        let result = svc.search_foods("curry", 1, "all").await.expect("search");

        assert_eq!(result.foods.len(), 20);
        assert_eq!(result.total, 25);
        assert!(result.has_more);
        assert!(result.foods.iter().all(|f| f.source == FoodSource::Local));
    }

    #[tokio::test]
    async fn first_page_merges_local_before_external() {
        let foods = vec![
            catalog_food("curry_01", "Green Curry", "curry"),
            catalog_food("curry_02", "Red Curry", "curry"),
            catalog_food("curry_03", "Massaman Curry", "curry"),
        ];
        let products: Vec<_> = (0..17)
            .map(|i| off_product_json(&format!("90000000{i:02}"), &format!("Curry Paste {i}")))
            .collect();

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi/search.pl"))
            .and(query_param("search_terms", "curry"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", "17"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": products })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(foods), &test_config(&mock_server.uri(), true));
        let result = svc.search_foods("curry", 1, "all").await.expect("search");

        assert_eq!(result.foods.len(), 20);
        assert_eq!(result.total, 20);
        assert!(result.has_more);
        // Local results always sort before external on the first page.
        assert!(result.foods[..3].iter().all(|f| f.source == FoodSource::Local));
        assert!(result.foods[3..]
            .iter()
            .all(|f| f.source == FoodSource::Openfoodfacts));
    }

    #[tokio::test]
    async fn later_pages_are_external_only_and_request_a_full_page() {
        let foods = vec![catalog_food("curry_01", "Green Curry", "curry")];
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi/search.pl"))
            .and(query_param("page", "2"))
            .and(query_param("page_size", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [off_product_json("9000000001", "Curry Sauce")]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(foods), &test_config(&mock_server.uri(), true));
        let result = svc.search_foods("curry", 2, "all").await.expect("search");

        assert_eq!(result.foods.len(), 1);
        assert_eq!(result.total, 1);
        assert!(!result.has_more);
        assert!(result.foods.iter().all(|f| f.source == FoodSource::Openfoodfacts));
    }

    #[tokio::test]
    async fn category_filter_applies_to_local_results() {
        let foods = vec![
            catalog_food("curry_01", "Green Curry", "curry"),
            catalog_food("soup_01", "Curry Soup", "soup"),
        ];
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi/search.pl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(foods), &test_config(&mock_server.uri(), true));
        let result = svc.search_foods("curry", 1, "soup").await.expect("search");

        assert_eq!(result.foods.len(), 1);
        assert_eq!(result.foods[0].id, "soup_01");
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_local_results() {
        let foods = vec![catalog_food("curry_01", "Green Curry", "curry")];
        // Nothing is listening here; the provider call fails fast.
        let svc = service(StubCatalog::new(foods), &test_config("http://127.0.0.1:1", true));

        let result = svc.search_foods("curry", 1, "all").await.expect("search");
        assert_eq!(result.foods.len(), 1);
        assert_eq!(result.foods[0].source, FoodSource::Local);
        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn malformed_search_body_degrades_to_local_results() {
        let foods = vec![catalog_food("curry_01", "Green Curry", "curry")];
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi/search.pl"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(foods), &test_config(&mock_server.uri(), true));
        let result = svc.search_foods("curry", 1, "all").await.expect("search");
        assert_eq!(result.foods.len(), 1);
    }

    #[tokio::test]
    async fn catalog_failure_is_fatal_to_the_call() {
        let svc = service(Arc::new(DownCatalog), &test_config("http://127.0.0.1:1", true));
        let err = svc.search_foods("curry", 1, "all").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn barcode_lookup_hits_provider_once_within_ttl() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/product/737628064502.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 1,
                "product": off_product_json("737628064502", "Rice Noodles")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(vec![]), &test_config(&mock_server.uri(), true));
        let first = svc.lookup_barcode("737628064502").await.expect("lookup");
        let second = svc.lookup_barcode("737628064502").await.expect("lookup");

        assert_eq!(first, second);
        assert_eq!(first.id, "off_737628064502");
    }

    #[tokio::test]
    async fn barcode_not_found_is_not_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/product/000.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": 0, "status_verbose": "product not found" })),
            )
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(vec![]), &test_config(&mock_server.uri(), true));
        let err = svc.lookup_barcode("000").await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(svc.cache().expect("cache enabled").is_empty());
    }

    #[tokio::test]
    async fn provider_unavailable_surfaces_as_not_found_for_barcodes() {
        let svc = service(StubCatalog::new(vec![]), &test_config("http://127.0.0.1:1", true));
        let err = svc.lookup_barcode("737628064502").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn lookups_work_with_the_cache_disabled() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/product/737628064502.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 1,
                "product": off_product_json("737628064502", "Rice Noodles")
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(vec![]), &test_config(&mock_server.uri(), false));
        assert!(svc.cache().is_none());
        let first = svc.lookup_barcode("737628064502").await.expect("lookup");
        let second = svc.lookup_barcode("737628064502").await.expect("lookup");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn nameless_product_is_rejected_as_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/product/123.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 1,
                "product": { "code": "123" }
            })))
            .mount(&mock_server)
            .await;

        let svc = service(StubCatalog::new(vec![]), &test_config(&mock_server.uri(), true));
        let err = svc.lookup_barcode("123").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn catalog_listing_respects_category() {
        let foods = vec![
            catalog_food("curry_01", "Green Curry", "curry"),
            catalog_food("soup_01", "Tom Yum", "soup"),
        ];
        let svc = service(StubCatalog::new(foods), &test_config("http://127.0.0.1:1", true));

        let all = svc.list_catalog("all").await.expect("list");
        assert_eq!(all.len(), 2);
        let soups = svc.list_catalog("soup").await.expect("list");
        assert_eq!(soups.len(), 1);
        assert_eq!(soups[0].id, "soup_01");
    }
}
