use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::foods::dto::FoodItem;

struct CacheEntry {
    food: FoodItem,
    expires_at: Instant,
}

/// Time-bounded cache-aside store for barcode lookups.
///
/// Entries are evicted lazily the first time they are observed expired;
/// there is no background sweeper. Keys are independent: reads and writes
/// on different barcodes never contend, and concurrent misses on the same
/// barcode are allowed to race (the provider call behind them is
/// idempotent).
pub struct BarcodeCache {
    entries: DashMap<String, CacheEntry>,
}

impl BarcodeCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// A hit requires the entry to exist and not be expired. An expired
    /// entry is removed and reported as a plain miss, indistinguishable
    /// from never-cached.
    pub fn get(&self, barcode: &str) -> Option<FoodItem> {
        self.entries
            .remove_if(barcode, |_, entry| Instant::now() >= entry.expires_at);
        self.entries.get(barcode).map(|entry| entry.food.clone())
    }

    /// Insert or overwrite unconditionally.
    pub fn set(&self, barcode: &str, food: FoodItem, ttl: Duration) {
        self.entries.insert(
            barcode.to_string(),
            CacheEntry {
                food,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BarcodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::dto::{FoodSource, NutritionInfo};

    fn food(id: &str) -> FoodItem {
        FoodItem {
            id: id.into(),
            name: "Test".into(),
            name_en: "Test".into(),
            brand: None,
            category: "other".into(),
            nutrition: NutritionInfo {
                calories: 100,
                protein: 1.0,
                carbs: 2.0,
                fat: 3.0,
                fiber: None,
                sugar: None,
                sodium: None,
                serving_size: 100.0,
                serving_unit: "g".into(),
            },
            image: None,
            barcode: Some(id.into()),
            source: FoodSource::Openfoodfacts,
            emoji: None,
        }
    }

    #[test]
    fn get_returns_what_was_set() {
        let cache = BarcodeCache::new();
        cache.set("123", food("off_123"), Duration::from_secs(60));
        let hit = cache.get("123").expect("fresh entry");
        assert_eq!(hit.id, "off_123");
    }

    #[test]
    fn zero_ttl_entry_is_already_expired() {
        let cache = BarcodeCache::new();
        cache.set("123", food("off_123"), Duration::ZERO);
        assert!(cache.get("123").is_none());
        // The expired entry was evicted on observation.
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = BarcodeCache::new();
        cache.set("123", food("off_old"), Duration::from_secs(60));
        cache.set("123", food("off_new"), Duration::from_secs(60));
        assert_eq!(cache.get("123").expect("entry").id, "off_new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn miss_on_unknown_barcode() {
        let cache = BarcodeCache::new();
        assert!(cache.get("nope").is_none());
    }
}
