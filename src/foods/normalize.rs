use crate::foods::dto::{FoodItem, FoodSource, NutritionInfo};
use crate::foods::off::OffProduct;

/// Map a raw provider product into the canonical record.
///
/// Returns `None` when the payload carries no usable name in either
/// language; such a product cannot be shown or logged.
pub fn product_to_food_item(product: &OffProduct) -> Option<FoodItem> {
    if product.product_name.is_empty() && product.product_name_en.is_empty() {
        return None;
    }

    let n = &product.nutriments;
    let (serving_size, serving_unit) = parse_serving_size(&product.serving_size);

    // Per-serving values only mean something once a serving size is known;
    // zero means the field was not reported.
    let pick = |per_serving: f64, per_100: f64| {
        if per_serving > 0.0 && serving_size > 0.0 {
            per_serving
        } else {
            per_100
        }
    };
    let calories = pick(n.energy_kcal_serving, n.energy_kcal_100g).max(0.0) as i32;
    let protein = round1(pick(n.proteins_serving, n.proteins_100g));
    let carbs = round1(pick(n.carbohydrates_serving, n.carbohydrates_100g));
    let fat = round1(pick(n.fat_serving, n.fat_100g));

    let name = if product.product_name.is_empty() {
        product.product_name_en.clone()
    } else {
        product.product_name.clone()
    };
    let name_en = if product.product_name_en.is_empty() {
        product.product_name.clone()
    } else {
        product.product_name_en.clone()
    };

    Some(FoodItem {
        id: format!("off_{}", product.code),
        name,
        name_en,
        brand: (!product.brands.is_empty()).then(|| product.brands.clone()),
        category: first_category(&product.categories),
        nutrition: NutritionInfo {
            calories,
            protein,
            carbs,
            fat,
            fiber: (n.fiber_100g != 0.0).then(|| round1(n.fiber_100g)),
            sugar: (n.sugars_100g != 0.0).then(|| round1(n.sugars_100g)),
            // The source cannot distinguish a verified zero from a missing
            // field, so zero is reported as absent.
            sodium: sodium_mg(n.sodium_100g),
            serving_size,
            serving_unit,
        },
        image: (!product.image_url.is_empty()).then(|| product.image_url.clone()),
        barcode: Some(product.code.clone()),
        source: FoodSource::Openfoodfacts,
        emoji: None,
    })
}

/// Substring before the first comma of the categories string, or `"other"`
/// when the string is empty.
fn first_category(categories: &str) -> String {
    if categories.is_empty() {
        return "other".into();
    }
    match categories.split_once(',') {
        Some((first, _)) => first.to_string(),
        None => categories.to_string(),
    }
}

/// Parse a leading numeric quantity and trailing unit token out of a
/// serving-size string like `"250 ml"` or `"100g"`. Unparsable input falls
/// back to 100 g.
fn parse_serving_size(raw: &str) -> (f64, String) {
    let raw = raw.trim();
    let numeric: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let size = numeric.parse::<f64>().unwrap_or(0.0);
    if size <= 0.0 {
        return (100.0, "g".into());
    }
    let unit = raw[numeric.len()..]
        .split_whitespace()
        .next()
        .unwrap_or("g")
        .to_string();
    (size, unit)
}

/// Round-half-up to one decimal place, clamped non-negative.
fn round1(value: f64) -> f64 {
    ((value.max(0.0) * 10.0) + 0.5).floor() / 10.0
}

/// Provider sodium is grams per 100g; the canonical unit is whole
/// milligrams. Exactly zero is treated as absent.
fn sodium_mg(grams: f64) -> Option<i32> {
    if grams == 0.0 {
        return None;
    }
    Some((grams.max(0.0) * 1000.0).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::off::OffNutriments;

    fn product(name: &str, name_en: &str) -> OffProduct {
        OffProduct {
            code: "7612345678900".into(),
            product_name: name.into(),
            product_name_en: name_en.into(),
            ..OffProduct::default()
        }
    }

    #[test]
    fn rejects_product_without_any_name() {
        assert!(product_to_food_item(&product("", "")).is_none());
    }

    #[test]
    fn name_fields_degrade_to_each_other() {
        let item = product_to_food_item(&product("ต้มยำกุ้ง", "")).expect("usable product");
        assert_eq!(item.name, "ต้มยำกุ้ง");
        assert_eq!(item.name_en, "ต้มยำกุ้ง");

        let item = product_to_food_item(&product("", "Tom Yum Goong")).expect("usable product");
        assert_eq!(item.name, "Tom Yum Goong");
        assert_eq!(item.name_en, "Tom Yum Goong");
    }

    #[test]
    fn id_source_and_barcode_are_derived_from_code() {
        let item = product_to_food_item(&product("X", "")).expect("usable product");
        assert_eq!(item.id, "off_7612345678900");
        assert_eq!(item.barcode.as_deref(), Some("7612345678900"));
        assert_eq!(item.source, FoodSource::Openfoodfacts);
    }

    #[test]
    fn per_100_values_used_when_no_serving_values_reported() {
        let mut p = product("", "Oat bar");
        p.nutriments = OffNutriments {
            energy_kcal_100g: 451.9,
            proteins_100g: 8.26,
            carbohydrates_100g: 60.0,
            fat_100g: 19.55,
            ..OffNutriments::default()
        };
        let item = product_to_food_item(&p).expect("usable product");
        assert_eq!(item.nutrition.calories, 451);
        assert_eq!(item.nutrition.protein, 8.3);
        assert_eq!(item.nutrition.carbs, 60.0);
        assert_eq!(item.nutrition.fat, 19.6);
        assert_eq!(item.nutrition.serving_size, 100.0);
        assert_eq!(item.nutrition.serving_unit, "g");
    }

    #[test]
    fn serving_values_win_once_a_serving_size_is_known() {
        let mut p = product("Yogurt", "");
        p.serving_size = "125 g".into();
        p.nutriments = OffNutriments {
            energy_kcal_100g: 60.0,
            energy_kcal_serving: 75.0,
            proteins_100g: 4.0,
            proteins_serving: 5.0,
            ..OffNutriments::default()
        };
        let item = product_to_food_item(&p).expect("usable product");
        assert_eq!(item.nutrition.calories, 75);
        assert_eq!(item.nutrition.protein, 5.0);
        assert_eq!(item.nutrition.serving_size, 125.0);
    }

    #[test]
    fn category_is_text_before_first_comma() {
        assert_eq!(first_category("Beverages, Sodas, Colas"), "Beverages");
        assert_eq!(first_category("Snacks"), "Snacks");
        assert_eq!(first_category(""), "other");
    }

    #[test]
    fn serving_size_parsing() {
        assert_eq!(parse_serving_size("250 ml"), (250.0, "ml".to_string()));
        assert_eq!(parse_serving_size("100g"), (100.0, "g".to_string()));
        assert_eq!(parse_serving_size("2.5 dl"), (2.5, "dl".to_string()));
        assert_eq!(parse_serving_size(""), (100.0, "g".to_string()));
        assert_eq!(parse_serving_size("one scoop"), (100.0, "g".to_string()));
    }

    #[test]
    fn rounds_half_up_to_one_decimal() {
        assert_eq!(round1(2.25), 2.3);
        assert_eq!(round1(2.24), 2.2);
        assert_eq!(round1(-1.0), 0.0);
    }

    #[test]
    fn zero_sodium_is_absent_not_zero() {
        let mut p = product("Water", "");
        p.nutriments.sodium_100g = 0.0;
        let item = product_to_food_item(&p).expect("usable product");
        assert_eq!(item.nutrition.sodium, None);

        p.nutriments.sodium_100g = 0.42;
        let item = product_to_food_item(&p).expect("usable product");
        assert_eq!(item.nutrition.sodium, Some(420));
    }

    #[test]
    fn optional_fields_absent_when_not_reported() {
        let item = product_to_food_item(&product("Plain", "")).expect("usable product");
        assert_eq!(item.brand, None);
        assert_eq!(item.image, None);
        assert_eq!(item.nutrition.fiber, None);
        assert_eq!(item.nutrition.sugar, None);
    }
}
