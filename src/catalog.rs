use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog product. Names are bilingual: `name` is Arabic, `name_en` English.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: u32,
    pub name: String,
    #[serde(rename = "nameEn")]
    pub name_en: String,
    pub category: String,
    pub price: Decimal,
    pub image: String,
    #[serde(rename = "isNew")]
    pub is_new: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "nameEn")]
    pub name_en: String,
}

/// Search criteria; all fields combine with AND, absent fields match anything.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct SearchFilters {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
}

/// Immutable in-memory product catalog.
///
/// Held behind an `Arc` in application state; every accessor is a pure read.
#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    /// The store's fixed product range.
    pub fn builtin() -> Self {
        fn product(
            id: u32,
            name: &str,
            name_en: &str,
            category: &str,
            price: Decimal,
            image: &str,
            is_new: bool,
        ) -> Product {
            Product {
                id,
                name: name.to_string(),
                name_en: name_en.to_string(),
                category: category.to_string(),
                price,
                image: format!("https://images.unsplash.com/{}", image),
                is_new,
            }
        }

        fn category(id: &str, name: &str, name_en: &str) -> Category {
            Category {
                id: id.to_string(),
                name: name.to_string(),
                name_en: name_en.to_string(),
            }
        }

        Self {
            products: vec![
                product(1, "حقيبة جلدية فاخرة", "Luxury Leather Bag", "bags", dec!(1299), "photo-1589363358751-ab05797e5629", true),
                product(2, "حقيبة يد كلاسيكية", "Classic Handbag", "bags", dec!(899), "photo-1587467512961-120760940315", false),
                product(3, "حقيبة كتف عصرية", "Modern Shoulder Bag", "bags", dec!(749), "photo-1591348278900-019a8a2a8b1d", true),
                product(4, "قميص صيفي أنيق", "Elegant Summer Shirt", "shirts", dec!(299), "photo-1715533173683-737d4a2433dd", true),
                product(5, "جاكيت رسمي", "Formal Jacket", "jackets", dec!(599), "photo-1558769132-cb1aea458c5e", false),
                product(6, "بنطلون كلاسيكي", "Classic Pants", "pants", dec!(399), "photo-1441984904996-e0b6ba687e04", true),
                product(7, "حقيبة ظهر عملية", "Practical Backpack", "bags", dec!(549), "photo-1590739225287-bd31519780c3", false),
                product(8, "قميص قطني فاخر", "Premium Cotton Shirt", "shirts", dec!(349), "photo-1716951220992-2bbe913ddbf8", true),
                product(9, "جاكيت كاجوال", "Casual Jacket", "jackets", dec!(699), "photo-1532453288672-3a27e9be9efd", false),
                product(10, "بنطلون صيفي خفيف", "Light Summer Pants", "pants", dec!(449), "photo-1716951988375-37d5793385d0", true),
                product(11, "قميص بولو أنيق", "Elegant Polo Shirt", "shirts", dec!(279), "photo-1716951918731-77d7682b4e63", false),
                product(12, "جاكيت جلدي فاخر", "Luxury Leather Jacket", "jackets", dec!(1499), "photo-1686491730848-0c86413833e5", true),
            ],
            categories: vec![
                category("bags", "الحقائب", "Bags"),
                category("jackets", "الجاكيتات", "Jackets"),
                category("shirts", "القمصان", "Shirts"),
                category("pants", "البناطيل", "Pants"),
            ],
        }
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn list(&self, category: Option<&str>) -> Vec<&Product> {
        match category {
            Some(cat) => self.products.iter().filter(|p| p.category == cat).collect(),
            None => self.products.iter().collect(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive text containment over either name, combined with
    /// category and inclusive price-range filters.
    pub fn search(&self, filters: &SearchFilters) -> Vec<&Product> {
        let query = filters
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.products
            .iter()
            .filter(|p| match &query {
                Some(q) => {
                    p.name.to_lowercase().contains(q) || p.name_en.to_lowercase().contains(q)
                }
                None => true,
            })
            .filter(|p| match &filters.category {
                Some(cat) => p.category == *cat,
                None => true,
            })
            .filter(|p| match filters.min_price {
                Some(min) => p.price >= min,
                None => true,
            })
            .filter(|p| match filters.max_price {
                Some(max) => p.price <= max,
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(
        q: Option<&str>,
        category: Option<&str>,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) -> SearchFilters {
        SearchFilters {
            q: q.map(String::from),
            category: category.map(String::from),
            min_price: min,
            max_price: max,
        }
    }

    #[test]
    fn builtin_catalog_shape() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.list(None).len(), 12);
        assert_eq!(catalog.categories().len(), 4);
        assert_eq!(catalog.get(1).unwrap().name_en, "Luxury Leather Bag");
        assert!(catalog.get(13).is_none());
    }

    #[test]
    fn text_search_matches_either_name_case_insensitively() {
        let catalog = Catalog::builtin();

        let hits = catalog.search(&filters(Some("LEATHER"), None, None, None));
        let ids: Vec<u32> = hits.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 12]);

        // Arabic name matches too
        let hits = catalog.search(&filters(Some("بولو"), None, None, None));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 11);
    }

    #[test]
    fn filters_combine_with_and() {
        let catalog = Catalog::builtin();
        let hits = catalog.search(&filters(
            None,
            Some("jackets"),
            Some(dec!(600)),
            Some(dec!(1000)),
        ));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 9);
    }

    #[test]
    fn no_match_yields_empty_list() {
        let catalog = Catalog::builtin();
        let hits = catalog.search(&filters(Some("nonexistent thing"), None, None, None));
        assert!(hits.is_empty());
    }

    #[test]
    fn blank_query_is_ignored() {
        let catalog = Catalog::builtin();
        let hits = catalog.search(&filters(Some("   "), None, None, None));
        assert_eq!(hits.len(), 12);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let catalog = Catalog::builtin();
        let hits = catalog.search(&filters(None, None, Some(dec!(1499)), None));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 12);
    }
}
