//! Static category reference data.

use axum::Json;
use serde::Serialize;

/// One catalog category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Category {
    pub slug: &'static str,
    pub name: &'static str,
}

/// The fixed category list listings are filed under.
pub const CATEGORIES: &[Category] = &[
    Category {
        slug: "vegetables",
        name: "Vegetables",
    },
    Category {
        slug: "fruits",
        name: "Fruits",
    },
    Category {
        slug: "grains",
        name: "Grains & Cereals",
    },
    Category {
        slug: "dairy",
        name: "Dairy & Eggs",
    },
    Category {
        slug: "poultry",
        name: "Poultry & Meat",
    },
    Category {
        slug: "herbs",
        name: "Herbs & Spices",
    },
    Category {
        slug: "seeds",
        name: "Seeds & Saplings",
    },
    Category {
        slug: "other",
        name: "Other Farm Produce",
    },
];

/// Whether a slug names a known category.
#[must_use]
pub fn is_valid_category(slug: &str) -> bool {
    CATEGORIES.iter().any(|c| c.slug == slug)
}

/// `GET /categories`
pub async fn list() -> Json<&'static [Category]> {
    Json(CATEGORIES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category() {
        assert!(is_valid_category("vegetables"));
        assert!(is_valid_category("other"));
    }

    #[test]
    fn test_unknown_category() {
        assert!(!is_valid_category("Vegetables"));
        assert!(!is_valid_category("tractors"));
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<_> = CATEGORIES.iter().map(|c| c.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), CATEGORIES.len());
    }
}
