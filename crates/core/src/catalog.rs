//! Category aggregation over product listings.
//!
//! Categories are not a backend resource; they are derived from the
//! `category` field of whatever products the backend returns. Every function
//! here keeps first-appearance order so menus stay stable between requests.

use crate::product::Product;

/// A category and how many products carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Unique categories in first-appearance order.
///
/// Products without a category are skipped. Matching is exact, so `Protein`
/// and `protein` are two entries, as they are two different link targets.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    category_counts(products)
        .into_iter()
        .map(|c| c.name)
        .collect()
}

/// Product count per category in first-appearance order.
#[must_use]
pub fn category_counts(products: &[Product]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for category in products.iter().filter_map(|p| p.category.as_deref()) {
        match counts.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.count += 1,
            None => counts.push(CategoryCount {
                name: category.to_string(),
                count: 1,
            }),
        }
    }
    counts
}

/// Products in `category`, compared case-insensitively, in listing order.
#[must_use]
pub fn filter_by_category(products: Vec<Product>, category: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.in_category(category))
        .collect()
}

/// Page title for a category path segment.
///
/// Splits on `-` and capitalizes the first letter of each piece:
/// `fat-burner` becomes `Fat Burner`; `Pre Workout` stays as it is.
#[must_use]
pub fn category_title(category: &str) -> String {
    category
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"1 product"` or `"N products"`, with the noun given in singular form.
#[must_use]
pub fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::product::RawProduct;

    fn listing(categories: &[Option<&str>]) -> Vec<Product> {
        Product::from_listing(
            categories
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    serde_json::from_value::<RawProduct>(json!({ "id": i.to_string(), "category": c }))
                        .unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_categories_keep_first_appearance_order() {
        let products = listing(&[
            Some("Protein"),
            Some("Creatine"),
            None,
            Some("Protein"),
            Some("BCAA"),
        ]);
        assert_eq!(categories(&products), vec!["Protein", "Creatine", "BCAA"]);
    }

    #[test]
    fn test_category_counts() {
        let products = listing(&[Some("Protein"), Some("Creatine"), Some("Protein")]);
        assert_eq!(
            category_counts(&products),
            vec![
                CategoryCount {
                    name: "Protein".into(),
                    count: 2
                },
                CategoryCount {
                    name: "Creatine".into(),
                    count: 1
                },
            ]
        );
        assert!(category_counts(&[]).is_empty());
    }

    #[test]
    fn test_filter_by_category_ignores_case() {
        let products = listing(&[Some("Fat Burner"), Some("fat burner"), Some("Protein"), None]);
        let filtered = filter_by_category(products, "FAT BURNER");
        let ids: Vec<_> = filtered.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[test]
    fn test_category_title() {
        assert_eq!(category_title("fat-burner"), "Fat Burner");
        assert_eq!(category_title("Pre Workout"), "Pre Workout");
        assert_eq!(category_title("weight-gainer-xl"), "Weight Gainer Xl");
        assert_eq!(category_title("bcaa"), "Bcaa");
        assert_eq!(category_title(""), "");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "product"), "1 product");
        assert_eq!(pluralize(0, "product"), "0 products");
        assert_eq!(pluralize(7, "Product"), "7 Products");
    }
}
