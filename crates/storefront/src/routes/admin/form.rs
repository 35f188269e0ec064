//! Product form parsing and validation.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use supplimax_core::{Product, ProductId, product::DEFAULT_SIZE};

/// Highest accepted rating.
const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Highest accepted price or cost.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// A product form that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    #[error("Product name is required")]
    MissingName,

    #[error("Category is required")]
    MissingCategory,

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} cannot be more than 1000000")]
    TooLarge(&'static str),

    #[error("Quantity in stock must be a whole number of zero or more")]
    InvalidQuantity,

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u8,
        max: u8,
    },
}

/// Product create/edit form as submitted.
///
/// Everything arrives as text; checkboxes are present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub cost: String,
    pub description: String,
    pub image_url: String,
    pub quantity_in_stock: String,
    pub size: String,
    pub rating: String,
    pub color: String,
    pub discount_percentage: String,
    pub category: String,
    pub on_sale: Option<String>,
    pub is_new_arrival: Option<String>,
    pub is_in_stock: Option<String>,
    pub is_featured: Option<String>,
    pub is_exclusive: Option<String>,
}

fn checkbox(on: bool) -> Option<String> {
    on.then(|| "on".to_string())
}

impl ProductForm {
    /// Form for a new product.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            price: "0".to_string(),
            cost: "0".to_string(),
            quantity_in_stock: "0".to_string(),
            size: DEFAULT_SIZE.to_string(),
            rating: "0".to_string(),
            discount_percentage: "0".to_string(),
            is_in_stock: checkbox(true),
            ..Self::default()
        }
    }

    /// Form prefilled from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.normalize().to_string(),
            cost: product.cost.normalize().to_string(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            quantity_in_stock: product.quantity_in_stock.to_string(),
            size: product.size.clone(),
            rating: product.rating.normalize().to_string(),
            color: product.color.clone(),
            discount_percentage: product.discount_percentage.normalize().to_string(),
            category: product.category_label().to_string(),
            on_sale: checkbox(product.on_sale),
            is_new_arrival: checkbox(product.is_new_arrival),
            is_in_stock: checkbox(product.is_in_stock),
            is_featured: checkbox(product.is_featured),
            is_exclusive: checkbox(product.is_exclusive),
        }
    }

    /// Check the form and build the product it describes.
    ///
    /// # Errors
    ///
    /// Returns the first rule the form breaks.
    pub fn validate(&self, id: ProductId) -> Result<Product, ProductFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ProductFormError::MissingCategory);
        }

        let price = money(&self.price, "Price", true)?;
        let cost = money(&self.cost, "Cost", false)?;
        let quantity_in_stock = quantity(&self.quantity_in_stock)?;

        let rating = amount(&self.rating, "Rating", false)?;
        if rating > MAX_RATING {
            return Err(ProductFormError::OutOfRange {
                field: "Rating",
                min: 0,
                max: 5,
            });
        }
        let discount_percentage = amount(&self.discount_percentage, "Discount", false)?;
        if discount_percentage > Decimal::ONE_HUNDRED {
            return Err(ProductFormError::OutOfRange {
                field: "Discount",
                min: 0,
                max: 100,
            });
        }

        let size = self.size.trim();

        Ok(Product {
            id,
            name: name.to_string(),
            price,
            cost,
            description: self.description.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            quantity_in_stock,
            size: if size.is_empty() {
                DEFAULT_SIZE.to_string()
            } else {
                size.to_string()
            },
            rating,
            color: self.color.trim().to_string(),
            on_sale: self.on_sale.is_some(),
            discount_percentage,
            is_new_arrival: self.is_new_arrival.is_some(),
            category: Some(category.to_string()),
            is_in_stock: self.is_in_stock.is_some(),
            is_featured: self.is_featured.is_some(),
            is_exclusive: self.is_exclusive.is_some(),
        })
    }
}

/// Parse a non-negative decimal. Blank reads as zero unless `required`.
fn amount(input: &str, field: &'static str, required: bool) -> Result<Decimal, ProductFormError> {
    let input = input.trim();
    if input.is_empty() {
        return if required {
            Err(ProductFormError::NotANumber(field))
        } else {
            Ok(Decimal::ZERO)
        };
    }
    let value: Decimal = input
        .parse()
        .map_err(|_| ProductFormError::NotANumber(field))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ProductFormError::Negative(field));
    }
    Ok(value)
}

/// Parse a price-like amount, capped at [`MAX_AMOUNT`].
fn money(input: &str, field: &'static str, required: bool) -> Result<Decimal, ProductFormError> {
    let value = amount(input, field, required)?;
    if value > MAX_AMOUNT {
        return Err(ProductFormError::TooLarge(field));
    }
    Ok(value)
}

fn quantity(input: &str) -> Result<u32, ProductFormError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }
    input.parse().map_err(|_| ProductFormError::InvalidQuantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> ProductForm {
        ProductForm {
            name: " Whey Gold ".to_string(),
            price: "49.99".to_string(),
            cost: "20".to_string(),
            quantity_in_stock: "12".to_string(),
            size: String::new(),
            rating: "4.5".to_string(),
            discount_percentage: "10".to_string(),
            category: "Protein".to_string(),
            on_sale: Some("on".to_string()),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_valid_form_builds_product() {
        let product = filled().validate(ProductId::new("p1")).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.name, "Whey Gold");
        assert_eq!(product.price, Decimal::new(4999, 2));
        assert_eq!(product.quantity_in_stock, 12);
        assert_eq!(product.size, DEFAULT_SIZE);
        assert_eq!(product.category.as_deref(), Some("Protein"));
        assert!(product.on_sale);
        assert!(!product.is_in_stock);
        assert!(!product.is_featured);
    }

    #[test]
    fn test_required_fields() {
        let form = ProductForm {
            name: "  ".to_string(),
            ..filled()
        };
        assert_eq!(
            form.validate(ProductId::new("p1")),
            Err(ProductFormError::MissingName)
        );

        let form = ProductForm {
            category: String::new(),
            ..filled()
        };
        assert_eq!(
            form.validate(ProductId::new("p1")),
            Err(ProductFormError::MissingCategory)
        );

        let form = ProductForm {
            price: String::new(),
            ..filled()
        };
        assert_eq!(
            form.validate(ProductId::new("p1")),
            Err(ProductFormError::NotANumber("Price"))
        );
    }

    #[test]
    fn test_numeric_rules() {
        let cases = [
            (
                ProductForm {
                    price: "-1".to_string(),
                    ..filled()
                },
                ProductFormError::Negative("Price"),
            ),
            (
                ProductForm {
                    cost: "abc".to_string(),
                    ..filled()
                },
                ProductFormError::NotANumber("Cost"),
            ),
            (
                ProductForm {
                    quantity_in_stock: "-3".to_string(),
                    ..filled()
                },
                ProductFormError::InvalidQuantity,
            ),
            (
                ProductForm {
                    quantity_in_stock: "2.5".to_string(),
                    ..filled()
                },
                ProductFormError::InvalidQuantity,
            ),
            (
                ProductForm {
                    price: "100000000000000000000".to_string(),
                    ..filled()
                },
                ProductFormError::TooLarge("Price"),
            ),
            (
                ProductForm {
                    cost: "1000000.01".to_string(),
                    ..filled()
                },
                ProductFormError::TooLarge("Cost"),
            ),
            (
                ProductForm {
                    rating: "5.1".to_string(),
                    ..filled()
                },
                ProductFormError::OutOfRange {
                    field: "Rating",
                    min: 0,
                    max: 5,
                },
            ),
            (
                ProductForm {
                    discount_percentage: "101".to_string(),
                    ..filled()
                },
                ProductFormError::OutOfRange {
                    field: "Discount",
                    min: 0,
                    max: 100,
                },
            ),
        ];

        for (form, expected) in cases {
            assert_eq!(form.validate(ProductId::new("p1")), Err(expected));
        }
    }

    #[test]
    fn test_boundaries_are_accepted() {
        let form = ProductForm {
            rating: "5".to_string(),
            discount_percentage: "100".to_string(),
            price: "0".to_string(),
            ..filled()
        };
        assert!(form.validate(ProductId::new("p1")).is_ok());
    }

    #[test]
    fn test_prefill_round_trips_through_validation() {
        let product = filled().validate(ProductId::new("p1")).unwrap();
        let again = ProductForm::from_product(&product)
            .validate(ProductId::new("p1"))
            .unwrap();
        assert_eq!(again, product);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ProductFormError::OutOfRange {
                field: "Rating",
                min: 0,
                max: 5
            }
            .to_string(),
            "Rating must be between 0 and 5"
        );
        assert_eq!(
            ProductFormError::Negative("Cost").to_string(),
            "Cost cannot be negative"
        );
    }
}
