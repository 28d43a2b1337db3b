use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId};

/// Categories offered before the user has saved any of their own.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Dairy",
    "Bakery",
    "Produce",
    "Beverages",
    "Snacks",
    "Canned Goods",
    "Household",
    "Personal Care",
];

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// One stock-keeping unit.
///
/// `category` is a plain name. It usually matches an active category but may
/// point at one that has since been deleted; nothing cascades on delete.
///
/// Serialized with the field names shared by the local cache and the remote
/// `products` table (`expiryDate` as `YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    /// Price per item.
    pub price: f64,
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Product {
    /// Build a product with a freshly generated id.
    pub fn new(draft: ProductDraft) -> DomainResult<Self> {
        draft.into_product(ProductId::new())
    }

    /// Quantity × price for this line.
    pub fn line_value(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }

    /// The editable fields, for pre-filling an edit form.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            category: self.category.clone(),
            quantity: self.quantity,
            price: self.price,
            expiry_date: self.expiry_date,
            notes: self.notes.clone(),
        }
    }

    pub fn with_category(&self, category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..self.clone()
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// User-entered product fields, before an id is assigned.
///
/// This is the data-entry boundary: everything downstream assumes a draft
/// has passed [`ProductDraft::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub price: f64,
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProductDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation(
                "price must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Validate and attach `id`. Names are trimmed; blank notes become `None`.
    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        self.validate()?;
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Product {
            id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            quantity: self.quantity,
            price: self.price,
            expiry_date: self.expiry_date,
            notes,
        })
    }
}

/// Demo stock shown on a first run with nothing stored anywhere.
///
/// Dates are relative to `today` so the set always covers an expired line,
/// one expiring soon and one in good shape. Ids are fixed (`1`..`3`) so a
/// sample row can be edited from a later load.
pub fn sample_products(today: NaiveDate) -> Vec<Product> {
    vec![
        Product {
            id: ProductId::from(1),
            name: "Almond Milk".to_string(),
            category: "Dairy".to_string(),
            quantity: 45,
            price: 240.0,
            expiry_date: today + Duration::days(60),
            notes: None,
        },
        Product {
            id: ProductId::from(2),
            name: "Cheddar Cheese".to_string(),
            category: "Dairy".to_string(),
            quantity: 8,
            price: 480.0,
            expiry_date: today - Duration::days(30),
            notes: None,
        },
        Product {
            id: ProductId::from(3),
            name: "Whole Wheat Bread".to_string(),
            category: "Bakery".to_string(),
            quantity: 15,
            price: 55.0,
            expiry_date: today + Duration::days(5),
            notes: None,
        },
    ]
}
