//! Search, category filter and sort for the product table.

use core::cmp::{Ordering, Reverse};
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use stockroom_core::DomainError;

use crate::model::Product;

/// Category filter; the string `"All"` selects every category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub const ALL: &'static str = "All";

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => product.category == *name,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == Self::ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "quantity")]
    Quantity,
    #[default]
    #[serde(rename = "expiryDate")]
    ExpiryDate,
    #[serde(rename = "price")]
    Price,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Quantity => "quantity",
            SortField::ExpiryDate => "expiryDate",
            SortField::Price => "price",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
            SortField::ExpiryDate => a.expiry_date.cmp(&b.expiry_date),
            SortField::Price => a.price.total_cmp(&b.price),
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "quantity" => Ok(SortField::Quantity),
            "expiryDate" | "expiry" => Ok(SortField::ExpiryDate),
            "price" => Ok(SortField::Price),
            other => Err(DomainError::validation(format!("unknown sort field '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Current sort of the product table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    /// Header click: the active column flips direction, another column starts ascending.
    pub fn click(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                order: self.order.toggled(),
            }
        } else {
            Self {
                field,
                order: SortOrder::Asc,
            }
        }
    }
}

/// Filter by name substring (case-insensitive) and category, then sort.
///
/// The sort is stable, so equal keys keep their input order in both directions.
pub fn filter_and_sort(
    products: &[Product],
    search_term: &str,
    category_filter: &CategoryFilter,
    sort_field: SortField,
    sort_order: SortOrder,
) -> Vec<Product> {
    let needle = search_term.to_lowercase();
    let mut rows: Vec<Product> = products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle) && category_filter.matches(p))
        .cloned()
        .collect();

    // Lowercased names are computed once per row rather than per comparison.
    match (sort_field, sort_order) {
        (SortField::Name, SortOrder::Asc) => rows.sort_by_cached_key(|p| p.name.to_lowercase()),
        (SortField::Name, SortOrder::Desc) => {
            rows.sort_by_cached_key(|p| Reverse(p.name.to_lowercase()))
        }
        (_, SortOrder::Asc) => rows.sort_by(|a, b| sort_field.compare(a, b)),
        (_, SortOrder::Desc) => rows.sort_by(|a, b| sort_field.compare(a, b).reverse()),
    }
    rows
}
