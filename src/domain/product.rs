//! Product entities produced by the scraping pipeline
//!
//! A `ProductRecord` is assembled stage by stage by the orchestrator and is
//! immutable once returned to the caller.

use serde::{Deserialize, Serialize};

/// Complete product information for one product page lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_url: String,
    pub title: String,
    /// Retailer product identifier; empty when the hidden field was missing
    pub asin: String,
    /// `None` when no price selector matched or the text was not numeric
    pub price: Option<f64>,
    pub is_available: bool,
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub sales_rank: SalesRank,
    /// Category ranks listed in the product details table
    pub categories: Vec<CategoryRank>,
    pub ratings: Option<Ratings>,
    pub created_on: Option<String>,
    /// Remaining inventory, set only after the checkout stage succeeded
    pub inventory_size: Option<u32>,
    /// Quantity shown on the cart view page, when that stage is enabled
    pub cart_quantity: Option<u32>,
}

impl ProductRecord {
    /// Create an empty record for the given product page
    pub fn new(product_url: impl Into<String>) -> Self {
        Self {
            product_url: product_url.into(),
            title: String::new(),
            asin: String::new(),
            price: None,
            is_available: true,
            merchant_id: None,
            merchant_name: None,
            sales_rank: SalesRank::default(),
            categories: Vec::new(),
            ratings: None,
            created_on: None,
            inventory_size: None,
            cart_quantity: None,
        }
    }

    /// Merge the checkout stage result into the record
    pub fn with_inventory(mut self, inventory_size: u32) -> Self {
        self.inventory_size = Some(inventory_size);
        self
    }
}

/// Best-seller ranking data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRank {
    /// Overall rank from the rank summary
    pub main: Option<CategoryRank>,
    /// Per-category rank badges, in page order
    pub secondary: Vec<CategoryRank>,
}

impl SalesRank {
    pub fn is_empty(&self) -> bool {
        self.main.is_none() && self.secondary.is_empty()
    }
}

/// A rank within one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRank {
    pub rank: u64,
    pub category: String,
    pub link: Option<String>,
}

/// Customer rating summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    /// Average score out of 5
    pub score: f32,
    pub total_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults_to_available() {
        let record = ProductRecord::new("https://example.com/dp/B000");
        assert!(record.is_available);
        assert!(record.price.is_none());
        assert!(record.sales_rank.is_empty());
        assert!(record.inventory_size.is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ProductRecord::new("https://example.com/dp/B000").with_inventory(7);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["productUrl"], "https://example.com/dp/B000");
        assert_eq!(json["inventorySize"], 7);
        assert_eq!(json["isAvailable"], true);
        assert!(json["price"].is_null());
    }
}
