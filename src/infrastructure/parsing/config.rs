//! Selector configuration for HTML extraction
//!
//! Centralized CSS selector candidates for every page region the scraper
//! reads. Each list is tried in order, first match wins.

use serde::{Deserialize, Serialize};

fn strings(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| (*s).to_string()).collect()
}

/// CSS selectors for the product, checkout and cart pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Product page
    pub title: Vec<String>,
    pub price: Vec<String>,
    pub availability: Vec<String>,
    pub merchant_id: Vec<String>,
    pub merchant_name: Vec<String>,
    pub asin: Vec<String>,
    pub sales_rank_summary: Vec<String>,
    pub sales_rank_item: Vec<String>,
    pub sales_rank_badge: Vec<String>,
    pub sales_rank_ladder_link: Vec<String>,
    pub details_table: Vec<String>,
    pub details_bullets: Vec<String>,
    pub add_to_cart: Vec<String>,

    /// Checkout page
    pub alert_box: Vec<String>,
    pub confirm_text: Vec<String>,
    pub hidden_inventory: Vec<String>,

    /// Cart view page
    pub cart_quantity: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: strings(&["h1#title", "#productTitle"]),
            price: strings(&[
                "#priceblock_ourprice",
                "#priceblock_saleprice",
                "#priceBlock .priceLarge",
                "#actualPriceContent .priceLarge",
                "#actualPriceValue .priceLarge",
            ]),
            availability: strings(&["#outOfStock", "#availability", ".availRed"]),
            merchant_id: strings(&["#merchantID"]),
            merchant_name: strings(&["#sellerProfileTriggerId"]),
            asin: strings(&["input[id=\"ASIN\"]", "input[name=\"ASIN\"]"]),
            sales_rank_summary: strings(&["#SalesRank"]),
            sales_rank_item: strings(&[".zg_hrsr_item"]),
            sales_rank_badge: strings(&[".zg_hrsr_rank"]),
            sales_rank_ladder_link: strings(&[".zg_hrsr_ladder a"]),
            details_table: strings(&[
                "#prodDetails table",
                "#productDetails_detailBullets_sections1",
                "#productDetails_techSpec_section_1",
                "table.prodDetTable",
            ]),
            details_bullets: strings(&["#detailBullets_feature_div li", "#detailBulletsWrapper_feature_div li"]),
            add_to_cart: strings(&["#addToCart", "#handleBuy"]),
            alert_box: strings(&["#huc-v2-box-warning"]),
            confirm_text: strings(&["#confirm-text"]),
            hidden_inventory: strings(&["#hucArgsNewItems"]),
            cart_quantity: strings(&["input[name=\"quantityBox\"]"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_cart_priority_order() {
        let config = SelectorConfig::default();
        assert_eq!(config.add_to_cart, vec!["#addToCart", "#handleBuy"]);
        assert_eq!(config.price.first().map(String::as_str), Some("#priceblock_ourprice"));
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: SelectorConfig = serde_json::from_str(r##"{"title": ["#custom-title"]}"##).unwrap();
        assert_eq!(config.title, vec!["#custom-title"]);
        assert_eq!(config.add_to_cart, SelectorConfig::default().add_to_cart);
    }
}
