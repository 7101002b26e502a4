//! Cart view page reader

use anyhow::Result;
use tracing::debug;

use super::config::SelectorConfig;
use super::document::{ParsedDocument, element_value};
use super::normalizer;
use super::selector_chain::SelectorChain;

pub struct CartPageReader {
    quantity_box: SelectorChain,
}

impl CartPageReader {
    pub fn with_config(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            quantity_box: SelectorChain::compile("cart_quantity", &selectors.cart_quantity)?,
        })
    }

    /// Quantity held in the cart, `None` when the box is missing or not numeric
    pub fn quantity(&self, doc: &ParsedDocument) -> Option<u32> {
        let (_, quantity_box) = self.quantity_box.first_present(doc)?;
        let value = element_value(&quantity_box);
        let quantity = normalizer::parse_inventory_token(value.trim());
        debug!("Cart quantity box '{}' -> {:?}", value, quantity);
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(body: &str) -> Option<u32> {
        let doc = ParsedDocument::parse("https://example.com/gp/cart/view.html", body);
        CartPageReader::with_config(&SelectorConfig::default()).unwrap().quantity(&doc)
    }

    #[test]
    fn test_reads_quantity_box() {
        assert_eq!(read(r#"<input type="text" name="quantityBox" value="12">"#), Some(12));
        assert_eq!(read(r#"<input type="text" name="quantityBox" value="1.000">"#), Some(1000));
    }

    #[test]
    fn test_missing_or_blank_box() {
        assert_eq!(read("<p>Your cart is empty</p>"), None);
        assert_eq!(read(r#"<input type="text" name="quantityBox" value="">"#), None);
    }
}
