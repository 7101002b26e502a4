//! Add-to-cart form discovery
//!
//! Finds the add-to-cart control on a product page, serializes its form and
//! resolves where the form must be posted. The submission URL always ends up
//! absolute, https, and on the product page's host.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{debug, info, warn};
use url::Url;

use super::config::SelectorConfig;
use super::document::{ParsedDocument, enclosing_form, serialize_form};
use super::selector_chain::SelectorChain;

/// Name of the quantity field injected into every cart submission
pub const QUANTITY_FIELD: &str = "quantity";

/// Where and what to post to add the product to the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartFormDescriptor {
    pub url: String,
    pub fields: BTreeMap<String, String>,
}

pub struct CartFormBuilder {
    add_to_cart: SelectorChain,
    default_quantity: u32,
}

impl CartFormBuilder {
    pub fn with_config(selectors: &SelectorConfig, default_quantity: u32) -> Result<Self> {
        Ok(Self {
            add_to_cart: SelectorChain::compile("add_to_cart", &selectors.add_to_cart)?,
            default_quantity,
        })
    }

    /// Build the cart submission for a product page.
    ///
    /// Returns `None` when no add-to-cart control is present, which means the
    /// product cannot be put in the cart at all.
    pub fn build(&self, doc: &ParsedDocument, product_url: &Url) -> Option<CartFormDescriptor> {
        let (source, control) = self.add_to_cart.first_present(doc)?;
        let form = enclosing_form(&control).unwrap_or(control);

        let mut fields: BTreeMap<String, String> = serialize_form(&form).into_iter().collect();
        fields.insert(QUANTITY_FIELD.to_string(), self.default_quantity.to_string());

        let action = form
            .value()
            .attr("action")
            .map(str::trim)
            .filter(|action| !action.is_empty());
        let Some(url) = resolve_submission_url(product_url, action) else {
            warn!("Cannot resolve add-to-cart action {:?} against {}", action, product_url);
            return None;
        };

        info!("Add-to-cart form found via '{}' posting {} fields to {}", source, fields.len(), url);
        Some(CartFormDescriptor { url, fields })
    }
}

/// `https://<host>[:port]` of the product page
pub fn canonical_origin(product_url: &Url) -> Option<String> {
    let host = product_url.host_str()?;
    Some(match product_url.port() {
        Some(port) => format!("https://{host}:{port}"),
        None => format!("https://{host}"),
    })
}

/// Resolve a form action into an absolute https URL on the product host.
///
/// An absolute https action on the product host is returned unchanged.
/// Anything else keeps its path and query and is re-homed onto the
/// canonical origin. A missing action posts back to the product page.
pub fn resolve_submission_url(product_url: &Url, action: Option<&str>) -> Option<String> {
    let origin = canonical_origin(product_url)?;
    let host = product_url.host_str()?;

    let Some(action) = action else {
        return Some(rehome(&origin, product_url));
    };

    if let Ok(absolute) = Url::parse(action)
        && absolute.scheme() == "https"
        && absolute.host_str() == Some(host)
        && absolute.port() == product_url.port()
    {
        return Some(action.to_string());
    }

    // Leading same-host prefix with a non-https scheme or stray slashes
    let relative = action
        .strip_prefix(&format!("https://{host}"))
        .or_else(|| action.strip_prefix(&format!("http://{host}")))
        .unwrap_or(action);

    let target = product_url.join(relative).ok()?;
    debug!("Form action '{}' resolved to {}", action, target);
    Some(rehome(&origin, &target))
}

fn rehome(origin: &str, target: &Url) -> String {
    match target.query() {
        Some(query) => format!("{origin}{}?{query}", target.path()),
        None => format!("{origin}{}", target.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn product_url() -> Url {
        Url::parse("https://example.com/dp/B000123?th=1").unwrap()
    }

    fn builder() -> CartFormBuilder {
        CartFormBuilder::with_config(&SelectorConfig::default(), 999).unwrap()
    }

    #[rstest]
    #[case(Some("/gp/product/handle-buy-box"), "https://example.com/gp/product/handle-buy-box")]
    #[case(Some("/cart/add?ref=dp"), "https://example.com/cart/add?ref=dp")]
    #[case(Some("https://example.com/gp/add"), "https://example.com/gp/add")]
    #[case(Some("http://example.com/gp/add"), "https://example.com/gp/add")]
    #[case(Some("https://other.example.net/gp/add?x=1"), "https://example.com/gp/add?x=1")]
    #[case(Some("handle-buy-box"), "https://example.com/dp/handle-buy-box")]
    #[case(None, "https://example.com/dp/B000123?th=1")]
    fn test_resolve_submission_url(#[case] action: Option<&str>, #[case] expected: &str) {
        assert_eq!(resolve_submission_url(&product_url(), action).as_deref(), Some(expected));
    }

    #[test]
    fn test_http_product_url_resolves_to_https() {
        let product = Url::parse("http://shop.example.com:8443/dp/X").unwrap();
        assert_eq!(
            resolve_submission_url(&product, Some("/cart")).as_deref(),
            Some("https://shop.example.com:8443/cart")
        );
    }

    #[test]
    fn test_build_serializes_form_and_sets_quantity() {
        let doc = ParsedDocument::parse(
            "https://example.com/dp/B000123",
            r#"<form id="addToCart" method="post" action="/gp/product/handle-buy-box">
                <input type="hidden" name="ASIN" value="B000123">
                <input type="hidden" name="offerListingID" value="olid">
                <select name="quantity"><option value="1" selected>1</option></select>
                <input type="submit" name="submit.add-to-cart" value="Add to Cart">
            </form>"#,
        );

        let descriptor = builder().build(&doc, &product_url()).unwrap();

        assert_eq!(descriptor.url, "https://example.com/gp/product/handle-buy-box");
        assert_eq!(descriptor.fields.get("ASIN").map(String::as_str), Some("B000123"));
        assert_eq!(descriptor.fields.get("offerListingID").map(String::as_str), Some("olid"));
        assert_eq!(descriptor.fields.get(QUANTITY_FIELD).map(String::as_str), Some("999"));
        assert!(!descriptor.fields.contains_key("submit.add-to-cart"));
    }

    #[test]
    fn test_build_falls_back_to_second_control() {
        let doc = ParsedDocument::parse(
            "https://example.com/dp/B000123",
            r#"<form action="https://example.com/gp/buy"><div id="handleBuy"><input name="ASIN" value="B0"></div></form>"#,
        );

        let descriptor = builder().build(&doc, &product_url()).unwrap();
        assert_eq!(descriptor.url, "https://example.com/gp/buy");
        assert_eq!(descriptor.fields.len(), 2);
    }

    #[test]
    fn test_build_without_control_is_none() {
        let doc = ParsedDocument::parse("https://example.com/dp/B000123", "<p>Sold by third parties</p>");
        assert!(builder().build(&doc, &product_url()).is_none());
    }
}
