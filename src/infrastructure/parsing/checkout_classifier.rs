//! Checkout page inventory classification
//!
//! After the add-to-cart POST the retailer answers with a page whose copy
//! varies per locale and per experiment. The checks run most specific
//! first, and the first decisive one ends classification:
//!
//! 1. no body                        -> `NoHtmlBody`
//! 2. confirmation prompt            -> `ConfirmationError`
//! 3. cart update failure notice     -> `RequestFailed`
//! 4. alert box ("N available" / purchase limit), confirm text, or a
//!    generic "(N items)" count provides the inventory token
//! 5. no token                       -> `NoInventory`
//! 6. token vs hidden confirmation   -> `IncorrectInventory` on mismatch

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use super::config::SelectorConfig;
use super::document::{ParsedDocument, element_text, element_value};
use super::normalizer;
use super::phrases::{
    self, AVAILABLE_COUNT_PREFIXES, AVAILABLE_COUNT_SUFFIXES, CONFIRMATION_PROMPTS, ITEM_COUNT_NOUNS,
    LIMIT_PREFIXES, LIMIT_SUFFIXES, PhraseFamily, UPDATE_FAILED,
};
use super::selector_chain::SelectorChain;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

pub struct CheckoutClassifier {
    confirmation: PhraseFamily,
    update_failed: PhraseFamily,
    available_count: Regex,
    purchase_limit: Regex,
    item_count: Regex,
    alert_box: SelectorChain,
    confirm_text: SelectorChain,
    hidden_inventory: SelectorChain,
}

impl CheckoutClassifier {
    pub fn new() -> Result<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    pub fn with_config(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            confirmation: PhraseFamily::new("confirmation", CONFIRMATION_PROMPTS),
            update_failed: PhraseFamily::new("update_failed", UPDATE_FAILED),
            available_count: phrases::count_between(AVAILABLE_COUNT_PREFIXES, AVAILABLE_COUNT_SUFFIXES),
            purchase_limit: phrases::count_between(LIMIT_PREFIXES, LIMIT_SUFFIXES),
            item_count: phrases::parenthetical_count(ITEM_COUNT_NOUNS),
            alert_box: SelectorChain::compile("alert_box", &selectors.alert_box)?,
            confirm_text: SelectorChain::compile("confirm_text", &selectors.confirm_text)?,
            hidden_inventory: SelectorChain::compile("hidden_inventory", &selectors.hidden_inventory)?,
        })
    }

    /// Remaining inventory shown on the checkout page, or the classified failure
    pub fn classify(&self, doc: &ParsedDocument) -> ScrapeResult<u32> {
        if doc.body_html().is_none() {
            warn!("Checkout page {} has no body", doc.url());
            return Err(ScrapeError::NoHtmlBody);
        }
        let body = doc.body_text();

        if self.confirmation.is_match(&body) {
            info!("Checkout page asks for a confirmation");
            return Err(ScrapeError::ConfirmationError);
        }
        if self.update_failed.is_match(&body) {
            warn!("Checkout page reports a failed cart update");
            return Err(ScrapeError::request_failed(doc.url(), "cart update failed"));
        }

        let Some(token) = self.inventory_token(doc, &body)? else {
            info!("No inventory signal on checkout page");
            return Err(ScrapeError::NoInventory);
        };

        let visible = normalizer::parse_inventory_token(&token);
        let hidden = self
            .hidden_inventory
            .first_present(doc)
            .and_then(|(_, element)| normalizer::parse_hidden_confirmation(&element_value(&element)));

        match (visible, hidden) {
            (Some(count), Some(confirmed)) if count == confirmed => {
                info!("Checkout inventory confirmed: {}", count);
                Ok(count)
            }
            _ => {
                warn!("Inventory token '{}' parsed as {:?}, hidden confirmation {:?}", token, visible, hidden);
                Err(ScrapeError::IncorrectInventory { visible, hidden })
            }
        }
    }

    /// The raw inventory token, from the most specific region that has one
    fn inventory_token(&self, doc: &ParsedDocument, body: &str) -> ScrapeResult<Option<String>> {
        if self.alert_box.is_present(doc) {
            if let Some(captures) = self.available_count.captures(body) {
                debug!("Inventory from alert box count");
                return Ok(Some(captures[1].to_string()));
            }
            if let Some(captures) = self.purchase_limit.captures(body) {
                let limit = captures[1].parse().unwrap_or(u32::MAX);
                info!("Purchase limited to {} per customer", limit);
                return Err(ScrapeError::LimitInventory { limit });
            }
            debug!("Alert box without a count or limit");
            return Ok(None);
        }

        if let Some((_, element)) = self.confirm_text.first_present(doc) {
            debug!("Inventory from confirm text");
            return Ok(Some(element_text(&element)).filter(|text| !text.is_empty()));
        }

        Ok(self.item_count.captures(body).map(|captures| {
            debug!("Inventory from item count '{}'", &captures[0]);
            captures[1].to_string()
        }))
    }
}
