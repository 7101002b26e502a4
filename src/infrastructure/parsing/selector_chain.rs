//! Ordered selector candidates, evaluated first-match-wins
//!
//! Layout and locale variants of the same page region are listed in
//! priority order. The first candidate with at least one matching element
//! wins; later candidates are never consulted, even when the winner's text
//! turns out to be empty.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use super::document::ParsedDocument;

#[derive(Debug, Clone)]
pub struct SelectorChain {
    field: &'static str,
    candidates: Vec<(String, Selector)>,
}

impl SelectorChain {
    /// Compile selector strings for `field`.
    ///
    /// Invalid selectors are skipped with a warning; the chain fails only
    /// when none of the candidates compiles.
    pub fn compile(field: &'static str, selector_strings: &[String]) -> Result<Self> {
        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => candidates.push((selector_str.clone(), selector)),
                Err(e) => {
                    warn!("Failed to compile {} selector '{}': {}", field, selector_str, e);
                    errors.push(format!("'{selector_str}': {e}"));
                }
            }
        }

        if candidates.is_empty() {
            return Err(anyhow!(
                "No valid {} selectors compiled from {} candidates. Errors: {}",
                field,
                selector_strings.len(),
                errors.join(", ")
            ));
        }

        Ok(Self { field, candidates })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// First candidate that matches anything in the document
    pub fn first_present<'a>(&'a self, doc: &'a ParsedDocument) -> Option<(&'a str, ElementRef<'a>)> {
        for (source, selector) in &self.candidates {
            if let Some(element) = doc.select_first(selector) {
                debug!("{} matched selector '{}'", self.field, source);
                return Some((source.as_str(), element));
            }
        }
        debug!("{} not found using {} selectors", self.field, self.candidates.len());
        None
    }

    /// First candidate match inside `scope`
    pub fn first_in<'a>(&self, scope: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.candidates
            .iter()
            .find_map(|(_, selector)| scope.select(selector).next())
    }

    /// Every match inside `scope` of the first candidate that matches there
    pub fn all_in<'a>(&self, scope: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.candidates
            .iter()
            .map(|(_, selector)| scope.select(selector).collect::<Vec<_>>())
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    /// Every element matched by any candidate, in candidate order
    pub fn all_matches<'a>(&'a self, doc: &'a ParsedDocument) -> Vec<ElementRef<'a>> {
        self.candidates
            .iter()
            .flat_map(|(_, selector)| doc.select_all(selector))
            .collect()
    }

    /// Whether any candidate matches
    pub fn is_present(&self, doc: &ParsedDocument) -> bool {
        self.candidates.iter().any(|(_, selector)| doc.exists(selector))
    }
}
