//! Product details table extraction
//!
//! The details section is a list of labeled rows whose labels are localized.
//! Each row label is matched against the known variants and the value is
//! parsed with a label-specific rule: rank digits, a fraction of 5, or the
//! raw text for dates.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;

use super::config::SelectorConfig;
use super::document::{ParsedDocument, element_text};
use super::normalizer;
use super::phrases::{self, LISTING_DATE_LABELS, RANK_LABELS, RATING_LABELS};
use super::selector_chain::SelectorChain;
use crate::domain::product::{CategoryRank, Ratings};

/// "N in Category" after rank text normalization
pub static RANK_IN_CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) (?:in|en|dans) ([^\d(]+)").expect("static regex"));

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("static regex"));

static RATING_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?) (?:out of|sur|de) 5").expect("static regex"));

static RATING_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d[\d.,\x{a0}\x{202f} ]*) (?:ratings|rating|customer reviews|évaluations|évaluation|commentaires|valoraciones)")
        .expect("static regex")
});

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static LABEL_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").expect("static selector"));
static VALUE_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Metadata collected from the details section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsMetadata {
    pub category_ranks: Vec<CategoryRank>,
    pub ratings: Option<Ratings>,
    pub created_on: Option<String>,
}

pub struct DetailsTableParser {
    tables: SelectorChain,
    bullets: SelectorChain,
}

impl DetailsTableParser {
    pub fn with_config(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            tables: SelectorChain::compile("details_table", &selectors.details_table)?,
            bullets: SelectorChain::compile("details_bullets", &selectors.details_bullets)?,
        })
    }

    pub fn parse(&self, doc: &ParsedDocument) -> DetailsMetadata {
        let mut metadata = DetailsMetadata::default();

        for table in self.tables.all_matches(doc) {
            for row in table.select(&ROW) {
                let Some(label_cell) = row.select(&LABEL_CELL).next() else {
                    continue;
                };
                let Some(value_cell) = row.select(&VALUE_CELL).filter(|cell| cell.id() != label_cell.id()).last() else {
                    continue;
                };
                let value_text = element_text(&value_cell);
                Self::apply_row(&element_text(&label_cell), &value_cell, &value_text, &mut metadata);
            }
        }

        // Bullet layout: "Label : value" inside one list item
        for item in self.bullets.all_matches(doc) {
            let text = element_text(&item);
            if let Some((label, value_text)) = text.split_once(':') {
                Self::apply_row(label, &item, value_text, &mut metadata);
            }
        }

        debug!(
            "Details table: {} category ranks, ratings={}, created_on={}",
            metadata.category_ranks.len(),
            metadata.ratings.is_some(),
            metadata.created_on.is_some()
        );
        metadata
    }

    fn apply_row(raw_label: &str, value: &ElementRef<'_>, value_text: &str, metadata: &mut DetailsMetadata) {
        let label = clean_label(raw_label);
        // Values wrap across lines in the markup
        let value_text = clean_label(value_text);

        if phrases::label_matches(&label, RANK_LABELS) {
            if metadata.category_ranks.is_empty() {
                metadata.category_ranks = parse_category_ranks(value);
            }
        } else if phrases::label_matches(&label, RATING_LABELS) {
            if metadata.ratings.is_none() {
                metadata.ratings = parse_ratings(&value_text);
            }
        } else if phrases::label_matches(&label, LISTING_DATE_LABELS)
            && metadata.created_on.is_none()
            && !value_text.is_empty()
        {
            metadata.created_on = Some(value_text);
        }
    }
}

/// Every "N in Category" pair of an element, ignoring "(See Top 100 in …)" asides
pub fn parse_category_ranks(element: &ElementRef<'_>) -> Vec<CategoryRank> {
    let raw = element_text(element);
    let without_asides = PARENTHETICAL.replace_all(&raw, " ");
    let normalized = normalizer::normalize_rank_text(&without_asides);

    RANK_IN_CATEGORY
        .captures_iter(&normalized)
        .filter_map(|captures| {
            let rank = captures[1].parse().ok()?;
            let category = captures[2].trim().to_string();
            let link = link_for(element, &category);
            Some(CategoryRank { rank, category, link })
        })
        .collect()
}

/// Parse "4.5 out of 5 stars 1,234 ratings"
pub fn parse_ratings(text: &str) -> Option<Ratings> {
    let score_text = RATING_SCORE.captures(text)?.get(1)?.as_str();
    let score = normalizer::parse_price(score_text)? as f32;
    let total_count = RATING_COUNT
        .captures(text)
        .and_then(|captures| {
            let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .unwrap_or(0);

    Some(Ratings { score, total_count })
}

/// `href` of the link inside `element` whose text is the given category
pub fn link_for(element: &ElementRef<'_>, category: &str) -> Option<String> {
    element
        .select(&LINK)
        .find(|link| normalizer::normalize_rank_text(&element_text(link)) == category)
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
}

fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\u{200e}' | '\u{200f}'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
