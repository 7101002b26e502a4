//! Multi-locale phrase families
//!
//! The retailer's copy differs per marketplace (English, French, Spanish)
//! and per page experiment. Each family below keeps its locale variants as
//! data; [`PhraseFamily`] compiles them into one alternation pattern.

use regex::Regex;

/// "Out of stock" wording shown in availability indicators
pub const UNAVAILABLE: &[&str] = &[
    "Actuellement indisponible",
    "No disponible",
    "Unavailable",
    "Currently unavailable",
];

/// Checkout interstitials asking the shopper to confirm before continuing
pub const CONFIRMATION_PROMPTS: &[&str] = &[
    "Veuillez confirmer que",
    "Confirma que quieres",
    "Please confirm",
    "faut que nous nous assurions que vous",
];

/// Cart update notices that mean the add-to-cart request did not go through
pub const UPDATE_FAILED: &[&str] = &["Votre mise à jour a"];

/// Words right before the count in "only N available" alerts
pub const AVAILABLE_COUNT_PREFIXES: &[&str] = &["de los", "a que", "than the"];

/// Words right after the count in "only N available" alerts
pub const AVAILABLE_COUNT_SUFFIXES: &[&str] = &["disponibles", "de disponible", "available"];

/// Words right before the count in purchase limit alerts
pub const LIMIT_PREFIXES: &[&str] = &["limite de vente de", "limit of"];

/// Words right after the count in purchase limit alerts
pub const LIMIT_SUFFIXES: &[&str] = &["articles", "per customer"];

/// Nouns closing a "(N items)" cart count, plurals before their singular
pub const ITEM_COUNT_NOUNS: &[&str] = &["articles", "article", "productos", "producto", "items", "item"];

/// Labels of the best sellers rank row in the product details table
pub const RANK_LABELS: &[&str] = &[
    "best sellers rank",
    "amazon best sellers rank",
    "classement des meilleures ventes d'amazon",
    "classement des meilleures ventes",
];

/// Labels of the customer reviews row in the product details table
pub const RATING_LABELS: &[&str] = &[
    "customer reviews",
    "average customer review",
    "commentaires client",
    "moyenne des commentaires client",
];

/// Labels of the listing date row in the product details table
pub const LISTING_DATE_LABELS: &[&str] = &[
    "date first available",
    "date de mise en ligne sur amazon.fr",
    "date de mise en ligne",
];

/// A set of literal locale variants matched as a single pattern
#[derive(Debug, Clone)]
pub struct PhraseFamily {
    name: &'static str,
    pattern: Regex,
}

impl PhraseFamily {
    pub fn new(name: &'static str, variants: &[&str]) -> Self {
        Self {
            name,
            pattern: Regex::new(&alternation(variants)).expect("escaped literals form a valid pattern"),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Pattern capturing the number between one of `prefixes` and one of `suffixes`
pub fn count_between(prefixes: &[&str], suffixes: &[&str]) -> Regex {
    Regex::new(&format!("{} ([0-9]+) {}", alternation(prefixes), alternation(suffixes)))
        .expect("escaped literals form a valid pattern")
}

/// Pattern capturing a parenthetical count such as `(3 items)`
pub fn parenthetical_count(nouns: &[&str]) -> Regex {
    Regex::new(&format!(r"\(([^)]+ {})\)", alternation(nouns))).expect("escaped literals form a valid pattern")
}

/// Whether a details table label matches one of the known variants
pub fn label_matches(label: &str, variants: &[&str]) -> bool {
    let label = label.trim().trim_end_matches(':').trim().to_lowercase();
    variants.iter().any(|variant| label == *variant)
}

fn alternation(variants: &[&str]) -> String {
    let escaped: Vec<String> = variants.iter().map(|variant| regex::escape(variant)).collect();
    format!("(?:{})", escaped.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_family_matches_any_locale() {
        let family = PhraseFamily::new("confirmation", CONFIRMATION_PROMPTS);
        assert_eq!(family.name(), "confirmation");
        assert!(family.is_match("<p>Please confirm that you want to continue</p>"));
        assert!(family.is_match("Veuillez confirmer que vous souhaitez"));
        assert!(family.is_match("Confirma que quieres continuar"));
        assert!(!family.is_match("Added to cart"));
    }

    #[test]
    fn test_count_between_captures_number() {
        let available = count_between(AVAILABLE_COUNT_PREFIXES, AVAILABLE_COUNT_SUFFIXES);
        let captures = available.captures("You requested more than the 5 available").unwrap();
        assert_eq!(&captures[1], "5");

        let limit = count_between(LIMIT_PREFIXES, LIMIT_SUFFIXES);
        let captures = limit.captures("This seller has a limit of 2 per customer").unwrap();
        assert_eq!(&captures[1], "2");
        assert!(limit.is_match("une limite de vente de 3 articles"));
    }

    #[test]
    fn test_parenthetical_count() {
        let pattern = parenthetical_count(ITEM_COUNT_NOUNS);
        let found = pattern.find("Subtotal (3 items): $30").unwrap();
        assert_eq!(found.as_str(), "(3 items)");
        assert!(pattern.find("Subtotal (3): $30").is_none());
    }

    #[test]
    fn test_label_matches_is_case_insensitive() {
        assert!(label_matches("  Best Sellers Rank : ", RANK_LABELS));
        assert!(label_matches("Date First Available", LISTING_DATE_LABELS));
        assert!(!label_matches("Item Weight", RANK_LABELS));
    }
}
