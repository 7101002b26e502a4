//! Locale-aware text normalization
//!
//! Pure functions for turning noisy, locale-formatted page text into numbers:
//! prices with either decimal convention, rank strings with `#` / `n°`
//! prefixes, and inventory tokens like `(3 items)`.

use super::phrases::ITEM_COUNT_NOUNS;

/// Currency symbols and codes removed before parsing a price.
/// `Â` shows up when a UTF-8 `£`/`€` is decoded as Latin-1.
pub const CURRENCY_MARKERS: &[&str] = &["AED", "EUR", "£", "$", "€", "Â"];

/// Parse a displayed price into a decimal number.
///
/// When both `,` and `.` are present, whichever appears last is the decimal
/// separator and the other one is a thousands separator. When only one kind
/// appears, a single `,` is a decimal comma while repeated separators are
/// grouping marks.
pub fn parse_price(raw: &str) -> Option<f64> {
    let mut text = raw.to_string();
    for marker in CURRENCY_MARKERS {
        text = text.replace(marker, "");
    }
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return None;
    }

    let normalized = normalize_separators(&text);
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn normalize_separators(text: &str) -> String {
    let last_comma = text.rfind(',');
    let last_point = text.rfind('.');

    match (last_comma, last_point) {
        (Some(comma), Some(point)) if comma < point => text.replace(',', ""),
        (Some(_), Some(_)) => text.replace('.', "").replace(',', "."),
        (Some(_), None) if text.matches(',').count() == 1 => text.replace(',', "."),
        (Some(_), None) => text.replace(',', ""),
        (None, Some(_)) if text.matches('.').count() > 1 => text.replace('.', ""),
        _ => text.to_string(),
    }
}

/// Parse a rank string such as `#1,234`, `n°12` or `Nr. 1.234`
pub fn parse_rank(raw: &str) -> Option<u64> {
    let digits = strip_grouping(&raw.to_lowercase().replace("n°", "").replace('#', ""));
    leading_number(&digits)
}

/// Lower-case a rank summary and drop punctuation that breaks number matching
pub fn normalize_rank_text(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace("n°", "");
    let mut normalized = String::with_capacity(lowered.len());
    let chars: Vec<char> = lowered.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            // grouping separators between digits
            '.' | ',' | '\u{a0}' | '\u{202f}' if is_digit_at(&chars, i.wrapping_sub(1)) && is_digit_at(&chars, i + 1) => {}
            '#' | ':' | '.' | ',' => normalized.push(' '),
            c if c.is_whitespace() => normalized.push(' '),
            c => normalized.push(c),
        }
    }

    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an inventory token (`3`, `(3 items)`, `(12 articles)`) into a count
pub fn parse_inventory_token(raw: &str) -> Option<u32> {
    let mut text = raw.replace(['(', ')'], "");
    for noun in ITEM_COUNT_NOUNS {
        text = text.replace(noun, "");
    }
    let text = strip_grouping(text.trim());
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Extract the second component of a comma separated hidden field value (`"x,3"` → 3)
pub fn parse_hidden_confirmation(raw: &str) -> Option<u32> {
    raw.split(',').nth(1).and_then(|part| part.trim().parse().ok())
}

fn strip_grouping(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '.' | ',' | '\u{a0}' | '\u{202f}') && !c.is_whitespace())
        .collect()
}

fn leading_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn is_digit_at(chars: &[char], index: usize) -> bool {
    chars.get(index).is_some_and(char::is_ascii_digit)
}
