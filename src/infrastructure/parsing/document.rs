//! Parsed HTML page handle
//!
//! `ParsedDocument` is produced by the page fetcher and is read-only for every
//! downstream component. Besides selector queries it knows how to serialize
//! form controls into name/value pairs the way a browser submits them.

use scraper::{ElementRef, Html, Selector};

/// A fetched page parsed into a queryable DOM
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    url: String,
    html: Html,
}

impl ParsedDocument {
    /// Parse a full HTML document fetched from `url`
    pub fn parse(url: impl Into<String>, body: &str) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(body),
        }
    }

    /// Final URL the document was served from (after redirects)
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whole document serialized back to HTML
    pub fn html(&self) -> String {
        self.html.html()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    pub fn exists(&self, selector: &Selector) -> bool {
        self.select_first(selector).is_some()
    }

    /// Trimmed text of the first match
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.select_first(selector).map(|element| element_text(&element))
    }

    /// Concatenated text of every match, trimmed as a whole
    pub fn joined_text(&self, selector: &Selector) -> String {
        self.select_all(selector)
            .flat_map(|element| element.text())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Value of the first match: the `value` attribute for inputs,
    /// the text content for textareas and other elements
    pub fn value(&self, selector: &Selector) -> Option<String> {
        self.select_first(selector).map(|element| element_value(&element))
    }

    pub fn attr(&self, selector: &Selector, name: &str) -> Option<String> {
        self.select_first(selector)
            .and_then(|element| element.value().attr(name))
            .map(str::to_string)
    }

    /// Inner HTML of `<body>`, `None` when the body is empty
    pub fn body_html(&self) -> Option<String> {
        let body = self.select_first(&BODY)?;
        let inner = body.inner_html();
        if inner.trim().is_empty() { None } else { Some(inner) }
    }

    /// Text of `<body>` with whitespace runs collapsed to single spaces
    pub fn body_text(&self) -> String {
        self.select_first(&BODY)
            .map(|body| {
                let text: String = body.text().collect();
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            })
            .unwrap_or_default()
    }
}

static BODY: once_cell::sync::Lazy<Selector> =
    once_cell::sync::Lazy::new(|| Selector::parse("body").expect("static selector"));

/// Text content of an element, trimmed
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Form value of an element: the `value` attribute for inputs and options,
/// the selected option for selects, the text content otherwise
pub fn element_value(element: &ElementRef<'_>) -> String {
    match element.value().name() {
        "input" | "button" | "option" => element
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_default(),
        "select" => selected_options(element).into_iter().next().unwrap_or_default(),
        _ => element.text().collect(),
    }
}

/// Nearest `<form>` ancestor of an element, or the element itself when it is a form
pub fn enclosing_form<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if element.value().name() == "form" {
        return Some(*element);
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "form")
}

/// Serialize the successful controls of a form (or of a single control)
/// into ordered name/value pairs.
///
/// Disabled controls, controls without a name, buttons and file inputs are
/// skipped; checkboxes and radios only contribute when checked.
pub fn serialize_form(element: &ElementRef<'_>) -> Vec<(String, String)> {
    let controls: Vec<ElementRef<'_>> = if is_form_control(element) {
        vec![*element]
    } else {
        element.select(&FORM_CONTROLS).collect()
    };

    let mut pairs = Vec::new();
    for control in controls {
        let node = control.value();
        let Some(name) = node.attr("name").filter(|name| !name.is_empty()) else {
            continue;
        };
        if node.attr("disabled").is_some() {
            continue;
        }

        match node.name() {
            "input" => {
                let input_type = node.attr("type").unwrap_or("text").to_ascii_lowercase();
                match input_type.as_str() {
                    "submit" | "button" | "image" | "reset" | "file" => continue,
                    "checkbox" | "radio" => {
                        if node.attr("checked").is_some() {
                            let value = node.attr("value").unwrap_or("on");
                            pairs.push((name.to_string(), value.to_string()));
                        }
                    }
                    _ => pairs.push((name.to_string(), node.attr("value").unwrap_or_default().to_string())),
                }
            }
            "select" => {
                for value in selected_options(&control) {
                    pairs.push((name.to_string(), value));
                }
            }
            "textarea" => pairs.push((name.to_string(), control.text().collect())),
            _ => {}
        }
    }
    pairs
}

fn is_form_control(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "input" | "select" | "textarea")
}

fn selected_options(select: &ElementRef<'_>) -> Vec<String> {
    let options: Vec<ElementRef<'_>> = select.select(&OPTIONS).collect();
    let option_value = |option: &ElementRef<'_>| {
        option
            .value()
            .attr("value")
            .map_or_else(|| element_text(option), str::to_string)
    };

    let selected: Vec<String> = options
        .iter()
        .filter(|option| option.value().attr("selected").is_some())
        .map(option_value)
        .collect();

    if !selected.is_empty() || select.value().attr("multiple").is_some() {
        return selected;
    }
    options.first().map(option_value).into_iter().collect()
}

static FORM_CONTROLS: once_cell::sync::Lazy<Selector> =
    once_cell::sync::Lazy::new(|| Selector::parse("input, select, textarea").expect("static selector"));

static OPTIONS: once_cell::sync::Lazy<Selector> =
    once_cell::sync::Lazy::new(|| Selector::parse("option").expect("static selector"));

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    #[test]
    fn test_body_html_empty_document() {
        let doc = ParsedDocument::parse("https://example.com/cart", "");
        assert!(doc.body_html().is_none());

        let doc = ParsedDocument::parse("https://example.com/cart", "<html><body><p>hi</p></body></html>");
        assert_eq!(doc.body_html().as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn test_body_text_collapses_whitespace() {
        let doc = ParsedDocument::parse(
            "https://example.com/cart",
            "<body><p>Subtotal\n   (<b>3</b> items):</p>\n<p>limit of  2</p></body>",
        );
        assert_eq!(doc.body_text(), "Subtotal (3 items): limit of 2");
    }

    #[test]
    fn test_text_and_value_access() {
        let doc = ParsedDocument::parse(
            "https://example.com",
            r#"<body><h1 id="title">  Widget  </h1><input id="ASIN" value="B000123"><span class="a">x</span><span class="a">y</span></body>"#,
        );

        assert_eq!(doc.first_text(&selector("h1#title")).as_deref(), Some("Widget"));
        assert_eq!(doc.value(&selector("input#ASIN")).as_deref(), Some("B000123"));
        assert_eq!(doc.joined_text(&selector(".a")), "xy");
        assert!(doc.value(&selector("#missing")).is_none());
    }

    #[test]
    fn test_attr_and_html_access() {
        let doc = ParsedDocument::parse(
            "https://example.com",
            r#"<body><a id="seller" href="/shops/A1B2C3">Shop</a><a id="bare">Plain</a></body>"#,
        );

        assert_eq!(doc.attr(&selector("a#seller"), "href").as_deref(), Some("/shops/A1B2C3"));
        assert!(doc.attr(&selector("a#bare"), "href").is_none());
        assert!(doc.attr(&selector("#missing"), "href").is_none());

        let html = doc.html();
        assert!(html.starts_with("<html>"));
        assert!(html.contains(r#"<a id="seller" href="/shops/A1B2C3">Shop</a>"#));
    }

    #[test]
    fn test_serialize_form_successful_controls() {
        let doc = ParsedDocument::parse(
            "https://example.com",
            r#"<form id="addToCart" action="/cart/add">
                <input type="hidden" name="ASIN" value="B000123">
                <input type="hidden" name="offerListingID" value="abc">
                <input type="text" name="disabled" value="no" disabled>
                <input type="checkbox" name="gift" value="yes">
                <input type="checkbox" name="prime" checked>
                <input type="submit" name="submit.add-to-cart" value="Add">
                <select name="quantity"><option value="1">1</option><option value="2" selected>2</option></select>
                <textarea name="note">hello</textarea>
            </form>"#,
        );

        let form = doc.select_first(&selector("#addToCart")).unwrap();
        let pairs = serialize_form(&form);

        assert_eq!(
            pairs,
            vec![
                ("ASIN".to_string(), "B000123".to_string()),
                ("offerListingID".to_string(), "abc".to_string()),
                ("prime".to_string(), "on".to_string()),
                ("quantity".to_string(), "2".to_string()),
                ("note".to_string(), "hello".to_string()),
            ]
        );
    }

    #[test]
    fn test_enclosing_form_from_nested_control() {
        let doc = ParsedDocument::parse(
            "https://example.com",
            r#"<form id="f" action="/x"><div><input id="handleBuy" name="a" value="1"></div></form>"#,
        );
        let control = doc.select_first(&selector("#handleBuy")).unwrap();
        let form = enclosing_form(&control).unwrap();
        assert_eq!(form.value().attr("id"), Some("f"));
    }
}
