//! Product page field extraction
//!
//! Every field is read independently from the product page document. A
//! missing field never fails the page: it becomes an empty string, `None`,
//! or the documented default in the returned [`ProductRecord`].

use anyhow::Result;
use tracing::debug;

use super::config::SelectorConfig;
use super::details_table::{DetailsTableParser, link_for, parse_category_ranks};
use super::document::{ParsedDocument, element_text, element_value};
use super::normalizer;
use super::phrases::{PhraseFamily, UNAVAILABLE};
use super::selector_chain::SelectorChain;
use crate::domain::product::{CategoryRank, ProductRecord, SalesRank};

/// Field extractors for the product page
pub struct ProductPageParser {
    title: SelectorChain,
    price: SelectorChain,
    availability: SelectorChain,
    merchant_id: SelectorChain,
    merchant_name: SelectorChain,
    asin: SelectorChain,
    sales_rank_summary: SelectorChain,
    sales_rank_item: SelectorChain,
    sales_rank_badge: SelectorChain,
    sales_rank_ladder_link: SelectorChain,
    unavailable: PhraseFamily,
    details: DetailsTableParser,
}

impl ProductPageParser {
    pub fn new() -> Result<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    pub fn with_config(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            title: SelectorChain::compile("title", &selectors.title)?,
            price: SelectorChain::compile("price", &selectors.price)?,
            availability: SelectorChain::compile("availability", &selectors.availability)?,
            merchant_id: SelectorChain::compile("merchant_id", &selectors.merchant_id)?,
            merchant_name: SelectorChain::compile("merchant_name", &selectors.merchant_name)?,
            asin: SelectorChain::compile("asin", &selectors.asin)?,
            sales_rank_summary: SelectorChain::compile("sales_rank_summary", &selectors.sales_rank_summary)?,
            sales_rank_item: SelectorChain::compile("sales_rank_item", &selectors.sales_rank_item)?,
            sales_rank_badge: SelectorChain::compile("sales_rank_badge", &selectors.sales_rank_badge)?,
            sales_rank_ladder_link: SelectorChain::compile(
                "sales_rank_ladder_link",
                &selectors.sales_rank_ladder_link,
            )?,
            unavailable: PhraseFamily::new("unavailable", UNAVAILABLE),
            details: DetailsTableParser::with_config(selectors)?,
        })
    }

    /// Extract every product field from the product page
    pub fn parse(&self, doc: &ParsedDocument, product_url: &str) -> ProductRecord {
        let details = self.details.parse(doc);

        let mut sales_rank = SalesRank {
            main: self.extract_main_rank(doc),
            secondary: self.extract_secondary_ranks(doc),
        };
        // The details row stands in only on pages without a rank summary
        if !self.sales_rank_summary.is_present(doc) {
            sales_rank.main = details.category_ranks.first().cloned();
        }

        let record = ProductRecord {
            title: self.extract_title(doc),
            asin: self.extract_asin(doc),
            price: self.extract_price(doc),
            is_available: self.extract_availability(doc),
            merchant_id: self.extract_merchant_id(doc),
            merchant_name: self.extract_merchant_name(doc),
            sales_rank,
            categories: details.category_ranks,
            ratings: details.ratings,
            created_on: details.created_on,
            ..ProductRecord::new(product_url)
        };

        debug!(
            "Extracted product '{}' (asin={}, price={:?}, available={})",
            record.title, record.asin, record.price, record.is_available
        );
        record
    }

    pub fn extract_title(&self, doc: &ParsedDocument) -> String {
        self.title
            .first_present(doc)
            .map(|(_, element)| element_text(&element))
            .unwrap_or_default()
    }

    /// The first present price selector decides, even when its text is empty
    pub fn extract_price(&self, doc: &ParsedDocument) -> Option<f64> {
        let (_, element) = self.price.first_present(doc)?;
        let text = element_text(&element);
        let price = normalizer::parse_price(&text);
        if price.is_none() {
            debug!("Price text '{}' is not numeric", text);
        }
        price
    }

    /// Available unless an indicator shows one of the out-of-stock phrases
    pub fn extract_availability(&self, doc: &ParsedDocument) -> bool {
        let indicator_text: String = self
            .availability
            .all_matches(doc)
            .iter()
            .flat_map(|element| element.text())
            .collect();
        !self.unavailable.is_match(&indicator_text)
    }

    pub fn extract_merchant_id(&self, doc: &ParsedDocument) -> Option<String> {
        self.merchant_id
            .first_present(doc)
            .map(|(_, element)| element_value(&element).trim().to_string())
            .filter(|id| !id.is_empty())
    }

    pub fn extract_merchant_name(&self, doc: &ParsedDocument) -> Option<String> {
        self.merchant_name
            .first_present(doc)
            .map(|(_, element)| element_text(&element))
            .filter(|name| !name.is_empty())
    }

    pub fn extract_asin(&self, doc: &ParsedDocument) -> String {
        self.asin
            .first_present(doc)
            .map(|(_, element)| element_value(&element).trim().to_string())
            .unwrap_or_default()
    }

    /// Rank parsed from the rank summary; `None` when the text has no "N in Category"
    fn extract_main_rank(&self, doc: &ParsedDocument) -> Option<CategoryRank> {
        let (_, summary) = self.sales_rank_summary.first_present(doc)?;
        let main = parse_category_ranks(&summary).into_iter().next();
        if main.is_none() {
            debug!("Sales rank summary present but no rank matched");
        }
        main
    }

    fn extract_secondary_ranks(&self, doc: &ParsedDocument) -> Vec<CategoryRank> {
        let items = self.sales_rank_item.all_matches(doc);

        if items.is_empty() {
            // Bare badges without the surrounding item markup
            return self
                .sales_rank_badge
                .all_matches(doc)
                .iter()
                .filter_map(|badge| normalizer::parse_rank(&element_text(badge)))
                .map(|rank| CategoryRank {
                    rank,
                    category: String::new(),
                    link: None,
                })
                .collect();
        }

        items
            .iter()
            .filter_map(|item| {
                let badge = self.sales_rank_badge.first_in(item)?;
                let rank = normalizer::parse_rank(&element_text(&badge))?;

                // The ladder lists parent categories first; the last link is the ranked one
                let leaf = self.sales_rank_ladder_link.all_in(item).into_iter().last();
                let category = leaf
                    .map(|link| normalizer::normalize_rank_text(&element_text(&link)))
                    .unwrap_or_default();
                let link = if category.is_empty() {
                    None
                } else {
                    link_for(item, &category)
                };

                Some(CategoryRank { rank, category, link })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PRODUCT_URL: &str = "https://www.example.com/dp/B000123";

    fn parse(body: &str) -> ProductRecord {
        let doc = ParsedDocument::parse(PRODUCT_URL, body);
        ProductPageParser::new().unwrap().parse(&doc, PRODUCT_URL)
    }

    const FULL_PAGE: &str = r#"<html><body>
        <h1 id="title"> Wooden Puzzle Box </h1>
        <span id="priceblock_ourprice">1.234,56 €</span>
        <div id="availability"><span>En stock.</span></div>
        <input type="hidden" id="merchantID" value="A1B2C3">
        <a id="sellerProfileTriggerId">Puzzle Shop</a>
        <input type="hidden" id="ASIN" name="ASIN" value="B000123">
        <li id="SalesRank">
            <b>Amazon Best Sellers Rank:</b> #1,234 in <a href="/gp/bestsellers/toys">Toys &amp; Games</a> (See Top 100)
            <ul>
                <li class="zg_hrsr_item">
                    <span class="zg_hrsr_rank">#5</span>
                    <span class="zg_hrsr_ladder">in <a href="/gp/bestsellers/toys">Toys &amp; Games</a> &gt; <a href="/gp/bestsellers/toys/puzzles">Puzzles</a></span>
                </li>
                <li class="zg_hrsr_item">
                    <span class="zg_hrsr_rank">#17</span>
                    <span class="zg_hrsr_ladder">in <a href="/gp/bestsellers/toys/brain">Brain Teasers</a></span>
                </li>
            </ul>
        </li>
        <form id="addToCart" action="/gp/product/handle-buy-box"></form>
    </body></html>"#;

    #[test]
    fn test_full_product_page() {
        let record = parse(FULL_PAGE);

        assert_eq!(record.product_url, PRODUCT_URL);
        assert_eq!(record.title, "Wooden Puzzle Box");
        assert_eq!(record.price, Some(1234.56));
        assert!(record.is_available);
        assert_eq!(record.merchant_id.as_deref(), Some("A1B2C3"));
        assert_eq!(record.merchant_name.as_deref(), Some("Puzzle Shop"));
        assert_eq!(record.asin, "B000123");
        assert!(record.inventory_size.is_none());

        let main = record.sales_rank.main.unwrap();
        assert_eq!(main.rank, 1234);
        assert_eq!(main.category, "toys & games");
        assert_eq!(main.link.as_deref(), Some("/gp/bestsellers/toys"));

        assert_eq!(
            record.sales_rank.secondary,
            vec![
                CategoryRank {
                    rank: 5,
                    category: "puzzles".to_string(),
                    link: Some("/gp/bestsellers/toys/puzzles".to_string()),
                },
                CategoryRank {
                    rank: 17,
                    category: "brain teasers".to_string(),
                    link: Some("/gp/bestsellers/toys/brain".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_missing_fields_are_absent_not_errors() {
        let record = parse("<html><body><p>Nothing to see</p></body></html>");

        assert_eq!(record.title, "");
        assert_eq!(record.asin, "");
        assert!(record.price.is_none());
        assert!(record.is_available);
        assert!(record.merchant_id.is_none());
        assert!(record.merchant_name.is_none());
        assert!(record.sales_rank.is_empty());
        assert!(record.categories.is_empty());
        assert!(record.ratings.is_none());
    }

    #[test]
    fn test_first_price_candidate_wins_even_when_empty() {
        let record = parse(
            r#"<span id="priceblock_ourprice"></span><span id="priceblock_saleprice">12,99 €</span>"#,
        );
        assert!(record.price.is_none());

        let record = parse(r#"<div id="priceBlock"><b class="priceLarge">£19.99</b></div>"#);
        assert_eq!(record.price, Some(19.99));
    }

    #[rstest]
    #[case("Actuellement indisponible.", false)]
    #[case("No disponible.", false)]
    #[case("Currently unavailable.", false)]
    #[case("Unavailable", false)]
    #[case("In Stock.", true)]
    #[case("", true)]
    fn test_availability_phrases(#[case] indicator: &str, #[case] expected: bool) {
        let record = parse(&format!(r#"<div id="availability"><span>{indicator}</span></div>"#));
        assert_eq!(record.is_available, expected);
    }

    #[test]
    fn test_unparseable_rank_summary_is_absent() {
        let record = parse(r#"<li id="SalesRank">Rank not available</li>"#);
        assert!(record.sales_rank.main.is_none());
    }

    #[test]
    fn test_details_rank_row_backs_up_main_rank() {
        let record = parse(
            r#"<div id="prodDetails"><table>
                <tr><th>Best Sellers Rank</th><td>#42 in <a href="/b/kitchen">Kitchen</a> #3 in <a href="/b/knives">Knives</a></td></tr>
            </table></div>"#,
        );

        assert_eq!(record.categories.len(), 2);
        assert_eq!(record.sales_rank.main, record.categories.first().cloned());
        assert_eq!(record.sales_rank.main.map(|rank| rank.rank), Some(42));
    }

    #[test]
    fn test_unparseable_rank_summary_is_not_backed_up_by_details() {
        let record = parse(
            r#"<li id="SalesRank">Rank not available</li>
            <div id="prodDetails"><table>
                <tr><th>Best Sellers Rank</th><td>#42 in <a href="/b/kitchen">Kitchen</a></td></tr>
            </table></div>"#,
        );

        assert!(record.sales_rank.main.is_none());
        assert_eq!(record.categories.len(), 1);
        assert_eq!(record.categories[0].rank, 42);
    }

    #[test]
    fn test_bare_rank_badges() {
        let record = parse(r#"<span class="zg_hrsr_rank">#8</span><span class="zg_hrsr_rank">n°1.024</span>"#);
        let ranks: Vec<u64> = record.sales_rank.secondary.iter().map(|rank| rank.rank).collect();
        assert_eq!(ranks, vec![8, 1024]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let doc = ParsedDocument::parse(PRODUCT_URL, FULL_PAGE);
        let parser = ProductPageParser::new().unwrap();
        assert_eq!(parser.parse(&doc, PRODUCT_URL), parser.parse(&doc, PRODUCT_URL));
    }
}
