//! Product scraping pipeline
//!
//! product page GET -> field extraction -> add-to-cart form -> POST ->
//! checkout classification -> (optional) cart view GET.
//!
//! Each stage needs the previous response and the cookies it set, so the
//! fetches form a strict await chain. Documents are consumed by the
//! synchronous stage that reads them and never outlive their statement.

use anyhow::Result;
use tracing::{info, warn};
use url::Url;

use super::config::{AppConfig, ScraperConfig, retail};
use super::http_client::{FetchRequest, HttpClient, PageFetcher};
use super::parsing::cart_form::canonical_origin;
use super::parsing::{
    CartFormBuilder, CartFormDescriptor, CartPageReader, CheckoutClassifier, ParsedDocument, ProductPageParser,
    SelectorConfig,
};
use super::scrape_error::{ScrapeError, ScrapeResult};
use crate::domain::product::ProductRecord;

/// One scraping session. The fetcher's cookie store is shared by every
/// request of every `scrape` call made on this instance.
pub struct ProductScraper<F: PageFetcher = HttpClient> {
    fetcher: F,
    product_parser: ProductPageParser,
    form_builder: CartFormBuilder,
    classifier: CheckoutClassifier,
    cart_reader: CartPageReader,
    confirm_with_cart_view: bool,
    cart_view_path: String,
}

impl ProductScraper<HttpClient> {
    /// Scraper with a fresh HTTP session built from the configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let fetcher = HttpClient::new(config.http.clone())?;
        Self::with_fetcher(fetcher, &config.scraper, &config.selectors)
    }
}

impl<F: PageFetcher> ProductScraper<F> {
    pub fn with_fetcher(fetcher: F, scraper: &ScraperConfig, selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            product_parser: ProductPageParser::with_config(selectors)?,
            form_builder: CartFormBuilder::with_config(selectors, scraper.default_quantity)?,
            classifier: CheckoutClassifier::with_config(selectors)?,
            cart_reader: CartPageReader::with_config(selectors)?,
            confirm_with_cart_view: scraper.confirm_with_cart_view,
            cart_view_path: scraper.cart_view_path.clone(),
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the whole pipeline for one product page
    pub async fn scrape(&self, product_url: &str) -> ScrapeResult<ProductRecord> {
        info!("Scraping product: {}", product_url);
        let result = self.run(product_url).await;

        match &result {
            Ok(record) => info!(
                "Scraped '{}' (asin={}, inventory={:?})",
                record.title, record.asin, record.inventory_size
            ),
            Err(e) => warn!(code = e.kind().code(), "Scrape of {} failed: {}", product_url, e),
        }
        result
    }

    async fn run(&self, product_url: &str) -> ScrapeResult<ProductRecord> {
        let url = validate_product_url(product_url)?;

        let (record, form) = self.process_product_page(
            self.fetcher.fetch(FetchRequest::get(url.as_str())).await?,
            &url,
        );
        let Some(form) = form else {
            return Err(ScrapeError::NoAmazonForm);
        };

        let inventory = self.classifier.classify(
            &self
                .fetcher
                .fetch(FetchRequest::post(form.url, form.fields))
                .await?,
        )?;
        let mut record = record.with_inventory(inventory);

        if self.confirm_with_cart_view {
            let cart_url = self.cart_view_url(&url)?;
            record.cart_quantity = self
                .cart_reader
                .quantity(&self.fetcher.fetch(FetchRequest::get(cart_url)).await?);
            info!("Cart view quantity: {:?}", record.cart_quantity);
        }

        Ok(record)
    }

    /// Extract the product fields and the cart form from the product page
    fn process_product_page(
        &self,
        doc: ParsedDocument,
        product_url: &Url,
    ) -> (ProductRecord, Option<CartFormDescriptor>) {
        let record = self.product_parser.parse(&doc, product_url.as_str());
        let form = self.form_builder.build(&doc, product_url);
        (record, form)
    }

    fn cart_view_url(&self, product_url: &Url) -> ScrapeResult<String> {
        let origin = canonical_origin(product_url)
            .ok_or_else(|| ScrapeError::request_failed(product_url.as_str(), "Product URL has no host"))?;
        Ok(format!("{origin}{}", self.cart_view_path))
    }
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_product_url(product_url: &str) -> ScrapeResult<Url> {
    let url = Url::parse(product_url.trim())
        .map_err(|e| ScrapeError::request_failed(product_url, format!("Invalid product URL: {e}")))?;

    if !retail::ACCEPTED_SCHEMES.contains(&url.scheme()) {
        return Err(ScrapeError::request_failed(
            product_url,
            format!("Unsupported URL scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ScrapeError::request_failed(product_url, "Product URL has no host"));
    }
    Ok(url)
}
