//! Infrastructure layer: HTTP session, HTML parsing, pipeline orchestration
//! and the ambient configuration and logging setup.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod product_scraper;
pub mod scrape_error;

pub use config::{AppConfig, ConfigManager, LoggingConfig, ScraperConfig};
pub use http_client::{FetchRequest, HttpClient, HttpClientConfig, HttpMethod, PageFetcher};
pub use logging::init_logging_with_config;
pub use parsing::{ParsedDocument, SelectorConfig};
pub use product_scraper::ProductScraper;
pub use scrape_error::{ErrorKind, ScrapeError, ScrapeResult};
