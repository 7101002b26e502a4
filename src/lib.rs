//! Stock Probe - retail product page scraper
//!
//! Reads a product page, submits its add-to-cart form on the same cookie
//! session and classifies the checkout page into a remaining inventory
//! count or one of a fixed set of failures.

pub mod domain;
pub mod infrastructure;

pub use domain::{CategoryRank, ProductRecord, Ratings, SalesRank};
pub use infrastructure::{AppConfig, ErrorKind, HttpClient, PageFetcher, ProductScraper, ScrapeError, ScrapeResult};
