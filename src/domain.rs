//! Domain module - product entities returned by the scraper

pub mod product;

pub use product::{CategoryRank, ProductRecord, Ratings, SalesRank};
