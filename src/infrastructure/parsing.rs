//! HTML parsing for the product, checkout and cart pages
//!
//! Every parser here is synchronous and works on an already fetched
//! [`ParsedDocument`]. Selector candidates come from [`SelectorConfig`] and
//! are compiled once when the parser is built.

pub mod cart_form;
pub mod cart_page;
pub mod checkout_classifier;
pub mod config;
pub mod details_table;
pub mod document;
pub mod normalizer;
pub mod phrases;
pub mod product_page_parser;
pub mod selector_chain;

pub use cart_form::{CartFormBuilder, CartFormDescriptor};
pub use cart_page::CartPageReader;
pub use checkout_classifier::CheckoutClassifier;
pub use config::SelectorConfig;
pub use details_table::{DetailsMetadata, DetailsTableParser};
pub use document::ParsedDocument;
pub use product_page_parser::ProductPageParser;
pub use selector_chain::SelectorChain;
