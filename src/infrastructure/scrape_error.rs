//! Classified pipeline failures
//!
//! Every variant is terminal: the orchestrator aborts on the first one and
//! never retries. Missing optional fields are not errors and never show up
//! here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Request failed for {url}: {reason}")]
    RequestFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Checkout page has no HTML body")]
    NoHtmlBody,

    #[error("Checkout page asks for a confirmation before proceeding")]
    ConfirmationError,

    #[error("Purchase limit of {limit} per customer instead of an inventory count")]
    LimitInventory { limit: u32 },

    #[error("No inventory signal found on checkout page")]
    NoInventory,

    #[error("Visible inventory {visible:?} does not match hidden confirmation {hidden:?}")]
    IncorrectInventory {
        visible: Option<u32>,
        hidden: Option<u32>,
    },

    #[error("No add-to-cart form found on product page")]
    NoAmazonForm,
}

/// Fieldless discriminant of [`ScrapeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RequestFailed,
    NoHtmlBody,
    ConfirmationError,
    LimitInventory,
    NoInventory,
    IncorrectInventory,
    NoAmazonForm,
}

impl ErrorKind {
    /// Stable code for logs and machine-readable output
    pub fn code(self) -> &'static str {
        match self {
            Self::RequestFailed => "REQUEST_FAILED",
            Self::NoHtmlBody => "NO_HTML_BODY",
            Self::ConfirmationError => "CONFIRMATION_ERROR",
            Self::LimitInventory => "LIMIT_INVENTORY",
            Self::NoInventory => "NO_INVENTORY",
            Self::IncorrectInventory => "INCORRECT_INVENTORY",
            Self::NoAmazonForm => "NO_AMAZON_FORM",
        }
    }
}

impl ScrapeError {
    /// Create a request failure without an HTTP status (transport error, bad input)
    pub fn request_failed(url: &str, reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Create a request failure for an HTTP status that carried no usable body
    pub fn http_status(url: &str, status: u16) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            status: Some(status),
            reason: format!("HTTP {status} with empty body"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestFailed { .. } => ErrorKind::RequestFailed,
            Self::NoHtmlBody => ErrorKind::NoHtmlBody,
            Self::ConfirmationError => ErrorKind::ConfirmationError,
            Self::LimitInventory { .. } => ErrorKind::LimitInventory,
            Self::NoInventory => ErrorKind::NoInventory,
            Self::IncorrectInventory { .. } => ErrorKind::IncorrectInventory,
            Self::NoAmazonForm => ErrorKind::NoAmazonForm,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
