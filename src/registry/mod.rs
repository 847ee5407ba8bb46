pub mod client;
pub mod types;

pub use client::{RegistryClient, basic_credential};
pub use types::{CompanyProfile, CompanyStub, Officer};

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid registry base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("registry API key is not a valid header value")]
    InvalidCredential,

    #[error("{endpoint} request failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{endpoint} response could not be decoded: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl RegistryError {
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidBaseUrl(_) | RegistryError::InvalidCredential => "config",
            RegistryError::Http { source, .. } if source.is_timeout() => "timeout",
            RegistryError::Http { .. } => "network_error",
            RegistryError::Status { status, .. } if status.as_u16() == 401 => "auth_error",
            RegistryError::Status { status, .. } if status.as_u16() == 404 => "not_found",
            RegistryError::Status { status, .. } if status.as_u16() == 429 => "rate_limit",
            RegistryError::Status { .. } => "http_status",
            RegistryError::Decode { .. } => "decode_error",
        }
    }
}

/// The three registry lookups the report is built from.
///
/// `RegistryClient` talks to Companies House; tests substitute in-memory
/// implementations.
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Companies incorporated between `from` and `to`, capped at `size` hits.
    async fn search_companies(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        size: u32,
    ) -> Result<Vec<CompanyStub>, RegistryError>;

    async fn fetch_profile(&self, company_number: &str) -> Result<CompanyProfile, RegistryError>;

    /// Officers in the order the registry lists them.
    async fn fetch_officers(&self, company_number: &str) -> Result<Vec<Officer>, RegistryError>;
}
