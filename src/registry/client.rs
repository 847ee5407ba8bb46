use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use opentelemetry::KeyValue;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{CompanyProfile, CompanyStub, Officer, OfficerList, SearchResponse};
use super::{Registry, RegistryError};
use crate::telemetry::metrics::{REGISTRY_ERRORS, REGISTRY_REQUEST_DURATION, REGISTRY_REQUESTS};

const SEARCH: &str = "company search";
const PROFILE: &str = "company profile";
const OFFICERS: &str = "company officers";

/// `Authorization` value for the registry: the API key as the Basic username
/// with an empty password.
pub fn basic_credential(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{api_key}:")))
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    /// The credential is encoded here once and sent with every request.
    pub fn new(base_url: Url, api_key: &str) -> Result<Self, RegistryError> {
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut authorization = HeaderValue::from_str(&basic_credential(api_key))
            .map_err(|_| RegistryError::InvalidCredential)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| RegistryError::Http {
                endpoint: "client init",
                source,
            })?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
    ) -> Result<T, RegistryError> {
        let start = Instant::now();
        let endpoint_kv = KeyValue::new("registry.endpoint", endpoint);

        let result = self.send(endpoint, url).await;

        REGISTRY_REQUESTS.add(1, &[endpoint_kv.clone()]);
        REGISTRY_REQUEST_DURATION.record(start.elapsed().as_secs_f64(), &[endpoint_kv.clone()]);

        if let Err(ref err) = result {
            tracing::Span::current().record("otel.status_code", "ERROR");
            REGISTRY_ERRORS.add(1, &[endpoint_kv, KeyValue::new("error.type", err.kind())]);
        }

        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
    ) -> Result<T, RegistryError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| RegistryError::Http { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                endpoint,
                status,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| RegistryError::Decode { endpoint, source })
    }
}

#[async_trait::async_trait]
impl Registry for RegistryClient {
    #[tracing::instrument(
        name = "registry.search",
        skip(self),
        fields(
            search.results,
            otel.status_code = tracing::field::Empty,
        )
    )]
    async fn search_companies(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        size: u32,
    ) -> Result<Vec<CompanyStub>, RegistryError> {
        let mut url = self.endpoint(&["advanced-search", "companies"])?;
        url.query_pairs_mut()
            .append_pair("incorporated_from", &from.format("%Y-%m-%d").to_string())
            .append_pair("incorporated_to", &to.format("%Y-%m-%d").to_string())
            .append_pair("size", &size.to_string());

        let response: SearchResponse = self.get_json(SEARCH, url).await?;

        tracing::Span::current().record("search.results", response.items.len());

        Ok(response.items)
    }

    #[tracing::instrument(
        name = "registry.profile",
        skip(self),
        fields(otel.status_code = tracing::field::Empty)
    )]
    async fn fetch_profile(&self, company_number: &str) -> Result<CompanyProfile, RegistryError> {
        let url = self.endpoint(&["company", company_number])?;
        self.get_json(PROFILE, url).await
    }

    #[tracing::instrument(
        name = "registry.officers",
        skip(self),
        fields(
            officers.count,
            otel.status_code = tracing::field::Empty,
        )
    )]
    async fn fetch_officers(&self, company_number: &str) -> Result<Vec<Officer>, RegistryError> {
        let url = self.endpoint(&["company", company_number, "officers"])?;
        let list: OfficerList = self.get_json(OFFICERS, url).await?;

        tracing::Span::current().record("officers.count", list.items.len());

        Ok(list.items)
    }
}
