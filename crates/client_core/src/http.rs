//! `reqwest` implementation of [`CatalogQueryPort`] for json-server style catalogs.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use shared::{error::ApiError, protocol::ProductItem};
use tracing::debug;
use url::Url;

use crate::{
    criteria::CriteriaSnapshot,
    error::CatalogHttpError,
    port::{CatalogEnvelope, CatalogQueryPort},
    settings::CatalogSettings,
    PAGE_SIZE,
};

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub struct HttpCatalogPort {
    http: Client,
    items_url: Url,
}

impl HttpCatalogPort {
    pub fn new(catalog_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), catalog_url)
    }

    pub fn from_settings(settings: &CatalogSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build catalog http client")?;
        Self::with_client(http, &settings.catalog_url)
    }

    pub fn with_client(http: Client, catalog_url: &str) -> Result<Self> {
        let raw = format!("{}/items", catalog_url.trim_end_matches('/'));
        let items_url = Url::parse(&raw).map_err(|source| CatalogHttpError::InvalidUrl {
            url: catalog_url.to_string(),
            source,
        })?;
        Ok(Self { http, items_url })
    }

    pub fn items_url(&self) -> &Url {
        &self.items_url
    }
}

/// Query parameters for one page, in json-server conventions.
pub fn query_pairs(criteria: &CriteriaSnapshot) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("_page", criteria.page.to_string()),
        ("_limit", PAGE_SIZE.to_string()),
        ("_sort", criteria.sort_value.field().to_string()),
        ("_order", criteria.sort_value.direction().to_string()),
    ];
    if let Some(item_type) = criteria.filter_type.item_type() {
        pairs.push(("itemType", item_type.as_str().to_string()));
    }
    pairs.extend(criteria.tags.iter().map(|tag| ("tags_like", tag.clone())));
    pairs.extend(
        criteria
            .brands
            .iter()
            .map(|brand| ("manufacturer", brand.clone())),
    );
    pairs
}

fn total_from_headers(headers: &HeaderMap) -> Result<u64, CatalogHttpError> {
    let value = headers
        .get(TOTAL_COUNT_HEADER)
        .ok_or(CatalogHttpError::MissingTotal {
            header: TOTAL_COUNT_HEADER,
        })?;
    let malformed = || CatalogHttpError::MalformedTotal {
        header: TOTAL_COUNT_HEADER,
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };
    value
        .to_str()
        .map_err(|_| malformed())?
        .trim()
        .parse::<u64>()
        .map_err(|_| malformed())
}

#[async_trait]
impl CatalogQueryPort for HttpCatalogPort {
    async fn fetch_product_items(&self, criteria: &CriteriaSnapshot) -> Result<CatalogEnvelope> {
        let response = self
            .http
            .get(self.items_url.clone())
            .query(&query_pairs(criteria))
            .send()
            .await
            .context("catalog request failed")?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiError>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            return Err(CatalogHttpError::Status { status, message }.into());
        }

        let total = total_from_headers(response.headers())?;
        debug!(
            page = criteria.page,
            total, "catalog: response headers received"
        );

        Ok(CatalogEnvelope::new(total, async move {
            response
                .json::<Vec<ProductItem>>()
                .await
                .context("failed to decode catalog items")
        }))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
