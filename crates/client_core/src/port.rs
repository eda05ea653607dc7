//! The injected catalog capability the orchestrator fetches through.

use std::{fmt, future::Future};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{future::BoxFuture, FutureExt};
use shared::protocol::ProductItem;

use crate::criteria::CriteriaSnapshot;

/// Two-phase result of a catalog query.
///
/// `total` is known as soon as the service answers; the page of items in `response` is decoded
/// separately and must still be awaited.
pub struct CatalogEnvelope {
    pub total: u64,
    pub response: BoxFuture<'static, Result<Vec<ProductItem>>>,
}

impl CatalogEnvelope {
    pub fn new<F>(total: u64, response: F) -> Self
    where
        F: Future<Output = Result<Vec<ProductItem>>> + Send + 'static,
    {
        Self {
            total,
            response: response.boxed(),
        }
    }

    /// Envelope whose items are already in hand.
    pub fn ready(total: u64, items: Vec<ProductItem>) -> Self {
        Self::new(total, futures::future::ready(Ok(items)))
    }
}

impl fmt::Debug for CatalogEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEnvelope")
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait CatalogQueryPort: Send + Sync {
    async fn fetch_product_items(&self, criteria: &CriteriaSnapshot) -> Result<CatalogEnvelope>;
}

pub struct MissingCatalogQueryPort;

#[async_trait]
impl CatalogQueryPort for MissingCatalogQueryPort {
    async fn fetch_product_items(&self, criteria: &CriteriaSnapshot) -> Result<CatalogEnvelope> {
        Err(anyhow!(
            "catalog backend unavailable for page {}",
            criteria.page
        ))
    }
}
