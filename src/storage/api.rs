// src/storage/api.rs

//! HTTP client for the central coupon API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, CouponRecord};
use crate::storage::CouponStore;

/// Remote record store reached over the coupon API.
#[derive(Clone)]
pub struct ApiCouponStore {
    client: reqwest::Client,
    config: ApiConfig,
}

/// Request body of the batched existence endpoint.
#[derive(Debug, Serialize)]
struct ExistenceQuery<'a> {
    fingerprints: &'a [String],
}

/// Response body of the batched existence endpoint.
#[derive(Debug, Deserialize)]
struct ExistenceReply {
    unknown: Vec<String>,
}

impl ApiCouponStore {
    /// Create a store client from a configured HTTP client.
    pub fn new(client: reqwest::Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Query one chunk of fingerprints.
    async fn query_chunk(&self, chunk: &[String]) -> Result<Vec<String>> {
        let reply: ExistenceReply = self
            .client
            .post(self.endpoint(&self.config.existence_path))
            .json(&ExistenceQuery {
                fingerprints: chunk,
            })
            .send()
            .await
            .map_err(AppError::oracle)?
            .error_for_status()
            .map_err(AppError::oracle)?
            .json()
            .await
            .map_err(AppError::oracle)?;

        Ok(reply.unknown)
    }
}

#[async_trait]
impl CouponStore for ApiCouponStore {
    async fn save_coupon(&self, record: &CouponRecord) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(&self.config.save_path))
            .json(record)
            .send()
            .await?;

        if let Err(e) = response.error_for_status_ref() {
            return Err(AppError::Store(format!(
                "save rejected for '{}': {}",
                record.id_in_site, e
            )));
        }
        Ok(())
    }

    async fn filter_unknown(&self, fingerprints: &[String]) -> Result<Vec<String>> {
        // One logical round trip per page; chunked so a pathological
        // page cannot produce an unbounded request body.
        let mut unknown = Vec::new();
        for chunk in fingerprints.chunks(self.config.batch_size.max(1)) {
            unknown.extend(self.query_chunk(chunk).await?);
        }
        Ok(unknown)
    }
}
