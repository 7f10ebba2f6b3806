// src/services/reveal.rs

//! Second-phase reveal fetching.
//!
//! Hosts embedded in a crawling engine hand [`FollowUpRequest`]s to the
//! engine's own queue and call
//! [`CouponPipeline::complete_reveal`](crate::pipeline::CouponPipeline::complete_reveal)
//! from the follow-up handler. [`RevealFetcher`] is for hosts without a
//! queue: it drains the scheduled requests itself with bounded
//! concurrency and a polite inter-request delay.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use scraper::Html;

use crate::models::HttpConfig;
use crate::pipeline::{CouponPipeline, FollowUpRequest, PendingReveal};
use crate::services::CandidateExtractor;
use crate::utils::http::fetch_text;

/// Summary of one reveal-fetch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RevealOutcome {
    /// Follow-up requests drained
    pub total: usize,
    /// Records finalized and persisted
    pub persisted: usize,
    /// Persisted records whose reveal page had no code element
    pub missing_code: usize,
    /// Requests lost to fetch, rehydration, or persistence failures
    pub failures: usize,
}

/// Fetches reveal pages and completes their pending records.
pub struct RevealFetcher {
    client: reqwest::Client,
    config: HttpConfig,
}

impl RevealFetcher {
    pub fn new(client: reqwest::Client, config: HttpConfig) -> Self {
        Self { client, config }
    }

    /// Fetch every scheduled reveal page and finalize its record.
    pub async fn run(
        &self,
        pipeline: &CouponPipeline,
        extractor: &CandidateExtractor,
        requests: Vec<FollowUpRequest>,
    ) -> RevealOutcome {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let concurrency = self.config.max_concurrent.max(1);

        let mut outcome = RevealOutcome {
            total: requests.len(),
            ..RevealOutcome::default()
        };

        let mut pendings = Vec::new();
        for request in requests {
            match PendingReveal::from_user_data(&request.user_data) {
                Ok(pending) => pendings.push(pending),
                Err(e) => {
                    log::warn!("Dropping follow-up for {}: {e}", request.url);
                    outcome.failures += 1;
                }
            }
        }

        // Fetch pages concurrently, bounded; completion stays sequential.
        let mut fetch_stream = stream::iter(pendings)
            .map(|pending| {
                let client = self.client.clone();
                async move {
                    let result = fetch_text(&client, &pending.reveal_url).await;
                    (pending, result)
                }
            })
            .buffer_unordered(concurrency);

        while let Some((pending, result)) = fetch_stream.next().await {
            match result {
                Ok(body) => {
                    let code = {
                        let document = Html::parse_document(&body);
                        extractor.extract_code(&document)
                    };
                    let codeless = code.is_none();

                    match pipeline.complete_reveal(pending, code).await {
                        Ok(record) => {
                            log::debug!("Revealed and persisted '{}'", record.title);
                            outcome.persisted += 1;
                            if codeless {
                                outcome.missing_code += 1;
                            }
                        }
                        Err(e) => {
                            log::warn!("Failed to finalize reveal: {e}");
                            outcome.failures += 1;
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Reveal fetch failed for {}: {e}", pending.reveal_url);
                    outcome.failures += 1;
                }
            }

            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_malformed_user_data_counted_as_failure() {
        let fetcher = RevealFetcher::new(reqwest::Client::new(), HttpConfig::default());
        let pipeline = CouponPipeline::new(Arc::new(MemoryStore::new()));

        let site = crate::models::SiteConfig {
            id: "dealhub".into(),
            name: "DealHub".into(),
            index_url: "https://dealhub.example".into(),
            merchant_name: None,
            baseline_count: None,
            selectors: crate::models::SiteSelectors {
                candidate_selector: "div.offer".into(),
                title_selector: "h3".into(),
                merchant_selector: None,
                id_attr: None,
                code_selector: Some("span.code".into()),
                reveal_link_selector: None,
                link_attr: "href".into(),
                description_selector: None,
                expired_marker: None,
                exclusive_marker: None,
                index_marker: None,
                detail_marker: None,
            },
        };
        let extractor = CandidateExtractor::new(&site).unwrap();

        let requests = vec![FollowUpRequest {
            url: "https://dealhub.example/reveal/1".into(),
            user_data: serde_json::json!({"garbage": true}),
        }];

        let outcome = fetcher.run(&pipeline, &extractor, requests).await;
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.persisted, 0);
    }

    #[tokio::test]
    async fn test_empty_queue_is_a_no_op() {
        let fetcher = RevealFetcher::new(reqwest::Client::new(), HttpConfig::default());
        let pipeline = CouponPipeline::new(Arc::new(MemoryStore::new()));

        let site = crate::models::SiteConfig {
            id: "s".into(),
            name: "S".into(),
            index_url: "https://s.example".into(),
            merchant_name: None,
            baseline_count: None,
            selectors: crate::models::SiteSelectors {
                candidate_selector: "div".into(),
                title_selector: "h3".into(),
                merchant_selector: None,
                id_attr: None,
                code_selector: None,
                reveal_link_selector: None,
                link_attr: "href".into(),
                description_selector: None,
                expired_marker: None,
                exclusive_marker: None,
                index_marker: None,
                detail_marker: None,
            },
        };
        let extractor = CandidateExtractor::new(&site).unwrap();

        let outcome = fetcher.run(&pipeline, &extractor, Vec::new()).await;
        assert_eq!(outcome, RevealOutcome::default());
    }
}
