// src/pipeline/reveal.rs

//! Two-phase code revelation.
//!
//! Some sites only surface a coupon code behind a second page load. A
//! candidate found on the index page becomes a [`PendingReveal`] that
//! rides through the host engine's follow-up queue as serialized user
//! data, and is finalized when the reveal page has been fetched.
//!
//! Lifecycle: `Listed` → `Queued` (fingerprint confirmed unknown) →
//! `Revealed` (second page fetched) → `Persisted`.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::CouponDraft;

/// Where a pending coupon sits in the reveal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealPhase {
    /// Found on the index page, existence not yet checked
    Listed,
    /// Confirmed unknown, follow-up request scheduled
    Queued,
    /// Reveal page fetched, code extraction attempted
    Revealed,
    /// Finalized and handed to the record store
    Persisted,
}

/// A coupon awaiting its second-phase fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReveal {
    /// Dedup fingerprint of the offer
    pub fingerprint: String,

    /// Partial validator state gathered on the index page
    pub draft: CouponDraft,

    /// URL of the reveal page
    pub reveal_url: String,

    /// Current lifecycle phase
    #[serde(default = "default_phase")]
    pub phase: RevealPhase,
}

fn default_phase() -> RevealPhase {
    RevealPhase::Listed
}

impl PendingReveal {
    /// Create a freshly listed pending coupon.
    pub fn new(fingerprint: String, draft: CouponDraft, reveal_url: String) -> Self {
        Self {
            fingerprint,
            draft,
            reveal_url,
            phase: RevealPhase::Listed,
        }
    }

    /// Serialize for a follow-up request's opaque user-data slot.
    pub fn to_user_data(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rehydrate from a follow-up request's user data.
    pub fn from_user_data(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            AppError::extraction("reveal user data", format!("malformed pending record: {e}"))
        })
    }
}

/// A follow-up request for the host engine's queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub url: String,
    pub user_data: serde_json::Value,
}

/// Follow-up request scheduler supplied by the host crawling engine.
#[async_trait]
pub trait RevealScheduler: Send + Sync {
    async fn enqueue(&self, request: FollowUpRequest) -> Result<()>;
}

/// Scheduler that records requests in memory.
///
/// Used by tests and by hosts that drain the queue themselves (see
/// [`crate::services::RevealFetcher`]).
#[derive(Default)]
pub struct CollectingScheduler {
    requests: Mutex<Vec<FollowUpRequest>>,
}

impl CollectingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded requests, leaving the queue empty.
    pub async fn drain(&self) -> Vec<FollowUpRequest> {
        std::mem::take(&mut *self.requests.lock().await)
    }
}

#[async_trait]
impl RevealScheduler for CollectingScheduler {
    async fn enqueue(&self, request: FollowUpRequest) -> Result<()> {
        self.requests.lock().await.push(request);
        Ok(())
    }
}

/// Split listed coupons by the oracle's verdict.
///
/// Unknown fingerprints transition `Listed` → `Queued`; known ones are
/// dropped (already persisted, never re-processed). Returns the queued
/// coupons and the number dropped.
pub fn plan_reveals(
    listed: Vec<PendingReveal>,
    unknown: &HashSet<String>,
) -> (Vec<PendingReveal>, usize) {
    let total = listed.len();
    let queued: Vec<PendingReveal> = listed
        .into_iter()
        .filter(|p| unknown.contains(&p.fingerprint))
        .map(|mut p| {
            p.phase = RevealPhase::Queued;
            p
        })
        .collect();

    let dropped = total - queued.len();
    (queued, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(fp: &str) -> PendingReveal {
        let mut draft = CouponDraft::default();
        draft.merchant_name = Some("Acme".into());
        draft.title = Some("10% Off".into());
        PendingReveal::new(fp.into(), draft, format!("https://x.com/reveal/{fp}"))
    }

    #[test]
    fn test_plan_queues_only_unknown() {
        let listed = vec![pending("aa"), pending("bb"), pending("cc")];
        let unknown: HashSet<String> = ["aa".to_string(), "cc".to_string()].into();

        let (queued, dropped) = plan_reveals(listed, &unknown);
        assert_eq!(dropped, 1);
        assert_eq!(queued.len(), 2);
        assert!(queued.iter().all(|p| p.phase == RevealPhase::Queued));
        assert!(queued.iter().any(|p| p.fingerprint == "aa"));
        assert!(queued.iter().any(|p| p.fingerprint == "cc"));
    }

    #[test]
    fn test_plan_with_all_known_drops_everything() {
        let listed = vec![pending("aa")];
        let unknown = HashSet::new();

        let (queued, dropped) = plan_reveals(listed, &unknown);
        assert!(queued.is_empty());
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_user_data_round_trip() {
        let original = pending("aa");
        let user_data = original.to_user_data().unwrap();

        let back = PendingReveal::from_user_data(&user_data).unwrap();
        assert_eq!(back.fingerprint, "aa");
        assert_eq!(back.reveal_url, original.reveal_url);
        assert_eq!(back.draft.merchant_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_malformed_user_data_rejected() {
        let junk = serde_json::json!({"unrelated": true});
        assert!(PendingReveal::from_user_data(&junk).is_err());
    }

    #[tokio::test]
    async fn test_collecting_scheduler_drains() {
        let scheduler = CollectingScheduler::new();
        scheduler
            .enqueue(FollowUpRequest {
                url: "https://x.com/reveal/1".into(),
                user_data: serde_json::Value::Null,
            })
            .await
            .unwrap();

        let drained = scheduler.drain().await;
        assert_eq!(drained.len(), 1);
        assert!(scheduler.drain().await.is_empty());
    }
}
