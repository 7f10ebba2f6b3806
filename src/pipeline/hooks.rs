// src/pipeline/hooks.rs

//! Pre/post-processing hooks and the per-page candidate loop.
//!
//! This is the sequencing contract every site handler honors: classify
//! the page and run the anomaly guard before touching any candidate,
//! then walk candidates sequentially, batch-check fingerprints that
//! need a reveal fetch, and persist only records that pass
//! `final_check`. One bad record never aborts a page; an anomalous page
//! aborts before any side effect.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{CouponRecord, RawCandidate, SiteConfig};
use crate::pipeline::anomaly::{AnomalyGuard, PageClass};
use crate::pipeline::fingerprint;
use crate::pipeline::oracle::filter_unknown_fail_open;
use crate::pipeline::reveal::{FollowUpRequest, PendingReveal, RevealPhase, RevealScheduler, plan_reveals};
use crate::pipeline::validator::CouponValidator;
use crate::storage::CouponStore;

/// Summary of one page's processing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// Records finalized and persisted directly from the index page
    pub saved: usize,
    /// Candidates dropped by extraction/validation/persistence failures
    pub skipped: usize,
    /// Follow-up reveal fetches scheduled
    pub queued: usize,
    /// Pending coupons dropped because the store already knows them
    pub dropped_known: usize,
}

/// The shared per-item extraction-and-validation pipeline.
pub struct CouponPipeline {
    store: Arc<dyn CouponStore>,
    guard: AnomalyGuard,
}

impl CouponPipeline {
    /// Create a pipeline with default anomaly thresholds.
    pub fn new(store: Arc<dyn CouponStore>) -> Self {
        Self {
            store,
            guard: AnomalyGuard::new(),
        }
    }

    /// Create a pipeline with a custom anomaly guard.
    pub fn with_guard(store: Arc<dyn CouponStore>, guard: AnomalyGuard) -> Self {
        Self { store, guard }
    }

    /// Pre-extraction hook: page classification plus anomaly guard.
    ///
    /// Fails without side effects; the caller abandons the page.
    pub fn pre_process(
        &self,
        page_url: &str,
        class: &PageClass,
        candidate_count: usize,
        baseline: Option<usize>,
    ) -> Result<()> {
        self.guard.validate(page_url, class, candidate_count, baseline)
    }

    /// Post-extraction hook: finalize one record and persist it.
    pub async fn post_process(&self, validator: CouponValidator) -> Result<CouponRecord> {
        let record = validator.final_check()?;
        self.store.save_coupon(&record).await?;
        Ok(record)
    }

    /// Process all candidates from one page.
    ///
    /// Candidates are handled sequentially: extraction state (merchant
    /// name, fingerprints) is page-local and the oracle call must
    /// complete before any follow-up is scheduled.
    pub async fn process_page(
        &self,
        site: &SiteConfig,
        page_url: &str,
        class: &PageClass,
        candidates: &[RawCandidate],
        scheduler: &dyn RevealScheduler,
    ) -> Result<PageOutcome> {
        self.pre_process(page_url, class, candidates.len(), site.baseline_count)?;

        let mut outcome = PageOutcome::default();
        let mut listed: Vec<PendingReveal> = Vec::new();
        let mut listed_fps: HashSet<String> = HashSet::new();

        for candidate in candidates {
            let (validator, fp) = match self.prepare(site, page_url, candidate) {
                Ok(prepared) => prepared,
                Err(e) => {
                    log::warn!("Skipping candidate on {page_url}: {e}");
                    outcome.skipped += 1;
                    continue;
                }
            };

            match (candidate.needs_reveal(), candidate.reveal_url.clone()) {
                (true, Some(reveal_url)) => {
                    // Duplicates must not be issued to the oracle; the
                    // first candidate wins the pending slot.
                    if !listed_fps.insert(fp.clone()) {
                        log::debug!("Duplicate fingerprint {fp} on {page_url}, ignoring");
                        continue;
                    }
                    listed.push(PendingReveal::new(fp, validator.into_data(), reveal_url));
                }
                _ => match self.post_process(validator).await {
                    Ok(record) => {
                        log::debug!("Persisted '{}' for {}", record.title, record.merchant_name);
                        outcome.saved += 1;
                    }
                    Err(e) => {
                        log::warn!("Dropping record on {page_url}: {e}");
                        outcome.skipped += 1;
                    }
                },
            }
        }

        if !listed.is_empty() {
            let fingerprints: Vec<String> =
                listed.iter().map(|p| p.fingerprint.clone()).collect();
            let unknown = filter_unknown_fail_open(self.store.as_ref(), &fingerprints).await;

            let (queued, dropped) = plan_reveals(listed, &unknown);
            outcome.dropped_known = dropped;

            for pending in queued {
                let request = FollowUpRequest {
                    url: pending.reveal_url.clone(),
                    user_data: pending.to_user_data()?,
                };
                match scheduler.enqueue(request).await {
                    Ok(()) => outcome.queued += 1,
                    Err(e) => {
                        log::warn!(
                            "Failed to schedule reveal fetch for {}: {e}",
                            pending.reveal_url
                        );
                        outcome.skipped += 1;
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Second-phase hook: attach the revealed code and persist.
    ///
    /// A reveal page without a code element is not fatal; the record is
    /// persisted codeless since all required fields were gathered on
    /// the index page.
    pub async fn complete_reveal(
        &self,
        mut pending: PendingReveal,
        code: Option<String>,
    ) -> Result<CouponRecord> {
        pending.phase = RevealPhase::Revealed;
        if code.is_none() {
            log::warn!(
                "No code found on reveal page {}, persisting without one",
                pending.reveal_url
            );
        }

        let mut validator = CouponValidator::load_data(pending.draft);
        validator.set_code(code);

        let record = self.post_process(validator).await?;
        pending.phase = RevealPhase::Persisted;
        Ok(record)
    }

    /// Turn one raw candidate into a populated validator plus its
    /// dedup fingerprint.
    fn prepare(
        &self,
        site: &SiteConfig,
        page_url: &str,
        candidate: &RawCandidate,
    ) -> Result<(CouponValidator, String)> {
        let merchant = candidate
            .merchant_name
            .as_deref()
            .or(site.merchant_name.as_deref())
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::extraction(page_url, "merchant name unresolved"))?;

        let title = candidate
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::extraction(page_url, "candidate has no title"))?;

        // Site-native ID when the markup exposes one; otherwise the
        // fingerprint doubles as the generated identity key.
        let fp = fingerprint(
            merchant,
            candidate.id_in_site.as_deref().unwrap_or(title),
            page_url,
        );
        let id_in_site = candidate.id_in_site.clone().unwrap_or_else(|| fp.clone());

        let mut validator = CouponValidator::new();
        validator
            .set_source_url(page_url)
            .set_merchant_name(merchant)
            .set_title(title)
            .set_id_in_site(id_in_site)
            .set_domain(candidate.domain.clone())
            .set_description(candidate.description.clone())
            .set_terms_and_conditions(candidate.terms_and_conditions.clone())
            .set_expiry_date(parse_expiry(candidate.expiry_text.as_deref()))
            .set_exclusive(candidate.is_exclusive)
            .set_expired(candidate.is_expired)
            .set_code(candidate.code.clone());

        Ok((validator, fp))
    }
}

/// Parse an expiry date the adapters have already normalized to ISO.
///
/// Free-form site date text is adapter territory; anything
/// unparseable here is stored as no expiry.
fn parse_expiry(text: Option<&str>) -> Option<NaiveDate> {
    let text = text?.trim();
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            log::debug!("Unparseable expiry date '{text}'");
            None
        }
    }
}
