// src/pipeline/oracle.rs

//! Batched existence checks with fail-open semantics.
//!
//! The second-phase "reveal code" fetch is the expensive step, so
//! fingerprints are checked against the record store first and only
//! unknown ones proceed. When the check itself fails, every fingerprint
//! is treated as unknown: re-checking is cheaper than silently losing
//! coupons to an infrastructure hiccup.

use std::collections::HashSet;

use crate::storage::CouponStore;

/// Check which fingerprints are unknown to the store, failing open.
///
/// Returns the set of fingerprints that should proceed to a follow-up
/// fetch. On transport failure, that is all of them.
pub async fn filter_unknown_fail_open(
    store: &dyn CouponStore,
    fingerprints: &[String],
) -> HashSet<String> {
    if fingerprints.is_empty() {
        return HashSet::new();
    }

    match store.filter_unknown(fingerprints).await {
        Ok(unknown) => unknown.into_iter().collect(),
        Err(e) => {
            log::warn!(
                "Existence check failed ({e}); treating all {} fingerprints as unknown",
                fingerprints.len()
            );
            fingerprints.iter().cloned().collect()
        }
    }
}
