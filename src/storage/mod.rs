// src/storage/mod.rs

//! Record-store abstractions.
//!
//! The central coupon API is an external collaborator: it accepts
//! finalized records and answers batched fingerprint-existence queries.
//! [`ApiCouponStore`] talks to the real service; [`MemoryStore`] backs
//! tests and dry runs.

pub mod api;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CouponRecord;

// Re-export for convenience
pub use api::ApiCouponStore;
pub use memory::MemoryStore;

/// Trait for coupon record stores.
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Persist one finalized coupon record.
    async fn save_coupon(&self, record: &CouponRecord) -> Result<()>;

    /// Return the subset of `fingerprints` not already stored.
    ///
    /// One logical call covers a whole page's fingerprints; order of the
    /// returned subset is unspecified.
    async fn filter_unknown(&self, fingerprints: &[String]) -> Result<Vec<String>>;
}
