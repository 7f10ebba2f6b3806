// src/storage/memory.rs

//! In-process record store for tests and dry runs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::CouponRecord;
use crate::pipeline::fingerprint;
use crate::storage::CouponStore;

/// In-memory store keyed by the record's dedup fingerprint.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, CouponRecord>,
    // Fingerprints known without a full record, e.g. seeded test state
    known: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fingerprint as already stored.
    pub async fn seed_fingerprint(&self, fp: impl Into<String>) {
        self.inner.lock().await.known.insert(fp.into());
    }

    /// Snapshot of all saved records.
    pub async fn saved(&self) -> Vec<CouponRecord> {
        self.inner.lock().await.records.values().cloned().collect()
    }

    /// Number of saved records.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.records.is_empty()
    }

    fn record_fingerprint(record: &CouponRecord) -> String {
        fingerprint(
            &record.merchant_name,
            &record.id_in_site,
            &record.source_url,
        )
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn save_coupon(&self, record: &CouponRecord) -> Result<()> {
        let fp = Self::record_fingerprint(record);
        let mut inner = self.inner.lock().await;
        inner.known.insert(fp.clone());
        inner.records.insert(fp, record.clone());
        Ok(())
    }

    async fn filter_unknown(&self, fingerprints: &[String]) -> Result<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(fingerprints
            .iter()
            .filter(|fp| !inner.known.contains(*fp))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CouponRecord {
        CouponRecord {
            source_url: "https://x.com/acme".into(),
            merchant_name: "Acme".into(),
            title: "10% Off".into(),
            id_in_site: id.into(),
            domain: None,
            description: None,
            terms_and_conditions: None,
            expiry_date_at: None,
            start_date_at: None,
            is_exclusive: None,
            is_expired: false,
            is_shown: true,
            code: None,
        }
    }

    #[tokio::test]
    async fn test_save_then_known() {
        let store = MemoryStore::new();
        store.save_coupon(&record("123")).await.unwrap();

        let fp = fingerprint("Acme", "123", "https://x.com/acme");
        let unknown = store
            .filter_unknown(&[fp, "ffff".to_string()])
            .await
            .unwrap();
        assert_eq!(unknown, vec!["ffff".to_string()]);
    }

    #[tokio::test]
    async fn test_seeded_fingerprint_is_known() {
        let store = MemoryStore::new();
        store.seed_fingerprint("abcd").await;

        let unknown = store.filter_unknown(&["abcd".to_string()]).await.unwrap();
        assert!(unknown.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_is_idempotent_per_identity() {
        let store = MemoryStore::new();
        store.save_coupon(&record("123")).await.unwrap();
        store.save_coupon(&record("123")).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
