// src/pipeline/validator.rs

//! Incremental construction and finalization of one coupon record.
//!
//! Sites discover fields out of order or conditionally, so nothing is
//! enforced while a record is being populated. The required-field
//! contract is checked once, at [`CouponValidator::final_check`], which
//! consumes the validator so finalization cannot happen twice.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{CouponDraft, CouponRecord};

/// Builds one [`CouponRecord`] field by field.
#[derive(Debug, Clone, Default)]
pub struct CouponValidator {
    draft: CouponDraft,
}

impl CouponValidator {
    /// Create an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate a validator from previously serialized state.
    ///
    /// Used to carry partial records across a two-phase fetch boundary.
    pub fn load_data(draft: CouponDraft) -> Self {
        Self { draft }
    }

    /// Current field state, suitable for serialization into a follow-up
    /// request or for inspection.
    pub fn get_data(&self) -> &CouponDraft {
        &self.draft
    }

    /// Consume the validator and return the raw draft.
    pub fn into_data(self) -> CouponDraft {
        self.draft
    }

    // --- Required fields ---

    pub fn set_source_url(&mut self, value: impl Into<String>) -> &mut Self {
        self.draft.source_url = Some(value.into());
        self
    }

    pub fn set_merchant_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.draft.merchant_name = Some(value.into());
        self
    }

    pub fn set_title(&mut self, value: impl Into<String>) -> &mut Self {
        self.draft.title = Some(value.into());
        self
    }

    pub fn set_id_in_site(&mut self, value: impl Into<String>) -> &mut Self {
        self.draft.id_in_site = Some(value.into());
        self
    }

    // --- Optional fields: empty strings are stored as absent ---

    pub fn set_domain(&mut self, value: Option<String>) -> &mut Self {
        self.draft.domain = non_empty(value);
        self
    }

    pub fn set_description(&mut self, value: Option<String>) -> &mut Self {
        self.draft.description = non_empty(value);
        self
    }

    pub fn set_terms_and_conditions(&mut self, value: Option<String>) -> &mut Self {
        self.draft.terms_and_conditions = non_empty(value);
        self
    }

    pub fn set_expiry_date(&mut self, value: Option<NaiveDate>) -> &mut Self {
        self.draft.expiry_date_at = value;
        self
    }

    pub fn set_start_date(&mut self, value: Option<NaiveDate>) -> &mut Self {
        self.draft.start_date_at = value;
        self
    }

    pub fn set_exclusive(&mut self, value: Option<bool>) -> &mut Self {
        self.draft.is_exclusive = value;
        self
    }

    pub fn set_expired(&mut self, value: bool) -> &mut Self {
        self.draft.is_expired = value;
        self
    }

    pub fn set_shown(&mut self, value: bool) -> &mut Self {
        self.draft.is_shown = value;
        self
    }

    pub fn set_code(&mut self, value: Option<String>) -> &mut Self {
        self.draft.code = non_empty(value);
        self
    }

    /// Enforce the required-field contract and produce the final record.
    ///
    /// Fails with [`AppError::Validation`] when `source_url`,
    /// `merchant_name`, `title`, or `id_in_site` is missing or empty.
    /// Must be called exactly once, immediately before persistence;
    /// consuming `self` enforces the "once".
    pub fn final_check(self) -> Result<CouponRecord> {
        let draft = self.draft;

        let source_url = draft.source_url.unwrap_or_default();
        let merchant_name = draft.merchant_name.unwrap_or_default();
        let title = draft.title.unwrap_or_default();
        let id_in_site = draft.id_in_site.unwrap_or_default();

        let missing: Vec<&str> = [
            ("source_url", &source_url),
            ("merchant_name", &merchant_name),
            ("title", &title),
            ("id_in_site", &id_in_site),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "required field(s) missing or empty: {}",
                missing.join(", ")
            )));
        }

        Ok(CouponRecord {
            source_url,
            merchant_name,
            title,
            id_in_site,
            domain: draft.domain,
            description: draft.description,
            terms_and_conditions: draft.terms_and_conditions,
            expiry_date_at: draft.expiry_date_at,
            start_date_at: draft.start_date_at,
            is_exclusive: draft.is_exclusive,
            is_expired: draft.is_expired,
            is_shown: draft.is_shown,
            code: draft.code,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
