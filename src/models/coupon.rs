// src/models/coupon.rs

//! Coupon record data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A validated coupon ready for persistence.
///
/// Produced only by [`crate::pipeline::CouponValidator::final_check`];
/// required fields are guaranteed non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponRecord {
    /// Page the coupon was scraped from
    pub source_url: String,

    /// Merchant display name
    pub merchant_name: String,

    /// Coupon title
    pub title: String,

    /// Site-native or generated identity key, unique per merchant+offer
    pub id_in_site: String,

    /// Merchant domain, when resolvable
    pub domain: Option<String>,

    /// Longer offer description
    pub description: Option<String>,

    /// Terms and conditions text
    pub terms_and_conditions: Option<String>,

    /// Offer expiry date
    pub expiry_date_at: Option<NaiveDate>,

    /// Offer start date
    pub start_date_at: Option<NaiveDate>,

    /// Whether the site marks the offer as exclusive
    pub is_exclusive: Option<bool>,

    /// Whether the offer is already expired
    pub is_expired: bool,

    /// Whether the offer should be listed
    pub is_shown: bool,

    /// Coupon code, when one exists
    pub code: Option<String>,
}

/// Partially populated coupon state held by the validator.
///
/// Serializable so it can ride through a follow-up request's opaque
/// user-data slot during a two-phase code reveal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponDraft {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub id_in_site: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
    #[serde(default)]
    pub expiry_date_at: Option<NaiveDate>,
    #[serde(default)]
    pub start_date_at: Option<NaiveDate>,
    #[serde(default)]
    pub is_exclusive: Option<bool>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default = "default_shown")]
    pub is_shown: bool,
    #[serde(default)]
    pub code: Option<String>,
}

fn default_shown() -> bool {
    true
}

impl Default for CouponDraft {
    fn default() -> Self {
        Self {
            source_url: None,
            merchant_name: None,
            title: None,
            id_in_site: None,
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
}
