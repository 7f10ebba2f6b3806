// src/models/candidate.rs

//! Raw scraped candidate, prior to validation.

use serde::{Deserialize, Serialize};

/// One potential coupon as extracted from a listing page.
///
/// Everything is optional at this stage; the pipeline decides per
/// candidate whether enough survived extraction to build a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Merchant name, usually resolved once per page
    pub merchant_name: Option<String>,

    /// Coupon title text
    pub title: Option<String>,

    /// Site-native identity key, when the markup exposes one
    pub id_in_site: Option<String>,

    /// Directly visible coupon code
    pub code: Option<String>,

    /// Merchant domain, when the adapter resolves one
    pub domain: Option<String>,

    /// URL of the second-phase "reveal code" page
    pub reveal_url: Option<String>,

    /// Offer description text
    pub description: Option<String>,

    /// Terms and conditions text
    pub terms_and_conditions: Option<String>,

    /// Raw expiry date text, parsed downstream by the adapter
    pub expiry_text: Option<String>,

    /// Whether the site marks the offer as exclusive
    pub is_exclusive: Option<bool>,

    /// Whether the site marks the offer as expired
    pub is_expired: bool,
}

impl RawCandidate {
    /// True when the coupon code needs a second page load.
    pub fn needs_reveal(&self) -> bool {
        self.code.is_none() && self.reveal_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_reveal() {
        let mut candidate = RawCandidate {
            reveal_url: Some("https://x.com/reveal/1".into()),
            ..RawCandidate::default()
        };
        assert!(candidate.needs_reveal());

        candidate.code = Some("SAVE10".into());
        assert!(!candidate.needs_reveal());
    }
}
