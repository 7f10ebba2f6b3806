// src/pipeline/fingerprint.rs

//! Identity hashing for coupon deduplication.
//!
//! A coupon's logical identity is the triple (merchant name, site ID or
//! title, source URL). Scraped text carries whitespace and case noise, so
//! each part is normalized before hashing; re-runs of a scraper must map
//! the same offer to the same fingerprint.

use sha2::{Digest, Sha256};

use crate::utils::collapse_whitespace;

/// Joins the normalized parts; unlikely to appear in scraped text.
const DELIMITER: char = '|';

/// Compute the stable dedup fingerprint for one coupon offer.
///
/// Normalization: trim, lowercase, collapse internal whitespace to single
/// spaces. The result is the hex-encoded SHA-256 of the joined parts.
pub fn fingerprint(merchant_name: &str, id_or_title: &str, source_url: &str) -> String {
    let mut joined = String::new();
    for (i, part) in [merchant_name, id_or_title, source_url].iter().enumerate() {
        if i > 0 {
            joined.push(DELIMITER);
        }
        joined.push_str(&collapse_whitespace(part).to_lowercase());
    }

    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = fingerprint("Acme", "10% Off", "https://x.com/acme");
        let b = fingerprint("Acme", "10% Off", "https://x.com/acme");
        assert_eq!(a, b);
    }

    #[test]
    fn test_whitespace_and_case_noise_collapses() {
        let clean = fingerprint("Acme", "10% Off", "https://x.com/acme");
        let noisy = fingerprint("  ACME ", "10%   Off\n", "HTTPS://X.COM/ACME");
        assert_eq!(clean, noisy);
    }

    #[test]
    fn test_distinct_offers_differ() {
        let a = fingerprint("Acme", "10% Off", "https://x.com/acme");
        let b = fingerprint("Acme", "20% Off", "https://x.com/acme");
        let c = fingerprint("Other", "10% Off", "https://x.com/acme");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hex_sha256_shape() {
        let hash = fingerprint("Acme", "123", "https://x.com/acme");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_delimiter_prevents_field_bleed() {
        // "ab" + "c" must not collide with "a" + "bc"
        let a = fingerprint("ab", "c", "https://x.com");
        let b = fingerprint("a", "bc", "https://x.com");
        assert_ne!(a, b);
    }
}
