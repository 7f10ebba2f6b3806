// src/models/site.rs

//! Per-site scraping manifests.
//!
//! Each of the farm's target sites is described by a [`SiteConfig`]:
//! where its listing pages live and which CSS selectors pull candidate
//! fields out of the markup. The pipeline itself stays site-agnostic.

use serde::{Deserialize, Serialize};

/// Manifest for one coupon-listing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Unique site identifier (e.g., "vouchercloud")
    pub id: String,

    /// Display name
    pub name: String,

    /// Entry URL of the merchant/coupon listing
    pub index_url: String,

    /// Fixed merchant name for single-merchant sites; otherwise the
    /// merchant selector resolves it per page
    #[serde(default)]
    pub merchant_name: Option<String>,

    /// Historical candidate count used as the anomaly baseline
    #[serde(default)]
    pub baseline_count: Option<usize>,

    /// CSS selectors for extraction
    #[serde(flatten)]
    pub selectors: SiteSelectors,
}

/// CSS selector set for one site's markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSelectors {
    /// Selector for one candidate element on the listing page
    pub candidate_selector: String,

    /// Selector for the title within a candidate
    pub title_selector: String,

    /// Page-level selector for the merchant name
    #[serde(default)]
    pub merchant_selector: Option<String>,

    /// Attribute on the candidate element carrying the site-native ID
    #[serde(default)]
    pub id_attr: Option<String>,

    /// Selector for a directly visible code; also applied to the
    /// second-phase reveal page
    #[serde(default)]
    pub code_selector: Option<String>,

    /// Selector for the "reveal code" link within a candidate
    #[serde(default)]
    pub reveal_link_selector: Option<String>,

    /// HTML attribute for link extraction
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Selector for the offer description within a candidate
    #[serde(default)]
    pub description_selector: Option<String>,

    /// Selector marking a candidate as expired
    #[serde(default)]
    pub expired_marker: Option<String>,

    /// Selector marking a candidate as exclusive
    #[serde(default)]
    pub exclusive_marker: Option<String>,

    /// Page-level selector present only on index/listing pages
    #[serde(default)]
    pub index_marker: Option<String>,

    /// Page-level selector present only on detail/reveal pages
    #[serde(default)]
    pub detail_marker: Option<String>,
}

mod defaults {
    pub fn link_attr() -> String {
        "href".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_config_from_toml() {
        let toml_str = r#"
            id = "dealhub"
            name = "DealHub"
            index_url = "https://dealhub.example/coupons"
            candidate_selector = "div.offer"
            title_selector = "h3.offer-title"
            merchant_selector = "h1.shop-name"
            reveal_link_selector = "a.show-code"
            index_marker = "div.offer-list"
        "#;

        let site: SiteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(site.id, "dealhub");
        assert_eq!(site.selectors.link_attr, "href");
        assert!(site.selectors.code_selector.is_none());
        assert_eq!(
            site.selectors.index_marker.as_deref(),
            Some("div.offer-list")
        );
    }
}
