// src/services/extract.rs

//! Selector-driven candidate extraction.
//!
//! Turns a parsed listing page into [`RawCandidate`]s using the site
//! manifest's CSS selectors. Selectors are parsed once per site; the
//! merchant name is resolved once per page and reused for every
//! candidate on it.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{RawCandidate, SiteConfig};
use crate::pipeline::{PageClass, PageKind};
use crate::utils::{collapse_whitespace, extract_offer_id, resolve_url};

/// Compiled extractor for one site.
pub struct CandidateExtractor {
    fixed_merchant: Option<String>,
    candidate_sel: Selector,
    title_sel: Selector,
    merchant_sel: Option<Selector>,
    code_sel: Option<Selector>,
    reveal_sel: Option<Selector>,
    description_sel: Option<Selector>,
    expired_sel: Option<Selector>,
    exclusive_sel: Option<Selector>,
    index_marker: Option<Selector>,
    detail_marker: Option<Selector>,
    link_attr: String,
    id_attr: Option<String>,
}

impl CandidateExtractor {
    /// Compile a site manifest's selectors.
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let s = &site.selectors;
        Ok(Self {
            fixed_merchant: site.merchant_name.clone(),
            candidate_sel: parse_selector(&s.candidate_selector)?,
            title_sel: parse_selector(&s.title_selector)?,
            merchant_sel: parse_optional(s.merchant_selector.as_deref())?,
            code_sel: parse_optional(s.code_selector.as_deref())?,
            reveal_sel: parse_optional(s.reveal_link_selector.as_deref())?,
            description_sel: parse_optional(s.description_selector.as_deref())?,
            expired_sel: parse_optional(s.expired_marker.as_deref())?,
            exclusive_sel: parse_optional(s.exclusive_marker.as_deref())?,
            index_marker: parse_optional(s.index_marker.as_deref())?,
            detail_marker: parse_optional(s.detail_marker.as_deref())?,
            link_attr: s.link_attr.clone(),
            id_attr: s.id_attr.clone(),
        })
    }

    /// Classify a page from the manifest's index/detail markers.
    pub fn classify(&self, document: &Html) -> PageClass {
        let index_hits = self
            .index_marker
            .as_ref()
            .map_or(0, |sel| document.select(sel).count());
        let detail_hits = self
            .detail_marker
            .as_ref()
            .map_or(0, |sel| document.select(sel).count());

        let kind = match (index_hits, detail_hits) {
            (0, 0) if self.index_marker.is_none() && self.detail_marker.is_none() => {
                // Site has no markers configured; assume listing pages.
                PageKind::Index
            }
            (0, 0) => PageKind::Unknown,
            (_, 0) => PageKind::Index,
            (0, _) => PageKind::Detail,
            // Both matched; the anomaly guard treats this as a misroute.
            (_, _) => PageKind::Unknown,
        };

        PageClass {
            kind,
            index_hits,
            detail_hits,
        }
    }

    /// Extract all candidates from a listing page.
    pub fn extract(&self, document: &Html, page_url: &Url) -> Vec<RawCandidate> {
        // Shared per-page state: the merchant resolves once.
        let merchant = self.page_merchant(document);

        document
            .select(&self.candidate_sel)
            .map(|element| self.extract_one(&element, merchant.as_deref(), page_url))
            .collect()
    }

    /// Extract the coupon code from a reveal page.
    pub fn extract_code(&self, document: &Html) -> Option<String> {
        let sel = self.code_sel.as_ref()?;
        document
            .select(sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|code| !code.is_empty())
    }

    fn page_merchant(&self, document: &Html) -> Option<String> {
        if let Some(sel) = &self.merchant_sel {
            if let Some(el) = document.select(sel).next() {
                let name = collapse_whitespace(&el.text().collect::<String>());
                if !name.is_empty() {
                    return Some(name);
                }
            }
        }
        self.fixed_merchant.clone()
    }

    fn extract_one(
        &self,
        element: &ElementRef,
        merchant: Option<&str>,
        page_url: &Url,
    ) -> RawCandidate {
        let title = element
            .select(&self.title_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let code = self
            .code_sel
            .as_ref()
            .and_then(|sel| element.select(sel).next())
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|c| !c.is_empty());

        let reveal_url = self
            .reveal_sel
            .as_ref()
            .and_then(|sel| element.select(sel).next())
            .and_then(|el| el.value().attr(&self.link_attr))
            .map(|href| resolve_url(page_url, href));

        // Prefer the markup's own ID; fall back to a numeric ID embedded
        // in the reveal link, as many sites only expose it there.
        let id_in_site = self
            .id_attr
            .as_deref()
            .and_then(|attr| element.value().attr(attr))
            .map(str::to_string)
            .filter(|id| !id.is_empty())
            .or_else(|| reveal_url.as_deref().and_then(extract_offer_id));

        let description = self
            .description_sel
            .as_ref()
            .and_then(|sel| element.select(sel).next())
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|d| !d.is_empty());

        let is_expired = self
            .expired_sel
            .as_ref()
            .is_some_and(|sel| element.select(sel).next().is_some());

        let is_exclusive = self
            .exclusive_sel
            .as_ref()
            .map(|sel| element.select(sel).next().is_some());

        RawCandidate {
            merchant_name: merchant.map(str::to_string),
            title,
            id_in_site,
            code,
            domain: None,
            reveal_url,
            description,
            terms_and_conditions: None,
            expiry_text: None,
            is_exclusive,
            is_expired,
        }
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn parse_optional(s: Option<&str>) -> Result<Option<Selector>> {
    s.map(parse_selector).transpose()
}
