//! Issuer taxpayer id (ИНН) lookup through the national ISIN registry.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::Result;
use crate::fetch::HttpFetch;
use crate::source::TaxIdLookup;

pub const REGISTRY_URL: &str = "https://www.isin.ru/ru/ru_isin/db/";

const ISSUE_LINK_MARKER: &str = "index.php?type=issue_id";
const TAX_ID_LABEL: &str = "ИНН";
/// How far past the label the id may start; the label cell is followed by markup.
const TAX_ID_WINDOW: usize = 256;

pub struct RegistryTaxIdLookup {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
}

impl RegistryTaxIdLookup {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            fetcher,
            base_url: REGISTRY_URL.to_string(),
        }
    }
}

/// Relative link to the issuer page, if the search found one.
fn issue_link(page: &str) -> Option<String> {
    let start = page.find(ISSUE_LINK_MARKER)?;
    let link = &page[start..];
    let end = link.find('"').unwrap_or(link.len());
    Some(link[..end].replace("&amp;", "&"))
}

/// First run of digits shortly after the taxpayer id label.
fn tax_id(page: &str) -> Option<String> {
    let start = page.find(TAX_ID_LABEL)? + TAX_ID_LABEL.len();
    let window: String = page[start..].chars().take(TAX_ID_WINDOW).collect();
    let digits: String = window
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

#[async_trait]
impl TaxIdLookup for RegistryTaxIdLookup {
    async fn resolve(&self, isin: &str) -> Result<Option<String>> {
        let form = [
            ("from_code", "isin"),
            ("input_from_isin", isin),
            ("isin_code_state", "Y"),
            ("cfi_code_state", "Y"),
            ("search", "1"),
        ];
        let search = self
            .fetcher
            .post_form(&self.base_url, &form)
            .await?
            .require_ok(&self.base_url)?;

        let Some(link) = issue_link(&search.text()) else {
            debug!("Registry has no issuer page for {}", isin);
            return Ok(None);
        };

        let issuer_url = format!("{}{}", self.base_url, link);
        let issuer = self
            .fetcher
            .get(&issuer_url, &[])
            .await?
            .require_ok(&issuer_url)?;

        let id = tax_id(&issuer.text());
        if id.is_none() {
            debug!("Issuer page for {} carries no taxpayer id", isin);
        }
        Ok(id)
    }
}
