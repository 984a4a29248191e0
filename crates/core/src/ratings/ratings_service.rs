use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, warn};

use bondscope_market_data::BondInstrument;
use bondscope_ratings::{
    AcraSource, CachedRatingSource, CachedTaxIdLookup, HttpFetch, RatingSource,
    RegistryTaxIdLookup, ReqwestFetcher, SpreadsheetSource, TaxIdLookup,
};

use crate::errors::Result;
use crate::ratings::{IssuerRatings, RatingOutcome, TaxIdOutcome};
use crate::settings::ScreenerSettings;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Collects the three agency ratings for an issuer.
///
/// Failures of a single source are folded into that field's outcome and
/// never fail the whole lookup.
pub struct RatingService {
    acra: Arc<dyn RatingSource>,
    nra: Arc<dyn RatingSource>,
    nkr: Arc<dyn RatingSource>,
    tax_ids: Arc<dyn TaxIdLookup>,
}

impl RatingService {
    pub fn new(
        acra: Arc<dyn RatingSource>,
        nra: Arc<dyn RatingSource>,
        nkr: Arc<dyn RatingSource>,
        tax_ids: Arc<dyn TaxIdLookup>,
    ) -> Self {
        Self {
            acra,
            nra,
            nkr,
            tax_ids,
        }
    }

    /// Live sources behind run-lifetime caches. `today` drives the
    /// spreadsheet freshness check.
    pub fn from_settings(settings: &ScreenerSettings, today: NaiveDate) -> Result<Self> {
        let fetcher: Arc<dyn HttpFetch> =
            Arc::new(ReqwestFetcher::new(HTTP_TIMEOUT, settings.accept_invalid_certs)?);
        let dir = settings.ratings_dir.as_path();

        Ok(Self::new(
            Arc::new(CachedRatingSource::new(AcraSource::new(
                fetcher.clone(),
                settings.api_delay,
            ))),
            Arc::new(CachedRatingSource::new(SpreadsheetSource::nra(
                fetcher.clone(),
                dir,
                today,
            ))),
            Arc::new(CachedRatingSource::new(SpreadsheetSource::nkr(
                fetcher.clone(),
                dir,
                today,
            ))),
            Arc::new(CachedTaxIdLookup::new(RegistryTaxIdLookup::new(fetcher))),
        ))
    }

    /// Ratings for `bond`. Government and municipal issuers are not queried.
    pub async fn rate(&self, bond: &BondInstrument) -> IssuerRatings {
        if bond.is_state_sector() {
            return IssuerRatings::not_applicable();
        }

        let acra = lookup(self.acra.as_ref(), &bond.isin).await;

        let (nra, nkr, tax_id) = match self.tax_ids.resolve(&bond.isin).await {
            Ok(Some(tax_id)) => (
                lookup(self.nra.as_ref(), &tax_id).await,
                lookup(self.nkr.as_ref(), &tax_id).await,
                TaxIdOutcome::Found(tax_id),
            ),
            Ok(None) => {
                debug!("No taxpayer id for {}", bond.isin);
                (
                    RatingOutcome::NotApplicable,
                    RatingOutcome::NotApplicable,
                    TaxIdOutcome::Missing,
                )
            }
            Err(e) => {
                warn!("Taxpayer id lookup failed for {}: {}", bond.isin, e);
                let reason = e.to_string();
                (
                    RatingOutcome::TaxIdFailed(reason.clone()),
                    RatingOutcome::TaxIdFailed(reason.clone()),
                    TaxIdOutcome::Failed(reason),
                )
            }
        };

        IssuerRatings {
            acra,
            nra,
            nkr,
            tax_id,
        }
    }
}

async fn lookup(source: &dyn RatingSource, key: &str) -> RatingOutcome {
    match source.lookup(key).await {
        Ok(rating) => rating.into(),
        Err(e) => {
            warn!("{} lookup failed for {}: {}", source.id(), key, e);
            RatingOutcome::LookupFailed(e.to_string())
        }
    }
}
