//! Batch screening of every bond the gateway lists.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use bondscope_market_data::{
    BondInstrument, InvestGateway, Quotation, Retrier, RetryPolicy, Sleeper,
};

use crate::bonds::filter_eligible;
use crate::errors::Result;
use crate::pipeline::{BondRow, ScreeningRun};
use crate::ratings::RatingService;
use crate::settings::ScreenerSettings;
use crate::valuation::{coupon_horizon, value_bond};

/// Runs the screen: list, filter, price, value and rate every bond in turn.
///
/// Bonds are processed one at a time with a pause after each one. A bond
/// whose processing fails is logged and skipped.
pub struct BondScreener {
    gateway: Arc<dyn InvestGateway>,
    ratings: RatingService,
    retrier: Retrier,
    sleeper: Arc<dyn Sleeper>,
    settings: ScreenerSettings,
}

impl BondScreener {
    pub fn new(
        gateway: Arc<dyn InvestGateway>,
        ratings: RatingService,
        sleeper: Arc<dyn Sleeper>,
        settings: ScreenerSettings,
    ) -> Self {
        let policy = RetryPolicy::default().with_attempts(settings.retry_attempts);
        let retrier = Retrier::with_policy(policy);
        Self::with_retrier(gateway, ratings, retrier, sleeper, settings)
    }

    pub fn with_retrier(
        gateway: Arc<dyn InvestGateway>,
        ratings: RatingService,
        retrier: Retrier,
        sleeper: Arc<dyn Sleeper>,
        settings: ScreenerSettings,
    ) -> Self {
        Self {
            gateway,
            ratings,
            retrier,
            sleeper,
            settings,
        }
    }

    /// Screens every bond as of `now`. The gateway session is closed before
    /// returning, whether or not the run succeeded.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ScreeningRun> {
        let result = self.collect(now).await;
        self.gateway.close().await;
        if let Err(e) = &result {
            error!("Screening aborted: {}", e);
        }
        result
    }

    async fn collect(&self, now: DateTime<Utc>) -> Result<ScreeningRun> {
        let started = Instant::now();
        let gateway = self.gateway.as_ref();

        info!("Listing bonds from {}", gateway.id());
        let listed = self.retrier.run("list_bonds", || gateway.list_bonds()).await?;
        let listed_count = listed.len();
        let bonds = filter_eligible(listed, &self.settings);
        info!("{} of {} bonds pass the screen", bonds.len(), listed_count);

        let mut run = ScreeningRun {
            listed: listed_count,
            eligible: bonds.len(),
            ..Default::default()
        };
        if bonds.is_empty() {
            run.elapsed = started.elapsed();
            return Ok(run);
        }

        let figis: Vec<String> = bonds.iter().map(|b| b.figi.clone()).collect();
        let prices: HashMap<String, Quotation> = self
            .retrier
            .run("get_last_prices", || gateway.get_last_prices(&figis))
            .await?
            .into_iter()
            .map(|p| (p.figi, p.price))
            .collect();

        let total = bonds.len();
        for (index, bond) in bonds.iter().enumerate() {
            match self.process(bond, prices.get(&bond.figi).copied(), now).await {
                Ok(row) => run.rows.push(row),
                Err(e) => {
                    warn!("Skipping {}: {}", bond.ticker, e);
                    run.skipped += 1;
                }
            }
            info!("Processed {}/{}", index + 1, total);
            self.sleeper.sleep(self.settings.api_delay).await;
        }

        run.elapsed = started.elapsed();
        info!(
            "Screened {} bonds: {} kept, {} skipped in {:.1}s",
            total,
            run.rows.len(),
            run.skipped,
            run.elapsed.as_secs_f64()
        );
        Ok(run)
    }

    async fn process(
        &self,
        bond: &BondInstrument,
        price: Option<Quotation>,
        now: DateTime<Utc>,
    ) -> Result<BondRow> {
        let gateway = self.gateway.as_ref();
        let horizon = coupon_horizon(bond.maturity_date, now);
        let coupons = self
            .retrier
            .run("get_bond_coupons", || {
                gateway.get_bond_coupons(&bond.figi, now, horizon)
            })
            .await?;

        let valuation = value_bond(bond, &coupons, price, now);
        let ratings = self.ratings.rate(bond).await;
        Ok(BondRow::new(bond, &valuation, ratings))
    }
}
