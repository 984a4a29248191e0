use std::time::Duration;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use bondscope_market_data::BondInstrument;

use crate::bonds::translate_sector;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::ratings::IssuerRatings;
use crate::valuation::{BondValuation, YieldToMaturity};

/// Report sheet a row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SheetGroup {
    /// Government and municipal debt.
    Government,
    Corporate,
}

impl SheetGroup {
    pub fn of(bond: &BondInstrument) -> Self {
        if bond.is_state_sector() {
            Self::Government
        } else {
            Self::Corporate
        }
    }
}

/// One screened bond, as written to the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BondRow {
    pub name: String,
    pub ticker: String,
    /// Clean price plus accrued income, to the kopeck.
    pub dirty_price: Decimal,
    /// Next coupon payment, to the kopeck.
    pub coupon: Decimal,
    pub annual_yield: Decimal,
    pub yield_to_maturity: YieldToMaturity,
    pub coupons_per_year: i32,
    pub years_to_maturity: Decimal,
    pub duration: Decimal,
    pub ratings: IssuerRatings,
    pub risk_level: String,
    pub sector: String,
    pub group: SheetGroup,
}

fn display_round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DECIMAL_PRECISION, RoundingStrategy::MidpointNearestEven)
}

impl BondRow {
    pub fn new(bond: &BondInstrument, valuation: &BondValuation, ratings: IssuerRatings) -> Self {
        Self {
            name: bond.name.clone(),
            ticker: bond.ticker.clone(),
            dirty_price: display_round(valuation.dirty_price),
            coupon: display_round(valuation.next_coupon),
            annual_yield: valuation.annual_yield,
            yield_to_maturity: valuation.yield_to_maturity,
            coupons_per_year: bond.coupon_quantity_per_year,
            years_to_maturity: valuation.years_to_maturity,
            duration: valuation.duration,
            ratings,
            risk_level: bond.risk_level.label().to_string(),
            sector: translate_sector(&bond.sector).to_string(),
            group: SheetGroup::of(bond),
        }
    }
}

/// Outcome of one screening run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ScreeningRun {
    pub rows: Vec<BondRow>,
    /// Bonds listed by the gateway.
    pub listed: usize,
    /// Bonds that passed the screen.
    pub eligible: usize,
    /// Eligible bonds dropped because processing failed.
    pub skipped: usize,
    pub elapsed: Duration,
}
