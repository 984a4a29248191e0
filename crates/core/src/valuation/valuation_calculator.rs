//! Bond valuation.
//!
//! All functions are pure: the caller fixes `now` once per run so that two
//! valuations of the same inputs are identical.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use bondscope_market_data::{BondInstrument, CouponEvent, Quotation};

use crate::constants::{
    DAYS_PER_YEAR, MATURITY_SLACK_DAYS, MIN_COUPON_HORIZON_DAYS, TAX_RETENTION,
    YTM_DAYS_PER_YEAR,
};
use crate::valuation::{BondValuation, YieldToMaturity};

const SECONDS_PER_DAY: i64 = 86_400;

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// Whole days from `from` to `to`, rounded toward negative infinity.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Year fraction of `days`, rounded to `dp` places.
fn years(days: i64, dp: u32) -> Decimal {
    Decimal::from(days)
        .checked_div(DAYS_PER_YEAR)
        .map(|y| round(y, dp))
        .unwrap_or(Decimal::ZERO)
}

/// End of the coupon window for a bond maturing at `maturity`.
///
/// At least three years ahead; for bonds maturing later, one week past
/// maturity.
pub fn coupon_horizon(maturity: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let minimum = now + Duration::days(MIN_COUPON_HORIZON_DAYS);
    match maturity {
        Some(maturity) if maturity > now => maturity
            .checked_add_signed(Duration::days(MATURITY_SLACK_DAYS))
            .unwrap_or(maturity)
            .max(minimum),
        _ => minimum,
    }
}

/// `round(0.87 * next_coupon * coupons_per_year / dirty_price, 3) * 100`.
fn annual_yield(next_coupon: Decimal, coupons_per_year: i32, dirty_price: Decimal) -> Decimal {
    (TAX_RETENTION * next_coupon)
        .checked_mul(Decimal::from(coupons_per_year))
        .and_then(|income| income.checked_div(dirty_price))
        .and_then(|y| round(y, 3).checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Undiscounted average time to cash flows, weighted by amount.
fn duration(
    coupons: &[CouponEvent],
    nominal: Decimal,
    years_to_maturity: Decimal,
    now: DateTime<Utc>,
) -> Decimal {
    let mut flows = coupons
        .iter()
        .map(|c| (c.amount(), years(days_between(now, c.coupon_date), 2)))
        .chain(std::iter::once((nominal, years_to_maturity)));

    flows
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(weighted, income), (amount, when)| {
            Some((
                weighted.checked_add(amount.checked_mul(when)?)?,
                income.checked_add(amount)?,
            ))
        })
        .and_then(|(weighted, income)| weighted.checked_div(income))
        .map(|d| round(d, 2))
        .unwrap_or(Decimal::ZERO)
}

/// `round(0.87 * 365 * (coupons + nominal - dirty) / (days * dirty), 3) * 100`,
/// or not available when any coupon in the window is unset.
fn yield_to_maturity(
    coupons: &[CouponEvent],
    coupon_income: Decimal,
    nominal: Decimal,
    dirty_price: Decimal,
    days_to_maturity: i64,
) -> YieldToMaturity {
    if coupons.iter().any(|c| c.amount().is_zero()) {
        return YieldToMaturity::NotAvailable;
    }

    let value = coupon_income
        .checked_add(nominal)
        .and_then(|total| total.checked_sub(dirty_price))
        .and_then(|gain| (TAX_RETENTION * Decimal::from(YTM_DAYS_PER_YEAR)).checked_mul(gain))
        .zip(Decimal::from(days_to_maturity).checked_mul(dirty_price))
        .and_then(|(numerator, denominator)| numerator.checked_div(denominator))
        .and_then(|y| round(y, 3).checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO);

    YieldToMaturity::Value(value)
}

/// Values `bond` from its coupon window and last traded price.
///
/// `coupons` must be the future events in date order; the first one is taken
/// as the next payment. A missing `price` values the bond at zero. Division
/// by a zero price or a zero day count, and any overflow, yields 0 rather
/// than an error or a panic.
pub fn value_bond(
    bond: &BondInstrument,
    coupons: &[CouponEvent],
    price: Option<Quotation>,
    now: DateTime<Utc>,
) -> BondValuation {
    let nominal = bond.nominal_value();
    let clean_price = price
        .and_then(|q| (q.to_decimal() / Decimal::ONE_HUNDRED).checked_mul(nominal))
        .unwrap_or(Decimal::ZERO);
    let accrued_income = bond.accrued_income();
    let dirty_price = clean_price
        .checked_add(accrued_income)
        .unwrap_or(Decimal::ZERO);

    let next_coupon = coupons.first().map(CouponEvent::amount).unwrap_or(Decimal::ZERO);
    let coupon_income = coupons
        .iter()
        .try_fold(Decimal::ZERO, |total, c| total.checked_add(c.amount()))
        .unwrap_or(Decimal::ZERO);

    let days_to_maturity = bond
        .maturity_date
        .map(|maturity| days_between(now, maturity))
        .unwrap_or(0);
    let years_to_maturity = years(days_to_maturity, 1);

    BondValuation {
        clean_price,
        accrued_income,
        dirty_price,
        next_coupon,
        annual_yield: annual_yield(next_coupon, bond.coupon_quantity_per_year, dirty_price),
        yield_to_maturity: yield_to_maturity(
            coupons,
            coupon_income,
            nominal,
            dirty_price,
            days_to_maturity,
        ),
        years_to_maturity,
        days_to_maturity,
        duration: duration(coupons, nominal, years_to_maturity, now),
        coupon_income,
    }
}
