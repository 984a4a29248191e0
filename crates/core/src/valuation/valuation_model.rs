use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::NOT_AVAILABLE_LABEL;

/// Simplified yield to maturity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum YieldToMaturity {
    /// Percent per year.
    Value(Decimal),
    /// Some future coupon is not yet set.
    NotAvailable,
}

impl YieldToMaturity {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotAvailable => None,
        }
    }
}

impl fmt::Display for YieldToMaturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v.normalize()),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE_LABEL),
        }
    }
}

/// Metrics computed for one bond at a fixed point in time.
///
/// Prices are per bond in the bond's currency. Yields are in percent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BondValuation {
    pub clean_price: Decimal,
    pub accrued_income: Decimal,
    pub dirty_price: Decimal,
    pub next_coupon: Decimal,
    /// After-tax current yield from the next coupon.
    pub annual_yield: Decimal,
    pub yield_to_maturity: YieldToMaturity,
    pub years_to_maturity: Decimal,
    pub days_to_maturity: i64,
    /// Income-weighted average time to cash flows, undiscounted.
    pub duration: Decimal,
    /// Sum of coupon payments in the fetched horizon.
    pub coupon_income: Decimal,
}
