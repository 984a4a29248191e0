pub mod valuation_calculator;
pub mod valuation_model;

pub use valuation_calculator::{coupon_horizon, days_between, value_bond};
pub use valuation_model::{BondValuation, YieldToMaturity};
