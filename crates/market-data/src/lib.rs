//! Bondscope Market Data Crate
//!
//! Typed access to the brokerage market-data gateway used by the bond
//! screener.
//!
//! # Overview
//!
//! - Fixed-point wire amounts ([`Quotation`], [`MoneyValue`]) decoded to
//!   [`rust_decimal::Decimal`]
//! - Bond, coupon and price models
//! - The [`InvestGateway`] trait and its REST implementation
//! - A [`Retrier`] with exponential backoff and pluggable sleep/jitter
//!
//! # Core Types
//!
//! - [`BondInstrument`] - Instrument descriptor as listed by the gateway
//! - [`CouponEvent`] - One scheduled coupon payment
//! - [`LastPrice`] - Latest traded price, in percent of nominal
//! - [`GatewayError`] - Gateway failures, classified by [`RetryClass`]

pub mod errors;
pub mod gateway;
pub mod models;
pub mod retry;

pub use errors::{GatewayError, RetryClass, RetryExhausted};
pub use gateway::{InvestGateway, RestGateway, RestGatewayConfig};
pub use models::{
    BondInstrument, CouponEvent, LastPrice, MoneyValue, Quotation, RiskLevel, SECTOR_GOVERNMENT,
    SECTOR_MUNICIPAL,
};
pub use retry::{
    FixedJitter, Jitter, RandomJitter, RecordingSleeper, Retrier, RetryPolicy, Retryable, Sleeper,
    TokioSleeper,
};
