//! Gateway trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::GatewayError;
use crate::models::{BondInstrument, CouponEvent, LastPrice};

/// A session with the brokerage market-data gateway.
///
/// One session is opened per run and shared by every call. Implementations
/// must tolerate [`close`](Self::close) being called more than once.
#[async_trait]
pub trait InvestGateway: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &'static str;

    /// Lists every bond the broker knows about.
    async fn list_bonds(&self) -> Result<Vec<BondInstrument>, GatewayError>;

    /// Latest traded price for each of `figis`.
    ///
    /// Instruments without a trade may be missing from the result.
    async fn get_last_prices(&self, figis: &[String]) -> Result<Vec<LastPrice>, GatewayError>;

    /// Coupon events for `figi` dated within `[from, to]`, ordered by date.
    async fn get_bond_coupons(
        &self,
        figi: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CouponEvent>, GatewayError>;

    /// Ends the session.
    async fn close(&self);
}
