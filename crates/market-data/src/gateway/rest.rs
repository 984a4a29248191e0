//! REST binding of the brokerage gateway.
//!
//! Every method is a `POST {base}{Service}/{Method}` with a JSON body and a
//! bearer token. Failures come back as `{"code": .., "message": ..}` where
//! code 13 marks an internal service fault.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::InvestGateway;
use crate::errors::GatewayError;
use crate::models::{BondInstrument, CouponEvent, LastPrice};

pub const DEFAULT_BASE_URL: &str =
    "https://invest-public-api.tinkoff.ru/rest/tinkoff.public.invest.api.contract.v1.";
const GATEWAY_ID: &str = "TINVEST_REST";
const APP_NAME: &str = "bondscope";

const BONDS: &str = "InstrumentsService/Bonds";
const BOND_COUPONS: &str = "InstrumentsService/GetBondCoupons";
const LAST_PRICES: &str = "MarketDataService/GetLastPrices";

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BondsRequest<'a> {
    instrument_status: &'a str,
}

#[derive(Debug, Serialize)]
struct LastPricesRequest<'a> {
    figi: &'a [String],
}

#[derive(Debug, Serialize)]
struct BondCouponsRequest<'a> {
    figi: &'a str,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct BondsResponse {
    #[serde(default)]
    instruments: Vec<BondInstrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastPricesResponse {
    #[serde(default)]
    last_prices: Vec<LastPrice>,
}

#[derive(Debug, Deserialize)]
struct BondCouponsResponse {
    #[serde(default)]
    events: Vec<CouponEvent>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
    #[serde(default)]
    description: String,
}

// ============================================================================
// Gateway
// ============================================================================

#[derive(Clone, Debug)]
pub struct RestGatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RestGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct RestGateway {
    client: Client,
    token: String,
    base_url: String,
    closed: AtomicBool,
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base_url", &self.base_url)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl RestGateway {
    /// Opens a session authenticated with `token`.
    pub fn connect(token: impl Into<String>, config: RestGatewayConfig) -> Result<Self, GatewayError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(GatewayError::Unauthorized);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(APP_NAME)
            .build()?;

        info!("Opened gateway session at {}", config.base_url);

        Ok(Self {
            client,
            token,
            base_url: config.base_url,
            closed: AtomicBool::new(false),
        })
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GatewayError::Closed);
        }

        let url = format!("{}{}", self.base_url, method);
        debug!("Gateway request: {}", method);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("x-app-name", APP_NAME)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(GatewayError::Unauthorized);
        }

        if !status.is_success() {
            return Err(error_from_body(method, status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to decode {} response: {}", method, e);
            GatewayError::Malformed {
                endpoint: method.to_string(),
                message: e.to_string(),
            }
        })
    }
}

fn error_from_body(method: &str, status: reqwest::StatusCode, body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if err.code != 0 => {
            let message = if err.description.is_empty() {
                err.message
            } else {
                format!("{} ({})", err.message, err.description)
            };
            GatewayError::from_code(err.code, message)
        }
        _ => GatewayError::Api {
            code: i32::from(status.as_u16()),
            message: format!("{} returned HTTP {} - {}", method, status, body),
        },
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl InvestGateway for RestGateway {
    fn id(&self) -> &'static str {
        GATEWAY_ID
    }

    async fn list_bonds(&self) -> Result<Vec<BondInstrument>, GatewayError> {
        let response: BondsResponse = self
            .call(
                BONDS,
                &BondsRequest {
                    instrument_status: "INSTRUMENT_STATUS_BASE",
                },
            )
            .await?;
        debug!("Gateway listed {} bonds", response.instruments.len());
        Ok(response.instruments)
    }

    async fn get_last_prices(&self, figis: &[String]) -> Result<Vec<LastPrice>, GatewayError> {
        if figis.is_empty() {
            return Ok(Vec::new());
        }
        let response: LastPricesResponse = self
            .call(LAST_PRICES, &LastPricesRequest { figi: figis })
            .await?;
        Ok(response.last_prices)
    }

    async fn get_bond_coupons(
        &self,
        figi: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CouponEvent>, GatewayError> {
        let response: BondCouponsResponse = self
            .call(
                BOND_COUPONS,
                &BondCouponsRequest {
                    figi,
                    from: timestamp(from),
                    to: timestamp(to),
                },
            )
            .await?;

        let mut events = response.events;
        events.sort_by_key(|e| e.coupon_date);
        Ok(events)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Closed gateway session");
        }
    }
}
