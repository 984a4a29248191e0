use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of nano units in one whole unit.
pub const NANO_PER_UNIT: i64 = 1_000_000_000;

/// Fixed-point amount as sent by the gateway.
///
/// The value is `units + nano / 1e9`. Both parts carry the sign of the amount,
/// so `-1.5` arrives as `units = -1, nano = -500_000_000`.
///
/// The gateway encodes `units` as an int64, which proto3 JSON renders as a
/// string. Zero-valued fields are omitted entirely, so both parts default to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quotation {
    #[serde(default, deserialize_with = "int64_from_json")]
    pub units: i64,
    #[serde(default)]
    pub nano: i32,
}

impl Quotation {
    pub const ZERO: Quotation = Quotation { units: 0, nano: 0 };

    pub fn new(units: i64, nano: i32) -> Self {
        Self { units, nano }
    }

    /// Exact decimal value of this quotation.
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.units) + Decimal::new(self.nano as i64, 9)
    }

    /// Builds a quotation from a decimal, truncating below one nano.
    pub fn from_decimal(value: Decimal) -> Self {
        let units = value.trunc();
        let nano = ((value - units) * Decimal::from(NANO_PER_UNIT)).trunc();
        Self {
            units: i64::try_from(units).unwrap_or(0),
            nano: i32::try_from(nano).unwrap_or(0),
        }
    }

    pub fn is_zero(self) -> bool {
        self.units == 0 && self.nano == 0
    }
}

impl From<Quotation> for Decimal {
    fn from(q: Quotation) -> Self {
        q.to_decimal()
    }
}

impl fmt::Display for Quotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal().normalize())
    }
}

/// Monetary amount: a quotation tagged with its currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyValue {
    #[serde(default)]
    pub currency: String,
    #[serde(default, deserialize_with = "int64_from_json")]
    pub units: i64,
    #[serde(default)]
    pub nano: i32,
}

impl MoneyValue {
    pub fn quotation(&self) -> Quotation {
        Quotation::new(self.units, self.nano)
    }

    pub fn to_decimal(&self) -> Decimal {
        self.quotation().to_decimal()
    }
}

pub(crate) fn int64_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64Repr {
        Number(i64),
        Text(String),
    }

    match Int64Repr::deserialize(deserializer)? {
        Int64Repr::Number(n) => Ok(n),
        Int64Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
