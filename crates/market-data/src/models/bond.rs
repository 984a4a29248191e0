use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::quotation::{int64_from_json, MoneyValue, Quotation};

/// Sector tag the gateway uses for sovereign debt.
pub const SECTOR_GOVERNMENT: &str = "government";

/// Sector tag the gateway uses for regional and city debt.
pub const SECTOR_MUNICIPAL: &str = "municipal";

/// Issuer risk classification as reported by the broker.
///
/// Decoding never fails: unknown or non-string values become
/// [`RiskLevel::Unspecified`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    #[default]
    #[serde(rename = "RISK_LEVEL_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "RISK_LEVEL_LOW")]
    Low,
    #[serde(rename = "RISK_LEVEL_MODERATE")]
    Moderate,
    #[serde(rename = "RISK_LEVEL_HIGH")]
    High,
}

impl RiskLevel {
    fn from_wire(value: &str) -> Self {
        match value {
            "RISK_LEVEL_LOW" => Self::Low,
            "RISK_LEVEL_MODERATE" => Self::Moderate,
            "RISK_LEVEL_HIGH" => Self::High,
            _ => Self::Unspecified,
        }
    }

    /// Label written to the report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Низкий",
            Self::Moderate => "Средний",
            Self::High => "Высокий",
            Self::Unspecified => "Не оценен",
        }
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::from_wire).unwrap_or_default())
    }
}

/// Debt instrument descriptor, read-only after it is fetched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondInstrument {
    #[serde(default)]
    pub figi: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub class_code: String,
    #[serde(default)]
    pub isin: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub nominal: MoneyValue,
    /// Accrued coupon income per bond.
    #[serde(default)]
    pub aci_value: MoneyValue,
    #[serde(default)]
    pub coupon_quantity_per_year: i32,
    #[serde(default)]
    pub maturity_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub buy_available_flag: bool,
    #[serde(default)]
    pub floating_coupon_flag: bool,
    #[serde(default)]
    pub amortization_flag: bool,
    #[serde(default)]
    pub for_qual_investor_flag: bool,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl BondInstrument {
    pub fn nominal_value(&self) -> Decimal {
        self.nominal.to_decimal()
    }

    pub fn accrued_income(&self) -> Decimal {
        self.aci_value.to_decimal()
    }

    pub fn is_government(&self) -> bool {
        self.sector == SECTOR_GOVERNMENT
    }

    /// Government and municipal debt are reported together and never rating-queried.
    pub fn is_state_sector(&self) -> bool {
        self.sector == SECTOR_GOVERNMENT || self.sector == SECTOR_MUNICIPAL
    }
}

/// One scheduled coupon payment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponEvent {
    #[serde(default)]
    pub figi: String,
    pub coupon_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "int64_from_json")]
    pub coupon_number: i64,
    #[serde(default)]
    pub pay_one_bond: MoneyValue,
}

impl CouponEvent {
    pub fn amount(&self) -> Decimal {
        self.pay_one_bond.to_decimal()
    }
}

/// Latest traded price, quoted in percent of nominal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPrice {
    #[serde(default)]
    pub figi: String,
    #[serde(default)]
    pub price: Quotation,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bond_instrument_parsing() {
        let json = r#"{
            "figi": "BBG00QXGFHS6",
            "ticker": "SU26233RMFS5",
            "classCode": "TQOB",
            "isin": "RU000A101F94",
            "name": "ОФЗ 26233",
            "currency": "rub",
            "sector": "government",
            "nominal": {"currency": "rub", "units": "1000", "nano": 0},
            "aciValue": {"currency": "rub", "units": "12", "nano": 300000000},
            "couponQuantityPerYear": 2,
            "maturityDate": "2035-07-18T00:00:00Z",
            "buyAvailableFlag": true,
            "riskLevel": "RISK_LEVEL_LOW"
        }"#;

        let bond: BondInstrument = serde_json::from_str(json).unwrap();
        assert_eq!(bond.ticker, "SU26233RMFS5");
        assert_eq!(bond.nominal_value(), dec!(1000));
        assert_eq!(bond.accrued_income(), dec!(12.3));
        assert_eq!(bond.coupon_quantity_per_year, 2);
        assert!(bond.buy_available_flag);
        assert!(!bond.floating_coupon_flag);
        assert!(bond.maturity_date.is_some());
        assert_eq!(bond.risk_level, RiskLevel::Low);
        assert!(bond.is_government());
        assert!(bond.is_state_sector());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let bond: BondInstrument = serde_json::from_str(r#"{"figi": "X"}"#).unwrap();
        assert!(bond.maturity_date.is_none());
        assert_eq!(bond.risk_level, RiskLevel::Unspecified);
        assert_eq!(bond.nominal_value(), Decimal::ZERO);
    }

    #[test]
    fn test_municipal_is_state_sector_but_not_government() {
        let bond = BondInstrument {
            sector: SECTOR_MUNICIPAL.to_string(),
            ..Default::default()
        };
        assert!(!bond.is_government());
        assert!(bond.is_state_sector());
    }

    #[test]
    fn test_coupon_event_parsing() {
        let json = r#"{
            "figi": "BBG00QXGFHS6",
            "couponDate": "2025-01-22T00:00:00Z",
            "couponNumber": "11",
            "payOneBond": {"currency": "rub", "units": "35", "nano": 150000000}
        }"#;
        let event: CouponEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.amount(), dec!(35.15));
        assert_eq!(event.coupon_number, 11);
    }

    #[test]
    fn test_unknown_risk_level_is_unspecified() {
        for raw in [r#""RISK_LEVEL_NEW_VALUE""#, "2", "null"] {
            let json = format!(r#"{{"figi": "X", "riskLevel": {}}}"#, raw);
            let bond: BondInstrument = serde_json::from_str(&json).unwrap();
            assert_eq!(bond.risk_level, RiskLevel::Unspecified, "{raw}");
        }
    }

    #[test]
    fn test_risk_labels() {
        assert_eq!(RiskLevel::High.label(), "Высокий");
        assert_eq!(RiskLevel::Unspecified.label(), "Не оценен");
    }
}
