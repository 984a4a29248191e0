use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Share of coupon income left after the 13% personal income tax.
pub const TAX_RETENTION: Decimal = dec!(0.87);

/// Days in a year for year-fraction conversions.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Days in a year for the yield-to-maturity approximation.
pub const YTM_DAYS_PER_YEAR: i64 = 365;

/// Minimum coupon look-ahead.
pub const MIN_COUPON_HORIZON_DAYS: i64 = 365 * 3;

/// Slack past maturity so the final coupon is not cut off.
pub const MATURITY_SLACK_DAYS: i64 = 7;

/// Decimal places for display prices.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Report text for an instrument a rating source does not cover.
pub const NOT_RATED_LABEL: &str = "Не оценен";

/// Report text for a lookup that was deliberately skipped.
pub const NOT_APPLICABLE_LABEL: &str = "Отсутствует";

/// Report text for a rating source that failed.
pub const LOOKUP_FAILED_LABEL: &str = "Ошибка запроса";

/// Report text for rating fields whose taxpayer id could not be resolved.
pub const TAX_ID_FAILED_LABEL: &str = "Ошибка запроса ИНН";

/// Report text for a yield to maturity that cannot be computed.
pub const NOT_AVAILABLE_LABEL: &str = "Н/д";

pub const GOVERNMENT_SHEET: &str = "Государственные";
pub const CORPORATE_SHEET: &str = "Корпоративные";
