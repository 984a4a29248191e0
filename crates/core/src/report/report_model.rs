use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::{CORPORATE_SHEET, GOVERNMENT_SHEET};
use crate::pipeline::BondRow;

/// Column titles, in [`BondRow::cells`] order.
pub const REPORT_HEADERS: [&str; 14] = [
    "Имя",
    "Тикер",
    "Цена_плюс_НКД",
    "Купон",
    "Годовая_доходность",
    "Доходность_к_погашению",
    "Купонов_в_год",
    "Лет_до_погашения",
    "Дюрация",
    "Рейтинг_АКРА",
    "Рейтинг_НРА",
    "Рейтинг_НКР",
    "Риск_Тинькофф",
    "Сектор",
];

#[derive(Clone, Debug, PartialEq)]
pub enum ReportCell {
    Text(String),
    Number(f64),
}

impl From<Decimal> for ReportCell {
    fn from(value: Decimal) -> Self {
        Self::Number(value.to_f64().unwrap_or_default())
    }
}

impl From<&str> for ReportCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl BondRow {
    pub fn cells(&self) -> Vec<ReportCell> {
        let ytm = match self.yield_to_maturity.value() {
            Some(v) => v.into(),
            None => ReportCell::Text(self.yield_to_maturity.to_string()),
        };
        vec![
            self.name.as_str().into(),
            self.ticker.as_str().into(),
            self.dirty_price.into(),
            self.coupon.into(),
            self.annual_yield.into(),
            ytm,
            ReportCell::Number(f64::from(self.coupons_per_year)),
            self.years_to_maturity.into(),
            self.duration.into(),
            self.ratings.acra.label().into(),
            self.ratings.nra.label().into(),
            self.ratings.nkr.label().into(),
            self.risk_level.as_str().into(),
            self.sector.as_str().into(),
        ]
    }
}

/// The two sheets of the report, each sorted by annual yield.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub government: Vec<BondRow>,
    pub corporate: Vec<BondRow>,
}

impl Report {
    /// Sheet names paired with their rows, in workbook order.
    pub fn sheets(&self) -> [(&'static str, &[BondRow]); 2] {
        [
            (GOVERNMENT_SHEET, self.government.as_slice()),
            (CORPORATE_SHEET, self.corporate.as_slice()),
        ]
    }
}
