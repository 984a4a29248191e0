//! Gateway data models.

mod bond;
mod quotation;

pub use bond::{
    BondInstrument, CouponEvent, LastPrice, RiskLevel, SECTOR_GOVERNMENT, SECTOR_MUNICIPAL,
};
pub use quotation::{MoneyValue, Quotation, NANO_PER_UNIT};
