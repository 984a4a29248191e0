pub mod pipeline_model;
pub mod pipeline_service;

pub use pipeline_model::{BondRow, ScreeningRun, SheetGroup};
pub use pipeline_service::BondScreener;
