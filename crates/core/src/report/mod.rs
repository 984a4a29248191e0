pub mod report_model;
pub mod report_service;

pub use report_model::{Report, ReportCell, REPORT_HEADERS};
pub use report_service::build_report;
