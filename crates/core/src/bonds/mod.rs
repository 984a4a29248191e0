pub mod bond_filter;
pub mod sector;

pub use bond_filter::{filter_eligible, is_eligible};
pub use sector::translate_sector;
