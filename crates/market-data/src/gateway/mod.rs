//! Market-data gateway abstraction and its REST implementation.

mod rest;
mod traits;

pub use rest::{RestGateway, RestGatewayConfig, DEFAULT_BASE_URL};
pub use traits::InvestGateway;
