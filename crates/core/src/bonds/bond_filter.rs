use bondscope_market_data::BondInstrument;

use crate::settings::ScreenerSettings;

/// True if `bond` passes the screen: buyable, matching the configured coupon
/// and investor flags, in the target currency, outside the excluded class and
/// paying at least one coupon a year.
pub fn is_eligible(bond: &BondInstrument, settings: &ScreenerSettings) -> bool {
    bond.buy_available_flag
        && bond.floating_coupon_flag == settings.floating_coupon
        && bond.amortization_flag == settings.amortization
        && bond.for_qual_investor_flag == settings.for_qual_investor
        && bond.currency == settings.currency
        && bond.class_code != settings.excluded_class_code
        && bond.coupon_quantity_per_year > 0
}

pub fn filter_eligible(
    bonds: Vec<BondInstrument>,
    settings: &ScreenerSettings,
) -> Vec<BondInstrument> {
    bonds
        .into_iter()
        .filter(|bond| is_eligible(bond, settings))
        .collect()
}
