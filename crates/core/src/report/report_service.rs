use log::debug;

use crate::pipeline::{BondRow, SheetGroup};
use crate::report::Report;

/// Splits rows into the government and corporate sheets and sorts each by
/// annual yield, highest first; ties keep their screening order.
///
/// With `clear`, corporate bonds that no agency rates are dropped.
pub fn build_report(rows: Vec<BondRow>, clear: bool) -> Report {
    let (mut government, mut corporate): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| row.group == SheetGroup::Government);

    if clear {
        let before = corporate.len();
        corporate.retain(|row| !row.ratings.all_not_rated());
        debug!("Dropped {} unrated corporate bonds", before - corporate.len());
    }

    government.sort_by(|a, b| b.annual_yield.cmp(&a.annual_yield));
    corporate.sort_by(|a, b| b.annual_yield.cmp(&a.annual_yield));

    Report {
        government,
        corporate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::{IssuerRatings, RatingOutcome, TaxIdOutcome};
    use crate::report::{ReportCell, REPORT_HEADERS};
    use crate::valuation::YieldToMaturity;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn unrated() -> IssuerRatings {
        IssuerRatings {
            acra: RatingOutcome::NotRated,
            nra: RatingOutcome::NotRated,
            nkr: RatingOutcome::NotRated,
            tax_id: TaxIdOutcome::Found("1".to_string()),
        }
    }

    fn row(ticker: &str, annual_yield: Decimal, group: SheetGroup, ratings: IssuerRatings) -> BondRow {
        BondRow {
            name: format!("Bond {}", ticker),
            ticker: ticker.to_string(),
            dirty_price: dec!(1000),
            coupon: dec!(40),
            annual_yield,
            yield_to_maturity: YieldToMaturity::NotAvailable,
            coupons_per_year: 2,
            years_to_maturity: dec!(3.0),
            duration: dec!(2.8),
            ratings,
            risk_level: "Низкий".to_string(),
            sector: "Финансы".to_string(),
            group,
        }
    }

    #[test]
    fn test_split_and_sort_descending() {
        let rows = vec![
            row("G1", dec!(8.0), SheetGroup::Government, IssuerRatings::not_applicable()),
            row("C1", dec!(9.5), SheetGroup::Corporate, unrated()),
            row("G2", dec!(10.1), SheetGroup::Government, IssuerRatings::not_applicable()),
            row("C2", dec!(12.0), SheetGroup::Corporate, unrated()),
        ];

        let report = build_report(rows, false);

        let gov: Vec<_> = report.government.iter().map(|r| r.ticker.as_str()).collect();
        let corp: Vec<_> = report.corporate.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(gov, vec!["G2", "G1"]);
        assert_eq!(corp, vec!["C2", "C1"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = vec![
            row("A", dec!(7.0), SheetGroup::Corporate, unrated()),
            row("B", dec!(7.0), SheetGroup::Corporate, unrated()),
            row("C", dec!(7.00), SheetGroup::Corporate, unrated()),
        ];
        let report = build_report(rows, false);
        let tickers: Vec<_> = report.corporate.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_clear_drops_only_fully_unrated_corporates() {
        let partly_rated = IssuerRatings {
            nra: RatingOutcome::Rated("A|ru|".to_string()),
            ..unrated()
        };
        let failed = IssuerRatings {
            acra: RatingOutcome::LookupFailed("503".to_string()),
            ..unrated()
        };
        let rows = vec![
            row("G1", dec!(8.0), SheetGroup::Government, IssuerRatings::not_applicable()),
            row("C1", dec!(9.0), SheetGroup::Corporate, unrated()),
            row("C2", dec!(8.0), SheetGroup::Corporate, partly_rated),
            row("C3", dec!(7.0), SheetGroup::Corporate, failed),
        ];

        let report = build_report(rows, true);

        assert_eq!(report.government.len(), 1);
        let corp: Vec<_> = report.corporate.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(corp, vec!["C2", "C3"]);
    }

    #[test]
    fn test_cells_follow_headers() {
        let r = row("C1", dec!(7.9), SheetGroup::Corporate, unrated());
        let cells = r.cells();
        assert_eq!(cells.len(), REPORT_HEADERS.len());
        assert_eq!(cells[1], ReportCell::Text("C1".to_string()));
        assert_eq!(cells[4], ReportCell::Number(7.9));
        assert_eq!(cells[5], ReportCell::Text("Н/д".to_string()));
        assert_eq!(cells[9], ReportCell::Text("Не оценен".to_string()));
    }

    #[test]
    fn test_sheet_names() {
        let report = Report::default();
        let names: Vec<_> = report.sheets().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Государственные", "Корпоративные"]);
    }
}
