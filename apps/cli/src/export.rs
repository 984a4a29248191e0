//! Workbook export.

use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};

use bondscope_core::{BondRow, Error, Report, ReportCell, Result, REPORT_HEADERS};

fn output_error(e: XlsxError) -> Error {
    Error::Output(e.to_string())
}

fn write_sheet(
    sheet: &mut Worksheet,
    rows: &[BondRow],
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (col, cell) in row.cells().into_iter().enumerate() {
            match cell {
                ReportCell::Text(text) => {
                    sheet.write_string_with_format(line, col as u16, text, format)?
                }
                ReportCell::Number(number) => {
                    sheet.write_number_with_format(line, col as u16, number, format)?
                }
            };
        }
    }

    sheet.autofit();
    Ok(())
}

/// Writes both report sheets to `path`, replacing any existing file.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let format = Format::new().set_align(FormatAlign::Center);

    for (name, rows) in report.sheets() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(output_error)?;
        write_sheet(sheet, rows, &format).map_err(output_error)?;
    }

    workbook.save(path).map_err(output_error)
}
