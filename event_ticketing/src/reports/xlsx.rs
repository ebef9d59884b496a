// event_ticketing/src/reports/xlsx.rs

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::warn;

use super::report::{RegistrationReport, TABLE_HEADER};
use crate::errors::{AppError, Result as AppResult};

pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Registrations";
const HEADER_ROW: u32 = 4;

fn xlsx_error(err: XlsxError) -> AppError {
  warn!(error = %err, "Building spreadsheet failed.");
  AppError::Transport(format!("Building spreadsheet failed: {}", err))
}

/// One sheet: the summary in rows 1-3, a blank row, then the bold-headed attendee table.
pub fn render_report(report: &RegistrationReport) -> AppResult<Vec<u8>> {
  let mut workbook = Workbook::new();
  let bold = Format::new().set_bold();
  {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    sheet.write_string_with_format(0, 0, "Event:", &bold).map_err(xlsx_error)?;
    sheet.write_string(0, 1, &report.title).map_err(xlsx_error)?;
    sheet.write_string_with_format(1, 0, "Date:", &bold).map_err(xlsx_error)?;
    sheet.write_string(1, 1, &report.date).map_err(xlsx_error)?;
    sheet
      .write_string_with_format(2, 0, "Total Registrations:", &bold)
      .map_err(xlsx_error)?;
    sheet.write_number(2, 1, report.total as f64).map_err(xlsx_error)?;

    for (col, title) in (0u16..).zip(TABLE_HEADER) {
      sheet
        .write_string_with_format(HEADER_ROW, col, title, &bold)
        .map_err(xlsx_error)?;
    }
    for (row, entry) in (HEADER_ROW + 1..).zip(&report.rows) {
      for (col, cell) in (0u16..).zip(entry.cells()) {
        sheet.write_string(row, col, cell).map_err(xlsx_error)?;
      }
    }
    sheet.autofit();
  }
  workbook.save_to_buffer().map_err(xlsx_error)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reports::ReportRow;

  #[test]
  fn renders_a_zip_container() {
    let report = RegistrationReport {
      title: "Meetup".to_string(),
      date: "2026-03-14".to_string(),
      total: 1,
      rows: vec![ReportRow {
        user_name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        phone: "N/A".to_string(),
        payment_status: "Pending".to_string(),
        transaction_id: "N/A".to_string(),
      }],
    };
    let bytes = render_report(&report).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(report.xlsx_file_name(), "Event_Meetup_Registrations.xlsx");
  }

  #[test]
  fn empty_report_still_renders() {
    let report = RegistrationReport {
      title: "Quiet".to_string(),
      date: "2026-03-14".to_string(),
      total: 0,
      rows: Vec::new(),
    };
    assert!(render_report(&report).unwrap().starts_with(b"PK"));
  }
}
