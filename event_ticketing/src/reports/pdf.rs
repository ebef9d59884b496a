// event_ticketing/src/reports/pdf.rs

//! PDF rendering with `genpdf`. Fonts are loaded from the configured
//! directory on every render; a missing font surfaces as a transport error.

use super::report::{RegistrationReport, TABLE_HEADER};
use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::models::RegistrationDetails;
use crate::services::messages::long_date;
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::fonts::{self, FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Document, Size, SimplePageDecorator};
use tracing::{debug, warn};

fn pdf_error(context: &str, err: genpdf::error::Error) -> AppError {
  warn!(error = %err, "{} failed.", context);
  AppError::Transport(format!("{} failed: {}", context, err))
}

fn load_fonts(config: &AppConfig) -> AppResult<FontFamily<FontData>> {
  debug!(dir = %config.report_font_dir.display(), name = %config.report_font_name, "Loading report fonts.");
  fonts::from_files(&config.report_font_dir, &config.report_font_name, None)
    .map_err(|e| pdf_error("Loading report fonts", e))
}

fn new_document(config: &AppConfig, title: &str) -> AppResult<Document> {
  let mut doc = Document::new(load_fonts(config)?);
  doc.set_title(title);
  let mut decorator = SimplePageDecorator::new();
  decorator.set_margins(12);
  doc.set_page_decorator(decorator);
  doc.set_font_size(10);
  Ok(doc)
}

fn render(doc: Document) -> AppResult<Vec<u8>> {
  let mut out = Vec::new();
  doc.render(&mut out).map_err(|e| pdf_error("Rendering PDF", e))?;
  Ok(out)
}

fn key_value_row(table: &mut TableLayout, key: &str, value: impl Into<String>) -> AppResult<()> {
  let mut row = table.row();
  row.push_element(Paragraph::new(key));
  row.push_element(Paragraph::new(value.into()));
  row.push().map_err(|e| pdf_error("Building table row", e))
}

/// The admin attendee report, A4 portrait.
pub fn render_report(config: &AppConfig, report: &RegistrationReport) -> AppResult<Vec<u8>> {
  let mut doc = new_document(config, &format!("{} Registrations", report.title))?;

  doc.push(Paragraph::default().styled_string(report.title.clone(), Style::default().with_font_size(18)));
  doc.push(Break::new(1));

  let mut summary = TableLayout::new(vec![3, 7]);
  key_value_row(&mut summary, "Date:", report.date.clone())?;
  key_value_row(&mut summary, "Total Registrations:", report.total.to_string())?;
  doc.push(summary);
  doc.push(Break::new(2));

  let mut table = TableLayout::new(vec![3, 4, 2, 2, 4]);
  table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
  let mut header = table.row();
  for title in TABLE_HEADER {
    header.push_element(Paragraph::default().styled_string(title, Style::default().bold()));
  }
  header.push().map_err(|e| pdf_error("Building table header", e))?;

  for entry in &report.rows {
    let mut row = table.row();
    for cell in entry.cells() {
      row.push_element(Paragraph::new(cell));
    }
    row.push().map_err(|e| pdf_error("Building table row", e))?;
  }
  doc.push(table);

  render(doc)
}

/// A single A5 ticket for a paid registration.
pub fn render_ticket(config: &AppConfig, details: &RegistrationDetails) -> AppResult<Vec<u8>> {
  let RegistrationDetails { registration, event, user } = details;
  let mut doc = new_document(config, &format!("Ticket {}", registration.id))?;
  doc.set_paper_size(Size::new(148, 210));

  doc.push(Paragraph::default().styled_string(event.title.clone(), Style::default().with_font_size(16)));
  doc.push(Break::new(1));

  let mut table = TableLayout::new(vec![2, 5]);
  key_value_row(&mut table, "Attendee:", user.name.clone())?;
  key_value_row(&mut table, "Email:", user.email.clone())?;
  key_value_row(&mut table, "Date:", long_date(event.date))?;
  key_value_row(&mut table, "Ticket No.:", registration.id.to_string())?;
  key_value_row(&mut table, "Amount:", event.price_display())?;
  key_value_row(&mut table, "Payment:", registration.payment_status.to_string())?;
  key_value_row(
    &mut table,
    "Transaction:",
    registration.transaction_id.clone().unwrap_or_else(|| "N/A".to_string()),
  )?;
  doc.push(table);

  render(doc)
}

pub fn ticket_file_name(details: &RegistrationDetails) -> String {
  format!(
    "Ticket_{}_{}.pdf",
    super::report::file_safe(&details.event.title),
    details.registration.id
  )
}
