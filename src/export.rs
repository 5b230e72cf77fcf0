//! Spreadsheet export of a filtered report set.
//!
//! One row per report followed by a `Total` row summing the price column.
//! Files are written next to the destination under a hidden temporary name
//! and renamed into place once complete.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

use crate::error::{DeskError, Result};
use crate::filter::DateRange;
use crate::types::Report;

/// Column headers, in order
pub const HEADERS: [&str; 12] = [
    "ID",
    "Name",
    "IMO",
    "Certificate",
    "Certificate Number",
    "Type",
    "Date Issuance",
    "Date Expire",
    "Date Endorsement",
    "Date Plan Approval",
    "Date Created",
    "Price",
];

const PRICE_COLUMN: u16 = 11;
const SHEET_NAME: &str = "Reports";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(DeskError::Validation(format!(
                "unknown export format '{other}', expected csv or xlsx"
            ))),
        }
    }
}

/// What was written
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub total: f64,
}

/// `dd/mm/yyyy` in UTC, or `N/A`
pub fn format_date(ts: Option<Timestamp>) -> String {
    match ts {
        Some(ts) => ts.to_zoned(TimeZone::UTC).strftime("%d/%m/%Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// Dollar amount with thousands separators and two decimals
pub fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn total_price(reports: &[Report]) -> f64 {
    reports.iter().map(Report::price_or_zero).sum()
}

/// Text cells of one report row; the price cell is formatted
pub fn report_row(index: usize, report: &Report) -> [String; 12] {
    [
        index.to_string(),
        report.name.clone(),
        report.imo.clone(),
        report.certificate.clone(),
        report.certificate_number.clone().unwrap_or_default(),
        report.kind.clone(),
        format_date(report.date_issuance),
        format_date(report.date_expire),
        format_date(report.date_endorsement),
        format_date(report.date_plan_approval),
        format_date(report.date_create.or(report.created_at)),
        format_price(report.price_or_zero()),
    ]
}

fn total_row(total: f64) -> [String; 12] {
    let mut row: [String; 12] = Default::default();
    row[0] = "Total".to_string();
    row[1] = "Total".to_string();
    row[PRICE_COLUMN as usize] = format_price(total);
    row
}

/// Suggested file name for a range export
pub fn default_file_name(range: &DateRange, format: ExportFormat) -> String {
    format!(
        "reports_{}_{}.{}",
        range.start,
        range.end,
        format.extension()
    )
}

pub fn write_csv(path: &Path, reports: &[Report]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADERS)?;
    for (index, report) in reports.iter().enumerate() {
        writer.write_record(report_row(index, report))?;
    }
    writer.write_record(total_row(total_price(reports)))?;
    writer.flush()?;
    Ok(())
}

/// Prices are written as numbers with a currency format so spreadsheet
/// formulas keep working.
pub fn write_xlsx(path: &Path, reports: &[Report]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("$#,##0.00");
    let money_bold = Format::new().set_bold().set_num_format("$#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    let mut row: u32 = 1;
    for (index, report) in reports.iter().enumerate() {
        let cells = report_row(index, report);
        for (col, cell) in cells.iter().enumerate().take(PRICE_COLUMN as usize) {
            sheet.write_string(row, col as u16, cell.as_str())?;
        }
        sheet.write_number_with_format(row, PRICE_COLUMN, report.price_or_zero(), &money)?;
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "Total", &header)?;
    sheet.write_string_with_format(row, 1, "Total", &header)?;
    sheet.write_number_with_format(row, PRICE_COLUMN, total_price(reports), &money_bold)?;
    sheet.autofit();

    workbook.save(path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `reports` to `path` in `format`, replacing any existing file
pub fn export_reports(reports: &[Report], format: ExportFormat, path: &Path) -> Result<ExportSummary> {
    let temp = temp_path_for(path);
    debug!(temp = %temp.display(), %format, "writing export");

    let written = match format {
        ExportFormat::Csv => write_csv(&temp, reports),
        ExportFormat::Xlsx => write_xlsx(&temp, reports),
    };
    if let Err(err) = written {
        let _ = std::fs::remove_file(&temp);
        return Err(err);
    }
    std::fs::rename(&temp, path)?;

    let summary = ExportSummary {
        path: path.to_path_buf(),
        rows: reports.len(),
        total: total_price(reports),
    };
    info!(
        path = %summary.path.display(),
        rows = summary.rows,
        "export written"
    );
    Ok(summary)
}
