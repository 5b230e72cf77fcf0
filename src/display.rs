//! Terminal rendering of pages, buckets and report sets.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::controller::bucket::BucketedCollection;
use crate::controller::store::PaginatedStore;
use crate::export::{format_date, format_price, total_price};
use crate::types::{Certificate, Entity, Report, Ship};
use crate::utils::truncate_string;

/// Widest certificate name shown in report tables
const CERTIFICATE_WIDTH: usize = 32;

#[derive(Tabled)]
struct ShipRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IMO")]
    imo: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Flag")]
    flag: String,
}

#[derive(Tabled)]
struct CertificateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Abbreviation")]
    abbreviations: String,
    #[tabled(rename = "Price")]
    price: String,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Ship")]
    name: String,
    #[tabled(rename = "IMO")]
    imo: String,
    #[tabled(rename = "Certificate")]
    certificate: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Issued")]
    issued: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Price")]
    price: String,
}

/// Rows a collection renders as
pub trait TableRows: Entity {
    fn table(items: &[Self]) -> String;
}

impl TableRows for Ship {
    fn table(items: &[Self]) -> String {
        render(items.iter().map(|s| ShipRow {
            id: s.id.to_string(),
            name: s.name.clone(),
            imo: s.imo.clone(),
            kind: s.kind.clone(),
            flag: s.flag.clone().unwrap_or_default(),
        }))
    }
}

impl TableRows for Certificate {
    fn table(items: &[Self]) -> String {
        render(items.iter().map(|c| CertificateRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            abbreviations: c.abbreviations.clone().unwrap_or_default(),
            price: c.price.map(format_price).unwrap_or_default(),
        }))
    }
}

impl TableRows for Report {
    fn table(items: &[Self]) -> String {
        render(items.iter().map(|r| ReportRow {
            id: r.id.to_string(),
            name: r.name.clone(),
            imo: r.imo.clone(),
            certificate: truncate_string(&r.certificate, CERTIFICATE_WIDTH),
            kind: r.kind.clone(),
            issued: format_date(r.date_issuance),
            created: format_date(r.created_at()),
            price: format_price(r.price_or_zero()),
        }))
    }
}

fn render<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// "Page 2 of 3 (120 records)"
pub fn page_footer<T>(store: &PaginatedStore<T>) -> String {
    format!(
        "Page {} of {} ({} records)",
        store.current_page(),
        store.last_page(),
        store.total()
    )
}

/// A page as one table, or a placeholder when empty
pub fn render_page<T: TableRows>(items: &[T], empty: &str) -> String {
    if items.is_empty() {
        return empty.dimmed().to_string();
    }
    T::table(items)
}

/// Each non-empty bucket under its title, in bucket order
pub fn render_buckets<T: TableRows>(buckets: &BucketedCollection<T>) -> String {
    let mut out = String::new();
    for (bucket, items) in buckets.iter() {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "{} {}\n",
            bucket.title().cyan().bold(),
            format!("({})", items.len()).dimmed()
        ));
        out.push_str(&T::table(items));
        out.push_str("\n\n");
    }
    if out.is_empty() {
        return "No reports found".dimmed().to_string();
    }
    out.trim_end().to_string()
}

/// A filtered report set with its heading and total
pub fn render_report_set(heading: &str, reports: &[Report]) -> String {
    let mut out = format!("{}\n", heading.bold());
    if reports.is_empty() {
        out.push_str(&"No reports in this range".dimmed().to_string());
        return out;
    }
    out.push_str(&Report::table(reports));
    out.push_str(&format!(
        "\n{} report(s), total {}",
        reports.len(),
        format_price(total_price(reports)).green()
    ));
    out
}
