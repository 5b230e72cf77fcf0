//! Report (quotation) commands
//!
//! - `reports ls`: the report listing grouped by how recently each was created
//! - `reports filter`: reports created within a date range, optionally by flag
//! - `reports export`: the same set written to CSV or XLSX
//! - `reports add`: create a quotation for a ship
//! - `reports rm`: delete a report after confirmation

use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde_json::json;
use tracing::{debug, warn};

use super::{CommandOutput, approve, connect, interactive, open_page, report_outcome};
use crate::cli::OutputOptions;
use crate::controller::search::MIN_QUERY_CHARS;
use crate::controller::{DeleteTarget, ListController, ReportForm};
use crate::display::{page_footer, render_buckets, render_page, render_report_set};
use crate::error::{DeskError, Result};
use crate::export::{ExportFormat, default_file_name, export_reports, format_price, total_price};
use crate::filter::{DateRange, filter_by_flag};
use crate::remote::{HttpClient, ResourceClient};
use crate::types::{Certificate, Report};
use crate::utils::is_stdin_tty;

/// Fields of the quotation form as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Ship search text, resolved to one ship
    pub ship: Option<String>,
    /// IMO typed directly, skipping the lookup
    pub imo: Option<String>,
    /// Overrides the name taken from the selected ship
    pub name: Option<String>,
    pub certificate: String,
    pub certificate_number: Option<String>,
    pub kind: Option<String>,
    pub price: String,
    pub date_issuance: Option<String>,
    pub date_expire: Option<String>,
    pub date_endorsement: Option<String>,
    pub date_plan_approval: Option<String>,
}

/// Date range and flag shared by `filter` and `export`
#[derive(Debug, Clone, Default)]
pub struct ReportFilterOptions {
    pub start: Option<String>,
    pub end: Option<String>,
    pub flag: Option<String>,
}

impl ReportFilterOptions {
    async fn fetch<C: ResourceClient>(&self, client: &C) -> Result<(DateRange, Vec<Report>)> {
        let range = DateRange::parse(self.start.as_deref(), self.end.as_deref())?;
        let reports = client.filter_reports(&range).await?;
        let reports = match self.flag.as_deref() {
            Some(flag) => filter_by_flag(reports, flag),
            None => reports,
        };
        debug!(count = reports.len(), "filtered report set");
        Ok((range, reports))
    }
}

/// List reports grouped by recency
pub async fn cmd_reports_ls(page: u32, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let mut reports: ListController<Report> = ListController::new();
    open_page(&mut reports, &client, page).await?;

    let store = reports.store();
    let mut text = match reports.buckets() {
        Some(buckets) => render_buckets(buckets),
        None => render_page(reports.items(), "No reports found"),
    };
    text.push('\n');
    text.push_str(&page_footer(store));

    let grouped: serde_json::Map<String, serde_json::Value> = reports
        .buckets()
        .map(|buckets| {
            buckets
                .iter()
                .map(|(bucket, items)| (bucket.key().to_string(), json!(items)))
                .collect()
        })
        .unwrap_or_default();

    CommandOutput::new(json!({
        "page": store.current_page(),
        "total_pages": store.total_pages(),
        "total": store.total(),
        "categorizedReports": grouped,
    }))
    .with_text(text)
    .print(output)
}

/// Show reports created within a date range
pub async fn cmd_reports_filter(filter: ReportFilterOptions, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let (range, reports) = filter.fetch(&client).await?;

    CommandOutput::new(json!({
        "start": range.start.to_string(),
        "end": range.end.to_string(),
        "flag": filter.flag,
        "count": reports.len(),
        "total": total_price(&reports),
        "reports": reports,
    }))
    .with_text(render_report_set(&range.heading(), &reports))
    .print(output)
}

/// Write the filtered report set to a spreadsheet
pub async fn cmd_reports_export(
    filter: ReportFilterOptions,
    format: ExportFormat,
    path: Option<PathBuf>,
    output: OutputOptions,
) -> Result<()> {
    let client = connect()?;
    let (range, reports) = filter.fetch(&client).await?;

    let path = path.unwrap_or_else(|| PathBuf::from(default_file_name(&range, format)));
    let summary = export_reports(&reports, format, &path)?;

    CommandOutput::new(json!({
        "action": "exported",
        "format": format.to_string(),
        "path": summary.path.to_string_lossy(),
        "rows": summary.rows,
        "total": summary.total,
    }))
    .with_text(format!(
        "{} Exported {} report(s) to {} (total {})",
        "✓".green(),
        summary.rows,
        summary.path.display().cyan(),
        format_price(summary.total)
    ))
    .print(output)
}

/// Resolve `--ship` to a single ship, asking when several match
async fn pick_ship(
    client: &HttpClient,
    form: &mut ReportForm,
    query: &str,
    output: OutputOptions,
) -> Result<()> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Err(DeskError::Validation(format!(
            "ship search must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    form.ship_search.type_query(client, query.trim()).await?;
    let found = form.ship_search.suggestions();

    let index = match found.len() {
        0 => {
            return Err(DeskError::Validation(format!(
                "no ship matches '{}'",
                query.trim()
            )));
        }
        1 => 0,
        n if output.json || !is_stdin_tty() => {
            return Err(DeskError::Validation(format!(
                "'{}' matches {n} ships; refine the search or pass --imo",
                query.trim()
            )));
        }
        _ => {
            let options: Vec<String> = found
                .iter()
                .map(|ship| format!("{} (IMO {})", ship.name, ship.imo))
                .collect();
            interactive::select_option("Select ship", &options, Some(0))?
        }
    };

    form.select_ship(index);
    Ok(())
}

/// Match the certificate against the catalogue, keeping the typed name when
/// the catalogue is unavailable or has no such entry
async fn resolve_certificate(client: &HttpClient, name: &str) -> String {
    if name.trim().is_empty() {
        return String::new();
    }
    let mut certs: ListController<Certificate> = ListController::new();
    if let Err(err) = certs.mount(client).await {
        warn!(error = %err, "could not load certificate catalogue");
        return name.to_string();
    }
    match certs
        .items()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    {
        Some(known) => known.name.clone(),
        None => {
            warn!(certificate = %name, "certificate is not in the catalogue");
            name.to_string()
        }
    }
}

/// Create a quotation
pub async fn cmd_reports_add(options: ReportOptions, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let mut form = ReportForm::default();

    match (options.ship.as_deref(), options.imo.as_deref()) {
        (Some(query), _) => pick_ship(&client, &mut form, query, output).await?,
        (None, Some(imo)) => {
            form.ship_search.set_query(imo.trim());
        }
        (None, None) => {
            return Err(DeskError::Validation(
                "a ship is required: pass --ship or --imo".to_string(),
            ));
        }
    }

    if let Some(name) = options.name {
        form.ship_name = name;
    }
    form.certificate = resolve_certificate(&client, &options.certificate).await;
    form.certificate_number = options.certificate_number.unwrap_or_default();
    form.kind = options.kind.unwrap_or_default();
    form.price = options.price;
    form.date_issuance = options.date_issuance.unwrap_or_default();
    form.date_expire = options.date_expire.unwrap_or_default();
    form.date_endorsement = options.date_endorsement.unwrap_or_default();
    form.date_plan_approval = options.date_plan_approval.unwrap_or_default();

    let mut reports: ListController<Report> = ListController::new();
    let outcome = reports.submit(&client, &mut form).await;
    report_outcome(&reports, outcome, "created", output)
}

/// Delete a report by uid
pub async fn cmd_reports_rm(uid: &str, yes: bool, output: OutputOptions) -> Result<()> {
    let mut reports: ListController<Report> = ListController::new();
    reports.request_delete(DeleteTarget::new(uid, format!("report {uid}")));

    if !approve(&format!("Delete report {uid}"), yes, output)? {
        reports.cancel_delete();
        println!("Cancelled");
        return Ok(());
    }

    let client = connect()?;
    let outcome = reports.confirm_delete(&client).await;
    report_outcome(&reports, outcome, "deleted", output)
}
