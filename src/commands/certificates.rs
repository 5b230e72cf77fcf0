//! Certificate catalogue commands

use serde_json::json;

use super::{CommandOutput, connect, open_page, report_outcome};
use crate::cli::OutputOptions;
use crate::controller::{CertificateForm, ListController};
use crate::display::{page_footer, render_page};
use crate::error::Result;
use crate::filter::fuzzy_filter;
use crate::types::Certificate;

pub async fn cmd_certs_ls(page: u32, filter: Option<&str>, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let mut certs: ListController<Certificate> = ListController::new();
    open_page(&mut certs, &client, page).await?;

    let shown: Vec<Certificate> = match filter {
        Some(query) => fuzzy_filter(certs.items(), query)
            .into_iter()
            .map(|scored| scored.item)
            .collect(),
        None => certs.items().to_vec(),
    };

    let store = certs.store();
    let mut text = render_page(&shown, "No certificates found");
    text.push('\n');
    text.push_str(&page_footer(store));

    CommandOutput::new(json!({
        "page": store.current_page(),
        "total_pages": store.total_pages(),
        "total": store.total(),
        "certificates": shown,
    }))
    .with_text(text)
    .print(output)
}

pub async fn cmd_certs_add(name: &str, output: OutputOptions) -> Result<()> {
    let client = connect()?;
    let mut form = CertificateForm {
        name: name.to_string(),
    };
    let mut certs: ListController<Certificate> = ListController::new();

    let outcome = certs.submit(&client, &mut form).await;
    report_outcome(&certs, outcome, "created", output)
}
