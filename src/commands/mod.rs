mod certificates;
mod config;
pub mod interactive;
mod reports;
mod ships;

pub use certificates::{cmd_certs_add, cmd_certs_ls};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use reports::{
    ReportFilterOptions, ReportOptions, cmd_reports_add, cmd_reports_export, cmd_reports_filter,
    cmd_reports_ls, cmd_reports_rm,
};
pub use ships::{cmd_ships_add, cmd_ships_ls, cmd_ships_rm, cmd_ships_search};

use owo_colors::OwoColorize;
use serde_json::{Value, json};

use crate::cli::OutputOptions;
use crate::config::Config;
use crate::controller::{ListController, Notice, SubmissionOutcome};
use crate::error::{DeskError, Result};
use crate::remote::{HttpClient, RemoteEntity, ResourceClient};
use crate::utils::is_stdin_tty;

/// A command result in both renderings
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print the JSON form when `--json` is set, the text form otherwise
    pub fn print(self, output: OutputOptions) -> Result<()> {
        if output.json {
            return print_json(&self.json);
        }
        match self.text {
            Some(text) => println!("{text}"),
            None => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// HTTP client for the configured backend
pub(crate) fn connect() -> Result<HttpClient> {
    let config = Config::load()?;
    HttpClient::from_config(&config)
}

/// Load page `page` of a collection through its controller
pub(crate) async fn open_page<C, T>(
    controller: &mut ListController<T>,
    client: &C,
    page: u32,
) -> Result<()>
where
    C: ResourceClient,
    T: RemoteEntity,
{
    controller.mount(client).await?;
    if page != 1 {
        controller.go_to(client, page).await?;
    }
    Ok(())
}

/// Ask before a destructive action unless `yes` was given.
///
/// Returns `Ok(false)` when the operator declines. Without a terminal to ask
/// on, the action is refused rather than assumed.
pub(crate) fn approve(prompt: &str, yes: bool, output: OutputOptions) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if output.json || !is_stdin_tty() {
        return Err(DeskError::ConfirmationRequired(format!(
            "{prompt} requires --yes in non-interactive contexts"
        )));
    }
    interactive::confirm(prompt)
}

/// Turn the outcome of a create or delete into command output.
///
/// Failures become errors so the process exits non-zero with the server's
/// reason.
pub(crate) fn report_outcome<T: RemoteEntity>(
    controller: &ListController<T>,
    outcome: SubmissionOutcome,
    action: &str,
    output: OutputOptions,
) -> Result<()> {
    match outcome {
        SubmissionOutcome::Succeeded(message) => {
            let notice = controller
                .notice()
                .cloned()
                .unwrap_or_else(|| Notice::success(message.clone()));
            CommandOutput::new(json!({
                "resource": T::RESOURCE.name(),
                "action": action,
                "success": true,
                "message": message,
            }))
            .with_text(format!("{} {}", "✓".green(), notice.message))
            .print(output)
        }
        SubmissionOutcome::Failed(failure) => Err(DeskError::from(failure)),
        SubmissionOutcome::Ignored => Err(DeskError::Validation(format!(
            "{action} was not performed"
        ))),
    }
}
