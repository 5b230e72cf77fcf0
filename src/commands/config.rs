//! Configuration commands for managing certdesk settings.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::utils::mask_sensitive_value;

fn is_sensitive(key: &str) -> bool {
    key == "auth.token"
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.api_token().is_some();
    let effective_url = config.api_url()?;

    let json_output = json!({
        "api": {
            "url": effective_url.as_str(),
            "timeout": config.timeout_secs,
            "connect_timeout": config.connect_timeout_secs,
        },
        "auth": {
            "token_configured": token_configured,
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text.push_str(&format!("{}:\n", "api".cyan()));
    text.push_str(&format!("  url: {effective_url}\n"));
    text.push_str(&format!("  timeout: {}s\n", config.timeout_secs));
    text.push_str(&format!(
        "  connect_timeout: {}s\n",
        config.connect_timeout_secs
    ));
    text.push('\n');

    // Never print the token itself
    text.push_str(&format!("{}:\n", "auth".cyan()));
    let token_status = if token_configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    text.push_str(&format!("  token: {token_status}\n"));

    text.push('\n');
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let shown = if is_sensitive(key) {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(output)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config
        .get(key)?
        .ok_or_else(|| DeskError::Config(format!("{key} is not set")))?;

    let shown = if is_sensitive(key) {
        mask_sensitive_value(&value)
    } else {
        value
    };

    CommandOutput::new(json!({
        "key": key,
        "value": shown,
    }))
    .with_text(shown)
    .print(output)
}
