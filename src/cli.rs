use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;

use crate::controller::ShipForm;
use crate::controller::forms::REPORT_TYPES;
use crate::export::ExportFormat;
use crate::filter::FLAG_OPTIONS;
use crate::types::VALID_SHIP_KINDS;

#[derive(Parser)]
#[command(name = "certdesk")]
#[command(about = "Ship certification and quotation desk")]
#[command(version)]
pub struct Cli {
    /// Log requests and controller decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// How a command renders its result
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

impl OutputOptions {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the ship register
    #[command(visible_alias = "s")]
    Ships {
        #[command(subcommand)]
        action: ShipAction,
    },

    /// Manage the certificate catalogue
    #[command(visible_alias = "c")]
    Certs {
        #[command(subcommand)]
        action: CertAction,
    },

    /// Manage quotations
    #[command(visible_alias = "r")]
    Reports {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ShipAction {
    /// List one page of ships
    Ls {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1", value_parser = parse_page)]
        page: u32,

        /// Fuzzy filter over the loaded page
        #[arg(short, long)]
        filter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search ships by name or IMO
    Search {
        /// At least two characters of a name or IMO
        term: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a ship
    Add {
        /// IMO number
        #[arg(long)]
        imo: String,

        /// Ship name
        #[arg(long)]
        name: String,

        /// Type: Ship or Company (default: Ship)
        #[arg(short = 't', long = "type", value_parser = parse_ship_kind)]
        kind: Option<String>,

        /// Flag state
        #[arg(long)]
        flag: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a ship
    Rm {
        /// Ship uid
        uid: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CertAction {
    /// List one page of certificates
    Ls {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1", value_parser = parse_page)]
        page: u32,

        /// Fuzzy filter over the loaded page
        #[arg(short, long)]
        filter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a certificate to the catalogue
    Add {
        /// Certificate name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
pub struct RangeArgs {
    /// First creation date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last creation date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Only reports whose ship flies this flag
    #[arg(long, ignore_case = true, value_parser = clap::builder::PossibleValuesParser::new(FLAG_OPTIONS))]
    pub flag: Option<String>,
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// List reports grouped by creation date
    Ls {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1", value_parser = parse_page)]
        page: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show reports created within a date range
    Filter {
        #[command(flatten)]
        range: RangeArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export reports created within a date range
    Export {
        #[command(flatten)]
        range: RangeArgs,

        /// File format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Destination file (default: reports_<start>_<end>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a quotation
    Add {
        /// Search text for the ship (name or IMO)
        #[arg(long, conflicts_with = "imo")]
        ship: Option<String>,

        /// IMO number, used as typed
        #[arg(long)]
        imo: Option<String>,

        /// Ship name (default: the selected ship's name)
        #[arg(long)]
        name: Option<String>,

        /// Certificate name
        #[arg(long)]
        certificate: String,

        /// Certificate number
        #[arg(long)]
        certificate_number: Option<String>,

        /// Report type: Full Term or Interim (default: Full Term)
        #[arg(short = 't', long = "type", value_parser = parse_report_type)]
        kind: Option<String>,

        /// Quoted price
        #[arg(long)]
        price: String,

        /// Issuance date (YYYY-MM-DD)
        #[arg(long)]
        issued: Option<String>,

        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires: Option<String>,

        /// Endorsement date (YYYY-MM-DD)
        #[arg(long)]
        endorsed: Option<String>,

        /// Plan approval date (YYYY-MM-DD)
        #[arg(long)]
        plan_approved: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a report
    Rm {
        /// Report uid
        uid: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api.url, api.timeout, api.connect_timeout, auth.token)
        key: String,
        /// Value to set
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (api.url, api.timeout, api.connect_timeout, auth.token)
        key: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_page(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("invalid page '{s}', pages start at 1")),
        Ok(page) => Ok(page),
    }
}

fn parse_ship_kind(s: &str) -> Result<String, String> {
    VALID_SHIP_KINDS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(s))
        .map(|k| k.to_string())
        .ok_or_else(|| {
            format!(
                "Invalid type. Must be one of: {}",
                VALID_SHIP_KINDS.join(", ")
            )
        })
}

fn parse_report_type(s: &str) -> Result<String, String> {
    REPORT_TYPES
        .iter()
        .find(|k| k.eq_ignore_ascii_case(s))
        .map(|k| k.to_string())
        .ok_or_else(|| format!("Invalid type. Must be one of: {}", REPORT_TYPES.join(", ")))
}

impl From<RangeArgs> for crate::commands::ReportFilterOptions {
    fn from(args: RangeArgs) -> Self {
        Self {
            start: args.start,
            end: args.end,
            flag: args.flag,
        }
    }
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            ReportOptions, cmd_certs_add, cmd_certs_ls, cmd_config_get, cmd_config_set,
            cmd_config_show, cmd_reports_add, cmd_reports_export, cmd_reports_filter,
            cmd_reports_ls, cmd_reports_rm, cmd_ships_add, cmd_ships_ls, cmd_ships_rm,
            cmd_ships_search,
        };

        match self {
            Commands::Ships { action } => match action {
                ShipAction::Ls { page, filter, json } => {
                    cmd_ships_ls(page, filter.as_deref(), OutputOptions::new(json)).await
                }
                ShipAction::Search { term, json } => {
                    cmd_ships_search(&term, OutputOptions::new(json)).await
                }
                ShipAction::Add {
                    imo,
                    name,
                    kind,
                    flag,
                    json,
                } => {
                    let form = ShipForm {
                        imo,
                        name,
                        kind: kind.unwrap_or_default(),
                        flag,
                    };
                    cmd_ships_add(form, OutputOptions::new(json)).await
                }
                ShipAction::Rm { uid, yes, json } => {
                    cmd_ships_rm(&uid, yes, OutputOptions::new(json)).await
                }
            },

            Commands::Certs { action } => match action {
                CertAction::Ls { page, filter, json } => {
                    cmd_certs_ls(page, filter.as_deref(), OutputOptions::new(json)).await
                }
                CertAction::Add { name, json } => {
                    cmd_certs_add(&name, OutputOptions::new(json)).await
                }
            },

            Commands::Reports { action } => match action {
                ReportAction::Ls { page, json } => {
                    cmd_reports_ls(page, OutputOptions::new(json)).await
                }
                ReportAction::Filter { range, json } => {
                    cmd_reports_filter(range.into(), OutputOptions::new(json)).await
                }
                ReportAction::Export {
                    range,
                    format,
                    output,
                    json,
                } => {
                    cmd_reports_export(range.into(), format, output, OutputOptions::new(json))
                        .await
                }
                ReportAction::Add {
                    ship,
                    imo,
                    name,
                    certificate,
                    certificate_number,
                    kind,
                    price,
                    issued,
                    expires,
                    endorsed,
                    plan_approved,
                    json,
                } => {
                    let options = ReportOptions {
                        ship,
                        imo,
                        name,
                        certificate,
                        certificate_number,
                        kind,
                        price,
                        date_issuance: issued,
                        date_expire: expires,
                        date_endorsement: endorsed,
                        date_plan_approval: plan_approved,
                    };
                    cmd_reports_add(options, OutputOptions::new(json)).await
                }
                ReportAction::Rm { uid, yes, json } => {
                    cmd_reports_rm(&uid, yes, OutputOptions::new(json)).await
                }
            },

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(OutputOptions::new(json)),
                ConfigAction::Set { key, value, json } => {
                    cmd_config_set(&key, &value, OutputOptions::new(json))
                }
                ConfigAction::Get { key, json } => {
                    cmd_config_get(&key, OutputOptions::new(json))
                }
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "certdesk", &mut io::stdout());
}
