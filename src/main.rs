use clap::Parser;
use std::process::ExitCode;

use certdesk::cli::Cli;
use certdesk::controller::Notice;
use certdesk::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Notice::error(e.to_string()).print();
            ExitCode::FAILURE
        }
    }
}
