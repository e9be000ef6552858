//! `i18n-keysync` command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use i18n_keysync::cli::Cli;
use i18n_keysync::error::EXIT_OK;
use i18n_keysync::{
    commands,
    logging,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_file.as_deref());

    match commands::run(cli).await {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::from(error.exit_code())
        }
    }
}
