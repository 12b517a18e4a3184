mod app;
mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser as _;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = logging::init(&cli.log_file, cli.verbose) {
        report_startup_error(&err);
        return ExitCode::FAILURE;
    }

    match app::execute(cli).await {
        Ok(json) => {
            print_output(&json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "command failed");
            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stdout, reason = "JSON on stdout is the command's output")]
fn print_output(json: &str) {
    println!("{json}");
}

#[expect(clippy::print_stderr, reason = "no subscriber is installed yet")]
fn report_startup_error(err: &anyhow::Error) {
    eprintln!("error: {err:#}");
}
