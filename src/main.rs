use std::process::ExitCode;

use clap::Parser;
use log::debug;
use telomemore::command::Commands;
use telomemore::runtime;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    runtime::setup_global_logger();
    let mut cli = Cli::parse();
    debug!("Running {:?}", cli.command);

    if let Err(e) = cli.command.try_execute() {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
