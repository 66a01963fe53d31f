// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kurdocx: command-line PDF to Word converter.
//
// Builds one frozen configuration per invocation and runs one conversion.
// Any failure is caught here once, translated to a plain-language message,
// and ends the process with a non-zero status.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use kurdocx_core::error::ConvertError;
use kurdocx_core::human_errors::{Severity, humanize_error};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        report_failure(&err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Doctor { config } => commands::doctor::run(config.as_deref()),
        Commands::Config { write } => commands::settings::config(write.as_deref()),
        Commands::Languages => commands::settings::languages(),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn report_failure(err: &anyhow::Error) {
    error!(error = %err, "conversion failed");
    for cause in err.chain().skip(1) {
        error!(cause = %cause, "caused by");
    }

    match err.downcast_ref::<ConvertError>() {
        Some(convert_err) => {
            let human = humanize_error(convert_err);
            let heading = match human.severity {
                Severity::ActionRequired => "Action required",
                Severity::Permanent => "Conversion failed",
                Severity::Transient => "Conversion failed, worth another try",
            };
            eprintln!("{heading}: {}", human.message);
            eprintln!("{}", human.suggestion);
        }
        None => eprintln!("Conversion failed: {err:#}"),
    }
}
