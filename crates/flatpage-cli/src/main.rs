// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flatpage — photo in, flat page out.
//
// Entry point. Initialises logging, parses the command line, and reports
// failures in plain language.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use flatpage_core::human_errors::humanize_error;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Flatpage starting");

    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "flatpage failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}
