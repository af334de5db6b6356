// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signwerk — command-line PDF toolbox.
//
// Entry point. Initialises logging, runs the requested subcommand, and prints
// failures in plain language.

use clap::Parser;
use signwerk_cli::Cli;
use signwerk_core::human_errors::humanize_error;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = signwerk_cli::run(cli, &mut std::io::stdout().lock()) {
        tracing::debug!(%err, "Command failed");
        let human = humanize_error(&err);
        eprintln!("{}\n{}", human.message, human.suggestion);
        std::process::exit(1);
    }
}
