// agentlink - Agent identity and topology maintenance for Linux monitoring agents
// Copyright (C) 2025 agentlink Team
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use agentlink::commands::CommandRouter;
use agentlink::error::MaintenanceError;
use agentlink::{system, Args};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            eprintln!("{e}");
            let invalid = MaintenanceError::InvalidOptionProvided {
                detail: e.to_string(),
            };
            std::process::exit(invalid.exit_code());
        }
    };

    // Initialize logging: -v raises to debug, -s suppresses to errors only,
    // RUST_LOG is respected otherwise
    let log_level = if args.output.verbose {
        Level::DEBUG
    } else if args.output.suppress {
        Level::ERROR
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    // Certificate material and the config file belong to the service
    // account; only privileged (or test-mode) invocations may touch them.
    if !system::is_privileged() && !system::test_mode() {
        error!("agentlink must run as a privileged user");
        std::process::exit(MaintenanceError::NonPrivilegedUser.exit_code());
    }

    system::write_pid_file(&args.pid);

    let command = match CommandRouter::route(args) {
        Ok(command) => command,
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    info!(command = command.name(), "starting maintenance operation");
    if let Err(e) = command.execute().await {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
}
