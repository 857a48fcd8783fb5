#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod dose;
mod error_fmt;
mod interactive;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use reef_core::DosingEngine;
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    let mut file_guard = None;
    let code = match run(&cli, &mut file_guard) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            ExitCode::from(exit_code_for_error(&e))
        }
    };
    // flush the file sink before the process exits
    drop(file_guard);
    code
}

fn run(cli: &Cli, file_guard: &mut Option<WorkerGuard>) -> eyre::Result<u8> {
    let cfg = dose::load_config(cli.config.as_deref())?;
    *file_guard = logging::init_tracing(cli.log_level.as_deref(), cli.json, &cfg.logging)?;
    let table = dose::build_table(&cfg, cli.products.as_deref())?;
    let engine = DosingEngine::new(table);

    match &cli.cmd {
        Commands::Dose(args) => dose::run_dose(&engine, args, cli.json),
        Commands::Products => {
            dose::run_products(&engine, cli.json);
            Ok(0)
        }
        Commands::SuggestUnit {
            parameter,
            value,
            unit,
        } => {
            dose::run_suggest_unit(parameter, value, unit.as_deref(), cli.json)?;
            Ok(0)
        }
        Commands::Check => {
            dose::run_check(&engine, cli.json);
            Ok(0)
        }
        Commands::Interactive => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout().lock();
            interactive::run(&engine, &mut input, &mut out)?;
            Ok(0)
        }
    }
}
