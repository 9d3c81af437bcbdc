//! # Tabloid command-line entry point
//!
//! ```text
//! main()
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Resolve configuration (defaults < file < env < flags)
//!   ├─> Initialize logging
//!   └─> Execute the subcommand, mapping failures to an exit status
//! ```
//!
//! ```bash
//! tabloid init
//! tabloid run --on-file-error skip
//! tabloid profile uploads/orders.csv
//! tabloid report
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::Parser as _;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return cli::exit_code(&err);
        }
    };

    if let Err(err) = tabloid::logging::init(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("Warning: {err:#}");
    }
    if let Some(dir) = &config.log_dir {
        tracing::debug!(path = %tabloid::logging::current_log_path(dir).display(), "Writing log file");
    }

    match cli::run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("Error: {err:#}");
            cli::exit_code(&err)
        }
    }
}
