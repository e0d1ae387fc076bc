//! Keystone CLI: inspect and drive XID files.
//!
//! ```text
//! keystone create <PATH>
//! keystone inspect <PATH> [--json]
//! keystone begin <PATH>
//! keystone commit <PATH> <XID>
//! keystone abort <PATH> <XID>
//! keystone status <PATH> <XID>
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod commands;
mod exec;
mod format;
mod parse;

use std::process;

use commands::build_cli;
use format::{format_error, format_output, OutputMode};
use parse::matches_to_action;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let result = matches_to_action(&matches).and_then(exec::execute);
    let code = match result {
        Ok(output) => {
            println!("{}", format_output(&output, mode));
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    };
    process::exit(code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
