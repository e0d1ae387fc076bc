//! clap command tree for the `keystone` binary.

use clap::{value_parser, Arg, ArgAction, Command};

fn path_arg() -> Arg {
    Arg::new("path")
        .required(true)
        .help("Path of the XID file")
}

fn xid_arg() -> Arg {
    Arg::new("xid")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Transaction id")
}

/// Build the top-level command.
pub fn build_cli() -> Command {
    Command::new("keystone")
        .about("Inspect and drive Keystone XID files")
        .subcommand_required(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .subcommand(
            Command::new("create")
                .about("Create an empty XID file")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the transaction count and every status")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("begin")
                .about("Allocate a transaction id")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("commit")
                .about("Mark a transaction committed")
                .arg(path_arg())
                .arg(xid_arg()),
        )
        .subcommand(
            Command::new("abort")
                .about("Mark a transaction aborted")
                .arg(path_arg())
                .arg(xid_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Print the status of one transaction")
                .arg(path_arg())
                .arg(xid_arg()),
        )
}
