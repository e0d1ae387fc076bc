//! ArgMatches → Action conversion.

use clap::ArgMatches;
use std::path::PathBuf;

/// A parsed CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create { path: PathBuf },
    Inspect { path: PathBuf },
    Begin { path: PathBuf },
    Commit { path: PathBuf, xid: u64 },
    Abort { path: PathBuf, xid: u64 },
    Status { path: PathBuf, xid: u64 },
}

/// Translate clap matches into an [`Action`].
pub fn matches_to_action(matches: &ArgMatches) -> Result<Action, String> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| "missing command".to_string())?;

    let path = sub
        .get_one::<String>("path")
        .map(PathBuf::from)
        .ok_or_else(|| format!("{}: missing path", name))?;
    let xid = || {
        sub.get_one::<u64>("xid")
            .copied()
            .ok_or_else(|| format!("{}: missing xid", name))
    };

    match name {
        "create" => Ok(Action::Create { path }),
        "inspect" => Ok(Action::Inspect { path }),
        "begin" => Ok(Action::Begin { path }),
        "commit" => Ok(Action::Commit { path, xid: xid()? }),
        "abort" => Ok(Action::Abort { path, xid: xid()? }),
        "status" => Ok(Action::Status { path, xid: xid()? }),
        other => Err(format!("unknown command: {}", other)),
    }
}
