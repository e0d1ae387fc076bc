//! Output rendering for human and JSON modes.

use crate::exec::Output;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Render a successful result.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(output)
            .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e)),
        OutputMode::Human => format_human(output),
    }
}

/// Render an error message.
pub fn format_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({ "error": message }).to_string(),
        OutputMode::Human => format!("(error) {}", message),
    }
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Created { path } => format!("created {}", path),
        Output::Began { xid } => format!("{}", xid),
        Output::Finalized { xid, status } => format!("{} {}", xid, status),
        Output::Status { xid, status } => format!("{} {}", xid, status),
        Output::Inspection {
            path,
            xid_count,
            transactions,
        } => {
            let mut lines = vec![format!("{}: {} transactions", path, xid_count)];
            lines.extend(
                transactions
                    .iter()
                    .map(|row| format!("{:>8}  {}", row.xid, row.status)),
            );
            lines.join("\n")
        }
    }
}
