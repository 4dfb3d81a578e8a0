use std::path::Path;

use anyhow::Context;
use serde_json::json;
use upnqr_core::split_payload;

use crate::commands::{field_rows, read_file, rows_to_json};
use crate::output::{CommandOutput, OutputHandler};
use crate::CliError;

/// Editors and shell redirection append a line break after the checksum.
fn strip_line_break(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

pub fn run(file: &Path, output: &mut dyn OutputHandler) -> Result<CommandOutput, CliError> {
    output.progress(&format!("inspecting {}", file.display()));

    let bytes = read_file(file)?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not UTF-8 text", file.display()))?;
    let parsed = split_payload(strip_line_break(&text))?;

    let rows = field_rows(parsed.lines.iter().skip(1).map(String::as_str));
    output.display_order(&rows);

    Ok(CommandOutput::success(
        "inspect",
        format!("payload is well formed (checksum {:03})", parsed.checksum),
        Vec::new(),
        Some(json!({
            "checksum": parsed.checksum,
            "lines": parsed.lines,
            "fields": rows_to_json(&rows),
        })),
    ))
}
