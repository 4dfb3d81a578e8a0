use std::path::Path;

use serde_json::json;

use crate::commands::{order_rows, read_order_file, rows_to_json};
use crate::output::{CommandOutput, OutputHandler};
use crate::CliError;

pub fn run(file: &Path, output: &mut dyn OutputHandler) -> Result<CommandOutput, CliError> {
    output.progress(&format!("validating {}", file.display()));

    let order = read_order_file(file)?;
    let rows = order_rows(&order)?;
    output.display_order(&rows);

    Ok(CommandOutput::success(
        "validate",
        "order is valid",
        Vec::new(),
        Some(json!({
            "valid": true,
            "fields": rows_to_json(&rows),
        })),
    ))
}
