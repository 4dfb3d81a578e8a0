use std::path::Path;

use serde_json::json;
use upnqr_core::payload::checksum;
use upnqr_core::MAX_PAYLOAD_CHARS;

use crate::commands::read_order_file;
use crate::output::{CommandOutput, OutputHandler};
use crate::CliError;

pub fn run(file: &Path, output: &mut dyn OutputHandler) -> Result<CommandOutput, CliError> {
    output.progress(&format!("serializing {}", file.display()));

    let order = read_order_file(file)?;
    let payload = order.serialize()?;
    let chars = checksum(&payload);

    let mut details = Vec::new();
    if chars > MAX_PAYLOAD_CHARS {
        details.push(format!(
            "payload has {chars} characters, above the {MAX_PAYLOAD_CHARS} character UPN QR limit"
        ));
    }

    Ok(CommandOutput::success(
        "serialize",
        format!("payload serialized ({chars} characters)"),
        details,
        Some(json!({
            "payload": payload,
            "chars": chars,
        })),
    )
    .with_body(payload))
}
