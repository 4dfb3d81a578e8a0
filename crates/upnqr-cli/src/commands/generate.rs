use std::path::Path;

use serde_json::json;
use upnqr_core::qr::{write_with_options, RenderOptions};

use crate::commands::read_order_file;
use crate::output::{CommandOutput, OutputHandler};
use crate::CliError;

pub fn run(
    file: &Path,
    out: &Path,
    size: u32,
    format: Option<&str>,
    output: &mut dyn OutputHandler,
) -> Result<CommandOutput, CliError> {
    let options = RenderOptions::for_path(out, format, size)?;
    let order = read_order_file(file)?;

    output.progress(&format!(
        "rendering {} QR code to {}",
        options.format.extension(),
        out.display()
    ));
    let bytes = write_with_options(&order, out, options)?;

    Ok(CommandOutput::success(
        "generate",
        format!("wrote {} ({bytes} bytes)", out.display()),
        Vec::new(),
        Some(json!({
            "path": out.to_string_lossy(),
            "format": options.format,
            "mimeType": options.format.mime_type(),
            "size": options.size,
            "bytes": bytes,
        })),
    ))
}
