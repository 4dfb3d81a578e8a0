use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, Luma};
use qrcode::bits::Bits;
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};
use serde::Serialize;

use crate::charset::{encode_iso_8859_2, ISO_8859_2_ECI};
use crate::error::{Result, UpnError};
use crate::order::PaymentOrder;

pub const DEFAULT_QR_SIZE: u32 = 400;
/// UPN QR symbols are always version 15 with medium error correction.
pub const UPN_QR_VERSION: i16 = 15;
pub const UPN_EC_LEVEL: EcLevel = EcLevel::M;
const QUIET_ZONE_MODULES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Svg,
    Eps,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Svg, OutputFormat::Eps];

    /// Parse a format hint such as `"svg"` or `".PNG"`.
    pub fn from_hint(hint: &str) -> Result<Self> {
        let normalized = hint.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "eps" => Ok(Self::Eps),
            _ => Err(UpnError::UnsupportedFormat(hint.trim().to_string())),
        }
    }

    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_hint(extension).map_err(|_| {
            UpnError::UnsupportedFormat(format!(
                "{} (supported extensions: .png, .svg, .eps)",
                path.display()
            ))
        })
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Eps => "eps",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Eps => "application/postscript",
        }
    }
}

/// Build the QR symbol for a payload: ISO-8859-2 bytes behind an ECI header.
pub fn encode_symbol(payload: &str) -> Result<QrCode> {
    let bytes = encode_iso_8859_2(payload)?;
    let ec_level = UPN_EC_LEVEL;

    let encode_err = |err: QrError| UpnError::Render(format!("failed to encode QR data: {err}"));
    let mut bits = Bits::new(Version::Normal(UPN_QR_VERSION));
    bits.push_eci_designator(ISO_8859_2_ECI).map_err(encode_err)?;
    bits.push_byte_data(&bytes).map_err(encode_err)?;
    bits.push_terminator(ec_level).map_err(encode_err)?;

    QrCode::with_bits(bits, ec_level)
        .map_err(|err| UpnError::Render(format!("failed to build QR symbol: {err}")))
}

/// Render a payload to image bytes in the requested format.
pub fn render(payload: &str, format: OutputFormat, size: u32) -> Result<Vec<u8>> {
    let code = encode_symbol(payload)?;
    tracing::debug!(
        format = format.extension(),
        size,
        modules = code.width(),
        "rendering UPN QR symbol"
    );

    match format {
        OutputFormat::Png => render_png(&code, size),
        OutputFormat::Svg => Ok(render_svg(&code, size).into_bytes()),
        OutputFormat::Eps => Ok(render_eps(&code, size).into_bytes()),
    }
}

fn render_png(code: &QrCode, size: u32) -> Result<Vec<u8>> {
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .dark_color(Luma([0u8]))
        .light_color(Luma([255u8]))
        .quiet_zone(true)
        .build();

    let (width, height) = image.dimensions();
    let raw = image.into_raw();
    let mut png_bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut png_bytes, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(&raw, width, height, image::ColorType::L8.into())
        .map_err(|err| UpnError::Render(format!("failed to encode PNG bytes: {err}")))?;

    Ok(png_bytes)
}

fn render_svg(code: &QrCode, size: u32) -> String {
    code.render::<svg::Color>()
        .min_dimensions(size, size)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .quiet_zone(true)
        .build()
}

fn render_eps(code: &QrCode, size: u32) -> String {
    let modules = code.width();
    let total = modules + 2 * QUIET_ZONE_MODULES;
    let scale = f64::from(size) / total as f64;
    let colors = code.to_colors();

    let mut eps = String::new();
    eps.push_str("%!PS-Adobe-3.0 EPSF-3.0\n");
    eps.push_str("%%Creator: upnqr\n");
    let _ = writeln!(eps, "%%BoundingBox: 0 0 {size} {size}");
    eps.push_str("%%EndComments\n");
    eps.push_str("/F { rectfill } def\n");
    let _ = writeln!(eps, "1 setgray 0 0 {size} {size} F");
    eps.push_str("0 setgray\n");

    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let column = index % modules + QUIET_ZONE_MODULES;
        let row = index / modules + QUIET_ZONE_MODULES;
        // PostScript's origin is bottom-left.
        let x = column as f64 * scale;
        let y = f64::from(size) - (row + 1) as f64 * scale;
        let _ = writeln!(eps, "{x:.3} {y:.3} {scale:.3} {scale:.3} F");
    }

    eps.push_str("%%EOF\n");
    eps
}

/// Output format and edge length in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            size: DEFAULT_QR_SIZE,
        }
    }
}

impl RenderOptions {
    /// Options for writing to `path`. An explicit `format` hint wins over the
    /// file extension.
    pub fn for_path(path: &Path, format: Option<&str>, size: u32) -> Result<Self> {
        let format = match format {
            Some(hint) => OutputFormat::from_hint(hint)?,
            None => OutputFormat::from_path(path)?,
        };
        if size == 0 {
            return Err(UpnError::InvalidSize(size));
        }
        Ok(Self { format, size })
    }
}

/// Serialize `order` and render it.
pub fn render_order(order: &PaymentOrder, format: OutputFormat, size: u32) -> Result<Vec<u8>> {
    let payload = order.serialize()?;
    render(&payload, format, size)
}

/// Serialize `order`, render it in the format named by the path extension and
/// write the image to `path`.
pub fn write_qr_file(order: &PaymentOrder, path: &Path, size: u32) -> Result<OutputFormat> {
    let options = RenderOptions::for_path(path, None, size)?;
    write_with_options(order, path, options)?;
    Ok(options.format)
}

/// Render `order` with explicit options and write it to `path`. Returns the
/// number of bytes written.
pub fn write_with_options(
    order: &PaymentOrder,
    path: &Path,
    options: RenderOptions,
) -> Result<usize> {
    let bytes = render_order(order, options.format, options.size)?;
    fs::write(path, &bytes)?;
    tracing::info!(
        path = %path.display(),
        format = options.format.extension(),
        bytes = bytes.len(),
        "wrote UPN QR code"
    );
    Ok(bytes.len())
}
