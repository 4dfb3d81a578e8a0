//! ISO-8859-2 transcoding for the QR symbol.
//!
//! UPN scanners read the symbol as Latin-2 (ECI 4), so the payload is
//! converted before encoding and never stored as anything but UTF-8.

use encoding_rs::ISO_8859_2;

use crate::error::{Result, UpnError};

/// ECI assignment number for ISO-8859-2.
pub const ISO_8859_2_ECI: u32 = 4;

fn is_mappable(ch: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_unmappable) = ISO_8859_2.encode(ch.encode_utf8(&mut buf));
    !had_unmappable
}

pub fn encode_iso_8859_2(text: &str) -> Result<Vec<u8>> {
    let (bytes, _, had_unmappable) = ISO_8859_2.encode(text);
    if had_unmappable {
        let offending = text.chars().find(|ch| !is_mappable(*ch)).unwrap_or('?');
        return Err(UpnError::Encoding(format!(
            "character '{offending}' (U+{:04X}) has no ISO-8859-2 mapping",
            offending as u32
        )));
    }
    Ok(bytes.into_owned())
}

pub fn decode_iso_8859_2(bytes: &[u8]) -> String {
    let (text, _) = ISO_8859_2.decode_without_bom_handling(bytes);
    text.into_owned()
}
