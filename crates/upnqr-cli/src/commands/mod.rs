pub mod generate;
pub mod inspect;
pub mod serialize;
pub mod validate;

use std::path::Path;

use serde_json::{Map, Value};
use upnqr_core::payload::payload_lines;
use upnqr_core::{Field, OrderInput, PaymentOrder};

use crate::output::FieldRow;
use crate::CliError;

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an order document and apply it to a fresh order.
pub(crate) fn read_order_file(path: &Path) -> Result<PaymentOrder, CliError> {
    let bytes = read_file(path)?;
    let input = OrderInput::from_json(&bytes)?;
    tracing::debug!(path = %path.display(), "loaded order document");
    input.build().map_err(CliError::InvalidOrder)
}

/// Pair each field with the line it occupies in a payload.
pub(crate) fn field_rows<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<FieldRow> {
    Field::ALL
        .into_iter()
        .zip(values)
        .map(|(field, value)| FieldRow {
            field,
            label: field.label(),
            value: value.to_string(),
        })
        .collect()
}

/// Normalized payload values of a complete order, one row per field.
pub(crate) fn order_rows(order: &PaymentOrder) -> Result<Vec<FieldRow>, CliError> {
    let lines = payload_lines(order)?;
    Ok(field_rows(lines.iter().skip(1).map(String::as_str)))
}

pub(crate) fn rows_to_json(rows: &[FieldRow]) -> Value {
    let mut fields = Map::new();
    for row in rows {
        fields.insert(row.field.to_string(), Value::String(row.value.clone()));
    }
    Value::Object(fields)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) const VALID_ORDER: &str = r#"{
        "payerIban": "SI56 0201 7001 4356 205",
        "deposit": true,
        "payerName": "Janez Novak",
        "payerCity": "Koper",
        "amount": "55.586",
        "paymentDate": "2022-06-16",
        "purposeCode": "GDSV",
        "paymentPurpose": "Predracun 111",
        "recipientIban": "SI56020360253863406",
        "recipientReference": "SI081236-17-34565",
        "recipientName": "Podjetje d.o.o.",
        "recipientCity": "Ljubljana"
    }"#;

    pub(crate) fn unique_path(prefix: &str, extension: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "{prefix}-{}-{}.{}",
            std::process::id(),
            nanos,
            extension
        ))
    }

    pub(crate) fn write_temp(prefix: &str, extension: &str, contents: &str) -> PathBuf {
        let path = unique_path(prefix, extension);
        fs::write(&path, contents).unwrap();
        path
    }
}
