//! The UPN QR text payload.
//!
//! A payload is 19 newline-joined lines, a trailing newline, and a
//! three-digit count of the characters before it.

use serde::Serialize;

use crate::error::{Result, UpnError};
use crate::field::Field;
use crate::order::PaymentOrder;

pub const LEADING_STRING: &str = "UPNQR";
pub const DEFAULT_PURPOSE_CODE: &str = "OTHR";
pub const DEFAULT_REFERENCE: &str = "SI99";
pub const PAYLOAD_DELIMITER: char = '\n';
pub const LINE_COUNT: usize = 19;
pub const CHECKSUM_DIGITS: usize = 3;
/// Protocol ceiling for a complete payload. Per-field limits keep a payload
/// under it; the serializer does not enforce it.
pub const MAX_PAYLOAD_CHARS: usize = 411;

fn flag(value: Option<bool>) -> String {
    if value.unwrap_or(false) {
        "X".to_string()
    } else {
        String::new()
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// The 19 payload lines of an order, in wire order.
pub fn payload_lines(order: &PaymentOrder) -> Result<[String; LINE_COUNT]> {
    order.check_required()?;

    Ok([
        LEADING_STRING.to_string(),
        text(order.payer_iban()),
        flag(order.deposit()),
        flag(order.withdraw()),
        text(order.payer_reference()),
        text(order.payer_name()),
        text(order.payer_street_address()),
        text(order.payer_city()),
        order.formatted_amount().unwrap_or_default(),
        order.formatted_payment_date().unwrap_or_default(),
        flag(order.urgent()),
        order
            .purpose_code()
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_PURPOSE_CODE.to_string()),
        text(order.payment_purpose()),
        order.formatted_payment_due_date().unwrap_or_default(),
        text(order.recipient_iban()),
        order
            .recipient_reference()
            .unwrap_or(DEFAULT_REFERENCE)
            .to_string(),
        text(order.recipient_name()),
        text(order.recipient_street_address()),
        text(order.recipient_city()),
    ])
}

/// Character count used as the payload checksum.
pub fn checksum(body: &str) -> usize {
    body.chars().count()
}

/// Serialize an order into its complete payload string.
pub fn serialize(order: &PaymentOrder) -> Result<String> {
    let lines = payload_lines(order)?;

    let mut payload = lines.join("\n");
    payload.push(PAYLOAD_DELIMITER);
    let count = checksum(&payload);
    payload.push_str(&format!("{count:0width$}", width = CHECKSUM_DIGITS));

    let total = checksum(&payload);
    if total > MAX_PAYLOAD_CHARS {
        tracing::warn!(
            chars = total,
            limit = MAX_PAYLOAD_CHARS,
            "UPN payload exceeds protocol ceiling"
        );
    } else {
        tracing::debug!(chars = total, "serialized UPN payload");
    }

    Ok(payload)
}

impl PaymentOrder {
    /// See [`serialize`].
    pub fn serialize(&self) -> Result<String> {
        serialize(self)
    }
}

/// A payload split back into its lines, with a verified checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPayload {
    pub lines: Vec<String>,
    pub checksum: usize,
}

impl ParsedPayload {
    /// The line carrying `field`.
    pub fn get(&self, field: Field) -> &str {
        let index = Field::ALL
            .iter()
            .position(|candidate| *candidate == field)
            .map_or(0, |position| position + 1);
        self.lines.get(index).map(String::as_str).unwrap_or_default()
    }
}

fn malformed(message: impl Into<String>) -> UpnError {
    UpnError::Payload(message.into())
}

/// Split a serialized payload and verify its marker, line count and checksum.
pub fn split_payload(payload: &str) -> Result<ParsedPayload> {
    let split_at = payload
        .len()
        .checked_sub(CHECKSUM_DIGITS)
        .filter(|index| payload.is_char_boundary(*index))
        .ok_or_else(|| malformed("payload is too short to carry a checksum"))?;
    let (body, digits) = payload.split_at(split_at);

    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed(format!("checksum '{digits}' is not three digits")));
    }
    let expected: usize = digits
        .parse()
        .map_err(|_| malformed(format!("checksum '{digits}' is not a number")))?;

    let actual = checksum(body);
    if actual != expected {
        return Err(malformed(format!(
            "checksum mismatch: payload declares {expected} characters, found {actual}"
        )));
    }

    let Some(content) = body.strip_suffix(PAYLOAD_DELIMITER) else {
        return Err(malformed("payload body must end with a newline"));
    };

    let lines: Vec<String> = content.split(PAYLOAD_DELIMITER).map(str::to_string).collect();
    if lines.len() != LINE_COUNT {
        return Err(malformed(format!(
            "expected {LINE_COUNT} lines, found {}",
            lines.len()
        )));
    }
    if lines[0] != LEADING_STRING {
        return Err(malformed(format!(
            "payload must start with '{LEADING_STRING}', found '{}'",
            lines[0]
        )));
    }

    Ok(ParsedPayload {
        lines,
        checksum: expected,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;

    fn full_order() -> PaymentOrder {
        let mut order = order_without_recipient_iban();
        order.set_recipient_iban("SI56020360253863406").unwrap();
        order
    }

    fn order_without_recipient_iban() -> PaymentOrder {
        let mut order = PaymentOrder::new();
        order
            .set_payer_iban(Some("SI56020170014356205"))
            .unwrap()
            .set_deposit(Some(true))
            .set_withdraw(Some(false))
            .set_payer_reference(Some("SI00225268-32526-222"))
            .unwrap()
            .set_payer_name(Some("Janez Novak"))
            .unwrap()
            .set_payer_street_address(Some("Lepa ulica 33"))
            .unwrap()
            .set_payer_city(Some("Koper"))
            .unwrap()
            .set_amount(Some(dec!(55.586)))
            .unwrap()
            .set_payment_date(Some("2022-06-16"))
            .unwrap()
            .set_urgent(Some(false))
            .set_purpose_code(Some("GDSV"))
            .unwrap()
            .set_payment_purpose(Some("Predracun 111"))
            .unwrap()
            .set_payment_due_date(Some("2022-06-30"))
            .unwrap()
            .set_recipient_reference(Some("SI081236-17-34565"))
            .unwrap()
            .set_recipient_name(Some("Podjetje d.o.o."))
            .unwrap()
            .set_recipient_street_address(Some("Neka ulica 5"))
            .unwrap()
            .set_recipient_city("Ljubljana")
            .unwrap();
        order
    }

    fn minimal_order() -> PaymentOrder {
        let mut order = PaymentOrder::new();
        order
            .set_recipient_iban("SI56020360253863406")
            .unwrap()
            .set_recipient_city("Ljubljana")
            .unwrap();
        order
    }

    #[test]
    fn full_order_serializes_to_expected_payload() {
        let body = "UPNQR\nSI56020170014356205\nX\n\nSI00225268-32526-222\nJanez Novak\n\
Lepa ulica 33\nKoper\n00000005558\n16.06.2022\n\nGDSV\nPredracun 111\n30.06.2022\n\
SI56020360253863406\nSI081236-17-34565\nPodjetje d.o.o.\nNeka ulica 5\nLjubljana\n";
        let expected = format!("{body}{:03}", body.chars().count());

        let payload = full_order().serialize().unwrap();
        assert_eq!(payload, expected);
        assert!(payload.ends_with("213"));
    }

    #[test]
    fn payload_has_nineteen_lines_and_checksum_suffix() {
        let payload = full_order().serialize().unwrap();
        let (body, digits) = payload.split_at(payload.len() - 3);
        assert_eq!(digits.parse::<usize>().unwrap(), body.chars().count());
        assert_eq!(body.trim_end_matches('\n').split('\n').count(), LINE_COUNT);
        assert!(payload.chars().count() <= MAX_PAYLOAD_CHARS);
    }

    #[test]
    fn unset_fields_are_empty_except_defaults() {
        let payload = minimal_order().serialize().unwrap();
        let parsed = split_payload(&payload).unwrap();

        assert_eq!(parsed.get(Field::PayerIban), "");
        assert_eq!(parsed.get(Field::Deposit), "");
        assert_eq!(parsed.get(Field::Amount), "");
        assert_eq!(parsed.get(Field::PaymentDate), "");
        assert_eq!(parsed.get(Field::PurposeCode), DEFAULT_PURPOSE_CODE);
        assert_eq!(parsed.get(Field::RecipientReference), DEFAULT_REFERENCE);
        assert_eq!(parsed.get(Field::RecipientIban), "SI56020360253863406");
        assert_eq!(parsed.get(Field::RecipientCity), "Ljubljana");
        assert!(payload.ends_with("060"));
    }

    #[test]
    fn missing_recipient_iban_fails_regardless_of_other_fields() {
        let order = order_without_recipient_iban();
        let err = order.serialize().unwrap_err();
        assert!(matches!(
            err,
            UpnError::Required {
                field: Field::RecipientIban
            }
        ));
        assert_eq!(err.to_string(), "recipientIban is required.");
    }

    #[test]
    fn missing_recipient_city_fails() {
        let mut order = PaymentOrder::new();
        order.set_recipient_iban("SI56020360253863406").unwrap();
        assert_eq!(
            order.serialize().unwrap_err().to_string(),
            "recipientCity is required."
        );
    }

    #[test]
    fn checksum_counts_characters_not_bytes() {
        let mut order = minimal_order();
        order.set_recipient_name(Some("Šolski center Žalec")).unwrap();
        let payload = order.serialize().unwrap();
        let body = &payload[..payload.len() - 3];
        assert!(body.len() > body.chars().count());
        assert_eq!(
            payload[payload.len() - 3..].parse::<usize>().unwrap(),
            body.chars().count()
        );
        split_payload(&payload).unwrap();
    }

    #[test]
    fn booleans_serialize_as_x_only_when_true() {
        let mut order = minimal_order();
        order
            .set_deposit(Some(true))
            .set_withdraw(Some(false))
            .set_urgent(Some(true));
        let parsed = split_payload(&order.serialize().unwrap()).unwrap();
        assert_eq!(parsed.get(Field::Deposit), "X");
        assert_eq!(parsed.get(Field::Withdraw), "");
        assert_eq!(parsed.get(Field::Urgent), "X");
    }

    #[test]
    fn split_rejects_tampered_payloads() {
        let payload = full_order().serialize().unwrap();

        let tampered = payload.replacen("Koper", "Kopr", 1);
        assert!(matches!(split_payload(&tampered), Err(UpnError::Payload(_))));

        let no_digits = &payload[..payload.len() - 3];
        assert!(split_payload(no_digits).is_err());

        assert!(split_payload("").is_err());
        assert!(split_payload("ab").is_err());

        let wrong_marker = payload.replacen(LEADING_STRING, "UPNQX", 1);
        let err = split_payload(&wrong_marker).unwrap_err();
        assert!(err.to_string().contains("UPNQR"));
    }

    #[test]
    fn split_rejects_wrong_line_count() {
        let body = "UPNQR\nonly\n";
        let payload = format!("{body}{:03}", body.chars().count());
        let err = split_payload(&payload).unwrap_err();
        assert!(err.to_string().contains("expected 19 lines"));
    }

    proptest! {
        #[test]
        fn checksum_matches_body_length(name in "\\PC{0,33}", city in "[a-zA-ZčšžČŠŽ ]{1,33}") {
            let mut order = minimal_order();
            order.set_recipient_name(Some(&name)).unwrap();
            order.set_recipient_city(&city).unwrap();
            let payload = order.serialize().unwrap();
            prop_assert!(split_payload(&payload).is_ok());
            let (body, digits) = payload.split_at(payload.len() - 3);
            prop_assert_eq!(digits.parse::<usize>().unwrap(), body.chars().count());
        }
    }
}
