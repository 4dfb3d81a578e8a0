//! Per-field normalization rules for UPN payment orders.
//!
//! Every function trims its input, checks it against the field's rule and
//! returns the canonical value or a [`UpnError::Validation`] naming the field.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Result, UpnError};
use crate::field::{Field, REFERENCE_MAX_CHARS};

const MAX_SI_REFERENCE_DASHES: usize = 2;
const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
const UPN_DATE_FORMAT: &str = "%d.%m.%Y";
/// Characters stripped from both ends of every input value. Unicode spaces
/// such as NBSP are kept.
const TRIMMED_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

fn iban_regex() -> &'static Regex {
    static IBAN_REGEX: OnceLock<Regex> = OnceLock::new();
    IBAN_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z]{2}[0-9]{17}$").unwrap())
}

fn reference_regex() -> &'static Regex {
    static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
    REFERENCE_REGEX.get_or_init(|| Regex::new(r"^(SI|RF)[0-9]{2}").unwrap())
}

fn purpose_code_regex() -> &'static Regex {
    static PURPOSE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
    PURPOSE_CODE_REGEX.get_or_init(|| Regex::new(r"^[A-Z]{4}$").unwrap())
}

fn date_shape_regex() -> &'static Regex {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    DATE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap())
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn trim_input(raw: &str) -> &str {
    raw.trim_matches(TRIMMED_CHARS.as_slice())
}

fn reject_line_breaks(field: Field, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(UpnError::validation(
            field,
            format!("{} must not contain line breaks.", field.label()),
        ));
    }
    Ok(())
}

fn iban_message(field: Field) -> String {
    if field.is_required() {
        format!(
            "{} must be 19 characters long with the country code prefix of two characters (alpha-2 ISO standard).",
            field.label()
        )
    } else {
        format!(
            "{} must either be null or have 19 characters with the country code prefix of two characters (alpha-2 ISO standard).",
            field.label()
        )
    }
}

/// Strip every space, trim, and require two letters followed by 17 digits.
pub fn normalize_iban(field: Field, raw: &str) -> Result<String> {
    let iban = trim_input(&raw.replace(' ', "")).to_string();
    if !iban_regex().is_match(&iban) {
        return Err(UpnError::validation(field, iban_message(field)));
    }
    Ok(iban)
}

/// Optional IBAN: blank input means unset.
pub fn normalize_optional_iban(field: Field, raw: &str) -> Result<Option<String>> {
    let iban = trim_input(&raw.replace(' ', "")).to_string();
    if iban.is_empty() {
        return Ok(None);
    }
    normalize_iban(field, &iban).map(Some)
}

/// SI/RF structured reference. Blank input means unset.
///
/// Checks run prefix, then length, then the SI dash limit; the first failure
/// wins.
pub fn normalize_reference(field: Field, raw: &str) -> Result<Option<String>> {
    let reference = trim_input(raw);
    if reference.is_empty() {
        return Ok(None);
    }
    reject_line_breaks(field, reference)?;

    if !reference_regex().is_match(reference) {
        return Err(UpnError::validation(
            field,
            format!(
                "{} must either be null or start with SI or RF and then 2 digits and other digits or characters.",
                field.label()
            ),
        ));
    }
    if char_len(reference) > REFERENCE_MAX_CHARS {
        return Err(UpnError::validation(
            field,
            format!(
                "{} should not have more than {REFERENCE_MAX_CHARS} characters.",
                field.label()
            ),
        ));
    }
    if reference.starts_with("SI") && reference.matches('-').count() > MAX_SI_REFERENCE_DASHES {
        return Err(UpnError::validation(
            field,
            format!(
                "{}s that starts with SI should not have more than two dashes.",
                field.label()
            ),
        ));
    }

    Ok(Some(reference.to_string()))
}

/// Trim, refuse embedded line breaks and enforce the field's character limit.
pub fn normalize_text(field: Field, raw: &str) -> Result<String> {
    let text = trim_input(raw);
    reject_line_breaks(field, text)?;
    let Some(limit) = field.max_chars() else {
        return Ok(text.to_string());
    };

    if char_len(text) > limit {
        let message = if field.is_required() {
            format!(
                "{} should not have more than {limit} characters.",
                field.label()
            )
        } else {
            format!(
                "{} must either be null or not have more than {limit} characters.",
                field.label()
            )
        };
        return Err(UpnError::validation(field, message));
    }

    Ok(text.to_string())
}

/// Exactly four uppercase ASCII letters. Blank input is rejected.
pub fn normalize_purpose_code(raw: &str) -> Result<String> {
    let code = trim_input(raw);
    if !purpose_code_regex().is_match(code) {
        return Err(UpnError::validation(
            Field::PurposeCode,
            "Purpose code must be null or have exactly four uppercase characters [A-Z].",
        ));
    }
    Ok(code.to_string())
}

/// Strict `YYYY-MM-DD` followed by a calendar check. Blank input means unset.
pub fn parse_date(field: Field, raw: &str) -> Result<Option<NaiveDate>> {
    let value = trim_input(raw);
    if value.is_empty() {
        return Ok(None);
    }

    if !date_shape_regex().is_match(value) {
        return Err(UpnError::validation(
            field,
            format!(
                "{} must either be null or be in the YYYY-MM-DD format.",
                field.label()
            ),
        ));
    }

    NaiveDate::parse_from_str(value, INPUT_DATE_FORMAT)
        .map(Some)
        .map_err(|_| {
            UpnError::validation(
                field,
                format!(
                    "The provided {} is not a valid date.",
                    field.label().to_lowercase()
                ),
            )
        })
}

/// Payload date representation, `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(UPN_DATE_FORMAT).to_string()
}
