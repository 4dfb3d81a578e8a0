use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::amount::Amount;
use crate::error::{Result, UpnError};
use crate::field::Field;
use crate::validation::{
    format_date, normalize_iban, normalize_optional_iban, normalize_purpose_code,
    normalize_reference, normalize_text, parse_date,
};

/// A Slovenian UPN payment order.
///
/// Starts empty. Each setter validates and normalizes its input before
/// storing it; on failure the previous value is left untouched. Setters return
/// `&mut Self` so calls can be chained with `?`:
///
/// ```
/// use upnqr_core::PaymentOrder;
///
/// let mut order = PaymentOrder::new();
/// order
///     .set_recipient_iban("SI56 0203 6025 3863 406")?
///     .set_recipient_city("Ljubljana")?;
/// assert_eq!(order.recipient_iban(), Some("SI56020360253863406"));
/// # Ok::<(), upnqr_core::UpnError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentOrder {
    payer_iban: Option<String>,
    deposit: Option<bool>,
    withdraw: Option<bool>,
    payer_reference: Option<String>,
    payer_name: Option<String>,
    payer_street_address: Option<String>,
    payer_city: Option<String>,
    amount: Option<Amount>,
    payment_date: Option<NaiveDate>,
    urgent: Option<bool>,
    purpose_code: Option<String>,
    payment_purpose: Option<String>,
    payment_due_date: Option<NaiveDate>,
    recipient_iban: Option<String>,
    recipient_reference: Option<String>,
    recipient_name: Option<String>,
    recipient_street_address: Option<String>,
    recipient_city: Option<String>,
}

fn optional_text(field: Field, value: Option<&str>) -> Result<Option<String>> {
    value.map(|raw| normalize_text(field, raw)).transpose()
}

impl PaymentOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payer_iban(&self) -> Option<&str> {
        self.payer_iban.as_deref()
    }

    pub fn set_payer_iban(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payer_iban = match value {
            Some(raw) => normalize_optional_iban(Field::PayerIban, raw)?,
            None => None,
        };
        Ok(self)
    }

    pub fn deposit(&self) -> Option<bool> {
        self.deposit
    }

    pub fn set_deposit(&mut self, value: Option<bool>) -> &mut Self {
        self.deposit = value;
        self
    }

    pub fn withdraw(&self) -> Option<bool> {
        self.withdraw
    }

    pub fn set_withdraw(&mut self, value: Option<bool>) -> &mut Self {
        self.withdraw = value;
        self
    }

    pub fn payer_reference(&self) -> Option<&str> {
        self.payer_reference.as_deref()
    }

    pub fn set_payer_reference(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payer_reference = match value {
            Some(raw) => normalize_reference(Field::PayerReference, raw)?,
            None => None,
        };
        Ok(self)
    }

    pub fn payer_name(&self) -> Option<&str> {
        self.payer_name.as_deref()
    }

    pub fn set_payer_name(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payer_name = optional_text(Field::PayerName, value)?;
        Ok(self)
    }

    pub fn payer_street_address(&self) -> Option<&str> {
        self.payer_street_address.as_deref()
    }

    pub fn set_payer_street_address(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payer_street_address = optional_text(Field::PayerStreetAddress, value)?;
        Ok(self)
    }

    pub fn payer_city(&self) -> Option<&str> {
        self.payer_city.as_deref()
    }

    pub fn set_payer_city(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payer_city = optional_text(Field::PayerCity, value)?;
        Ok(self)
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn set_amount(&mut self, value: Option<Decimal>) -> Result<&mut Self> {
        self.amount = value.map(Amount::new).transpose()?;
        Ok(self)
    }

    /// The amount as it appears in the payload, or `None` when unset.
    pub fn formatted_amount(&self) -> Option<String> {
        self.amount.map(|amount| amount.to_upn_string())
    }

    pub fn payment_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    pub fn set_payment_date(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payment_date = match value {
            Some(raw) => parse_date(Field::PaymentDate, raw)?,
            None => None,
        };
        Ok(self)
    }

    pub fn urgent(&self) -> Option<bool> {
        self.urgent
    }

    pub fn set_urgent(&mut self, value: Option<bool>) -> &mut Self {
        self.urgent = value;
        self
    }

    pub fn purpose_code(&self) -> Option<&str> {
        self.purpose_code.as_deref()
    }

    pub fn set_purpose_code(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.purpose_code = value.map(normalize_purpose_code).transpose()?;
        Ok(self)
    }

    pub fn payment_purpose(&self) -> Option<&str> {
        self.payment_purpose.as_deref()
    }

    pub fn set_payment_purpose(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payment_purpose = optional_text(Field::PaymentPurpose, value)?;
        Ok(self)
    }

    pub fn payment_due_date(&self) -> Option<NaiveDate> {
        self.payment_due_date
    }

    pub fn set_payment_due_date(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.payment_due_date = match value {
            Some(raw) => parse_date(Field::PaymentDueDate, raw)?,
            None => None,
        };
        Ok(self)
    }

    pub fn recipient_iban(&self) -> Option<&str> {
        self.recipient_iban.as_deref()
    }

    pub fn set_recipient_iban(&mut self, value: &str) -> Result<&mut Self> {
        self.recipient_iban = Some(normalize_iban(Field::RecipientIban, value)?);
        Ok(self)
    }

    pub fn recipient_reference(&self) -> Option<&str> {
        self.recipient_reference.as_deref()
    }

    pub fn set_recipient_reference(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.recipient_reference = match value {
            Some(raw) => normalize_reference(Field::RecipientReference, raw)?,
            None => None,
        };
        Ok(self)
    }

    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name.as_deref()
    }

    pub fn set_recipient_name(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.recipient_name = optional_text(Field::RecipientName, value)?;
        Ok(self)
    }

    pub fn recipient_street_address(&self) -> Option<&str> {
        self.recipient_street_address.as_deref()
    }

    pub fn set_recipient_street_address(&mut self, value: Option<&str>) -> Result<&mut Self> {
        self.recipient_street_address = optional_text(Field::RecipientStreetAddress, value)?;
        Ok(self)
    }

    pub fn recipient_city(&self) -> Option<&str> {
        self.recipient_city.as_deref()
    }

    pub fn set_recipient_city(&mut self, value: &str) -> Result<&mut Self> {
        self.recipient_city = Some(normalize_text(Field::RecipientCity, value)?);
        Ok(self)
    }

    /// Fail with the first required field, in declaration order, that is unset.
    pub fn check_required(&self) -> Result<()> {
        for field in Field::REQUIRED {
            let missing = match field {
                Field::RecipientIban => self.recipient_iban.is_none(),
                Field::RecipientCity => self.recipient_city.is_none(),
                _ => false,
            };
            if missing {
                return Err(UpnError::Required { field });
            }
        }
        Ok(())
    }

    pub(crate) fn formatted_payment_date(&self) -> Option<String> {
        self.payment_date.map(format_date)
    }

    pub(crate) fn formatted_payment_due_date(&self) -> Option<String> {
        self.payment_due_date.map(format_date)
    }
}
