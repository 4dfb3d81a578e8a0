//! JSON order documents.
//!
//! An [`OrderInput`] mirrors the payment order field by field with raw,
//! unvalidated values. [`OrderInput::build`] runs every value through the
//! order's setters and reports all failures at once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpnError};
use crate::field::Field;
use crate::order::PaymentOrder;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderInput {
    #[serde(default)]
    pub payer_iban: Option<String>,
    #[serde(default)]
    pub deposit: Option<bool>,
    #[serde(default)]
    pub withdraw: Option<bool>,
    #[serde(default)]
    pub payer_reference: Option<String>,
    #[serde(default)]
    pub payer_name: Option<String>,
    #[serde(default)]
    pub payer_street_address: Option<String>,
    #[serde(default)]
    pub payer_city: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub urgent: Option<bool>,
    #[serde(default)]
    pub purpose_code: Option<String>,
    #[serde(default)]
    pub payment_purpose: Option<String>,
    #[serde(default)]
    pub payment_due_date: Option<String>,
    #[serde(default)]
    pub recipient_iban: Option<String>,
    #[serde(default)]
    pub recipient_reference: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_street_address: Option<String>,
    #[serde(default)]
    pub recipient_city: Option<String>,
}

/// One rejected field of an order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub message: String,
}

impl FieldIssue {
    fn required(field: Field) -> Self {
        Self {
            field,
            message: UpnError::Required { field }.to_string(),
        }
    }

    fn from_error(err: &UpnError) -> Option<Self> {
        err.field().map(|field| Self {
            field,
            message: err.to_string(),
        })
    }
}

fn record(issues: &mut Vec<FieldIssue>, outcome: Result<&mut PaymentOrder>) {
    if let Err(err) = outcome {
        issues.extend(FieldIssue::from_error(&err));
    }
}

impl OrderInput {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Apply every field to a fresh order, collecting all issues.
    ///
    /// Issues are reported in payload order. A required field that is absent
    /// is reported as `"<field> is required."`.
    pub fn build(&self) -> std::result::Result<PaymentOrder, Vec<FieldIssue>> {
        let mut order = PaymentOrder::new();
        let mut issues = Vec::new();

        record(&mut issues, order.set_payer_iban(self.payer_iban.as_deref()));
        order.set_deposit(self.deposit).set_withdraw(self.withdraw);
        record(
            &mut issues,
            order.set_payer_reference(self.payer_reference.as_deref()),
        );
        record(&mut issues, order.set_payer_name(self.payer_name.as_deref()));
        record(
            &mut issues,
            order.set_payer_street_address(self.payer_street_address.as_deref()),
        );
        record(&mut issues, order.set_payer_city(self.payer_city.as_deref()));
        record(&mut issues, order.set_amount(self.amount));
        record(
            &mut issues,
            order.set_payment_date(self.payment_date.as_deref()),
        );
        order.set_urgent(self.urgent);
        record(
            &mut issues,
            order.set_purpose_code(self.purpose_code.as_deref()),
        );
        record(
            &mut issues,
            order.set_payment_purpose(self.payment_purpose.as_deref()),
        );
        record(
            &mut issues,
            order.set_payment_due_date(self.payment_due_date.as_deref()),
        );
        match self.recipient_iban.as_deref() {
            Some(iban) => record(&mut issues, order.set_recipient_iban(iban)),
            None => issues.push(FieldIssue::required(Field::RecipientIban)),
        }
        record(
            &mut issues,
            order.set_recipient_reference(self.recipient_reference.as_deref()),
        );
        record(
            &mut issues,
            order.set_recipient_name(self.recipient_name.as_deref()),
        );
        record(
            &mut issues,
            order.set_recipient_street_address(self.recipient_street_address.as_deref()),
        );
        match self.recipient_city.as_deref() {
            Some(city) => record(&mut issues, order.set_recipient_city(city)),
            None => issues.push(FieldIssue::required(Field::RecipientCity)),
        }

        if issues.is_empty() {
            Ok(order)
        } else {
            Err(issues)
        }
    }
}
