use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub const NAME_MAX_CHARS: usize = 33;
pub const PURPOSE_MAX_CHARS: usize = 42;
pub const REFERENCE_MAX_CHARS: usize = 26;

/// Every field of a UPN payment order, in payload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PayerIban,
    Deposit,
    Withdraw,
    PayerReference,
    PayerName,
    PayerStreetAddress,
    PayerCity,
    Amount,
    PaymentDate,
    Urgent,
    PurposeCode,
    PaymentPurpose,
    PaymentDueDate,
    RecipientIban,
    RecipientReference,
    RecipientName,
    RecipientStreetAddress,
    RecipientCity,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::PayerIban,
        Field::Deposit,
        Field::Withdraw,
        Field::PayerReference,
        Field::PayerName,
        Field::PayerStreetAddress,
        Field::PayerCity,
        Field::Amount,
        Field::PaymentDate,
        Field::Urgent,
        Field::PurposeCode,
        Field::PaymentPurpose,
        Field::PaymentDueDate,
        Field::RecipientIban,
        Field::RecipientReference,
        Field::RecipientName,
        Field::RecipientStreetAddress,
        Field::RecipientCity,
    ];

    /// Fields that must be set before an order can be serialized, checked in this order.
    pub const REQUIRED: [Field; 2] = [Field::RecipientIban, Field::RecipientCity];

    /// Stable camelCase identifier used in error messages and JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::PayerIban => "payerIban",
            Field::Deposit => "deposit",
            Field::Withdraw => "withdraw",
            Field::PayerReference => "payerReference",
            Field::PayerName => "payerName",
            Field::PayerStreetAddress => "payerStreetAddress",
            Field::PayerCity => "payerCity",
            Field::Amount => "amount",
            Field::PaymentDate => "paymentDate",
            Field::Urgent => "urgent",
            Field::PurposeCode => "purposeCode",
            Field::PaymentPurpose => "paymentPurpose",
            Field::PaymentDueDate => "paymentDueDate",
            Field::RecipientIban => "recipientIban",
            Field::RecipientReference => "recipientReference",
            Field::RecipientName => "recipientName",
            Field::RecipientStreetAddress => "recipientStreetAddress",
            Field::RecipientCity => "recipientCity",
        }
    }

    /// Human readable label, used as the subject of validation messages.
    pub const fn label(self) -> &'static str {
        match self {
            Field::PayerIban => "Payer IBAN",
            Field::Deposit => "Deposit",
            Field::Withdraw => "Withdraw",
            Field::PayerReference => "Payer reference",
            Field::PayerName => "Payer name",
            Field::PayerStreetAddress => "Payer street address",
            Field::PayerCity => "Payer city",
            Field::Amount => "Amount",
            Field::PaymentDate => "Payment date",
            Field::Urgent => "Urgent",
            Field::PurposeCode => "Purpose code",
            Field::PaymentPurpose => "Payment purpose",
            Field::PaymentDueDate => "Payment due date",
            Field::RecipientIban => "Recipient IBAN",
            Field::RecipientReference => "Recipient reference",
            Field::RecipientName => "Recipient name",
            Field::RecipientStreetAddress => "Recipient street address",
            Field::RecipientCity => "Recipient city",
        }
    }

    pub const fn is_required(self) -> bool {
        matches!(self, Field::RecipientIban | Field::RecipientCity)
    }

    /// Character limit for free-text fields.
    pub const fn max_chars(self) -> Option<usize> {
        match self {
            Field::PayerName
            | Field::PayerStreetAddress
            | Field::PayerCity
            | Field::RecipientName
            | Field::RecipientStreetAddress
            | Field::RecipientCity => Some(NAME_MAX_CHARS),
            Field::PaymentPurpose => Some(PURPOSE_MAX_CHARS),
            Field::PayerReference | Field::RecipientReference => Some(REFERENCE_MAX_CHARS),
            _ => None,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
