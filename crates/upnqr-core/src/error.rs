use thiserror::Error;

use crate::field::Field;

pub const AMOUNT_RANGE_MESSAGE: &str =
    "Amount must either be null or a value between 0 and 1,000,000,000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("{}", AMOUNT_RANGE_MESSAGE)]
    NotPositive,

    #[error("{}", AMOUNT_RANGE_MESSAGE)]
    AboveMaximum,

    #[error("amount '{input}' is not a decimal number")]
    InvalidNumber { input: String },
}

#[derive(Debug, Error)]
pub enum UpnError {
    #[error("{field} is required.")]
    Required { field: Field },

    #[error("{message}")]
    Validation { field: Field, message: String },

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("unsupported output format '{0}': expected png, svg or eps")]
    UnsupportedFormat(String),

    #[error("invalid image size {0}: must be at least 1 pixel")]
    InvalidSize(u32),

    #[error("payload cannot be encoded as ISO-8859-2: {0}")]
    Encoding(String),

    #[error("failed to render QR code: {0}")]
    Render(String),

    #[error("malformed payload: {0}")]
    Payload(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpnError {
    pub fn validation(field: Field, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The order field this error is about, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Required { field } | Self::Validation { field, .. } => Some(*field),
            Self::Amount(_) => Some(Field::Amount),
            _ => None,
        }
    }

    /// True for errors caused by order contents rather than rendering or IO.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Required { .. } | Self::Validation { .. } | Self::Amount(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, UpnError>;
