//! Slovenian UPN QR payment orders.
//!
//! Build a [`PaymentOrder`] through its validating setters (or from an
//! [`OrderInput`] document), [`serialize`] it into the UPN QR text payload and
//! render that payload with [`qr::render_order`] or [`qr::write_qr_file`].

pub mod amount;
pub mod charset;
pub mod error;
pub mod field;
pub mod input;
pub mod order;
pub mod payload;
pub mod qr;
pub mod validation;

pub use amount::Amount;
pub use error::{AmountError, Result, UpnError};
pub use field::Field;
pub use input::{FieldIssue, OrderInput};
pub use order::PaymentOrder;
pub use payload::{serialize, split_payload, ParsedPayload, MAX_PAYLOAD_CHARS};
pub use qr::{OutputFormat, RenderOptions, DEFAULT_QR_SIZE};
pub use validation::format_date;
