use serde::Serialize;
use upnqr_core::{Field, FieldIssue};

/// One line of the order summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub field: Field,
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub ok: bool,
    pub command: String,
    pub message: String,
    pub details: Vec<String>,
    /// Machine readable result, rendered as JSON in agent mode.
    pub payload: Option<serde_json::Value>,
    /// Text printed verbatim to stdout in operator mode.
    pub body: Option<String>,
}

impl CommandOutput {
    pub fn success(
        command: &str,
        message: impl Into<String>,
        details: Vec<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            ok: true,
            command: command.to_string(),
            message: message.into(),
            details,
            payload,
            body: None,
        }
    }

    pub fn failure(command: &str, message: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            ok: false,
            command: command.to_string(),
            message: message.into(),
            details,
            payload: None,
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

pub trait OutputHandler {
    fn start_operation(&mut self, operation: &str);
    fn progress(&mut self, message: &str);
    fn display_order(&mut self, rows: &[FieldRow]);
    fn display_field_issues(&mut self, issues: &[FieldIssue]);
    fn complete(&mut self, output: &CommandOutput);
}
