use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use upnqr_core::FieldIssue;

use crate::output::{CommandOutput, FieldRow, OutputHandler};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub success: bool,
    pub upnqr_version: String,
    pub mode: String,
    pub operation: String,
    pub result: Option<Value>,
    pub error: Option<AgentError>,
}

/// Prints exactly one JSON document per command on stdout.
#[derive(Debug, Default)]
pub struct AgentOutputHandler;

impl AgentOutputHandler {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn build_agent_response(output: &CommandOutput) -> AgentResponse {
    let payload = output.payload.as_ref();

    let result = if output.ok {
        payload.cloned().filter(|value| !value.is_null())
    } else {
        None
    };

    let error = if output.ok {
        None
    } else {
        Some(
            payload
                .and_then(|p| p.get("error"))
                .and_then(|v| serde_json::from_value::<AgentError>(v.clone()).ok())
                .unwrap_or_else(|| AgentError {
                    code: "INTERNAL_ERROR".to_string(),
                    message: output.message.clone(),
                    details: if output.details.is_empty() {
                        None
                    } else {
                        Some(json!({ "messages": output.details }))
                    },
                }),
        )
    };

    AgentResponse {
        success: output.ok,
        upnqr_version: env!("CARGO_PKG_VERSION").to_string(),
        mode: "agent".to_string(),
        operation: output.command.clone(),
        result,
        error,
    }
}

fn sort_json_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::new();
            for (key, value) in entries {
                sorted.insert(key, sort_json_value(value));
            }
            Value::Object(sorted)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_json_value).collect()),
        other => other,
    }
}

pub(crate) fn render_agent_json(output: &CommandOutput) -> anyhow::Result<String> {
    let response = build_agent_response(output);
    let value = serde_json::to_value(response)?;
    let sorted = sort_json_value(value);
    Ok(serde_json::to_string_pretty(&sorted)?)
}

impl OutputHandler for AgentOutputHandler {
    fn start_operation(&mut self, _operation: &str) {}

    fn progress(&mut self, _message: &str) {}

    fn display_order(&mut self, _rows: &[FieldRow]) {}

    fn display_field_issues(&mut self, _issues: &[FieldIssue]) {}

    fn complete(&mut self, output: &CommandOutput) {
        match render_agent_json(output) {
            Ok(json) => println!("{json}"),
            Err(err) => println!(
                "{{\"error\":{{\"code\":\"INTERNAL_ERROR\",\"message\":\"serialization failed: {}\"}},\"mode\":\"agent\",\"operation\":\"{}\",\"result\":null,\"success\":false,\"upnqrVersion\":\"{}\"}}",
                err,
                output.command,
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}
