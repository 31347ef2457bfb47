use serde_json::json;

use crate::models::status::StatusRecord;

/// Payloads written to a live update stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Status(StatusRecord),
    /// Sent while a cold-start reconciliation is running.
    Loading,
    /// Sent when a reconciliation attempt for this client could not finish.
    Error,
}

impl StreamEvent {
    /// Serialize to the JSON text carried in the stream's `data:` field.
    pub fn to_payload(&self) -> String {
        match self {
            StreamEvent::Status(record) => record.to_json(),
            StreamEvent::Loading => json!({ "loading": true }).to_string(),
            StreamEvent::Error => json!({ "error": true }).to_string(),
        }
    }
}
