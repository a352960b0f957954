use serde::Serialize;
use serde_json::{json, Value};

pub const MSG_UPDATED: &str = "Groups and invite links updated successfully";
pub const MSG_UPDATE_FAILED: &str = "Failed to update groups and invite links";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized: Invalid or missing API key";
pub const MSG_ERROR: &str = "Error processing request";

/// Proxy-style response; `body` is the JSON text, not a nested object.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl GatewayResponse {
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }
}

pub fn resp_json(status: u16, message: &str) -> GatewayResponse {
    GatewayResponse {
        status_code: status,
        headers: json!({ "Content-Type": "application/json" }),
        body: json!({ "message": message }).to_string(),
    }
}
