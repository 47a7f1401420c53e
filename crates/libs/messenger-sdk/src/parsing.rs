//! Decoding of the JSON list encodings returned by the identity service.

use serde::de::DeserializeOwned;

use crate::error::SdkError;
use crate::types::{IdentityConversation, IdentityMessage};

/// Parse a conversation list. `None` or blank input is an empty list.
pub fn parse_conversations(raw: Option<&str>) -> Result<Vec<IdentityConversation>, SdkError> {
    parse_list(raw, "conversation")
}

/// Parse a message list. `None` or blank input is an empty list.
pub fn parse_messages(raw: Option<&str>) -> Result<Vec<IdentityMessage>, SdkError> {
    parse_list(raw, "message")
}

fn parse_list<T: DeserializeOwned>(
    raw: Option<&str>,
    kind: &'static str,
) -> Result<Vec<T>, SdkError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw)
        .map_err(|err| SdkError::MalformedData { kind, message: err.to_string() })
}
