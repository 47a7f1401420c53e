use serde::{Deserialize, Deserializer, Serialize};

// ── Identity records ──────────────────────────────────────────────────────────

/// A conversation belonging to the isolated identity.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConversation {
    /// XMTP conversation id.
    pub id: String,
    /// Ethereum address of the other party in the DM.
    #[serde(default, deserialize_with = "null_as_default")]
    pub peer_address: String,
    /// Creation time, milliseconds since epoch.
    pub created_at_ms: i64,
}

/// A message in one of the isolated identity's conversations.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMessage {
    /// XMTP message id.
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender_inbox_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Send time, milliseconds since epoch.
    pub sent_at_ms: i64,
    /// Sent by the isolated identity itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_me: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
