use crate::error::RemoteError;

/// Messaging on behalf of the device user.
pub trait MessagingService: Send + Sync {
    /// Send a DM to an address. Returns the message id.
    fn send_message(&self, recipient_address: &str, body: &str)
        -> Result<Option<String>, RemoteError>;

    /// Send to an existing group conversation. Returns the message id.
    fn send_group_message(
        &self,
        conversation_id: &str,
        body: &str,
    ) -> Result<Option<String>, RemoteError>;

    /// Whether the messenger's own XMTP client is initialised.
    fn is_client_ready(&self) -> Result<bool, RemoteError>;

    fn user_address(&self) -> Result<Option<String>, RemoteError>;

    fn inbox_id(&self) -> Result<Option<String>, RemoteError>;
}
