use std::sync::Arc;

use crate::error::RemoteError;
use crate::traits::IdentityMessageCallback;

/// Isolated XMTP identity held by the messenger process.
///
/// Calls block for the duration of the round trip. List-shaped results come
/// back as JSON array text.
pub trait IdentityService: Send + Sync {
    /// Generate the identity. Returns its address.
    fn create_identity(&self) -> Result<Option<String>, RemoteError>;

    fn has_identity(&self) -> Result<bool, RemoteError>;

    fn identity_address(&self) -> Result<Option<String>, RemoteError>;

    fn inbox_id(&self) -> Result<Option<String>, RemoteError>;

    /// Send a DM from the identity. Returns the message id.
    fn send_message(&self, recipient_address: &str, body: &str)
        -> Result<Option<String>, RemoteError>;

    /// Pull conversations from the network into the messenger's store.
    fn sync_conversations(&self) -> Result<(), RemoteError>;

    fn conversations(&self) -> Result<Option<String>, RemoteError>;

    /// Messages sent after `after_ns` (epoch nanoseconds, `0` for all).
    fn get_messages(
        &self,
        conversation_id: &str,
        after_ns: i64,
    ) -> Result<Option<String>, RemoteError>;

    fn register_message_callback(
        &self,
        callback: Arc<dyn IdentityMessageCallback>,
    ) -> Result<(), RemoteError>;

    fn unregister_message_callback(
        &self,
        callback: &Arc<dyn IdentityMessageCallback>,
    ) -> Result<(), RemoteError>;
}
