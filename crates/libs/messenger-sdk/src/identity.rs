use std::sync::Arc;

use messenger_ipc::{Binder, IdentityMessageCallback, IdentityService, RemoteError, ServiceHost};
use tokio::sync::{broadcast, watch};

use crate::binding::ServiceBindingDelegate;
use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::parsing;
use crate::rpc;
use crate::state::ConnectionState;
use crate::types::{IdentityConversation, IdentityMessage};

const NEW_MESSAGE_CAPACITY: usize = 64;

/// Forwards push notifications from the identity service to subscribers.
struct NewMessageRelay {
    tx: broadcast::Sender<i32>,
}

impl IdentityMessageCallback for NewMessageRelay {
    fn on_new_messages(&self, message_count: i32) {
        // No subscribers is fine.
        let _ = self.tx.send(message_count);
    }
}

/// Operates the isolated XMTP identity held by the messenger.
///
/// The identity's keys stay in the messenger process; this client only issues
/// calls against them. As with [`crate::MessagingClient`], calls require a
/// connected binding and fail with [`SdkError::ServiceNotConnected`]
/// otherwise.
///
/// # Panics
///
/// The async call methods panic when polled outside a tokio runtime.
pub struct IdentityClient {
    delegate: ServiceBindingDelegate<Arc<dyn IdentityService>>,
    new_messages: broadcast::Sender<i32>,
}

impl IdentityClient {
    pub fn new(host: Arc<dyn ServiceHost>, config: &SdkConfig) -> Self {
        let (new_messages, _) = broadcast::channel(NEW_MESSAGE_CAPACITY);
        let callback: Arc<dyn IdentityMessageCallback> =
            Arc::new(NewMessageRelay { tx: new_messages.clone() });
        let register = callback.clone();
        let delegate = ServiceBindingDelegate::with_release_hook(
            host,
            config.identity_intent(),
            Box::new(|binder: &Binder| binder.downcast::<Arc<dyn IdentityService>>()),
            Some(Box::new(move |svc: &Arc<dyn IdentityService>| -> Result<(), RemoteError> {
                svc.register_message_callback(register.clone())
            })),
            Some(Box::new(move |svc: &Arc<dyn IdentityService>| -> Result<(), RemoteError> {
                svc.unregister_message_callback(&callback)
            })),
        );
        Self { delegate, new_messages }
    }

    pub fn bind(&self) {
        self.delegate.bind();
    }

    /// Unregisters the push callback (best effort) and releases the binding.
    ///
    /// Unregistering is a blocking remote call made on the calling thread,
    /// so this can block for one round trip to the messenger while a
    /// connection is held.
    pub fn unbind(&self) {
        self.delegate.unbind();
    }

    pub async fn await_connected(&self) {
        self.delegate.await_connected().await;
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.delegate.state()
    }

    pub fn subscribe_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.delegate.subscribe()
    }

    /// New-message counts pushed by the identity service after each
    /// background sync. Slow receivers lose the oldest counts.
    pub fn new_messages(&self) -> broadcast::Receiver<i32> {
        self.new_messages.subscribe()
    }

    /// Generate the isolated identity. Returns its address.
    pub async fn create_identity(&self) -> Result<Option<String>, SdkError> {
        self.call("create_identity", |svc| svc.create_identity()).await
    }

    pub async fn has_identity(&self) -> Result<bool, SdkError> {
        self.call("has_identity", |svc| svc.has_identity()).await
    }

    pub async fn identity_address(&self) -> Result<Option<String>, SdkError> {
        self.call("identity_address", |svc| svc.identity_address()).await
    }

    pub async fn inbox_id(&self) -> Result<Option<String>, SdkError> {
        self.call("inbox_id", |svc| svc.inbox_id()).await
    }

    pub async fn send_message(
        &self,
        recipient_address: &str,
        body: &str,
    ) -> Result<Option<String>, SdkError> {
        let (recipient, body) = (recipient_address.to_owned(), body.to_owned());
        self.call("send_message", move |svc| svc.send_message(&recipient, &body)).await
    }

    /// Pull this identity's conversations from the network. Call before
    /// [`IdentityClient::conversations`] or [`IdentityClient::messages`] for
    /// fresh data.
    pub async fn sync_conversations(&self) -> Result<(), SdkError> {
        self.call("sync_conversations", |svc| svc.sync_conversations()).await
    }

    pub async fn conversations(&self) -> Result<Vec<IdentityConversation>, SdkError> {
        let raw = self.call("conversations", |svc| svc.conversations()).await?;
        parsing::parse_conversations(raw.as_deref())
    }

    /// Messages of `conversation_id` sent after `after_ns` (epoch
    /// nanoseconds). The filter is applied by the messenger.
    pub async fn messages(
        &self,
        conversation_id: &str,
        after_ns: i64,
    ) -> Result<Vec<IdentityMessage>, SdkError> {
        let conversation_id = conversation_id.to_owned();
        let raw = self
            .call("get_messages", move |svc| svc.get_messages(&conversation_id, after_ns))
            .await?;
        parsing::parse_messages(raw.as_deref())
    }

    /// All messages of `conversation_id`.
    pub async fn messages_since_start(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<IdentityMessage>, SdkError> {
        self.messages(conversation_id, 0).await
    }

    fn require_service(&self) -> Result<Arc<dyn IdentityService>, SdkError> {
        self.delegate.service().ok_or(SdkError::ServiceNotConnected { service: "identity" })
    }

    async fn call<R, F>(&self, method: &'static str, call: F) -> Result<R, SdkError>
    where
        R: Send + 'static,
        F: FnOnce(&dyn IdentityService) -> Result<R, RemoteError> + Send + 'static,
    {
        let service = self.require_service()?;
        rpc::dispatch(method, move || call(service.as_ref())).await
    }

    #[cfg(test)]
    pub(crate) fn delegate(&self) -> &ServiceBindingDelegate<Arc<dyn IdentityService>> {
        &self.delegate
    }
}
