use std::sync::Arc;

use messenger_ipc::{Binder, MessagingService, RemoteError, ServiceHost};
use tokio::sync::watch;

use crate::binding::ServiceBindingDelegate;
use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::rpc;
use crate::state::ConnectionState;

/// Sends messages as the device user through the messenger's messaging
/// service.
///
/// Every call requires a connected binding: call [`MessagingClient::bind`]
/// and [`MessagingClient::await_connected`] first. Calls made while not
/// connected fail with [`SdkError::ServiceNotConnected`].
///
/// # Panics
///
/// The async call methods panic when polled outside a tokio runtime.
pub struct MessagingClient {
    delegate: ServiceBindingDelegate<Arc<dyn MessagingService>>,
}

impl MessagingClient {
    pub fn new(host: Arc<dyn ServiceHost>, config: &SdkConfig) -> Self {
        let delegate = ServiceBindingDelegate::new(
            host,
            config.messaging_intent(),
            Box::new(|binder: &Binder| binder.downcast::<Arc<dyn MessagingService>>()),
            None,
        );
        Self { delegate }
    }

    pub fn bind(&self) {
        self.delegate.bind();
    }

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

    pub async fn send_message(
        &self,
        recipient_address: &str,
        body: &str,
    ) -> Result<Option<String>, SdkError> {
        let (recipient, body) = (recipient_address.to_owned(), body.to_owned());
        self.call("send_message", move |svc| svc.send_message(&recipient, &body)).await
    }

    pub async fn send_group_message(
        &self,
        conversation_id: &str,
        body: &str,
    ) -> Result<Option<String>, SdkError> {
        let (conversation_id, body) = (conversation_id.to_owned(), body.to_owned());
        self.call("send_group_message", move |svc| svc.send_group_message(&conversation_id, &body))
            .await
    }

    pub async fn is_client_ready(&self) -> Result<bool, SdkError> {
        self.call("is_client_ready", |svc| svc.is_client_ready()).await
    }

    pub async fn user_address(&self) -> Result<Option<String>, SdkError> {
        self.call("user_address", |svc| svc.user_address()).await
    }

    pub async fn inbox_id(&self) -> Result<Option<String>, SdkError> {
        self.call("inbox_id", |svc| svc.inbox_id()).await
    }

    fn require_service(&self) -> Result<Arc<dyn MessagingService>, SdkError> {
        self.delegate.service().ok_or(SdkError::ServiceNotConnected { service: "messaging" })
    }

    async fn call<R, F>(&self, method: &'static str, call: F) -> Result<R, SdkError>
    where
        R: Send + 'static,
        F: FnOnce(&dyn MessagingService) -> Result<R, RemoteError> + Send + 'static,
    {
        let service = self.require_service()?;
        rpc::dispatch(method, move || call(service.as_ref())).await
    }

    #[cfg(test)]
    pub(crate) fn delegate(&self) -> &ServiceBindingDelegate<Arc<dyn MessagingService>> {
        &self.delegate
    }
}
