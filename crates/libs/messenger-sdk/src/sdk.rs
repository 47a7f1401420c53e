use std::sync::{Arc, PoisonError, RwLock};

use messenger_ipc::ServiceHost;

use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::identity::IdentityClient;
use crate::messaging::MessagingClient;
use crate::wakeup::NewMessageWakeupHandler;

static INSTANCE: RwLock<Option<Arc<MessengerSdk>>> = RwLock::new(None);
static WAKEUP_HANDLER: RwLock<Option<Arc<dyn NewMessageWakeupHandler>>> = RwLock::new(None);

/// Process-wide entry point holding one [`MessagingClient`] and one
/// [`IdentityClient`].
///
/// The first successful [`MessengerSdk::get_instance`] call fixes the host and
/// configuration for the rest of the process; later calls return the cached
/// instance and ignore their arguments.
pub struct MessengerSdk {
    host: Arc<dyn ServiceHost>,
    config: SdkConfig,
    messaging: MessagingClient,
    identity: IdentityClient,
}

impl MessengerSdk {
    pub fn get_instance(host: Arc<dyn ServiceHost>) -> Result<Arc<Self>, SdkError> {
        Self::get_instance_with_config(host, SdkConfig::default())
    }

    /// Fails with [`SdkError::NotInstalled`] while the messenger package is
    /// missing from the host. Nothing is cached on failure.
    pub fn get_instance_with_config(
        host: Arc<dyn ServiceHost>,
        config: SdkConfig,
    ) -> Result<Arc<Self>, SdkError> {
        if let Some(sdk) = INSTANCE.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(sdk.clone());
        }

        let mut slot = INSTANCE.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(sdk) = slot.as_ref() {
            return Ok(sdk.clone());
        }

        config.validate()?;
        if !host.is_package_installed(&config.messenger_package) {
            return Err(SdkError::NotInstalled { package: config.messenger_package });
        }

        let sdk = Arc::new(Self {
            messaging: MessagingClient::new(host.clone(), &config),
            identity: IdentityClient::new(host.clone(), &config),
            host,
            config,
        });
        log::debug!("messenger sdk: instance created for {}", sdk.config.messenger_package);
        *slot = Some(sdk.clone());
        Ok(sdk)
    }

    pub fn messaging(&self) -> &MessagingClient {
        &self.messaging
    }

    pub fn identity(&self) -> &IdentityClient {
        &self.identity
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn ServiceHost> {
        &self.host
    }

    /// Unbinds both clients. Safe in any state.
    pub fn unbind_all(&self) {
        self.messaging.unbind();
        self.identity.unbind();
    }

    /// Install (or clear with `None`) the handler invoked by
    /// [`crate::NewMessageReceiver`] for wake-up notifications.
    pub fn set_new_message_wakeup_handler(handler: Option<Arc<dyn NewMessageWakeupHandler>>) {
        *WAKEUP_HANDLER.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    pub(crate) fn wakeup_handler() -> Option<Arc<dyn NewMessageWakeupHandler>> {
        WAKEUP_HANDLER.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[cfg(test)]
    pub(crate) fn reset_for_testing() {
        if let Some(sdk) = INSTANCE.write().unwrap_or_else(PoisonError::into_inner).take() {
            sdk.unbind_all();
        }
        Self::set_new_message_wakeup_handler(None);
    }
}

/// Serialises tests that touch the process-wide instance or handler.
#[cfg(test)]
pub(crate) fn lock_globals() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static GLOBALS_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let guard = GLOBALS_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    MessengerSdk::reset_for_testing();
    guard
}
