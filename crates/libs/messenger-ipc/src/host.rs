use std::sync::Arc;

use crate::error::HostError;
use crate::types::{Binder, ComponentName, Intent};

/// Receives connect/disconnect notifications for one binding.
///
/// The host serialises calls for a given connection but may make them from
/// any thread.
pub trait ServiceConnection: Send + Sync {
    fn on_service_connected(&self, name: ComponentName, binder: Binder);

    /// Unsolicited loss of the remote (process died). The binding stays
    /// registered with the host, which may connect it again later.
    fn on_service_disconnected(&self, name: ComponentName);
}

/// Service locator and package queries provided by the host environment.
pub trait ServiceHost: Send + Sync {
    /// Request an asynchronous connection. Returns `false` when the request
    /// is rejected outright (target not resolvable); no callback follows.
    fn bind_service(&self, intent: &Intent, connection: Arc<dyn ServiceConnection>) -> bool;

    /// Release a binding made with [`ServiceHost::bind_service`].
    fn unbind_service(&self, connection: &Arc<dyn ServiceConnection>) -> Result<(), HostError>;

    fn is_package_installed(&self, package: &str) -> bool;

    fn has_permission(&self, permission: &str) -> bool;
}
