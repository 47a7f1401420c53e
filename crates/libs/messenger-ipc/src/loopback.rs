use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::HostError;
use crate::host::{ServiceConnection, ServiceHost};
use crate::types::{Binder, ComponentName, Intent};

type ServiceKey = (String, String);

struct RegisteredService {
    component: ComponentName,
    binder: Binder,
    alive: bool,
}

struct ActiveBinding {
    key: ServiceKey,
    connection: Arc<dyn ServiceConnection>,
}

struct PendingConnect {
    connection: Arc<dyn ServiceConnection>,
    component: ComponentName,
    binder: Binder,
}

#[derive(Default)]
struct LoopbackState {
    services: HashMap<ServiceKey, RegisteredService>,
    installed: HashSet<String>,
    permissions: HashSet<String>,
    bindings: Vec<ActiveBinding>,
    defer_connects: bool,
    pending: Vec<PendingConnect>,
}

/// A [`ServiceHost`] that routes bindings to service objects living in the
/// same process.
///
/// Used to embed the messenger services next to the SDK and to drive the
/// binding lifecycle deterministically: connects can be delivered inline or
/// held until [`LoopbackHost::deliver_pending_connects`], and
/// [`LoopbackHost::kill_service`] simulates the remote process dying.
///
/// Callbacks are never invoked while the host's own lock is held.
#[derive(Default)]
pub struct LoopbackHost {
    state: Mutex<LoopbackState>,
}

impl LoopbackHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expose `binder` under `(package, action)`. Installs `package`.
    pub fn register_service(&self, package: &str, action: &str, binder: Binder) {
        let mut state = self.lock();
        state.installed.insert(package.to_owned());
        state.services.insert(
            (package.to_owned(), action.to_owned()),
            RegisteredService {
                component: ComponentName::new(package, action),
                binder,
                alive: true,
            },
        );
    }

    pub fn install_package(&self, package: &str) {
        self.lock().installed.insert(package.to_owned());
    }

    pub fn uninstall_package(&self, package: &str) {
        self.lock().installed.remove(package);
    }

    pub fn grant_permission(&self, permission: &str) {
        self.lock().permissions.insert(permission.to_owned());
    }

    pub fn revoke_permission(&self, permission: &str) {
        self.lock().permissions.remove(permission);
    }

    /// When `true`, accepted binds queue their connect notification instead
    /// of delivering it before `bind_service` returns.
    pub fn set_defer_connects(&self, defer: bool) {
        self.lock().defer_connects = defer;
    }

    /// Deliver queued connect notifications. Returns how many were delivered.
    pub fn deliver_pending_connects(&self) -> usize {
        let pending = std::mem::take(&mut self.lock().pending);
        let delivered = pending.len();
        for connect in pending {
            connect.connection.on_service_connected(connect.component, connect.binder);
        }
        delivered
    }

    /// Simulate the service process dying: every connection bound to it gets
    /// an unsolicited disconnect. Bindings stay registered.
    pub fn kill_service(&self, package: &str, action: &str) {
        let key = (package.to_owned(), action.to_owned());
        let (component, connections) = {
            let mut state = self.lock();
            let Some(service) = state.services.get_mut(&key) else {
                return;
            };
            service.alive = false;
            let component = service.component.clone();
            let connections = bound_connections(&state.bindings, &key);
            state.pending.retain(|pending| {
                !connections.iter().any(|conn| Arc::ptr_eq(conn, &pending.connection))
            });
            (component, connections)
        };
        log::debug!("loopback: killing {component}, {} bound connection(s)", connections.len());
        for connection in connections {
            connection.on_service_disconnected(component.clone());
        }
    }

    /// Bring a killed service back; still-bound connections are connected
    /// again.
    pub fn revive_service(&self, package: &str, action: &str) {
        let key = (package.to_owned(), action.to_owned());
        let (component, binder, connections) = {
            let mut state = self.lock();
            let Some(service) = state.services.get_mut(&key) else {
                return;
            };
            service.alive = true;
            let component = service.component.clone();
            let binder = service.binder.clone();
            let connections = bound_connections(&state.bindings, &key);
            if state.defer_connects {
                for connection in connections {
                    state.pending.push(PendingConnect {
                        connection,
                        component: component.clone(),
                        binder: binder.clone(),
                    });
                }
                return;
            }
            (component, binder, connections)
        };
        for connection in connections {
            connection.on_service_connected(component.clone(), binder.clone());
        }
    }

    /// Number of live bindings to `(package, action)`.
    pub fn bound_count(&self, package: &str, action: &str) -> usize {
        let key = (package.to_owned(), action.to_owned());
        self.lock().bindings.iter().filter(|binding| binding.key == key).count()
    }
}

fn bound_connections(
    bindings: &[ActiveBinding],
    key: &ServiceKey,
) -> Vec<Arc<dyn ServiceConnection>> {
    bindings
        .iter()
        .filter(|binding| &binding.key == key)
        .map(|binding| binding.connection.clone())
        .collect()
}

impl ServiceHost for LoopbackHost {
    fn bind_service(&self, intent: &Intent, connection: Arc<dyn ServiceConnection>) -> bool {
        let Some(package) = intent.package.as_deref() else {
            log::warn!("loopback: rejecting implicit bind for {}", intent.action);
            return false;
        };
        let key = (package.to_owned(), intent.action.clone());
        let connect = {
            let mut state = self.lock();
            if !state.installed.contains(package) {
                log::debug!("loopback: package {package} is not installed");
                return false;
            }
            let Some(service) = state.services.get(&key) else {
                log::debug!("loopback: no service for {}/{}", package, intent.action);
                return false;
            };
            let connect = service.alive.then(|| PendingConnect {
                connection: connection.clone(),
                component: service.component.clone(),
                binder: service.binder.clone(),
            });
            state.bindings.push(ActiveBinding { key, connection });
            match connect {
                Some(connect) if state.defer_connects => {
                    state.pending.push(connect);
                    None
                }
                other => other,
            }
        };
        if let Some(connect) = connect {
            connect.connection.on_service_connected(connect.component, connect.binder);
        }
        true
    }

    fn unbind_service(&self, connection: &Arc<dyn ServiceConnection>) -> Result<(), HostError> {
        let mut state = self.lock();
        let Some(index) =
            state.bindings.iter().position(|binding| Arc::ptr_eq(&binding.connection, connection))
        else {
            return Err(HostError::NotBound);
        };
        state.bindings.remove(index);
        state.pending.retain(|pending| !Arc::ptr_eq(&pending.connection, connection));
        Ok(())
    }

    fn is_package_installed(&self, package: &str) -> bool {
        self.lock().installed.contains(package)
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.lock().permissions.contains(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PACKAGE: &str = "org.example.messenger";
    const ACTION: &str = "org.example.messenger.action.BIND";

    #[derive(Default)]
    struct CountingConnection {
        connects: AtomicUsize,
        disconnects: AtomicUsize,
    }

    impl ServiceConnection for CountingConnection {
        fn on_service_connected(&self, _name: ComponentName, _binder: Binder) {
            self.connects.fetch_add(1, Ordering::SeqCst);
        }

        fn on_service_disconnected(&self, _name: ComponentName) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn intent() -> Intent {
        Intent::new(ACTION).with_package(PACKAGE)
    }

    fn host_with_service() -> LoopbackHost {
        let host = LoopbackHost::new();
        host.register_service(PACKAGE, ACTION, Binder::new(()));
        host
    }

    #[test]
    fn bind_connects_inline_by_default() {
        let host = host_with_service();
        let conn = Arc::new(CountingConnection::default());
        assert!(host.bind_service(&intent(), conn.clone()));
        assert_eq!(conn.connects.load(Ordering::SeqCst), 1);
        assert_eq!(host.bound_count(PACKAGE, ACTION), 1);
    }

    #[test]
    fn bind_rejects_unknown_or_implicit_targets() {
        let host = host_with_service();
        let conn: Arc<dyn ServiceConnection> = Arc::new(CountingConnection::default());
        assert!(!host.bind_service(&Intent::new(ACTION), conn.clone()));
        assert!(!host.bind_service(&Intent::new("other").with_package(PACKAGE), conn.clone()));
        host.uninstall_package(PACKAGE);
        assert!(!host.bind_service(&intent(), conn));
        assert_eq!(host.bound_count(PACKAGE, ACTION), 0);
    }

    #[test]
    fn deferred_connects_wait_for_delivery() {
        let host = host_with_service();
        host.set_defer_connects(true);
        let conn = Arc::new(CountingConnection::default());
        assert!(host.bind_service(&intent(), conn.clone()));
        assert_eq!(conn.connects.load(Ordering::SeqCst), 0);
        assert_eq!(host.deliver_pending_connects(), 1);
        assert_eq!(conn.connects.load(Ordering::SeqCst), 1);
        assert_eq!(host.deliver_pending_connects(), 0);
    }

    #[test]
    fn unbind_twice_reports_not_bound() {
        let host = host_with_service();
        let conn: Arc<dyn ServiceConnection> = Arc::new(CountingConnection::default());
        assert!(host.bind_service(&intent(), conn.clone()));
        assert_eq!(host.unbind_service(&conn), Ok(()));
        assert_eq!(host.unbind_service(&conn), Err(HostError::NotBound));
    }

    #[test]
    fn kill_and_revive_notify_bound_connections() {
        let host = host_with_service();
        let conn = Arc::new(CountingConnection::default());
        assert!(host.bind_service(&intent(), conn.clone()));

        host.kill_service(PACKAGE, ACTION);
        assert_eq!(conn.disconnects.load(Ordering::SeqCst), 1);

        host.revive_service(PACKAGE, ACTION);
        assert_eq!(conn.connects.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn permissions_are_tracked() {
        let host = LoopbackHost::new();
        assert!(!host.has_permission("perm.SEND"));
        host.grant_permission("perm.SEND");
        assert!(host.has_permission("perm.SEND"));
        host.revoke_permission("perm.SEND");
        assert!(!host.has_permission("perm.SEND"));
    }
}
