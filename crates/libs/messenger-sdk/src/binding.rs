use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use messenger_ipc::{
    Binder, ComponentName, HostError, Intent, RemoteError, ServiceConnection, ServiceHost,
};
use tokio::sync::watch;

use crate::state::ConnectionState;

/// Converts the host's raw binder into the typed service handle.
pub type AsInterface<T> = Box<dyn Fn(&Binder) -> Option<T> + Send + Sync>;

/// Runs once per successful connection, before `Connected` is published.
pub type OnConnected<T> = Box<dyn Fn(&T) -> Result<(), RemoteError> + Send + Sync>;

/// Runs with a handle the delegate gives up on `unbind`, or discards because
/// `unbind` ran while it was connecting. Not called after an unsolicited
/// disconnect.
pub type OnReleased<T> = Box<dyn Fn(&T) -> Result<(), RemoteError> + Send + Sync>;

struct Slot<T> {
    service: Option<T>,
    /// Whether the host currently holds a binding for our connection. Stays
    /// set across an unsolicited disconnect so a host reconnect is honoured.
    host_bound: bool,
    /// Bumped by every `unbind`.
    epoch: u64,
    /// `bind` calls between their state change and the host's answer. The
    /// host binding of such a call is released by the call itself.
    binds_in_flight: usize,
}

struct BindingShared<T> {
    intent: Intent,
    as_interface: AsInterface<T>,
    on_connected: Option<OnConnected<T>>,
    on_released: Option<OnReleased<T>>,
    slot: Mutex<Slot<T>>,
    state: watch::Sender<ConnectionState>,
}

impl<T> BindingShared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Must be called with the slot lock held so the handle and the state
    /// change together.
    fn publish(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        if changed {
            log::debug!("binding({}): {next}", self.intent.action);
        }
    }

    /// Must be called without the slot lock.
    fn release(&self, service: &T) {
        if let Some(hook) = &self.on_released {
            if let Err(err) = hook(service) {
                log::debug!("binding({}): release hook failed: {err}", self.intent.action);
            }
        }
    }
}

impl<T> ServiceConnection for BindingShared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_service_connected(&self, name: ComponentName, binder: Binder) {
        let Some(service) = (self.as_interface)(&binder) else {
            log::warn!("binding({}): {name} returned an unexpected interface", self.intent.action);
            let mut slot = self.lock();
            slot.service = None;
            self.publish(ConnectionState::Disconnected);
            return;
        };

        let epoch = {
            let slot = self.lock();
            if !slot.host_bound {
                log::debug!(
                    "binding({}): ignoring connect from {name} after unbind",
                    self.intent.action
                );
                return;
            }
            slot.epoch
        };

        if let Some(hook) = &self.on_connected {
            if let Err(err) = hook(&service) {
                log::warn!("binding({}): post-connect hook failed: {err}", self.intent.action);
            }
        }

        let mut slot = self.lock();
        if !slot.host_bound || slot.epoch != epoch {
            drop(slot);
            log::debug!("binding({}): unbound while connecting to {name}", self.intent.action);
            self.release(&service);
            return;
        }
        slot.service = Some(service);
        self.publish(ConnectionState::Connected);
    }

    fn on_service_disconnected(&self, name: ComponentName) {
        log::debug!("binding({}): {name} disconnected", self.intent.action);
        let mut slot = self.lock();
        slot.service = None;
        self.publish(ConnectionState::Disconnected);
    }
}

/// Manages the binding to one remote service contract.
///
/// The delegate owns the typed handle `T` and a [`ConnectionState`] that is
/// `Connected` exactly when a handle is present. `bind` and `unbind` are
/// idempotent and can be called from any thread; host callbacks may arrive on
/// any thread. The delegate is reusable across any number of bind/unbind
/// cycles, and every host binding it makes is released by the matching
/// `unbind`, even one racing with the `bind` that made it.
pub struct ServiceBindingDelegate<T> {
    host: Arc<dyn ServiceHost>,
    shared: Arc<BindingShared<T>>,
    connection: Arc<dyn ServiceConnection>,
}

impl<T> ServiceBindingDelegate<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        host: Arc<dyn ServiceHost>,
        intent: Intent,
        as_interface: AsInterface<T>,
        on_connected: Option<OnConnected<T>>,
    ) -> Self {
        Self::with_release_hook(host, intent, as_interface, on_connected, None)
    }

    /// Like [`ServiceBindingDelegate::new`], with a hook that undoes the
    /// post-connect hook's remote side effects when the handle is released.
    pub fn with_release_hook(
        host: Arc<dyn ServiceHost>,
        intent: Intent,
        as_interface: AsInterface<T>,
        on_connected: Option<OnConnected<T>>,
        on_released: Option<OnReleased<T>>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let shared = Arc::new(BindingShared {
            intent,
            as_interface,
            on_connected,
            on_released,
            slot: Mutex::new(Slot {
                service: None,
                host_bound: false,
                epoch: 0,
                binds_in_flight: 0,
            }),
            state,
        });
        let connection: Arc<dyn ServiceConnection> = shared.clone();
        Self { host, shared, connection }
    }

    pub fn intent(&self) -> &Intent {
        &self.shared.intent
    }

    /// Request a connection. Does nothing unless the binding is
    /// `Disconnected`.
    pub fn bind(&self) {
        let (stale, epoch) = {
            let mut slot = self.shared.lock();
            if self.shared.current() != ConnectionState::Disconnected {
                return;
            }
            let stale = slot.host_bound;
            slot.host_bound = true;
            slot.binds_in_flight += 1;
            self.shared.publish(ConnectionState::Connecting);
            (stale, slot.epoch)
        };

        // The remote died earlier but the host still holds our old binding.
        if stale {
            self.release_host_binding();
        }

        let accepted = self.host.bind_service(&self.shared.intent, self.connection.clone());

        let mut slot = self.shared.lock();
        slot.binds_in_flight -= 1;
        if slot.epoch != epoch {
            // `unbind` ran while the host was answering and left this
            // binding to us.
            drop(slot);
            if accepted {
                log::debug!(
                    "binding({}): unbound during bind, releasing",
                    self.shared.intent.action
                );
                self.release_host_binding();
            }
            return;
        }
        if accepted {
            return;
        }

        log::warn!("binding({}): host rejected bind request", self.shared.intent.action);
        slot.host_bound = false;
        slot.service = None;
        self.shared.publish(ConnectionState::Disconnected);
    }

    /// Release the connection. Safe to call in any state.
    ///
    /// The release hook, if any, runs on the calling thread before the host
    /// binding is released.
    pub fn unbind(&self) {
        let (release_host, released) = {
            let mut slot = self.shared.lock();
            slot.epoch = slot.epoch.wrapping_add(1);
            let was_bound = std::mem::replace(&mut slot.host_bound, false);
            let released = slot.service.take();
            self.shared.publish(ConnectionState::Disconnected);
            (was_bound && slot.binds_in_flight == 0, released)
        };
        if let Some(service) = released {
            self.shared.release(&service);
        }
        if release_host {
            self.release_host_binding();
        }
    }

    fn release_host_binding(&self) {
        match self.host.unbind_service(&self.connection) {
            Ok(()) => {}
            Err(HostError::NotBound) => {
                log::debug!(
                    "binding({}): host had no binding to release",
                    self.shared.intent.action
                );
            }
            Err(err) => {
                log::warn!("binding({}): unbind failed: {err}", self.shared.intent.action);
            }
        }
    }

    /// Wait until the binding is `Connected`. Returns immediately if it
    /// already is. Does not request a connection.
    pub async fn await_connected(&self) {
        let mut rx = self.shared.state.subscribe();
        // The sender lives in `self.shared`, so the channel cannot close
        // while we hold `&self`.
        let _ = rx.wait_for(ConnectionState::is_connected).await;
    }

    /// Current handle, `None` unless `Connected`.
    pub fn service(&self) -> Option<T> {
        self.shared.lock().service.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.current()
    }

    /// State and handle read together.
    pub fn snapshot(&self) -> (ConnectionState, Option<T>) {
        let slot = self.shared.lock();
        (self.shared.current(), slot.service.clone())
    }

    /// Receiver seeing the current state and every later change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn set_service_for_testing(&self, service: Option<T>) {
        let mut slot = self.shared.lock();
        let next = if service.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        slot.service = service;
        self.shared.publish(next);
    }
}
