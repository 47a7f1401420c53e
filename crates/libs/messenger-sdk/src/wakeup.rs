//! Wake-up notifications for identities the application is not bound to.

use messenger_ipc::Intent;

use crate::sdk::MessengerSdk;

/// Integer extra carrying the number of new messages.
pub const MESSAGE_COUNT_EXTRA: &str = "message_count";

/// Receives new-message counts delivered while no identity binding is held.
///
/// Registered process-wide through
/// [`MessengerSdk::set_new_message_wakeup_handler`]. Closures taking the
/// count implement this trait.
pub trait NewMessageWakeupHandler: Send + Sync {
    fn on_wakeup(&self, message_count: u32);
}

impl<F> NewMessageWakeupHandler for F
where
    F: Fn(u32) + Send + Sync,
{
    fn on_wakeup(&self, message_count: u32) {
        self(message_count)
    }
}

/// Entry point for wake-up broadcasts from the messenger.
#[derive(Clone, Copy, Debug, Default)]
pub struct NewMessageReceiver;

impl NewMessageReceiver {
    pub fn new() -> Self {
        Self
    }

    /// Forwards a positive message count to the registered handler. Returns
    /// `true` when a handler was invoked.
    pub fn on_receive(&self, intent: &Intent) -> bool {
        let raw = intent.int_extra(MESSAGE_COUNT_EXTRA, 0);
        let count = match u32::try_from(raw) {
            Ok(count) if count > 0 => count,
            _ => {
                log::trace!("wakeup: ignoring message count {raw}");
                return false;
            }
        };
        let Some(handler) = MessengerSdk::wakeup_handler() else {
            log::debug!("wakeup: no handler registered, dropping count {count}");
            return false;
        };
        handler.on_wakeup(count);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::lock_globals;
    use std::sync::{Arc, Mutex};

    fn wakeup(count: i64) -> Intent {
        Intent::new("org.ethereumhpone.messenger.action.NEW_MESSAGES")
            .with_int_extra(MESSAGE_COUNT_EXTRA, count)
    }

    fn recording_handler() -> Arc<Mutex<Vec<u32>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        MessengerSdk::set_new_message_wakeup_handler(Some(Arc::new(move |count: u32| {
            sink.lock().expect("seen mutex poisoned").push(count);
        })));
        seen
    }

    #[test]
    fn non_positive_counts_are_dropped() {
        let _globals = lock_globals();
        let seen = recording_handler();
        let receiver = NewMessageReceiver::new();

        assert!(!receiver.on_receive(&wakeup(0)));
        assert!(!receiver.on_receive(&wakeup(-3)));
        assert!(!receiver.on_receive(&Intent::new("no.extras")));
        assert!(seen.lock().expect("seen mutex poisoned").is_empty());
    }

    #[test]
    fn positive_count_without_handler_is_dropped() {
        let _globals = lock_globals();
        assert!(!NewMessageReceiver::new().on_receive(&wakeup(4)));
    }

    #[test]
    fn positive_count_reaches_handler_once() {
        let _globals = lock_globals();
        let seen = recording_handler();

        assert!(NewMessageReceiver::new().on_receive(&wakeup(5)));
        assert_eq!(seen.lock().expect("seen mutex poisoned").as_slice(), [5]);
    }

    #[test]
    fn counts_beyond_u32_are_dropped() {
        let _globals = lock_globals();
        let seen = recording_handler();

        assert!(!NewMessageReceiver::new().on_receive(&wakeup(i64::from(u32::MAX) + 1)));
        assert!(seen.lock().expect("seen mutex poisoned").is_empty());
    }
}
