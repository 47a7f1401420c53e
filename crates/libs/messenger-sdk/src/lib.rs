//! Client SDK for the privileged messenger application.
//!
//! Two typed clients talk to the messenger over the host's service binding
//! mechanism:
//!
//! - [`MessagingClient`] sends messages as the device user
//! - [`IdentityClient`] operates an isolated XMTP identity whose keys never
//!   leave the messenger process
//!
//! Both are built on [`ServiceBindingDelegate`], which owns the
//! connect/disconnect lifecycle of one remote service and exposes its
//! [`ConnectionState`] as a `tokio::sync::watch` stream. [`MessengerSdk`] is
//! the process-wide entry point composing the two.
//!
//! # Panics
//!
//! Remote calls run on tokio's blocking pool. The async RPC methods of both
//! clients panic when polled outside a tokio runtime. `await_connected` and
//! the binding lifecycle work on any executor.
//!
//! ```no_run
//! # async fn run(host: std::sync::Arc<dyn messenger_ipc::ServiceHost>) -> Result<(), messenger_sdk::SdkError> {
//! let sdk = messenger_sdk::MessengerSdk::get_instance(host)?;
//! sdk.messaging().bind();
//! sdk.messaging().await_connected().await;
//! sdk.messaging().send_message("0xRecipient", "gm").await?;
//! # Ok(())
//! # }
//! ```

mod binding;
pub mod config;
mod error;
mod identity;
mod messaging;
pub mod parsing;
pub mod permissions;
mod rpc;
mod sdk;
mod state;
pub mod types;
mod wakeup;

pub use binding::{AsInterface, OnConnected, OnReleased, ServiceBindingDelegate};
pub use config::SdkConfig;
pub use error::SdkError;
pub use identity::IdentityClient;
pub use messaging::MessagingClient;
pub use sdk::MessengerSdk;
pub use state::ConnectionState;
pub use types::{IdentityConversation, IdentityMessage};
pub use wakeup::{NewMessageReceiver, NewMessageWakeupHandler, MESSAGE_COUNT_EXTRA};
