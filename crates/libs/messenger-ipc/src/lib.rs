//! Interface boundary between the messenger SDK and the privileged messenger
//! application.
//!
//! This crate defines everything the SDK needs from the outside world:
//!
//! - **Remote contracts**: the synchronous service interfaces exposed by the
//!   messenger process ([`IdentityService`], [`MessagingService`]) and the
//!   push callback it invokes ([`IdentityMessageCallback`])
//! - **Host traits**: the service locator the host operating environment
//!   provides ([`ServiceHost`], [`ServiceConnection`])
//! - **Handle types**: [`Intent`], [`ComponentName`] and the type-erased
//!   [`Binder`]
//! - **`LoopbackHost`**: an in-process host that routes bindings to
//!   registered service objects
//!
//! # Trait hierarchy
//!
//! - [`IdentityService`]: isolated XMTP identity owned by the messenger
//! - [`MessagingService`]: send as the device user
//! - [`IdentityMessageCallback`]: new-message push from the identity service
//! - [`ServiceHost`]: bind/unbind, package and permission queries
//! - [`ServiceConnection`]: connect/disconnect notifications from the host

pub mod error;
pub mod host;
pub mod traits;
pub mod types;

pub use error::{HostError, RemoteError};
pub use host::{ServiceConnection, ServiceHost};
pub use traits::{IdentityMessageCallback, IdentityService, MessagingService};
pub use types::{Binder, ComponentName, Intent};

mod loopback;
pub use loopback::LoopbackHost;
