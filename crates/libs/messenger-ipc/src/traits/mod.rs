mod callback;
mod identity;
mod messaging;

pub use callback::IdentityMessageCallback;
pub use identity::IdentityService;
pub use messaging::MessagingService;
