//! Package and permission constants of the messenger app, and checks against
//! the host.

use messenger_ipc::ServiceHost;

use crate::error::SdkError;

pub const MESSENGER_PACKAGE: &str = "org.ethereumhpone.messenger";

/// Send messages as the device user through the messaging service.
pub const SEND_MESSAGE_AS_USER: &str =
    "org.ethereumhpone.messenger.permission.SEND_MESSAGE_AS_USER";

/// Create and use an isolated XMTP identity through the identity service.
pub const GENERATE_XMTP_IDENTITY: &str =
    "org.ethereumhpone.messenger.permission.GENERATE_XMTP_IDENTITY";

pub fn has_send_permission(host: &dyn ServiceHost) -> bool {
    host.has_permission(SEND_MESSAGE_AS_USER)
}

pub fn has_identity_permission(host: &dyn ServiceHost) -> bool {
    host.has_permission(GENERATE_XMTP_IDENTITY)
}

pub fn is_messenger_installed(host: &dyn ServiceHost) -> bool {
    host.is_package_installed(MESSENGER_PACKAGE)
}

pub fn require_send_permission(host: &dyn ServiceHost) -> Result<(), SdkError> {
    require(host, SEND_MESSAGE_AS_USER)
}

pub fn require_identity_permission(host: &dyn ServiceHost) -> Result<(), SdkError> {
    require(host, GENERATE_XMTP_IDENTITY)
}

fn require(host: &dyn ServiceHost, permission: &str) -> Result<(), SdkError> {
    if host.has_permission(permission) {
        return Ok(());
    }
    Err(SdkError::PermissionNotGranted { permission: permission.to_owned() })
}
