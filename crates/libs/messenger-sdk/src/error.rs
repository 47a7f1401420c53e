use messenger_ipc::RemoteError;
use thiserror::Error;

/// Errors surfaced to SDK callers.
///
/// `NotInstalled`, `PermissionNotGranted` and `ServiceNotConnected` are
/// preconditions the caller can fix; `RemoteCall` wraps a failure of the
/// messenger process or the transport; `MalformedData` means the messenger
/// answered with a list this SDK cannot read.
#[derive(Clone, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum SdkError {
    #[error("messenger app is not installed ({package})")]
    NotInstalled { package: String },

    #[error("permission not granted: {permission}")]
    PermissionNotGranted { permission: String },

    #[error("{service} service is not connected; call bind() and wait for the connected state")]
    ServiceNotConnected { service: &'static str },

    #[error("remote call '{method}' failed: {source}")]
    RemoteCall {
        method: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("malformed {kind} list: {message}")]
    MalformedData { kind: &'static str, message: String },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl SdkError {
    /// Returns `true` when repeating the same call may succeed. The SDK never
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteCall { .. })
    }

    /// Returns `true` for errors raised before any remote call was attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotInstalled { .. }
                | Self::PermissionNotGranted { .. }
                | Self::ServiceNotConnected { .. }
        )
    }

    pub(crate) fn remote_call(method: &'static str, source: RemoteError) -> Self {
        Self::RemoteCall { method, source }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }
}
