use serde::{Deserialize, Serialize};

/// Failure of a single call across the process boundary.
///
/// This is the only failure signal a remote contract method produces. The
/// SDK wraps it before handing it to callers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("remote process died: {reason}")]
    PeerDied { reason: String },

    #[error("remote rejected call: {message}")]
    Rejected { message: String },

    #[error("transport error: {message}")]
    Transport { message: String },
}

impl RemoteError {
    /// Returns `true` when the remote process is gone and the binding will
    /// see an unsolicited disconnect.
    pub fn is_peer_died(&self) -> bool {
        matches!(self, Self::PeerDied { .. })
    }

    pub fn peer_died(reason: impl Into<String>) -> Self {
        Self::PeerDied { reason: reason.into() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}

/// Errors raised by the host's service locator itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HostError {
    /// The connection passed to `unbind_service` is not currently bound.
    #[error("service connection is not bound")]
    NotBound,

    #[error("host unavailable: {reason}")]
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_died_is_detected() {
        assert!(RemoteError::peer_died("binder died").is_peer_died());
        assert!(!RemoteError::rejected("nope").is_peer_died());
        assert!(!RemoteError::transport("eof").is_peer_died());
    }

    #[test]
    fn display_carries_cause() {
        assert_eq!(RemoteError::transport("eof").to_string(), "transport error: eof");
        assert_eq!(HostError::NotBound.to_string(), "service connection is not bound");
    }
}
