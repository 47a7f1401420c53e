use messenger_ipc::RemoteError;

use crate::error::SdkError;

/// Run a blocking remote call on tokio's blocking pool and wrap its failure.
///
/// Dropping the returned future does not stop the call; it completes in the
/// background and its result is discarded. Panics outside a tokio runtime.
pub(crate) async fn dispatch<R, F>(method: &'static str, call: F) -> Result<R, SdkError>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R, RemoteError> + Send + 'static,
{
    log::trace!("rpc: dispatching {method}");
    match tokio::task::spawn_blocking(call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            log::debug!("rpc: {method} failed: {err}");
            Err(SdkError::remote_call(method, err))
        }
        Err(join_err) => {
            log::warn!("rpc: {method} did not complete: {join_err}");
            Err(SdkError::remote_call(
                method,
                RemoteError::transport(format!("call aborted: {join_err}")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_passes_value_through() {
        let value = dispatch("echo", || Ok::<_, RemoteError>(Some("x".to_owned())))
            .await
            .expect("dispatch");
        assert_eq!(value.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn remote_error_is_wrapped() {
        let err = dispatch("echo", || Err::<(), _>(RemoteError::rejected("denied")))
            .await
            .expect_err("must fail");
        assert_eq!(
            err,
            SdkError::RemoteCall { method: "echo", source: RemoteError::rejected("denied") }
        );
    }

    #[tokio::test]
    async fn panicking_call_is_reported_as_remote_failure() {
        let err = dispatch("explode", || -> Result<(), RemoteError> { panic!("proxy bug") })
            .await
            .expect_err("must fail");
        assert!(matches!(
            err,
            SdkError::RemoteCall { method: "explode", source: RemoteError::Transport { .. } }
        ));
    }

    struct NoopWake;

    impl std::task::Wake for NoopWake {
        fn wake(self: std::sync::Arc<Self>) {}
    }

    #[test]
    #[should_panic(expected = "Tokio")]
    fn polling_outside_a_runtime_panics() {
        use std::future::Future;

        let waker = std::task::Waker::from(std::sync::Arc::new(NoopWake));
        let mut cx = std::task::Context::from_waker(&waker);
        let mut call = std::pin::pin!(dispatch("echo", || Ok::<_, RemoteError>(())));
        let _ = call.as_mut().poll(&mut cx);
    }
}
