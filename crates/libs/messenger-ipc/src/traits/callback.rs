/// Push notification from the identity service after a background sync.
pub trait IdentityMessageCallback: Send + Sync {
    fn on_new_messages(&self, message_count: i32);
}

impl<F> IdentityMessageCallback for F
where
    F: Fn(i32) + Send + Sync,
{
    fn on_new_messages(&self, message_count: i32) {
        self(message_count)
    }
}
