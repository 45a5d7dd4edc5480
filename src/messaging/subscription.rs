use tokio::task::JoinHandle;

/// Handle to a registered message callback.
///
/// The callback stays registered while the handle is alive. Call
/// [`unsubscribe`](Self::unsubscribe) or drop the handle to stop delivery.
#[must_use = "dropping the subscription unregisters the callback"]
pub struct MessageSubscription {
    task: JoinHandle<()>,
}

impl MessageSubscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Returns `true` while the callback is still registered.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops delivering messages to the callback.
    pub fn unsubscribe(self) {}
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
