//! Broker collaborator traits.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Callback invoked once per inbound message with `(topic, payload)`.
pub type MessageHandler = Arc<dyn Fn(String, String) + Send + Sync>;

/// A publish/subscribe broker the engine can dial.
///
/// Each pub/sub action opens its own connection, as the engine makes no
/// assumption about pooling; a pooling implementation can hand out shared
/// handles from `connect`.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Open a connection to the broker.
    ///
    /// Connection failures are reported here, before any publish or
    /// subscribe is attempted.
    async fn connect(&self) -> Result<Box<dyn BrokerConnection>>;
}

/// An open broker connection.
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Publish one payload to a concrete topic.
    async fn publish(&self, topic: &str, payload: &str) -> Result<()>;

    /// Subscribe to a concrete topic, invoking the handler once per
    /// inbound message for as long as the returned handle lives.
    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<Subscription>;
}

/// Handle keeping a subscription alive.
///
/// Dropping the handle ends the subscription.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// End the subscription explicitly.
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
