//! In-process broker backed by tokio broadcast channels.
//!
//! The reference broker implementation: exact-topic matching, one
//! broadcast channel per topic, shared by every connection cloned from
//! the same broker. Serves single-process deployments and tests; a
//! network-backed broker implements the same traits against
//! [`crate::config::BrokerSection::url`].

use super::traits::{Broker, BrokerConnection, MessageHandler, Subscription};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Buffered messages per topic before slow subscribers start lagging.
const TOPIC_CHANNEL_CAPACITY: usize = 64;

type TopicTable = Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>;

/// In-process broker. Cloning shares the topic table, so every clone and
/// every connection sees the same messages.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    topics: TopicTable,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn connect(&self) -> Result<Box<dyn BrokerConnection>> {
        Ok(Box::new(MemoryConnection {
            topics: self.topics.clone(),
        }))
    }
}

struct MemoryConnection {
    topics: TopicTable,
}

impl MemoryConnection {
    async fn sender(&self, topic: &str) -> broadcast::Sender<String> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl BrokerConnection for MemoryConnection {
    async fn publish(&self, topic: &str, payload: &str) -> Result<()> {
        let sender = self.sender(topic).await;
        // A send with no subscribers is a successful no-op.
        let receivers = sender.send(payload.to_string()).unwrap_or(0);
        debug!("published to {} ({} subscribers)", topic, receivers);
        Ok(())
    }

    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<Subscription> {
        let mut receiver = self.sender(topic).await.subscribe();
        let topic = topic.to_string();

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(payload) => handler(topic.clone(), payload),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("subscriber on {} lagged, skipped {}", topic, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(task))
    }
}
