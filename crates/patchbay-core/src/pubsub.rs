//! Shared pub/sub binding logic.
//!
//! The server dispatcher and the client proxy perform exactly the same
//! steps for a pub/sub route: render the topic, dial the broker, act.
//! Both delegate here so the two sides cannot drift.

use crate::broker::{Broker, BrokerConnection, MessageHandler, Subscription};
use crate::error::Result;
use crate::params::ArgumentBag;
use crate::topic;

/// Publish one message on a pub route.
///
/// The topic is rendered before the broker is dialed; a validation
/// failure never opens a connection.
pub async fn publish(
    broker: &dyn Broker,
    prefix: &str,
    pattern: &str,
    args: &ArgumentBag,
    message: &str,
) -> Result<()> {
    let full_topic = topic::render(prefix, pattern, args)?;
    let connection = broker.connect().await?;
    connection.publish(&full_topic, message).await
}

/// Open a subscription on a sub route.
///
/// The handler fires once per inbound message with `(topic, payload)`;
/// the subscription lives as long as the returned handle.
pub async fn subscribe(
    broker: &dyn Broker,
    prefix: &str,
    pattern: &str,
    args: &ArgumentBag,
    handler: MessageHandler,
) -> Result<Subscription> {
    let full_topic = topic::render(prefix, pattern, args)?;
    let connection = broker.connect().await?;
    connection.subscribe(&full_topic, handler).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use crate::error::PatchbayError;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn bag(value: serde_json::Value) -> ArgumentBag {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_publish_renders_topic_with_prefix() {
        let broker = MemoryBroker::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = subscribe(
            &broker,
            "/",
            "games/{game_id}",
            &bag(json!({"game_id": 1})),
            Arc::new(move |topic, payload| {
                let _ = tx.send((topic, payload));
            }),
        )
        .await
        .unwrap();

        publish(
            &broker,
            "/",
            "games/{game_id}",
            &bag(json!({"game_id": 1})),
            "hello",
        )
        .await
        .unwrap();

        let (topic, payload) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(topic, "/games/1");
        assert_eq!(payload, "hello");
    }

    #[tokio::test]
    async fn test_validation_short_circuits_before_the_broker() {
        let broker = MemoryBroker::new();
        let err = publish(&broker, "/", "games/{game_id}", &bag(json!({})), "m")
            .await
            .unwrap_err();
        assert!(matches!(err, PatchbayError::UnresolvedPlaceholder { .. }));
    }
}
