//! In-process topic system
//!
//! Fire-and-forget broadcast topics for ephemeral notifications (chat
//! events, typing indicators). All subscribers on a topic receive every
//! message published after they subscribed; nothing is persisted or
//! replayed. Persistence of chat history is the message repository's job -
//! publish happens after commit, with no transactional coupling
//! (at-most-once-after-commit delivery).

mod error;

pub use error::TopicError;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Default broadcast channel capacity per topic
const DEFAULT_BROADCAST_CAPACITY: usize = 1_024;

/// Trait for messages that can be published to topics
pub trait TopicMessage: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> TopicMessage for T {}

/// Handle to a broadcast topic - clone and share across publishers
#[derive(Clone)]
pub struct BroadcastTopic<T: TopicMessage> {
    sender: broadcast::Sender<T>,
}

impl<T: TopicMessage> BroadcastTopic<T> {
    /// Publish a message to all current subscribers.
    ///
    /// Returns the number of receivers the message reached. Zero receivers
    /// is not an error - broadcast is fire-and-forget.
    pub fn publish(&self, msg: T) -> usize {
        self.sender.send(msg).unwrap_or(0)
    }

    /// Subscribe to messages published after this call
    pub fn subscribe(&self) -> Subscriber<T> {
        Subscriber {
            rx: self.sender.subscribe(),
        }
    }

    /// Current subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Subscriber handle for a broadcast topic
pub struct Subscriber<T: TopicMessage> {
    rx: broadcast::Receiver<T>,
}

impl<T: TopicMessage> Subscriber<T> {
    pub async fn recv(&mut self) -> Result<T, TopicError> {
        self.rx.recv().await.map_err(Into::into)
    }
}

/// Type-erased topic storage
type TopicMap = HashMap<String, (TypeId, Arc<dyn Any + Send + Sync>)>;

/// Central topic service - manages all topics by name
pub struct TopicService {
    topics: RwLock<TopicMap>,
    broadcast_capacity: usize,
}

impl Default for TopicService {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicService {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BROADCAST_CAPACITY)
    }

    pub fn with_capacity(broadcast_capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            broadcast_capacity,
        }
    }

    /// Get or create a broadcast topic by name.
    ///
    /// The name pins the message type on first use; reusing a name with a
    /// different type is a programming error and panics in debug via the
    /// type check below.
    pub fn broadcast_topic<T: TopicMessage>(&self, name: &str) -> BroadcastTopic<T> {
        // Fast path: existing topic
        {
            let topics = self.topics.read();
            if let Some((type_id, any)) = topics.get(name) {
                if *type_id == TypeId::of::<T>() {
                    if let Some(sender) = any.downcast_ref::<broadcast::Sender<T>>() {
                        return BroadcastTopic {
                            sender: sender.clone(),
                        };
                    }
                }
                tracing::error!(topic = name, "Topic reused with a different message type");
            }
        }

        // Slow path: create under the write lock, re-checking first
        let mut topics = self.topics.write();
        if let Some((type_id, any)) = topics.get(name) {
            if *type_id == TypeId::of::<T>() {
                if let Some(sender) = any.downcast_ref::<broadcast::Sender<T>>() {
                    return BroadcastTopic {
                        sender: sender.clone(),
                    };
                }
            }
        }

        let (sender, _) = broadcast::channel::<T>(self.broadcast_capacity);
        topics.insert(
            name.to_string(),
            (TypeId::of::<T>(), Arc::new(sender.clone())),
        );
        BroadcastTopic { sender }
    }

    /// Shutdown: drop all topics so subscribers see ChannelClosed
    pub async fn shutdown(&self) {
        self.topics.write().clear();
        tracing::debug!("TopicService shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let service = TopicService::new();
        let topic = service.broadcast_topic::<String>("test");

        let mut sub = topic.subscribe();
        assert_eq!(topic.publish("hello".to_string()), 1);
        assert_eq!(sub.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fire_and_forget() {
        let service = TopicService::new();
        let topic = service.broadcast_topic::<String>("test");
        assert_eq!(topic.publish("nobody listening".to_string()), 0);
    }

    #[tokio::test]
    async fn test_same_name_returns_same_channel() {
        let service = TopicService::new();
        let a = service.broadcast_topic::<String>("shared");
        let b = service.broadcast_topic::<String>("shared");

        let mut sub = b.subscribe();
        a.publish("via a".to_string());
        assert_eq!(sub.recv().await.unwrap(), "via a");
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let service = TopicService::new();
        let topic = service.broadcast_topic::<u32>("fanout");

        let mut sub1 = topic.subscribe();
        let mut sub2 = topic.subscribe();
        assert_eq!(topic.publish(7), 2);
        assert_eq!(sub1.recv().await.unwrap(), 7);
        assert_eq!(sub2.recv().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_subscriber_misses_earlier_messages() {
        let service = TopicService::new();
        let topic = service.broadcast_topic::<u32>("late");

        topic.publish(1);
        let mut sub = topic.subscribe();
        topic.publish(2);
        assert_eq!(sub.recv().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_closes_subscribers() {
        let service = TopicService::new();
        let topic = service.broadcast_topic::<u32>("closing");
        let mut sub = topic.subscribe();

        // Drop the service-held sender and the local handle
        service.shutdown().await;
        drop(topic);

        assert!(matches!(
            sub.recv().await.unwrap_err(),
            TopicError::ChannelClosed
        ));
    }
}
