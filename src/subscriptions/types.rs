//! Subscription descriptor and configuration.

use crate::error::Result;
use crate::handler::MessageHandler;
use crate::types::{Message, SubscriberId, Topic, TopicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::builder::InitialSubscriptionBuilder;

/// Predicate over the runtime topic of an incoming message.
pub type TopicFilter = Arc<dyn Fn(&TopicKey) -> bool + Send + Sync>;

/// Declarative settings applied to an initial builder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscriptionConfig {
    /// Only deliver messages published under exactly the declared topic.
    /// Default: false (every subtopic is accepted)
    pub reject_subtopics: bool,

    /// Owner recorded on the built subscription.
    pub subscriber: Option<SubscriberId>,
}

impl SubscriptionConfig {
    /// Parse a config from JSON. Missing fields take their defaults; unknown
    /// fields are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// An immutable subscription to messages of topic `T`.
///
/// Produced by [`SubscriptionBuilder::build`](super::SubscriptionBuilder::build).
/// Clones share the same topic filter and composed handler.
pub struct Subscription<T> {
    topic: Topic<T>,
    subscriber: Option<SubscriberId>,
    /// `None` accepts every subtopic of `topic`.
    topic_filter: Option<TopicFilter>,
    /// Handler function for the messages received by this subscription.
    message_handler: MessageHandler<T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        topic: Topic<T>,
        subscriber: Option<SubscriberId>,
        topic_filter: Option<TopicFilter>,
        message_handler: MessageHandler<T>,
    ) -> Self {
        Self {
            topic,
            subscriber,
            topic_filter,
            message_handler,
        }
    }

    /// Start building a subscription to `topic`.
    pub fn new_subscription(topic: Topic<T>) -> InitialSubscriptionBuilder<T> {
        InitialSubscriptionBuilder::new(topic, None)
    }

    /// Start building a subscription to `topic` owned by `subscriber`.
    pub fn new_subscription_for(
        topic: Topic<T>,
        subscriber: SubscriberId,
    ) -> InitialSubscriptionBuilder<T> {
        InitialSubscriptionBuilder::new(topic, Some(subscriber))
    }

    pub fn topic(&self) -> &Topic<T> {
        &self.topic
    }

    pub fn subscriber(&self) -> Option<SubscriberId> {
        self.subscriber
    }

    pub fn topic_filter(&self) -> Option<&TopicFilter> {
        self.topic_filter.as_ref()
    }

    pub fn message_handler(&self) -> &MessageHandler<T> {
        &self.message_handler
    }

    /// Check whether a message published under `runtime` should reach this
    /// subscription at all.
    pub fn accepts_topic(&self, runtime: &TopicKey) -> bool {
        if !runtime.is_subtopic_of(self.topic.key()) {
            return false;
        }
        match &self.topic_filter {
            Some(filter) => filter(runtime),
            None => true,
        }
    }

    /// Hand `message` to the composed handler if its topic is accepted.
    ///
    /// Returns whether the topic policy accepted the message. Content filters
    /// inside the handler chain may still drop it silently.
    pub fn deliver(&self, runtime: &TopicKey, message: T) -> bool {
        if !self.accepts_topic(runtime) {
            return false;
        }
        (self.message_handler)(message);
        true
    }
}

impl<T: Message> Subscription<T> {
    /// Deliver a message under the topic it reports for itself.
    pub fn deliver_message(&self, message: T) -> bool {
        let runtime = message.topic_key();
        self.deliver(&runtime, message)
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            subscriber: self.subscriber,
            topic_filter: self.topic_filter.clone(),
            message_handler: Arc::clone(&self.message_handler),
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("subscriber", &self.subscriber)
            .field("topic_filter", &self.topic_filter.is_some())
            .finish_non_exhaustive()
    }
}
