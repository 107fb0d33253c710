//! Core types: topic keys, typed topics and subscriber identities.

use crate::error::{Result, SubscriptionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hierarchical runtime topic identifier, e.g. `connection.closed`.
///
/// Topics form a tree: `connection.closed` is a subtopic of `connection`.
/// Every topic is a subtopic of itself.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicKey(Arc<str>);

impl TopicKey {
    /// Separator between topic segments.
    pub const SEPARATOR: char = '.';

    /// Parse and validate a topic path.
    pub fn parse(path: impl AsRef<str>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_empty() {
            return Err(SubscriptionError::EmptyTopic);
        }
        if path.chars().any(char::is_whitespace) {
            return Err(SubscriptionError::invalid_topic(path, "contains whitespace"));
        }
        if path.split(Self::SEPARATOR).any(str::is_empty) {
            return Err(SubscriptionError::invalid_topic(
                path,
                "contains an empty segment",
            ));
        }
        Ok(TopicKey(Arc::from(path)))
    }

    /// Topic key derived from a Rust type name.
    pub fn of_type<T: ?Sized + 'static>() -> Self {
        let name: String = std::any::type_name::<T>()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        TopicKey(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR)
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The enclosing topic, or `None` for a root topic.
    pub fn parent(&self) -> Option<TopicKey> {
        self.0
            .rsplit_once(Self::SEPARATOR)
            .map(|(head, _)| TopicKey(Arc::from(head)))
    }

    /// Extend this topic by one or more segments.
    pub fn child(&self, segment: &str) -> Result<TopicKey> {
        if segment.is_empty() {
            return Err(SubscriptionError::invalid_topic(
                self.as_str(),
                "child segment is empty",
            ));
        }
        Self::parse(format!("{}{}{}", self.0, Self::SEPARATOR, segment))
    }

    /// Returns `true` if this topic equals `other` or lies beneath it.
    pub fn is_subtopic_of(&self, other: &TopicKey) -> bool {
        match self.0.strip_prefix(&*other.0) {
            Some("") => true,
            Some(rest) => rest.starts_with(Self::SEPARATOR),
            None => false,
        }
    }

    /// Returns `true` if this topic lies beneath `other` and is not `other` itself.
    pub fn is_strict_subtopic_of(&self, other: &TopicKey) -> bool {
        self != other && self.is_subtopic_of(other)
    }
}

impl fmt::Debug for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicKey({})", self.0)
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TopicKey {
    type Error = SubscriptionError;

    fn try_from(value: String) -> Result<Self> {
        TopicKey::parse(value)
    }
}

impl From<TopicKey> for String {
    fn from(key: TopicKey) -> Self {
        key.0.to_string()
    }
}

/// A topic bound to the static message type `T` delivered under it.
pub struct Topic<T> {
    key: TopicKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Topic<T> {
    /// Create a typed topic from a path.
    pub fn new(path: impl AsRef<str>) -> Result<Self> {
        TopicKey::parse(path).map(Self::from_key)
    }

    pub fn from_key(key: TopicKey) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    /// Topic named after the Rust type `T`.
    pub fn of() -> Self
    where
        T: 'static,
    {
        Self::from_key(TopicKey::of_type::<T>())
    }

    pub fn key(&self) -> &TopicKey {
        &self.key
    }

    /// Runtime key of a subtopic of this topic.
    pub fn subtopic(&self, segment: &str) -> Result<TopicKey> {
        self.key.child(segment)
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self::from_key(self.key.clone())
    }
}

impl<T> PartialEq for Topic<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Topic<T> {}

impl<T> Hash for Topic<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", self.key)
    }
}

impl<T> fmt::Display for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Identity of the party owning a subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

impl SubscriberId {
    /// Allocate a process-unique subscriber id.
    pub fn generate() -> Self {
        SubscriberId(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message that knows the topic it was published under.
///
/// Enum messages typically report a subtopic per variant, so a subscription
/// to the enum's root topic can choose whether to see every variant.
pub trait Message: 'static {
    fn topic_key(&self) -> TopicKey;
}
