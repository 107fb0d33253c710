//! # Typed Subscriptions
//!
//! A typed publish/subscribe front-end: declare interest in a topic, narrow
//! and transform the messages through a chain of decorators, and attach a
//! handler. The result is an immutable [`Subscription`] for whatever
//! dispatcher delivers messages.
//!
//! ## Core Concepts
//!
//! - **Topics**: Hierarchical keys bound to a message type; `chat.private`
//!   is a subtopic of `chat`
//! - **Builders**: Immutable chain nodes; every filter or mapper returns a
//!   new builder
//! - **Handlers**: Shared closures composed at build time
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use typed_subscription::{Subscription, SubscriptionBuilder, Topic, TopicKey};
//!
//! # fn main() -> typed_subscription::Result<()> {
//! let topic = Topic::<String>::new("chat")?;
//! let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! let subscription = Subscription::new_subscription(topic)
//!     .filter_message(|s: &String| s.len() > 2)
//!     .mapped(|s: String| s.to_uppercase())
//!     .build(move |s| sink.lock().unwrap().push(s));
//!
//! let chat = TopicKey::parse("chat")?;
//! subscription.deliver(&chat, "hi".to_string());
//! subscription.deliver(&chat, "hey".to_string());
//! assert_eq!(*seen.lock().unwrap(), vec!["HEY".to_string()]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handler;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{Result, SubscriptionError};
pub use handler::{Cancellation, ContentFilterMapper, HandlerDecorator, MessageHandler};
pub use subscriptions::{
    DecoratingSubscriptionBuilder, InitialSubscriptionBuilder, Subscription, SubscriptionBuilder,
    SubscriptionConfig, TopicFilter,
};
pub use types::{Message, SubscriberId, Topic, TopicKey};
