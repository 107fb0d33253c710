//! Typed subscriptions built from decorator chains.
//!
//! A chain starts at [`Subscription::new_subscription`], picks up any number
//! of filters and mappers, and ends with `build`:
//! - Filters drop content silently
//! - Mappers change the content type seen further down the chain
//! - The topic filter decides which runtime subtopics are delivered at all
//!
//! # Example
//!
//! ```ignore
//! let topic = Topic::<String>::new("chat")?;
//!
//! let subscription = Subscription::new_subscription(topic)
//!     .reject_subtopics()
//!     .filter_message(|s| s.len() > 2)
//!     .mapped(|s| s.to_uppercase())
//!     .build(|s| println!("{}", s));
//!
//! subscription.deliver(&TopicKey::parse("chat")?, "hey".to_string());
//! ```

mod builder;
mod types;

pub use builder::{DecoratingSubscriptionBuilder, InitialSubscriptionBuilder, SubscriptionBuilder};
pub use types::{Subscription, SubscriptionConfig, TopicFilter};
