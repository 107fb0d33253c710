//! Builders that compose filters and mappers into a subscription handler.
//!
//! Each combinator returns a new builder pointing at its receiver; nothing
//! is wrapped until `build`, which walks the chain from the outermost
//! builder back to the [`InitialSubscriptionBuilder`]. The first declared
//! decorator ends up outermost, so decorators run in declaration order.

use crate::handler::{ContentFilterMapper, HandlerDecorator, MessageHandler};
use crate::types::{SubscriberId, Topic, TopicKey};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use super::types::{Subscription, SubscriptionConfig, TopicFilter};

/// Composition operations over a subscription to topic `T` whose content
/// currently has type `U`.
pub trait SubscriptionBuilder<T, U>: Send + Sync {
    /// Realise the subscription with an already shared handler.
    fn build_subscription(&self, handler: MessageHandler<U>) -> Subscription<T>;

    /// Number of decorators between this builder and the initial builder.
    fn depth(&self) -> usize;

    /// Realise the subscription, installing `handler` at the end of the chain.
    ///
    /// May be called repeatedly; every call yields an independent
    /// subscription sharing the declared decorators.
    fn build<F>(&self, handler: F) -> Subscription<T>
    where
        Self: Sized,
        F: Fn(U) + Send + Sync + 'static,
    {
        self.build_subscription(Arc::new(handler))
    }

    /// Extend the chain with a custom decorator.
    fn decorated<R, D>(&self, decorator: D) -> DecoratingSubscriptionBuilder<T, U, R>
    where
        Self: Clone + Sized + 'static,
        D: HandlerDecorator<U, R> + 'static,
    {
        DecoratingSubscriptionBuilder::new(Arc::new(self.clone()), decorator)
    }

    /// Forward only content for which `filter` holds.
    fn filter_message<P>(&self, filter: P) -> DecoratingSubscriptionBuilder<T, U, U>
    where
        Self: Clone + Sized + 'static,
        P: Fn(&U) -> bool + Send + Sync + 'static,
        U: 'static,
    {
        let filter = Arc::new(filter);
        self.decorated(move |handler: MessageHandler<U>| -> MessageHandler<U> {
            let filter = Arc::clone(&filter);
            Arc::new(move |message: U| {
                if filter(&message) {
                    handler(message);
                }
            })
        })
    }

    /// Transform content with `mapper` before forwarding it.
    fn mapped<R, M>(&self, mapper: M) -> DecoratingSubscriptionBuilder<T, U, R>
    where
        Self: Clone + Sized + 'static,
        M: Fn(U) -> R + Send + Sync + 'static,
        U: 'static,
        R: 'static,
    {
        let mapper = Arc::new(mapper);
        self.decorated(move |handler: MessageHandler<R>| -> MessageHandler<U> {
            let mapper = Arc::clone(&mapper);
            Arc::new(move |message: U| handler(mapper(message)))
        })
    }

    /// Filter then map in a single decorator layer.
    fn filter_mapped<R, F>(&self, filter_mapper: F) -> DecoratingSubscriptionBuilder<T, U, R>
    where
        Self: Clone + Sized + 'static,
        F: ContentFilterMapper<U, R> + 'static,
        U: 'static,
        R: 'static,
    {
        let filter_mapper = Arc::new(filter_mapper);
        self.decorated(move |handler: MessageHandler<R>| -> MessageHandler<U> {
            let filter_mapper = Arc::clone(&filter_mapper);
            Arc::new(move |message: U| {
                if filter_mapper.filter(&message) {
                    handler(filter_mapper.map(message));
                }
            })
        })
    }

    /// Forward the `Some` results of `f`, dropping content that maps to `None`.
    fn filter_map<R, F>(&self, f: F) -> DecoratingSubscriptionBuilder<T, U, R>
    where
        Self: Clone + Sized + 'static,
        F: Fn(U) -> Option<R> + Send + Sync + 'static,
        U: 'static,
        R: 'static,
    {
        let f = Arc::new(f);
        self.decorated(move |handler: MessageHandler<R>| -> MessageHandler<U> {
            let f = Arc::clone(&f);
            Arc::new(move |message: U| {
                if let Some(content) = f(message) {
                    handler(content);
                }
            })
        })
    }
}

impl<T, U, B> SubscriptionBuilder<T, U> for Arc<B>
where
    B: SubscriptionBuilder<T, U> + ?Sized,
{
    fn build_subscription(&self, handler: MessageHandler<U>) -> Subscription<T> {
        (**self).build_subscription(handler)
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }
}

/// Root of every builder chain, bound to a concrete topic.
pub struct InitialSubscriptionBuilder<T> {
    topic: Topic<T>,
    subscriber: Option<SubscriberId>,
    topic_filter: Option<TopicFilter>,
}

impl<T> InitialSubscriptionBuilder<T> {
    pub(crate) fn new(topic: Topic<T>, subscriber: Option<SubscriberId>) -> Self {
        Self {
            topic,
            subscriber,
            topic_filter: None,
        }
    }

    /// Builder for `topic` with `config` applied.
    pub fn from_config(topic: Topic<T>, config: &SubscriptionConfig) -> Self {
        let builder = Self::new(topic, config.subscriber);
        if config.reject_subtopics {
            builder.reject_subtopics()
        } else {
            builder
        }
    }

    pub fn topic(&self) -> &Topic<T> {
        &self.topic
    }

    /// Decide which runtime subtopics are delivered.
    ///
    /// Replaces any filter set earlier on this chain.
    pub fn filter_topic<P>(&self, filter: P) -> Self
    where
        P: Fn(&TopicKey) -> bool + Send + Sync + 'static,
    {
        Self {
            topic: self.topic.clone(),
            subscriber: self.subscriber,
            topic_filter: Some(Arc::new(filter)),
        }
    }

    /// Accept messages published under exactly the declared topic only.
    pub fn reject_subtopics(&self) -> Self {
        let topic = self.topic.key().clone();
        self.filter_topic(move |runtime: &TopicKey| *runtime == topic)
    }
}

impl<T> SubscriptionBuilder<T, T> for InitialSubscriptionBuilder<T> {
    fn build_subscription(&self, handler: MessageHandler<T>) -> Subscription<T> {
        debug!(
            topic = %self.topic,
            subscriber = ?self.subscriber,
            topic_filter = self.topic_filter.is_some(),
            "built subscription"
        );
        Subscription::new(
            self.topic.clone(),
            self.subscriber,
            self.topic_filter.clone(),
            handler,
        )
    }

    fn depth(&self) -> usize {
        0
    }
}

impl<T> Clone for InitialSubscriptionBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            subscriber: self.subscriber,
            topic_filter: self.topic_filter.clone(),
        }
    }
}

impl<T> fmt::Debug for InitialSubscriptionBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitialSubscriptionBuilder")
            .field("topic", &self.topic)
            .field("subscriber", &self.subscriber)
            .field("topic_filter", &self.topic_filter.is_some())
            .finish()
    }
}

/// A builder that wraps the eventual handler before passing it to `parent`.
pub struct DecoratingSubscriptionBuilder<T, U, R> {
    parent: Arc<dyn SubscriptionBuilder<T, U>>,
    decorator: Arc<dyn HandlerDecorator<U, R>>,
}

impl<T, U, R> DecoratingSubscriptionBuilder<T, U, R> {
    pub fn new<D>(parent: Arc<dyn SubscriptionBuilder<T, U>>, decorator: D) -> Self
    where
        D: HandlerDecorator<U, R> + 'static,
    {
        Self {
            parent,
            decorator: Arc::new(decorator),
        }
    }
}

impl<T, U, R> SubscriptionBuilder<T, R> for DecoratingSubscriptionBuilder<T, U, R> {
    fn build_subscription(&self, handler: MessageHandler<R>) -> Subscription<T> {
        let decorated = self.decorator.decorate_handler(handler);
        trace!("decorated message handler");
        self.parent.build_subscription(decorated)
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }
}

impl<T, U, R> Clone for DecoratingSubscriptionBuilder<T, U, R> {
    fn clone(&self) -> Self {
        Self {
            parent: Arc::clone(&self.parent),
            decorator: Arc::clone(&self.decorator),
        }
    }
}

impl<T, U, R> fmt::Debug for DecoratingSubscriptionBuilder<T, U, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratingSubscriptionBuilder")
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}
