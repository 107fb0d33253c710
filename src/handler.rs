//! Message handlers and the decorators that wrap them.

use crossbeam_channel::{Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

/// Terminal sink invoked once per delivered message.
pub type MessageHandler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Turns a downstream handler into the handler installed one level up the
/// builder chain.
pub trait HandlerDecorator<U, R>: Send + Sync {
    fn decorate_handler(&self, handler: MessageHandler<R>) -> MessageHandler<U>;
}

impl<U, R, F> HandlerDecorator<U, R> for F
where
    F: Fn(MessageHandler<R>) -> MessageHandler<U> + Send + Sync,
{
    fn decorate_handler(&self, handler: MessageHandler<R>) -> MessageHandler<U> {
        self(handler)
    }
}

/// Combined content test and transformation.
///
/// `map` is only called for content that passed `filter`.
pub trait ContentFilterMapper<U, R>: Send + Sync {
    fn filter(&self, content: &U) -> bool;

    fn map(&self, content: U) -> R;
}

impl<U, R, P, M> ContentFilterMapper<U, R> for (P, M)
where
    P: Fn(&U) -> bool + Send + Sync,
    M: Fn(U) -> R + Send + Sync,
{
    fn filter(&self, content: &U) -> bool {
        (self.0)(content)
    }

    fn map(&self, content: U) -> R {
        (self.1)(content)
    }
}

/// Wrap a closure as a [`MessageHandler`].
pub fn from_fn<T, F>(handler: F) -> MessageHandler<T>
where
    F: Fn(T) + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// Shared flag telling whether a cancellable handler has stopped.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn cancel(&self) {
        if !self.0.swap(true, Ordering::AcqRel) {
            trace!("message handler cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handler that cancels itself once `handler` returns `true`.
///
/// After cancellation every further message is ignored. The owner of the
/// subscription can poll the returned [`Cancellation`] to unregister it.
pub fn cancellable<T, F>(handler: F) -> (MessageHandler<T>, Cancellation)
where
    T: 'static,
    F: Fn(T) -> bool + Send + Sync + 'static,
{
    let cancellation = Cancellation::default();
    let flag = cancellation.clone();
    let wrapped: MessageHandler<T> = Arc::new(move |message: T| {
        if flag.is_cancelled() {
            return;
        }
        if handler(message) {
            flag.cancel();
        }
    });
    (wrapped, cancellation)
}

/// Handler that forwards at most one message to `handler`.
pub fn once<T, F>(handler: F) -> (MessageHandler<T>, Cancellation)
where
    T: 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    let cancellation = Cancellation::default();
    let flag = Arc::clone(&cancellation.0);
    let wrapped: MessageHandler<T> = Arc::new(move |message: T| {
        // Claim the single slot before running so concurrent callers lose.
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            handler(message);
        }
    });
    (wrapped, cancellation)
}

/// Handler that pushes messages into a channel without blocking.
///
/// Messages are dropped when the channel is full or its receiver is gone.
pub fn forward_to<T>(sender: Sender<T>) -> MessageHandler<T>
where
    T: Send + 'static,
{
    Arc::new(move |message: T| match sender.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!("forwarding channel full, dropping message");
        }
        Err(TrySendError::Disconnected(_)) => {
            trace!("forwarding channel disconnected, dropping message");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Subscription, SubscriptionBuilder, Topic};
    use crossbeam_channel::{bounded, unbounded};
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancellable_stops_after_true() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let (handler, cancellation) = cancellable(move |n: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            n >= 2
        });

        handler(1);
        assert!(!cancellation.is_cancelled());
        handler(2);
        assert!(cancellation.is_cancelled());
        handler(3);

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_external_cancel() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let (handler, cancellation) = cancellable(move |_: ()| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        cancellation.cancel();
        handler(());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_once_runs_single_time_across_threads() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let (handler, cancellation) = once(move |_: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let handler = Arc::clone(&handler);
                std::thread::spawn(move || handler(i))
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(cancellation.is_cancelled());
    }

    #[test]
    fn test_forward_to_channel() {
        let (tx, rx) = unbounded();
        let handler = forward_to(tx);
        handler("a");
        handler("b");
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_forward_to_drops_when_full() {
        let (tx, rx) = bounded(1);
        let handler = forward_to(tx);
        handler(1);
        handler(2);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1]);
    }

    /// Counts how many instances have been dropped.
    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_forward_to_disconnected_drops_message() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = unbounded();
        let handler = forward_to(tx);
        drop(rx);

        handler(Tracked(Arc::clone(&dropped)));
        handler(Tracked(Arc::clone(&dropped)));

        assert_eq!(dropped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_from_fn_installs_terminal_handler() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let terminal = from_fn(move |n: usize| {
            counter.fetch_add(n, Ordering::SeqCst);
        });

        let topic = Topic::<usize>::new("counts").unwrap();
        let subscription = Subscription::new_subscription(topic)
            .filter_message(|n| *n > 1)
            .build_subscription(terminal);

        let key = subscription.topic().key().clone();
        subscription.deliver(&key, 1);
        subscription.deliver(&key, 5);

        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_closure_pair_filter_mapper() {
        let fm: &dyn ContentFilterMapper<String, usize> =
            &(|s: &String| !s.is_empty(), |s: String| s.len());
        assert!(!fm.filter(&String::new()));
        assert_eq!(fm.map("abc".to_string()), 3);
    }
}
