//! Retry strategies: bounded delay sequences plus error predicates.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use weft_core::BoxError;

type ErrorPredicate = Arc<dyn Fn(&BoxError) -> bool + Send + Sync>;

/// Which failures to retry, and how long to pause before each attempt.
///
/// The delay sequence is finite and bounds the retry count: a strategy
/// with `n` delays allows at most `n` retries after the initial attempt.
/// With no predicates every failure is considered retryable; with one or
/// more, a failure is retryable when any predicate accepts it.
///
/// Strategies are shared configuration. The per-call delay iterators are
/// created fresh by [`delays`](RetryStrategy::delays) and never shared
/// between calls.
#[derive(Clone)]
pub struct RetryStrategy {
    delays: Vec<Duration>,
    predicates: Vec<ErrorPredicate>,
}

impl RetryStrategy {
    /// Creates a strategy with the given delay sequence and no predicates.
    pub fn new<I>(delays: I) -> Self
    where
        I: IntoIterator<Item = Duration>,
    {
        Self {
            delays: delays.into_iter().collect(),
            predicates: Vec::new(),
        }
    }

    /// Creates a strategy from millisecond delays.
    pub fn from_millis<I>(millis: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self::new(millis.into_iter().map(Duration::from_millis))
    }

    /// Adds a predicate over the raw boxed error.
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&BoxError) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Marks every failure of type `E` retryable.
    pub fn handle<E>(self) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.retry_on(|error| error.downcast_ref::<E>().is_some())
    }

    /// Marks failures of type `E` accepted by `predicate` retryable.
    pub fn handle_when<E, F>(self, predicate: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_on(move |error| error.downcast_ref::<E>().is_some_and(&predicate))
    }

    /// Whether the strategy considers this failure retryable.
    pub fn should_retry(&self, error: &BoxError) -> bool {
        self.predicates.is_empty() || self.predicates.iter().any(|predicate| predicate(error))
    }

    /// A fresh delay iterator for one call.
    pub fn delays(&self) -> std::vec::IntoIter<Duration> {
        self.delays.clone().into_iter()
    }

    /// The maximum number of retries this strategy allows.
    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }
}

impl fmt::Debug for RetryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryStrategy")
            .field("delays", &self.delays)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}
