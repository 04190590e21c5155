//! Advice-driven retry: the interceptor rendition of [`RetryStrategy`].

use std::sync::Arc;
use std::time::Duration;

use weft_core::{Advice, BoxError, Interceptor, InterceptorFactory, MethodCall};

use crate::strategy::RetryStrategy;

/// Interceptor advising [`Advice::Retry`] for retryable failures.
///
/// One instance steers one call; the delay iterator is created at
/// construction and consumed as failures arrive. A failure no predicate
/// accepts advises `Proceed` without consuming a delay, so a
/// non-retryable error leaves the budget intact.
#[derive(Debug)]
pub struct RetryInterceptor {
    strategy: Arc<RetryStrategy>,
    remaining: std::vec::IntoIter<Duration>,
}

impl RetryInterceptor {
    /// Creates a call-scoped interceptor for the given strategy.
    pub fn new(strategy: Arc<RetryStrategy>) -> Self {
        let remaining = strategy.delays();
        Self {
            strategy,
            remaining,
        }
    }
}

impl Interceptor for RetryInterceptor {
    fn on_error(&mut self, _call: &MethodCall, error: &BoxError) -> Result<Advice, BoxError> {
        if !self.strategy.should_retry(error) {
            return Ok(Advice::Proceed);
        }
        match self.remaining.next() {
            Some(delay) => Ok(Advice::Retry(delay)),
            None => Ok(Advice::Proceed),
        }
    }
}

/// Factory weaving a fresh [`RetryInterceptor`] around every call.
pub fn retry_aspect(strategy: RetryStrategy) -> InterceptorFactory {
    let strategy = Arc::new(strategy);
    Arc::new(move |_descriptor| {
        Some(Box::new(RetryInterceptor::new(Arc::clone(&strategy))) as Box<dyn Interceptor>)
    })
}
