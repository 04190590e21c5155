//! Self-contained retry: an invoker wrapper that loops without advice.
//!
//! [`Retry`] wraps a whole chain as one opaque unit and re-invokes it on
//! retryable failures. Unlike [`RetryInterceptor`](crate::RetryInterceptor)
//! it does not participate in the advice protocol, which lets it sit
//! outside an already woven chain. Both renditions make the same number of
//! attempts with the same pauses for the same [`RetryStrategy`].

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::BoxFuture;
use weft_core::{BoxError, BoxValue, Interceptable, Invoker, InvokerLayer, MethodCall};

use crate::config::RetryConfig;
use crate::events::RetryEvent;
use crate::strategy::RetryStrategy;

/// Invoker re-running its inner chain on retryable failures.
///
/// Each top-level call gets a fresh delay iterator from the strategy; the
/// sequence length bounds the retry count. Sync shapes pause with
/// `thread::sleep`, async shapes with `tokio::time::sleep`.
pub struct Retry {
    inner: Arc<dyn Invoker>,
    config: Arc<RetryConfig>,
}

impl Retry {
    /// Wraps `inner` with the given configuration.
    pub fn new(inner: Arc<dyn Invoker>, config: Arc<RetryConfig>) -> Self {
        Self { inner, config }
    }

    /// Wraps `inner` with a bare strategy and no listeners.
    pub fn with_strategy(inner: Arc<dyn Invoker>, strategy: RetryStrategy) -> Self {
        Self::new(
            inner,
            Arc::new(RetryConfig::builder().strategy(strategy).build()),
        )
    }

    fn run_sync<T>(
        &self,
        mut attempt: impl FnMut() -> Result<T, BoxError>,
    ) -> Result<T, BoxError> {
        let config = &self.config;
        let mut delays = config.strategy.delays();
        let mut attempts = 1usize;
        loop {
            match attempt() {
                Ok(value) => {
                    config.listeners.emit(&RetryEvent::Success {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts,
                    });
                    return Ok(value);
                }
                Err(error) => {
                    if !config.strategy.should_retry(&error) {
                        config.listeners.emit(&RetryEvent::Ignored {
                            name: config.name.clone(),
                            timestamp: Instant::now(),
                        });
                        return Err(error);
                    }
                    match delays.next() {
                        Some(delay) => {
                            config.listeners.emit(&RetryEvent::Retry {
                                name: config.name.clone(),
                                timestamp: Instant::now(),
                                attempt: attempts,
                                delay,
                            });
                            #[cfg(feature = "tracing")]
                            tracing::debug!(
                                name = %config.name,
                                attempt = attempts,
                                delay_ms = delay.as_millis() as u64,
                                "Retrying after failure"
                            );
                            thread::sleep(delay);
                            attempts += 1;
                        }
                        None => {
                            config.listeners.emit(&RetryEvent::Exhausted {
                                name: config.name.clone(),
                                timestamp: Instant::now(),
                                attempts,
                            });
                            return Err(error);
                        }
                    }
                }
            }
        }
    }

    async fn run_async<'a, T>(
        &'a self,
        mut attempt: impl FnMut() -> BoxFuture<'a, Result<T, BoxError>>,
    ) -> Result<T, BoxError> {
        let config = &self.config;
        let mut delays = config.strategy.delays();
        let mut attempts = 1usize;
        loop {
            match attempt().await {
                Ok(value) => {
                    config.listeners.emit(&RetryEvent::Success {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts,
                    });
                    return Ok(value);
                }
                Err(error) => {
                    if !config.strategy.should_retry(&error) {
                        config.listeners.emit(&RetryEvent::Ignored {
                            name: config.name.clone(),
                            timestamp: Instant::now(),
                        });
                        return Err(error);
                    }
                    match delays.next() {
                        Some(delay) => {
                            config.listeners.emit(&RetryEvent::Retry {
                                name: config.name.clone(),
                                timestamp: Instant::now(),
                                attempt: attempts,
                                delay,
                            });
                            #[cfg(feature = "tracing")]
                            tracing::debug!(
                                name = %config.name,
                                attempt = attempts,
                                delay_ms = delay.as_millis() as u64,
                                "Retrying after failure"
                            );
                            tokio::time::sleep(delay).await;
                            attempts += 1;
                        }
                        None => {
                            config.listeners.emit(&RetryEvent::Exhausted {
                                name: config.name.clone(),
                                timestamp: Instant::now(),
                                attempts,
                            });
                            return Err(error);
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("name", &self.config.name)
            .field("strategy", &self.config.strategy)
            .finish()
    }
}

#[async_trait]
impl Invoker for Retry {
    fn invoke_action(&self, call: &MethodCall) -> Result<(), BoxError> {
        self.run_sync(|| self.inner.invoke_action(call))
    }

    fn invoke_function(&self, call: &MethodCall) -> Result<BoxValue, BoxError> {
        self.run_sync(|| self.inner.invoke_function(call))
    }

    async fn invoke_action_async(&self, call: &MethodCall) -> Result<(), BoxError> {
        self.run_async(|| self.inner.invoke_action_async(call)).await
    }

    async fn invoke_function_async(&self, call: &MethodCall) -> Result<BoxValue, BoxError> {
        self.run_async(|| self.inner.invoke_function_async(call))
            .await
    }
}

/// Layer applying a [`Retry`] wrapper to a chain.
#[derive(Clone)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

impl RetryLayer {
    /// Creates a layer with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a builder for configuring a retry layer.
    pub fn builder() -> crate::config::RetryConfigBuilder {
        crate::config::RetryConfigBuilder::new()
    }
}

impl fmt::Debug for RetryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLayer")
            .field("name", &self.config.name)
            .finish()
    }
}

impl InvokerLayer for RetryLayer {
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        Arc::new(Retry::new(inner, Arc::clone(&self.config)))
    }
}

/// Retry sugar on `Arc<T>` for interceptable traits.
pub trait RetryExt<T: Interceptable + ?Sized>: Sized {
    /// Wraps the chain behind this value with a [`Retry`] layer.
    fn with_retry(self, strategy: RetryStrategy) -> Arc<T>;
}

impl<T> RetryExt<T> for Arc<T>
where
    T: Interceptable + ?Sized,
{
    fn with_retry(self, strategy: RetryStrategy) -> Arc<T> {
        weft_core::wrap(
            self,
            RetryLayer::new(RetryConfig::builder().strategy(strategy).build()),
        )
    }
}
