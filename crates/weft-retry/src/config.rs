use std::time::Duration;

use weft_core::events::{EventListener, EventListeners, FnListener};

use crate::events::RetryEvent;
use crate::layer::RetryLayer;
use crate::strategy::RetryStrategy;

/// Configuration for the retry wrapper.
pub struct RetryConfig {
    pub(crate) strategy: RetryStrategy,
    pub(crate) listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl RetryConfig {
    /// Creates a new builder for configuring retries.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Turns this configuration into a chain layer.
    pub fn layer(self) -> RetryLayer {
        RetryLayer::new(self)
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder {
    strategy: RetryStrategy,
    listeners: EventListeners<RetryEvent>,
    name: String,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - strategy: empty delay sequence (no retries)
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            strategy: RetryStrategy::new([]),
            listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the retry strategy.
    pub fn strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the name for this retry instance (used in events).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for each retry attempt.
    ///
    /// Called with the 1-based retry number and the delay that will run
    /// before it.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback when a call succeeds.
    ///
    /// Called with the total number of attempts made, so `1` means the
    /// first attempt succeeded.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when the delay sequence runs out.
    ///
    /// Called with the total number of attempts made.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when a failure is not retryable.
    pub fn on_ignored<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Ignored { .. } = event {
                f();
            }
        }));
        self
    }

    /// Registers a listener receiving every [`RetryEvent`].
    pub fn on_event<L>(mut self, listener: L) -> Self
    where
        L: EventListener<RetryEvent> + 'static,
    {
        self.listeners.add(listener);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RetryConfig {
        RetryConfig {
            strategy: self.strategy,
            listeners: self.listeners,
            name: self.name,
        }
    }
}
