use std::time::{Duration, Instant};

use weft_core::events::WeaveEvent;

/// Events emitted by the retry wrapper.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A retry attempt is about to be made.
    Retry {
        name: String,
        timestamp: Instant,
        /// 1-based number of the retry about to run.
        attempt: usize,
        delay: Duration,
    },
    /// The call succeeded, on the first attempt or after retries.
    Success {
        name: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The call failed after the delay sequence ran out.
    Exhausted {
        name: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// A failure was not retried because no predicate accepted it.
    Ignored { name: String, timestamp: Instant },
}

impl WeaveEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "Retry",
            RetryEvent::Success { .. } => "Success",
            RetryEvent::Exhausted { .. } => "Exhausted",
            RetryEvent::Ignored { .. } => "Ignored",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::Ignored { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            RetryEvent::Retry { name, .. }
            | RetryEvent::Success { name, .. }
            | RetryEvent::Exhausted { name, .. }
            | RetryEvent::Ignored { name, .. } => name,
        }
    }
}
