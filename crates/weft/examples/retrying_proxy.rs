use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use weft::retry::{RetryConfig, RetryLayer, RetryStrategy};
use weft::{interceptable, AspectExt, BoxError};

#[derive(Debug)]
struct TemporaryError;

impl std::fmt::Display for TemporaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "temporary error")
    }
}

impl std::error::Error for TemporaryError {}

#[interceptable]
pub trait Feed {
    fn pull(&self, topic: String) -> Result<i32, BoxError>;
}

struct Upstream {
    calls: AtomicUsize,
}

impl Feed for Upstream {
    fn pull(&self, topic: String) -> Result<i32, BoxError> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst);
        println!("  upstream pull of {topic:?} (attempt {})", count + 1);
        if count < 2 {
            Err(Box::new(TemporaryError))
        } else {
            Ok(42)
        }
    }
}

fn main() -> Result<(), BoxError> {
    println!("weft retrying proxy example");
    println!("===========================\n");

    let upstream: Arc<dyn Feed> = Arc::new(Upstream {
        calls: AtomicUsize::new(0),
    });

    // The retry stage wraps the chain as a whole; call sites keep the
    // Arc<dyn Feed> surface.
    let config = RetryConfig::builder()
        .name("feed-retry")
        .strategy(RetryStrategy::new([Duration::from_millis(100); 4]))
        .on_retry(|attempt, delay| {
            println!("  [retry] attempt {attempt} failed, pausing {delay:?}");
        })
        .on_success(|attempts| {
            println!("  [retry] succeeded after {attempts} attempt(s)");
        })
        .build();

    let feed = upstream.with_layer(RetryLayer::new(config));

    let value = feed.pull("updates".to_string())?;
    println!("\npulled: {value}");
    Ok(())
}
