//! Shared fixtures for the integration suite.
#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use weft::{async_trait, interceptable, Advice, BoxError, Interceptor, MethodCall};

/// Failure raised by a grumpy [`Creature`].
#[derive(Debug)]
pub struct Tired;

impl fmt::Display for Tired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "too tired to hop")
    }
}

impl std::error::Error for Tired {}

/// Failure that no strategy in these tests treats as retryable.
#[derive(Debug)]
pub struct Grounded;

impl fmt::Display for Grounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grounded")
    }
}

impl std::error::Error for Grounded {}

/// The interface the whole suite intercepts: one method per shape.
#[interceptable]
pub trait Creature {
    fn hop(&self) -> Result<i32, BoxError>;
    fn nap(&self) -> Result<(), BoxError>;
    async fn forage(&self, spot: String) -> Result<String, BoxError>;
    async fn rest(&self) -> Result<(), BoxError>;
}

/// Implementation whose `hop` fails a configurable number of times before
/// settling on 666.
pub struct ZoZo {
    fail_hops: usize,
    hops: AtomicUsize,
    naps: AtomicUsize,
    rests: AtomicUsize,
}

impl ZoZo {
    pub fn new(fail_hops: usize) -> Self {
        Self {
            fail_hops,
            hops: AtomicUsize::new(0),
            naps: AtomicUsize::new(0),
            rests: AtomicUsize::new(0),
        }
    }

    pub fn hops(&self) -> usize {
        self.hops.load(Ordering::SeqCst)
    }

    pub fn naps(&self) -> usize {
        self.naps.load(Ordering::SeqCst)
    }

    pub fn rests(&self) -> usize {
        self.rests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Creature for ZoZo {
    fn hop(&self) -> Result<i32, BoxError> {
        let attempt = self.hops.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_hops {
            Err(Box::new(Tired))
        } else {
            Ok(666)
        }
    }

    fn nap(&self) -> Result<(), BoxError> {
        self.naps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn forage(&self, spot: String) -> Result<String, BoxError> {
        Ok(format!("found {spot}"))
    }

    async fn rest(&self) -> Result<(), BoxError> {
        self.rests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Builds a ZoZo and a second handle for inspecting its counters.
pub fn zozo(fail_hops: usize) -> (Arc<dyn Creature>, Arc<ZoZo>) {
    let zozo = Arc::new(ZoZo::new(fail_hops));
    (Arc::clone(&zozo) as Arc<dyn Creature>, zozo)
}

/// Interceptor appending every hook invocation to a shared log.
///
/// The drop entry doubles as the release-exactly-once probe.
pub struct Recorder {
    tag: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            tag,
            log: Arc::clone(log),
        }
    }

    fn note(&self, hook: &str) {
        self.log.lock().unwrap().push(format!("{}.{hook}", self.tag));
    }
}

impl Interceptor for Recorder {
    fn before_call(&mut self, _call: &MethodCall) -> Result<Advice, BoxError> {
        self.note("before");
        Ok(Advice::Proceed)
    }

    fn after_completion(&mut self, _call: &MethodCall) -> Result<Advice, BoxError> {
        self.note("after");
        Ok(Advice::Proceed)
    }

    fn after_result(
        &mut self,
        _call: &MethodCall,
        _result: &(dyn std::any::Any + Send),
    ) -> Result<Advice, BoxError> {
        self.note("after");
        Ok(Advice::Proceed)
    }

    fn on_error(&mut self, _call: &MethodCall, _error: &BoxError) -> Result<Advice, BoxError> {
        self.note("error");
        Ok(Advice::Proceed)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.note("release");
    }
}

/// Drains the log into a plain vector.
pub fn drain(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().drain(..).collect()
}
