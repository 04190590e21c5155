//! Hook ordering, release discipline, and hook failure semantics.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use weft::{weave, Advice, BoxError, Interceptor, MethodCall};

use crate::common::{drain, zozo, Recorder};

fn release_count(log: &Arc<Mutex<Vec<String>>>) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.ends_with(".release"))
        .count()
}

#[test]
fn hooks_fire_in_order_with_release_last() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, _target) = zozo(0);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Recorder::new("a", &sink)) as Box<dyn Interceptor>)
    });

    proxy.hop().unwrap();
    assert_eq!(drain(&log), ["a.before", "a.after", "a.release"]);
}

#[test]
fn release_fires_once_on_success() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, _target) = zozo(0);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Recorder::new("a", &sink)) as Box<dyn Interceptor>)
    });

    proxy.hop().unwrap();
    assert_eq!(release_count(&log), 1);
}

#[test]
fn release_fires_once_when_a_failure_propagates() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, _target) = zozo(1);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Recorder::new("a", &sink)) as Box<dyn Interceptor>)
    });

    proxy.hop().unwrap_err();
    assert_eq!(drain(&log), ["a.before", "a.error", "a.release"]);
}

#[test]
fn release_fires_once_after_retries_then_success() {
    struct Persistent {
        recorder: Recorder,
    }

    impl Interceptor for Persistent {
        fn before_call(&mut self, call: &MethodCall) -> Result<Advice, BoxError> {
            self.recorder.before_call(call)
        }

        fn after_result(
            &mut self,
            call: &MethodCall,
            result: &(dyn std::any::Any + Send),
        ) -> Result<Advice, BoxError> {
            self.recorder.after_result(call, result)
        }

        fn on_error(&mut self, call: &MethodCall, error: &BoxError) -> Result<Advice, BoxError> {
            self.recorder.on_error(call, error)?;
            Ok(Advice::Retry(Duration::ZERO))
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(2);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Persistent {
            recorder: Recorder::new("a", &sink),
        }) as Box<dyn Interceptor>)
    });

    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 3);
    assert_eq!(
        drain(&log),
        ["a.before", "a.error", "a.error", "a.after", "a.release"]
    );
}

#[test]
fn release_fires_once_per_call_not_per_attempt() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, _target) = zozo(0);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Recorder::new("a", &sink)) as Box<dyn Interceptor>)
    });

    proxy.hop().unwrap();
    proxy.hop().unwrap();
    assert_eq!(release_count(&log), 2);
}

#[test]
fn failing_on_error_hook_replaces_the_call_failure() {
    struct Replacing {
        recorder: Recorder,
    }

    impl Interceptor for Replacing {
        fn before_call(&mut self, call: &MethodCall) -> Result<Advice, BoxError> {
            self.recorder.before_call(call)
        }

        fn on_error(&mut self, call: &MethodCall, error: &BoxError) -> Result<Advice, BoxError> {
            self.recorder.on_error(call, error)?;
            Err("hop rejected by policy".into())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(1);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Replacing {
            recorder: Recorder::new("a", &sink),
        }) as Box<dyn Interceptor>)
    });

    let err = proxy.hop().unwrap_err();
    // The hook's error stands in for the original failure.
    assert_eq!(err.to_string(), "hop rejected by policy");
    assert_eq!(target.hops(), 1);
    assert_eq!(drain(&log), ["a.before", "a.error", "a.release"]);
}

#[test]
fn failing_before_hook_terminates_without_on_error() {
    struct Broken {
        recorder: Recorder,
    }

    impl Interceptor for Broken {
        fn before_call(&mut self, call: &MethodCall) -> Result<Advice, BoxError> {
            self.recorder.before_call(call)?;
            Err("scope unavailable".into())
        }

        fn on_error(&mut self, call: &MethodCall, error: &BoxError) -> Result<Advice, BoxError> {
            self.recorder.on_error(call, error)
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(0);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Broken {
            recorder: Recorder::new("a", &sink),
        }) as Box<dyn Interceptor>)
    });

    let err = proxy.hop().unwrap_err();
    assert_eq!(err.to_string(), "scope unavailable");
    // The target was never reached, on_error never consulted, release ran.
    assert_eq!(target.hops(), 0);
    assert_eq!(drain(&log), ["a.before", "a.release"]);
}

#[tokio::test]
async fn release_fires_once_for_async_calls() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, _target) = zozo(0);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |_| {
        Some(Box::new(Recorder::new("a", &sink)) as Box<dyn Interceptor>)
    });

    proxy.forage("creek".to_string()).await.unwrap();
    assert_eq!(drain(&log), ["a.before", "a.after", "a.release"]);
}
