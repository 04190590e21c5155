//! Retry stacked around woven chains: the inner chain is one opaque unit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use weft::retry::{RetryConfig, RetryStrategy};
use weft::{AspectExt, Interceptable, Interceptor, RetryExt, WeaveLayer};

use crate::common::{drain, zozo, Creature, Recorder};

fn recording_layer(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> WeaveLayer {
    let log = Arc::clone(log);
    WeaveLayer::new(move |_descriptor| {
        Some(Box::new(Recorder::new(tag, &log)) as Box<dyn Interceptor>)
    })
}

#[test]
fn each_retry_attempt_reruns_the_whole_inner_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(2);

    let proxy = weft::wrap(creature, recording_layer("w", &log))
        .with_retry(RetryStrategy::from_millis([0, 0]));

    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 3);
    // A fresh interceptor per attempt, released per attempt.
    assert_eq!(
        drain(&log),
        [
            "w.before", "w.error", "w.release", "w.before", "w.error", "w.release", "w.before",
            "w.after", "w.release"
        ]
    );
}

#[test]
fn retry_outside_sees_one_failure_per_attempt() {
    let retries = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&retries);
    let config = RetryConfig::builder()
        .name("hop")
        .strategy(RetryStrategy::from_millis([0, 0, 0]))
        .on_retry(move |_attempt, _delay| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(1);
    let proxy = weft::wrap(creature, recording_layer("w", &log)).with_layer(config.layer());

    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 2);
    assert_eq!(retries.load(Ordering::SeqCst), 1);
}

#[test]
fn repeated_wraps_extend_one_chain_behind_one_proxy() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(0);

    let woven = weft::wrap(creature, recording_layer("w", &log));
    let chain = <dyn Creature as Interceptable>::chain_of(&woven).unwrap();

    let stacked = Arc::clone(&woven).with_retry(RetryStrategy::from_millis([0]));
    let extended = <dyn Creature as Interceptable>::chain_of(&stacked).unwrap();
    assert!(!Arc::ptr_eq(&chain, &extended));

    // Both the retry wrapper and the original interceptor see the call.
    assert_eq!(stacked.hop().unwrap(), 666);
    assert_eq!(target.hops(), 1);
    assert_eq!(drain(&log), ["w.before", "w.after", "w.release"]);
}

#[test]
fn a_vetoing_inspector_inside_retry_consumes_the_budget() {
    let (creature, target) = zozo(0);

    let proxy = creature
        .inspect_results::<i32, _>(|reading| {
            if *reading > 100 {
                Err("reading out of range".into())
            } else {
                Ok(())
            }
        })
        .with_retry(RetryStrategy::from_millis([0]));

    let err = proxy.hop().unwrap_err();
    assert_eq!(err.to_string(), "reading out of range");
    assert_eq!(target.hops(), 2);
}

#[test]
fn an_accepting_inspector_inside_retry_sees_only_the_final_value() {
    let seen = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&seen);
    let (creature, target) = zozo(2);

    let proxy = creature
        .inspect_results::<i32, _>(move |reading| {
            sink.fetch_add(*reading as usize, Ordering::SeqCst);
            Ok(())
        })
        .with_retry(RetryStrategy::from_millis([0, 0]));

    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 3);
    // Failing attempts never reach the inspector.
    assert_eq!(seen.load(Ordering::SeqCst), 666);
}

#[tokio::test]
async fn async_calls_stack_the_same_way() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (creature, target) = zozo(0);

    let proxy = weft::wrap(creature, recording_layer("w", &log))
        .with_retry(RetryStrategy::from_millis([0]));

    proxy.rest().await.unwrap();
    assert_eq!(target.rests(), 1);
    assert_eq!(drain(&log), ["w.before", "w.after", "w.release"]);
}
