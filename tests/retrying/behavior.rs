//! Core retry behavior through both compositions.

use std::time::{Duration, Instant};

use weft::retry::{retry_aspect, RetryExt, RetryStrategy};
use weft::weave;

use crate::common::{zozo, Tired};

#[test]
fn hop_fails_twice_then_returns_666_through_the_wrapper() {
    let (creature, target) = zozo(2);
    let proxy = creature.with_retry(RetryStrategy::from_millis([0, 0]));

    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 3);
}

#[test]
fn hop_fails_twice_then_returns_666_through_the_interceptor() {
    let (creature, target) = zozo(2);
    let factory = retry_aspect(RetryStrategy::from_millis([0, 0]));
    let proxy = weave(creature, move |descriptor| factory(descriptor));

    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 3);
}

#[test]
fn retry_pauses_for_the_configured_delays() {
    let (creature, _target) = zozo(2);
    let proxy = creature.with_retry(RetryStrategy::from_millis([30, 40]));

    let started = Instant::now();
    assert_eq!(proxy.hop().unwrap(), 666);
    assert!(started.elapsed() >= Duration::from_millis(70));
}

#[test]
fn an_exhausted_budget_surfaces_the_last_failure_unchanged() {
    let (creature, target) = zozo(2);
    let proxy = creature.with_retry(RetryStrategy::from_millis([0]));

    let err = proxy.hop().unwrap_err();
    assert!(err.downcast_ref::<Tired>().is_some());
    assert_eq!(err.to_string(), "too tired to hop");
    assert_eq!(target.hops(), 2);
}

#[test]
fn an_empty_strategy_never_retries() {
    let (creature, target) = zozo(1);
    let proxy = creature.with_retry(RetryStrategy::new([]));

    proxy.hop().unwrap_err();
    assert_eq!(target.hops(), 1);
}

#[test]
fn each_call_gets_a_fresh_delay_budget() {
    let (creature, target) = zozo(2);
    let proxy = creature.with_retry(RetryStrategy::from_millis([0, 0]));

    // First call consumes both retries; the second starts over.
    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(target.hops(), 4);
}

#[tokio::test]
async fn async_calls_retry_through_the_wrapper() {
    let (creature, target) = zozo(0);
    let proxy = creature.with_retry(RetryStrategy::from_millis([1, 1]));

    assert_eq!(proxy.forage("burrow".to_string()).await.unwrap(), "found burrow");
    proxy.rest().await.unwrap();
    assert_eq!(target.rests(), 1);
}
