//! Both retry compositions are externally indistinguishable.

use std::time::{Duration, Instant};

use weft::weave;
use weft_retry::{retry_aspect, RetryExt, RetryStrategy};

use crate::common::{zozo, Tired};

fn strategy() -> RetryStrategy {
    RetryStrategy::from_millis([20, 20]).handle::<Tired>()
}

#[test]
fn attempt_counts_match_on_eventual_success() {
    let (creature, wrapped_target) = zozo(2);
    let wrapper = creature.with_retry(strategy());
    assert_eq!(wrapper.hop().unwrap(), 666);

    let (creature, woven_target) = zozo(2);
    let factory = retry_aspect(strategy());
    let woven = weave(creature, move |descriptor| factory(descriptor));
    assert_eq!(woven.hop().unwrap(), 666);

    assert_eq!(wrapped_target.hops(), woven_target.hops());
}

#[test]
fn attempt_counts_match_on_exhaustion() {
    let (creature, wrapped_target) = zozo(9);
    let wrapper = creature.with_retry(strategy());
    wrapper.hop().unwrap_err();

    let (creature, woven_target) = zozo(9);
    let factory = retry_aspect(strategy());
    let woven = weave(creature, move |descriptor| factory(descriptor));
    woven.hop().unwrap_err();

    assert_eq!(wrapped_target.hops(), 3);
    assert_eq!(woven_target.hops(), 3);
}

#[test]
fn pauses_match_within_scheduling_noise() {
    let (creature, _target) = zozo(2);
    let wrapper = creature.with_retry(strategy());
    let started = Instant::now();
    wrapper.hop().unwrap();
    let wrapped_elapsed = started.elapsed();

    let (creature, _target) = zozo(2);
    let factory = retry_aspect(strategy());
    let woven = weave(creature, move |descriptor| factory(descriptor));
    let started = Instant::now();
    woven.hop().unwrap();
    let woven_elapsed = started.elapsed();

    // Both must serve the full 40ms budget; neither gets to skip delays.
    assert!(wrapped_elapsed >= Duration::from_millis(40));
    assert!(woven_elapsed >= Duration::from_millis(40));
}

#[test]
fn non_retryable_failures_short_circuit_in_both() {
    let (creature, wrapped_target) = zozo(9);
    let wrapper = creature.with_retry(RetryStrategy::from_millis([0]).handle::<std::io::Error>());
    wrapper.hop().unwrap_err();
    assert_eq!(wrapped_target.hops(), 1);

    let (creature, woven_target) = zozo(9);
    let factory = retry_aspect(RetryStrategy::from_millis([0]).handle::<std::io::Error>());
    let woven = weave(creature, move |descriptor| factory(descriptor));
    woven.hop().unwrap_err();
    assert_eq!(woven_target.hops(), 1);
}
