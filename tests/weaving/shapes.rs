//! The four invocation shapes through a macro-generated proxy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weft::{weave, Advice, AspectExt, BoxError, Interceptable, Interceptor, MethodCall};

use crate::common::{zozo, Creature};

#[test]
fn the_contract_describes_every_method() {
    let contract = <dyn Creature as Interceptable>::contract();
    assert_eq!(contract.name(), "Creature");
    assert_eq!(contract.len(), 4);
    assert_eq!(contract.method_named("hop").unwrap().index(), 0);
    assert!(contract.method_named("hop").unwrap().shape().kind().has_result());
    assert!(!contract.method_named("nap").unwrap().shape().kind().is_async());
    assert!(contract.method_named("forage").unwrap().shape().kind().is_async());
    assert!(contract.method_named("rest").unwrap().shape().kind().is_async());
}

#[tokio::test]
async fn every_shape_routes_through_one_interceptor() {
    struct CountAll {
        calls: Arc<AtomicUsize>,
    }

    impl Interceptor for CountAll {
        fn before_call(&mut self, _call: &MethodCall) -> Result<Advice, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Advice::Proceed)
        }
    }

    let (creature, target) = zozo(0);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let proxy = weave(creature, move |_| {
        Some(Box::new(CountAll {
            calls: Arc::clone(&seen),
        }) as Box<dyn Interceptor>)
    });

    assert_eq!(proxy.hop().unwrap(), 666);
    proxy.nap().unwrap();
    assert_eq!(proxy.forage("marsh".to_string()).await.unwrap(), "found marsh");
    proxy.rest().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(target.hops(), 1);
    assert_eq!(target.naps(), 1);
    assert_eq!(target.rests(), 1);
}

#[tokio::test]
async fn interceptors_see_the_raw_arguments() {
    struct ArgProbe {
        seen: Arc<std::sync::Mutex<Option<String>>>,
    }

    impl Interceptor for ArgProbe {
        fn before_call(&mut self, call: &MethodCall) -> Result<Advice, BoxError> {
            if call.descriptor().name() == "forage" {
                *self.seen.lock().unwrap() = Some(call.args().value::<String>(0)?);
            }
            Ok(Advice::Proceed)
        }
    }

    let (creature, _target) = zozo(0);
    let seen = Arc::new(std::sync::Mutex::new(None));
    let probe = Arc::clone(&seen);
    let proxy = weave(creature, move |_| {
        Some(Box::new(ArgProbe {
            seen: Arc::clone(&probe),
        }) as Box<dyn Interceptor>)
    });

    proxy.forage("thicket".to_string()).await.unwrap();
    assert_eq!(seen.lock().unwrap().as_deref(), Some("thicket"));
}

#[test]
fn result_inspection_observes_without_mutating() {
    let (creature, _target) = zozo(0);
    let seen = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&seen);
    let proxy = creature.inspect_results::<i32, _>(move |value| {
        sink.store(*value as usize, Ordering::SeqCst);
        Ok(())
    });

    // The caller still receives the real value.
    assert_eq!(proxy.hop().unwrap(), 666);
    assert_eq!(seen.load(Ordering::SeqCst), 666);
}

#[test]
fn result_inspection_can_replace_the_outcome() {
    let (creature, _target) = zozo(0);
    let proxy = creature.inspect_results::<i32, _>(|value| {
        if *value > 100 {
            return Err("reading out of range".into());
        }
        Ok(())
    });

    let err = proxy.hop().unwrap_err();
    assert_eq!(err.to_string(), "reading out of range");
}

#[test]
fn a_factory_can_opt_out_per_method() {
    let log = Arc::new(std::sync::Mutex::new(Vec::new()));
    let (creature, _target) = zozo(0);
    let sink = Arc::clone(&log);
    let proxy = weave(creature, move |descriptor| {
        if descriptor.name() == "hop" {
            Some(Box::new(crate::common::Recorder::new("hop", &sink)) as Box<dyn Interceptor>)
        } else {
            None
        }
    });

    proxy.hop().unwrap();
    proxy.nap().unwrap();
    assert_eq!(
        crate::common::drain(&log),
        ["hop.before", "hop.after", "hop.release"]
    );
}
