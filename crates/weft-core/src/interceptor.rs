//! Interceptor hooks and per-call interceptor construction.
//!
//! A [`Weave`](crate::weave::Weave) asks its [`InterceptorFactory`] for a
//! fresh interceptor on every call, so hook state is call-local by
//! construction. Returning `None` from the factory skips interception for
//! that call entirely.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::advice::Advice;
use crate::contract::{MethodCall, MethodDescriptor};
use crate::error::BoxError;

/// Call-scoped hooks steering one woven invocation.
///
/// Every hook returns [`Advice`] to direct the call, or an error to
/// terminate it immediately. All hooks default to
/// [`Advice::Proceed`], so implementations override only the stages they
/// care about. The interceptor is dropped when the call finishes, whatever
/// the outcome; `Drop` is the place for per-call cleanup.
pub trait Interceptor: Send {
    /// Runs before the first attempt.
    ///
    /// [`Advice::Done`] here suppresses the call: the target is never
    /// invoked and the caller receives the result type's default value.
    fn before_call(&mut self, _call: &MethodCall) -> Result<Advice, BoxError> {
        Ok(Advice::Proceed)
    }

    /// Runs after an attempt of an action-shaped method succeeds.
    ///
    /// [`Advice::Retry`] discards the completion and re-invokes after the
    /// delay; anything else finishes the call.
    fn after_completion(&mut self, _call: &MethodCall) -> Result<Advice, BoxError> {
        Ok(Advice::Proceed)
    }

    /// Runs after an attempt of a function-shaped method succeeds, with a
    /// view of the produced value.
    ///
    /// [`Advice::Retry`] discards the value and re-invokes after the
    /// delay; anything else lets the produced value flow to the caller.
    fn after_result(
        &mut self,
        _call: &MethodCall,
        _result: &(dyn Any + Send),
    ) -> Result<Advice, BoxError> {
        Ok(Advice::Proceed)
    }

    /// Runs after an attempt fails.
    ///
    /// [`Advice::Proceed`] propagates the error unchanged,
    /// [`Advice::Done`] swallows it in favor of the default value, and
    /// [`Advice::Retry`] re-invokes after the delay.
    fn on_error(&mut self, _call: &MethodCall, _error: &BoxError) -> Result<Advice, BoxError> {
        Ok(Advice::Proceed)
    }
}

/// Produces one interceptor per call, or `None` to leave the call alone.
///
/// The factory receives the descriptor of the method about to run, so it
/// can opt in per method.
pub type InterceptorFactory =
    Arc<dyn Fn(&MethodDescriptor) -> Option<Box<dyn Interceptor>> + Send + Sync>;

/// Interceptor that observes successful results of type `R`.
///
/// Results of any other type pass through untouched. The callback may
/// veto the result by returning an error, which terminates the call with
/// that error in place of the produced value; otherwise the inspector
/// advises [`Advice::Proceed`] and the value reaches the caller.
pub struct ResultInspector<R, F> {
    f: F,
    _marker: PhantomData<fn(&R)>,
}

impl<R, F> ResultInspector<R, F>
where
    R: 'static,
    F: FnMut(&R) -> Result<(), BoxError>,
{
    /// Creates an inspector running `f` on every matching result.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<R, F> fmt::Debug for ResultInspector<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultInspector")
            .field("f", &"<closure>")
            .finish()
    }
}

impl<R, F> Interceptor for ResultInspector<R, F>
where
    R: 'static,
    F: FnMut(&R) -> Result<(), BoxError> + Send,
{
    fn after_result(
        &mut self,
        _call: &MethodCall,
        result: &(dyn Any + Send),
    ) -> Result<Advice, BoxError> {
        if let Some(value) = result.downcast_ref::<R>() {
            (self.f)(value)?;
        }
        Ok(Advice::Proceed)
    }
}

/// Factory yielding a [`ResultInspector`] for methods producing `R`, and
/// `None` for everything else.
pub fn inspect_results<R, F>(f: F) -> InterceptorFactory
where
    R: Any + Send,
    F: FnMut(&R) -> Result<(), BoxError> + Clone + Send + Sync + 'static,
{
    Arc::new(move |descriptor: &MethodDescriptor| {
        let wants = descriptor
            .shape()
            .result_type()
            .is_some_and(|ty| ty.type_id() == TypeId::of::<R>());
        if wants {
            Some(Box::new(ResultInspector::new(f.clone())) as Box<dyn Interceptor>)
        } else {
            None
        }
    })
}
