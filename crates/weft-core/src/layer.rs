//! Composable decoration of invoker chains.
//!
//! An [`InvokerLayer`] turns an invoker into a wrapped invoker. Layers
//! compose with [`Stack`]; [`wrap`](crate::proxy::wrap) applies a layer
//! to the chain behind a proxy.

use std::fmt;
use std::sync::Arc;

use crate::invoker::Invoker;

/// Decorates an invoker chain with one more link.
pub trait InvokerLayer {
    /// Wraps `inner`, returning the decorated invoker.
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker>;
}

impl<L> InvokerLayer for &L
where
    L: InvokerLayer + ?Sized,
{
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        (**self).wrap(inner)
    }
}

impl<L> InvokerLayer for Box<L>
where
    L: InvokerLayer + ?Sized,
{
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        (**self).wrap(inner)
    }
}

impl<L> InvokerLayer for Arc<L>
where
    L: InvokerLayer + ?Sized,
{
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        (**self).wrap(inner)
    }
}

/// Layer built from a wrapping closure.
pub struct LayerFn<F> {
    f: F,
}

/// Creates an [`InvokerLayer`] from a closure.
pub fn layer_fn<F>(f: F) -> LayerFn<F>
where
    F: Fn(Arc<dyn Invoker>) -> Arc<dyn Invoker>,
{
    LayerFn { f }
}

impl<F> InvokerLayer for LayerFn<F>
where
    F: Fn(Arc<dyn Invoker>) -> Arc<dyn Invoker>,
{
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        (self.f)(inner)
    }
}

impl<F> fmt::Debug for LayerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerFn").field("f", &"<closure>").finish()
    }
}

/// Layer that returns the chain unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl InvokerLayer for Identity {
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        inner
    }
}

/// Two layers composed into one.
///
/// `inner` is applied first and so sits closer to the target; `outer`
/// wraps the result and runs first on each call.
#[derive(Debug, Clone)]
pub struct Stack<I, O> {
    inner: I,
    outer: O,
}

impl<I, O> Stack<I, O> {
    /// Composes `inner` and `outer`.
    pub fn new(inner: I, outer: O) -> Self {
        Self { inner, outer }
    }
}

impl<I, O> InvokerLayer for Stack<I, O>
where
    I: InvokerLayer,
    O: InvokerLayer,
{
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        self.outer.wrap(self.inner.wrap(inner))
    }
}
