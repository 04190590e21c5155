//! Typed proxy construction over invoker chains.
//!
//! [`Interceptable`] is the protocol between a trait and its generated
//! proxy: the contract, the binding of a real implementation to a
//! [`BaseInvoker`], and proxy construction from a chain. The
//! `#[interceptable]` attribute implements it for `dyn Trait`; [`wrap`]
//! and [`weave`] are the entry points that put it to work.

use std::any::Any;
use std::sync::Arc;

use crate::contract::{InterfaceContract, MethodDescriptor};
use crate::error::BoxError;
use crate::interceptor::Interceptor;
use crate::invoker::{BaseInvoker, Invoker};
use crate::layer::InvokerLayer;
use crate::weave::WeaveLayer;

/// Trait-object plumbing behind proxy construction.
///
/// Implemented for `dyn Trait` by the `#[interceptable]` attribute; the
/// functions here are the contract between the generated code and
/// [`wrap`]. Hand implementations are possible but rarely needed.
pub trait Interceptable: Send + Sync + 'static {
    /// The interface contract, shared process-wide.
    fn contract() -> Arc<InterfaceContract>;

    /// Binds a real implementation as the invoker terminating a chain.
    fn bind(target: Arc<Self>) -> BaseInvoker;

    /// Builds a proxy fronting the given chain.
    fn from_chain(chain: Arc<dyn Invoker>) -> Arc<Self>;

    /// The chain behind `proxy`, if `proxy` is itself a proxy.
    ///
    /// `Some` lets a re-wrap extend the existing chain instead of
    /// stacking a second proxy on top of the first.
    fn chain_of(proxy: &Arc<Self>) -> Option<Arc<dyn Invoker>>;
}

/// Wraps `target` behind a proxy whose chain is decorated by `layer`.
///
/// If `target` is already a proxy its chain is reused, so repeated wraps
/// build one chain with a single proxy in front. The call sites keep the
/// trait-typed `Arc<T>` surface either way.
pub fn wrap<T, L>(target: Arc<T>, layer: L) -> Arc<T>
where
    T: Interceptable + ?Sized,
    L: InvokerLayer,
{
    let chain = match T::chain_of(&target) {
        Some(chain) => chain,
        None => Arc::new(T::bind(target)),
    };
    T::from_chain(layer.wrap(chain))
}

/// Wraps `target` with an advice-weaving chain link.
///
/// Shorthand for [`wrap`] with a [`WeaveLayer`] built from `factory`.
pub fn weave<T, F>(target: Arc<T>, factory: F) -> Arc<T>
where
    T: Interceptable + ?Sized,
    F: Fn(&MethodDescriptor) -> Option<Box<dyn Interceptor>> + Send + Sync + 'static,
{
    wrap(target, WeaveLayer::new(factory))
}

/// Wrapping sugar on `Arc<T>` for interceptable traits.
pub trait AspectExt<T: Interceptable + ?Sized>: Sized {
    /// Decorates the chain behind this value with `layer`.
    fn with_layer<L: InvokerLayer>(self, layer: L) -> Arc<T>;

    /// Weaves a per-call interceptor factory around this value.
    fn with_aspect<F>(self, factory: F) -> Arc<T>
    where
        F: Fn(&MethodDescriptor) -> Option<Box<dyn Interceptor>> + Send + Sync + 'static;

    /// Observes successful results of type `R` on matching methods.
    fn inspect_results<R, F>(self, f: F) -> Arc<T>
    where
        R: Any + Send,
        F: FnMut(&R) -> Result<(), BoxError> + Clone + Send + Sync + 'static;
}

impl<T> AspectExt<T> for Arc<T>
where
    T: Interceptable + ?Sized,
{
    fn with_layer<L: InvokerLayer>(self, layer: L) -> Arc<T> {
        wrap(self, layer)
    }

    fn with_aspect<F>(self, factory: F) -> Arc<T>
    where
        F: Fn(&MethodDescriptor) -> Option<Box<dyn Interceptor>> + Send + Sync + 'static,
    {
        weave(self, factory)
    }

    fn inspect_results<R, F>(self, f: F) -> Arc<T>
    where
        R: Any + Send,
        F: FnMut(&R) -> Result<(), BoxError> + Clone + Send + Sync + 'static,
    {
        let factory = crate::interceptor::inspect_results::<R, F>(f);
        wrap(self, WeaveLayer::from_factory(factory))
    }
}
