//! The uniform invocation protocol and the invoker that terminates it.
//!
//! An [`Invoker`] exposes one operation per invocation shape. Wrapping
//! invokers ([`Weave`](crate::weave::Weave), retry wrappers) forward to an
//! inner invoker; every chain bottoms out in a [`BaseInvoker`] holding one
//! handler per contract method, closing over the real implementation.
//!
//! Function results cross the chain type-erased as [`BoxValue`] and are
//! downcast back at the proxy edge by the dispatch helpers in
//! [`shape`](crate::shape).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::contract::{CallArgs, InterfaceContract, MethodCall};
use crate::error::{BoxError, WeaveError};
use crate::shape::ShapeKind;

/// Type-erased result value of a function-shaped call.
pub type BoxValue = Box<dyn Any + Send>;

/// One link of an invoker chain.
///
/// Implementations must route a call through the operation matching its
/// declared shape; the dispatch helpers in [`shape`](crate::shape) and the
/// generated proxies uphold this.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Invokes a synchronous method without a result value.
    fn invoke_action(&self, call: &MethodCall) -> Result<(), BoxError>;

    /// Invokes a synchronous method producing a result value.
    fn invoke_function(&self, call: &MethodCall) -> Result<BoxValue, BoxError>;

    /// Invokes an asynchronous method without a result value.
    async fn invoke_action_async(&self, call: &MethodCall) -> Result<(), BoxError>;

    /// Invokes an asynchronous method producing a result value.
    async fn invoke_function_async(&self, call: &MethodCall) -> Result<BoxValue, BoxError>;
}

/// Handler closing over the real implementation of one method.
pub enum MethodHandler {
    /// Handler for a [`ShapeKind::Action`] method.
    Action(Box<dyn Fn(&CallArgs) -> Result<(), BoxError> + Send + Sync>),
    /// Handler for a [`ShapeKind::Function`] method.
    Function(Box<dyn Fn(&CallArgs) -> Result<BoxValue, BoxError> + Send + Sync>),
    /// Handler for a [`ShapeKind::AsyncAction`] method.
    AsyncAction(Box<dyn Fn(&CallArgs) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>),
    /// Handler for a [`ShapeKind::AsyncFunction`] method.
    AsyncFunction(
        Box<dyn Fn(&CallArgs) -> BoxFuture<'static, Result<BoxValue, BoxError>> + Send + Sync>,
    ),
}

impl MethodHandler {
    /// Wraps a closure as an action handler.
    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        MethodHandler::Action(Box::new(f))
    }

    /// Wraps a typed closure as a function handler, boxing its result.
    pub fn function<R, F>(f: F) -> Self
    where
        R: Any + Send,
        F: Fn(&CallArgs) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        MethodHandler::Function(Box::new(move |args| {
            f(args).map(|value| Box::new(value) as BoxValue)
        }))
    }

    /// Wraps a closure as an async action handler.
    pub fn async_action<F>(f: F) -> Self
    where
        F: Fn(&CallArgs) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync + 'static,
    {
        MethodHandler::AsyncAction(Box::new(f))
    }

    /// Wraps a typed closure as an async function handler, boxing the
    /// future's result.
    pub fn async_function<R, F>(f: F) -> Self
    where
        R: Any + Send,
        F: Fn(&CallArgs) -> BoxFuture<'static, Result<R, BoxError>> + Send + Sync + 'static,
    {
        MethodHandler::AsyncFunction(Box::new(move |args| {
            f(args)
                .map(|result| result.map(|value| Box::new(value) as BoxValue))
                .boxed()
        }))
    }

    /// The shape this handler serves.
    pub fn kind(&self) -> ShapeKind {
        match self {
            MethodHandler::Action(_) => ShapeKind::Action,
            MethodHandler::Function(_) => ShapeKind::Function,
            MethodHandler::AsyncAction(_) => ShapeKind::AsyncAction,
            MethodHandler::AsyncFunction(_) => ShapeKind::AsyncFunction,
        }
    }
}

impl fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodHandler").field(&self.kind()).finish()
    }
}

/// The invoker at the bottom of every chain.
///
/// Holds one handler per contract method, in declaration order. Failures
/// from the handlers (the real implementation) pass through unchanged.
pub struct BaseInvoker {
    contract: Arc<InterfaceContract>,
    handlers: Vec<MethodHandler>,
}

impl BaseInvoker {
    /// Builds an invoker from handlers already aligned with the contract.
    ///
    /// Used by generated code, which emits handlers in descriptor order.
    /// Hand-built invokers go through [`MethodTable`], which validates the
    /// alignment.
    #[doc(hidden)]
    pub fn from_handlers(contract: Arc<InterfaceContract>, handlers: Vec<MethodHandler>) -> Self {
        Self { contract, handlers }
    }

    /// The contract this invoker serves.
    pub fn contract(&self) -> &Arc<InterfaceContract> {
        &self.contract
    }

    fn handler(&self, call: &MethodCall) -> Result<&MethodHandler, WeaveError> {
        let descriptor = call.descriptor();
        self.handlers
            .get(descriptor.index())
            .ok_or_else(|| WeaveError::MissingHandler {
                method: descriptor.name().to_string(),
            })
    }

    fn mismatch(call: &MethodCall, expected: ShapeKind, found: ShapeKind) -> BoxError {
        WeaveError::ShapeMismatch {
            method: call.descriptor().name().to_string(),
            expected,
            found,
        }
        .into()
    }
}

impl fmt::Debug for BaseInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseInvoker")
            .field("interface", &self.contract.name())
            .field("methods", &self.handlers.len())
            .finish()
    }
}

#[async_trait]
impl Invoker for BaseInvoker {
    fn invoke_action(&self, call: &MethodCall) -> Result<(), BoxError> {
        match self.handler(call)? {
            MethodHandler::Action(f) => f(call.args()),
            other => Err(Self::mismatch(call, ShapeKind::Action, other.kind())),
        }
    }

    fn invoke_function(&self, call: &MethodCall) -> Result<BoxValue, BoxError> {
        match self.handler(call)? {
            MethodHandler::Function(f) => f(call.args()),
            other => Err(Self::mismatch(call, ShapeKind::Function, other.kind())),
        }
    }

    async fn invoke_action_async(&self, call: &MethodCall) -> Result<(), BoxError> {
        match self.handler(call)? {
            MethodHandler::AsyncAction(f) => f(call.args()).await,
            other => Err(Self::mismatch(call, ShapeKind::AsyncAction, other.kind())),
        }
    }

    async fn invoke_function_async(&self, call: &MethodCall) -> Result<BoxValue, BoxError> {
        match self.handler(call)? {
            MethodHandler::AsyncFunction(f) => f(call.args()).await,
            other => Err(Self::mismatch(call, ShapeKind::AsyncFunction, other.kind())),
        }
    }
}

/// Validated, name-keyed construction of a [`BaseInvoker`].
///
/// Registration records handlers; [`finish`](MethodTable::finish) checks
/// that every contract method has exactly one handler of the right shape
/// and fails fast otherwise.
pub struct MethodTable {
    contract: Arc<InterfaceContract>,
    pending: Vec<(String, MethodHandler)>,
}

impl MethodTable {
    /// Starts a table for the given contract.
    pub fn new(contract: Arc<InterfaceContract>) -> Self {
        Self {
            contract,
            pending: Vec::new(),
        }
    }

    /// Records a handler for the named method.
    pub fn handle(mut self, name: &str, handler: MethodHandler) -> Self {
        self.pending.push((name.to_string(), handler));
        self
    }

    /// Validates the registrations and builds the invoker.
    pub fn finish(self) -> Result<BaseInvoker, WeaveError> {
        let mut slots: Vec<Option<MethodHandler>> = Vec::new();
        slots.resize_with(self.contract.len(), || None);

        for (name, handler) in self.pending {
            let descriptor =
                self.contract
                    .method_named(&name)
                    .ok_or_else(|| WeaveError::UnknownMethod {
                        interface: self.contract.name(),
                        method: name.clone(),
                    })?;
            if handler.kind() != descriptor.shape().kind() {
                return Err(WeaveError::ShapeMismatch {
                    method: name,
                    expected: descriptor.shape().kind(),
                    found: handler.kind(),
                });
            }
            let slot = &mut slots[descriptor.index()];
            if slot.is_some() {
                return Err(WeaveError::DuplicateHandler { method: name });
            }
            *slot = Some(handler);
        }

        let mut handlers = Vec::with_capacity(slots.len());
        for (slot, method) in slots.into_iter().zip(self.contract.methods()) {
            match slot {
                Some(handler) => handlers.push(handler),
                None => {
                    return Err(WeaveError::MissingHandler {
                        method: method.name().to_string(),
                    })
                }
            }
        }

        Ok(BaseInvoker::from_handlers(self.contract, handlers))
    }
}
