//! Invocation shapes and the process-wide result-type registry.
//!
//! Every intercepted method is one of four shapes, derived from its
//! declared return type and asyncness:
//!
//! | declaration                          | shape           |
//! |--------------------------------------|-----------------|
//! | `fn(..) -> Result<(), BoxError>`     | `Action`        |
//! | `fn(..) -> Result<R, BoxError>`      | `Function`      |
//! | `async fn(..) -> Result<(), BoxError>` | `AsyncAction` |
//! | `async fn(..) -> Result<R, BoxError>` | `AsyncFunction` |
//!
//! The shape decides which [`Invoker`](crate::invoker::Invoker) operation a
//! call travels through, and for the function shapes a [`ResultType`]
//! carries the machinery to conjure the declared type's default value when
//! an interceptor finishes a call early. Resolving a `ResultType` is
//! memoized per result type in the [`ShapeRegistry`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};

use crate::contract::MethodCall;
use crate::error::{BoxError, WeaveError};
use crate::invoker::{BoxValue, Invoker};

/// The four invocation shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Synchronous, no result value.
    Action,
    /// Synchronous, produces a result value.
    Function,
    /// Asynchronous, no result value.
    AsyncAction,
    /// Asynchronous, produces a result value.
    AsyncFunction,
}

impl ShapeKind {
    /// Returns true for the two asynchronous shapes.
    pub fn is_async(self) -> bool {
        matches!(self, ShapeKind::AsyncAction | ShapeKind::AsyncFunction)
    }

    /// Returns true for the two shapes that produce a result value.
    pub fn has_result(self) -> bool {
        matches!(self, ShapeKind::Function | ShapeKind::AsyncFunction)
    }
}

/// Type-specialized adapter for a function shape's result type.
///
/// Carries the identity of the declared type plus a constructor for its
/// default value, which the pipeline returns when a call is finished early
/// by [`Advice::Done`](crate::advice::Advice::Done).
#[derive(Clone, Copy)]
pub struct ResultType {
    type_id: TypeId,
    name: &'static str,
    default_fn: fn() -> BoxValue,
}

fn default_boxed<R>() -> BoxValue
where
    R: Default + Send + 'static,
{
    Box::new(R::default())
}

impl ResultType {
    /// Builds the adapter for `R` without touching the registry.
    pub fn of<R>() -> Self
    where
        R: Default + Send + 'static,
    {
        Self {
            type_id: TypeId::of::<R>(),
            name: std::any::type_name::<R>(),
            default_fn: default_boxed::<R>,
        }
    }

    /// TypeId of the declared result type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the declared result type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Conjures the declared type's default value, boxed for the chain.
    pub fn default_value(&self) -> BoxValue {
        (self.default_fn)()
    }
}

impl fmt::Debug for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultType").field("name", &self.name).finish()
    }
}

/// A method's resolved invocation shape.
#[derive(Debug, Clone, Copy)]
pub struct ReturnShape {
    kind: ShapeKind,
    result: Option<ResultType>,
}

impl ReturnShape {
    /// Shape of `fn(..) -> Result<(), BoxError>`.
    pub fn action() -> Self {
        Self {
            kind: ShapeKind::Action,
            result: None,
        }
    }

    /// Shape of `async fn(..) -> Result<(), BoxError>`.
    pub fn async_action() -> Self {
        Self {
            kind: ShapeKind::AsyncAction,
            result: None,
        }
    }

    /// Shape of `fn(..) -> Result<R, BoxError>`.
    pub fn function<R>() -> Self
    where
        R: Default + Send + 'static,
    {
        Self {
            kind: ShapeKind::Function,
            result: Some(ShapeRegistry::global().resolve::<R>()),
        }
    }

    /// Shape of `async fn(..) -> Result<R, BoxError>`.
    pub fn async_function<R>() -> Self
    where
        R: Default + Send + 'static,
    {
        Self {
            kind: ShapeKind::AsyncFunction,
            result: Some(ShapeRegistry::global().resolve::<R>()),
        }
    }

    /// The shape kind.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The result-type adapter, present on the two function shapes.
    pub fn result_type(&self) -> Option<&ResultType> {
        self.result.as_ref()
    }
}

/// Process-wide, append-only registry of [`ResultType`] adapters.
///
/// Resolution is memoized per distinct result type: the first
/// [`resolve`](ShapeRegistry::resolve) for a type builds and stores the
/// adapter, later calls return the stored copy. Entries are never evicted;
/// [`reset`](ShapeRegistry::reset) exists for tests that assert on registry
/// contents and must not be called while proxies are being constructed
/// concurrently.
#[derive(Default)]
pub struct ShapeRegistry {
    entries: RwLock<HashMap<TypeId, ResultType>>,
}

impl ShapeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance used by contract construction.
    pub fn global() -> &'static ShapeRegistry {
        static GLOBAL: OnceLock<ShapeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ShapeRegistry::new)
    }

    /// Returns the memoized adapter for `R`, building it on first use.
    pub fn resolve<R>(&self) -> ResultType
    where
        R: Default + Send + 'static,
    {
        let id = TypeId::of::<R>();
        if let Some(resolved) = self.entries.read().unwrap().get(&id) {
            return *resolved;
        }
        let mut entries = self.entries.write().unwrap();
        *entries.entry(id).or_insert_with(ResultType::of::<R>)
    }

    /// Returns true if `R` has already been resolved.
    pub fn is_resolved<R>(&self) -> bool
    where
        R: 'static,
    {
        self.entries.read().unwrap().contains_key(&TypeId::of::<R>())
    }

    /// Number of memoized result types.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns true if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every memoized entry.
    pub fn reset(&self) {
        self.entries.write().unwrap().clear();
    }
}

/// Invokes an action-shaped call through the chain.
pub fn call_action(invoker: &dyn Invoker, call: &MethodCall) -> Result<(), BoxError> {
    invoker.invoke_action(call)
}

/// Invokes a function-shaped call through the chain and downcasts the
/// type-erased result back to `R`.
pub fn call_function<R>(invoker: &dyn Invoker, call: &MethodCall) -> Result<R, BoxError>
where
    R: Any + Send,
{
    let value = invoker.invoke_function(call)?;
    downcast_result(value, call)
}

/// Invokes an async-action-shaped call through the chain.
pub async fn call_action_async(invoker: &dyn Invoker, call: &MethodCall) -> Result<(), BoxError> {
    invoker.invoke_action_async(call).await
}

/// Invokes an async-function-shaped call through the chain and downcasts
/// the type-erased result back to `R`.
pub async fn call_function_async<R>(
    invoker: &dyn Invoker,
    call: &MethodCall,
) -> Result<R, BoxError>
where
    R: Any + Send,
{
    let value = invoker.invoke_function_async(call).await?;
    downcast_result(value, call)
}

fn downcast_result<R>(value: BoxValue, call: &MethodCall) -> Result<R, BoxError>
where
    R: Any + Send,
{
    match value.downcast::<R>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(WeaveError::ResultType {
            method: call.descriptor().name().to_string(),
            expected: std::any::type_name::<R>(),
        }
        .into()),
    }
}
