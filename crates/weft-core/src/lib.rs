//! Core interception pipeline for weft.
//!
//! This crate provides the pieces every weft feature builds on:
//! - Advice protocol and interceptor hooks
//! - Invocation shapes and the invoker chain
//! - The advice-weaving invoker and layer composition
//! - Proxy plumbing and the type-erased interface registry
//! - Event system for observability
//!
//! Most users reach this crate through `weft`, where the
//! `#[interceptable]` attribute generates the proxy plumbing. Everything
//! here also works hand-wired, which is what the example below does.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use weft_core::{
//!     call_function, CallArgs, InterfaceContract, MethodCall, MethodHandler, MethodTable, Weave,
//! };
//!
//! # fn main() -> Result<(), weft_core::BoxError> {
//! let contract = Arc::new(
//!     InterfaceContract::builder("Greeter")
//!         .function::<String>("greet")
//!         .finish()?,
//! );
//!
//! let base = MethodTable::new(Arc::clone(&contract))
//!     .handle(
//!         "greet",
//!         MethodHandler::function::<String, _>(|args| {
//!             let name: String = args.value(0)?;
//!             Ok(format!("hello {name}"))
//!         }),
//!     )
//!     .finish()?;
//!
//! // No interceptor factory: calls pass straight through.
//! let woven = Weave::new(Arc::new(base), Arc::new(|_| None));
//!
//! let mut args = CallArgs::new();
//! args.push("weft".to_string());
//! let call = MethodCall::new(contract, 0, args)?;
//! let greeting: String = call_function(&woven, &call)?;
//! assert_eq!(greeting, "hello weft");
//! # Ok(())
//! # }
//! ```

pub mod advice;
pub mod contract;
pub mod error;
pub mod events;
pub mod interceptor;
pub mod invoker;
pub mod layer;
pub mod proxy;
pub mod registry;
pub mod shape;
#[cfg(feature = "tracing")]
pub mod trace;
pub mod weave;

pub use advice::Advice;
pub use contract::{CallArgs, ContractBuilder, InterfaceContract, MethodCall, MethodDescriptor};
pub use error::{BoxError, WeaveError};
pub use events::{BoxedEventListener, EventListener, EventListeners, FnListener, WeaveEvent};
pub use interceptor::{inspect_results, Interceptor, InterceptorFactory, ResultInspector};
pub use invoker::{BaseInvoker, BoxValue, Invoker, MethodHandler, MethodTable};
pub use layer::{layer_fn, Identity, InvokerLayer, LayerFn, Stack};
pub use proxy::{weave, wrap, AspectExt, Interceptable};
pub use registry::{DynTarget, InterfaceRegistry};
pub use shape::{
    call_action, call_action_async, call_function, call_function_async, ResultType, ReturnShape,
    ShapeKind, ShapeRegistry,
};
#[cfg(feature = "tracing")]
pub use trace::{trace_aspect, TraceInterceptor};
pub use weave::{Weave, WeaveLayer};

pub use async_trait::async_trait;

// Implementation details of the code emitted by `#[interceptable]`.
// Everything here is exempt from semver; do not use directly.
#[doc(hidden)]
pub mod __private {
    pub use async_trait::async_trait;
    pub use futures::future::BoxFuture;

    pub use crate::contract::{CallArgs, InterfaceContract, MethodCall, MethodDescriptor};
    pub use crate::error::{BoxError, WeaveError};
    pub use crate::invoker::{BaseInvoker, BoxValue, Invoker, MethodHandler};
    pub use crate::proxy::Interceptable;
    pub use crate::shape::{
        call_action, call_action_async, call_function, call_function_async, ReturnShape,
    };
}
