//! Transparent interception pipelines for trait implementations.
//!
//! `weft` wraps any implementation of a trait with a chain of cross-cutting
//! behaviors (tracing, retrying, result inspection) without changing the
//! trait's call sites: callers keep using the trait, and every call is
//! routed through an invoker chain before reaching the real implementation.
//!
//! # Pieces
//!
//! - **Core** (always available): the advice protocol, interceptor hooks,
//!   invocation shapes, the weaving invoker, and layer composition
//! - **Macros** (`macros` feature): the `#[interceptable]` attribute that
//!   generates proxy plumbing per trait at build time
//! - **Retry** (`retry` feature): bounded delay sequences with error
//!   predicates, as an advice-driven interceptor or a standalone wrapper
//!
//! # Usage
//!
//! Enable the pieces you need:
//!
//! ```toml
//! [dependencies]
//! weft = { version = "0.1", features = ["macros", "retry"] }
//! ```
//!
//! Or enable everything:
//!
//! ```toml
//! [dependencies]
//! weft = { version = "0.1", features = ["full"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use weft::{interceptable, BoxError, RetryExt};
//! use weft::retry::RetryStrategy;
//!
//! #[interceptable]
//! pub trait Feed {
//!     fn pull(&self) -> Result<i32, BoxError>;
//! }
//!
//! struct Upstream;
//!
//! impl Feed for Upstream {
//!     fn pull(&self) -> Result<i32, BoxError> {
//!         Ok(7)
//!     }
//! }
//!
//! let feed: Arc<dyn Feed> = Arc::new(Upstream);
//! let feed = feed.with_retry(RetryStrategy::from_millis([10, 20]));
//! assert_eq!(feed.pull().unwrap(), 7);
//! ```

// Re-export core (always available)
pub use weft_core as core;

pub use weft_core::{
    async_trait, layer_fn, weave, wrap, Advice, AspectExt, BoxError, CallArgs, Identity,
    Interceptable, Interceptor, InterceptorFactory, InterfaceContract, InterfaceRegistry,
    InvokerLayer, MethodCall, MethodDescriptor, ResultInspector, Stack, Weave, WeaveError,
    WeaveLayer,
};

#[cfg(feature = "tracing")]
pub use weft_core::{trace_aspect, TraceInterceptor};

#[cfg(feature = "retry")]
pub use weft_retry as retry;

#[cfg(feature = "retry")]
pub use weft_retry::{retry_aspect, RetryExt};

#[cfg(feature = "macros")]
pub use weft_macros::interceptable;
