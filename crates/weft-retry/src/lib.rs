//! Retry compositions for weft interception chains.
//!
//! A [`RetryStrategy`] is an ordered, finite sequence of delays plus
//! optional error predicates: the sequence length bounds the retry count,
//! and with no predicates every failure is retryable. The strategy comes in
//! two renditions that behave identically from the outside:
//!
//! - [`RetryInterceptor`] participates in the advice protocol, so it
//!   composes with other interceptors inside one woven chain.
//! - [`Retry`] wraps a whole invoker chain as an opaque unit and runs its
//!   own loop, for stacking a retry stage outside an already intercepted
//!   object.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use weft_core::{CallArgs, InterfaceContract, Invoker, MethodCall, MethodHandler, MethodTable};
//! use weft_retry::{Retry, RetryStrategy};
//!
//! # fn main() -> Result<(), weft_core::BoxError> {
//! let contract = Arc::new(
//!     InterfaceContract::builder("Feed")
//!         .function::<i32>("pull")
//!         .finish()?,
//! );
//! let inner = MethodTable::new(Arc::clone(&contract))
//!     .handle("pull", MethodHandler::function::<i32, _>(|_args| Ok(7)))
//!     .finish()?;
//!
//! let strategy = RetryStrategy::new([Duration::from_millis(5); 3]);
//! let retry = Retry::with_strategy(Arc::new(inner), strategy);
//!
//! let call = MethodCall::new(contract, 0, CallArgs::new())?;
//! let value = retry.invoke_function(&call)?;
//! assert_eq!(value.downcast_ref::<i32>(), Some(&7));
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod interceptor;
mod layer;
mod strategy;

pub use config::{RetryConfig, RetryConfigBuilder};
pub use events::RetryEvent;
pub use interceptor::{retry_aspect, RetryInterceptor};
pub use layer::{Retry, RetryExt, RetryLayer};
pub use strategy::RetryStrategy;
