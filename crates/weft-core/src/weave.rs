//! The advice-weaving invoker.
//!
//! [`Weave`] wraps an inner invoker and drives the advice state machine
//! around it: one interceptor per call, hooks before the first attempt,
//! after each success or failure, and a retry loop bounded by the advice
//! the hooks return. The machine is uniform across the four shapes; only
//! the await points and the success hook differ.

use std::fmt;
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;

use crate::advice::Advice;
use crate::contract::{MethodCall, MethodDescriptor};
use crate::error::{BoxError, WeaveError};
use crate::interceptor::{Interceptor, InterceptorFactory};
use crate::invoker::{BoxValue, Invoker};
use crate::layer::InvokerLayer;
use crate::shape::ShapeKind;

/// Invoker that weaves interceptor advice around an inner invoker.
///
/// The factory runs once per call. `None` routes the call straight to the
/// inner invoker with no advice overhead. The interceptor built for a call
/// is dropped when the call finishes, on every exit path, which makes its
/// `Drop` impl the per-call release hook.
pub struct Weave {
    inner: Arc<dyn Invoker>,
    factory: InterceptorFactory,
}

impl Weave {
    /// Wraps `inner` with the given per-call interceptor factory.
    pub fn new(inner: Arc<dyn Invoker>, factory: InterceptorFactory) -> Self {
        Self { inner, factory }
    }

    fn interceptor(&self, call: &MethodCall) -> Option<Box<dyn Interceptor>> {
        (*self.factory)(call.descriptor())
    }

    fn default_value(call: &MethodCall, expected: ShapeKind) -> Result<BoxValue, BoxError> {
        let descriptor = call.descriptor();
        match descriptor.shape().result_type() {
            Some(ty) => Ok(ty.default_value()),
            None => Err(WeaveError::ShapeMismatch {
                method: descriptor.name().to_string(),
                expected,
                found: descriptor.shape().kind(),
            }
            .into()),
        }
    }
}

impl fmt::Debug for Weave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Weave").field("factory", &"<factory>").finish()
    }
}

#[async_trait]
impl Invoker for Weave {
    fn invoke_action(&self, call: &MethodCall) -> Result<(), BoxError> {
        let Some(mut interceptor) = self.interceptor(call) else {
            return self.inner.invoke_action(call);
        };

        let mut pending = match interceptor.before_call(call)? {
            Advice::Done => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    method = %call.descriptor().name(),
                    "Call suppressed before invocation"
                );
                return Ok(());
            }
            advice => advice.delay(),
        };

        loop {
            if let Some(delay) = pending.take() {
                thread::sleep(delay);
            }
            match self.inner.invoke_action(call) {
                Ok(()) => match interceptor.after_completion(call)? {
                    Advice::Retry(delay) => pending = Some(delay),
                    _ => return Ok(()),
                },
                Err(error) => match interceptor.on_error(call, &error)? {
                    Advice::Proceed => return Err(error),
                    Advice::Done => return Ok(()),
                    Advice::Retry(delay) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            method = %call.descriptor().name(),
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after failure"
                        );
                        pending = Some(delay);
                    }
                },
            }
        }
    }

    fn invoke_function(&self, call: &MethodCall) -> Result<BoxValue, BoxError> {
        let Some(mut interceptor) = self.interceptor(call) else {
            return self.inner.invoke_function(call);
        };

        let mut pending = match interceptor.before_call(call)? {
            Advice::Done => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    method = %call.descriptor().name(),
                    "Call suppressed before invocation"
                );
                return Self::default_value(call, ShapeKind::Function);
            }
            advice => advice.delay(),
        };

        loop {
            if let Some(delay) = pending.take() {
                thread::sleep(delay);
            }
            match self.inner.invoke_function(call) {
                Ok(value) => match interceptor.after_result(call, value.as_ref())? {
                    Advice::Retry(delay) => pending = Some(delay),
                    _ => return Ok(value),
                },
                Err(error) => match interceptor.on_error(call, &error)? {
                    Advice::Proceed => return Err(error),
                    Advice::Done => return Self::default_value(call, ShapeKind::Function),
                    Advice::Retry(delay) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            method = %call.descriptor().name(),
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after failure"
                        );
                        pending = Some(delay);
                    }
                },
            }
        }
    }

    async fn invoke_action_async(&self, call: &MethodCall) -> Result<(), BoxError> {
        let Some(mut interceptor) = self.interceptor(call) else {
            return self.inner.invoke_action_async(call).await;
        };

        let mut pending = match interceptor.before_call(call)? {
            Advice::Done => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    method = %call.descriptor().name(),
                    "Call suppressed before invocation"
                );
                return Ok(());
            }
            advice => advice.delay(),
        };

        loop {
            if let Some(delay) = pending.take() {
                tokio::time::sleep(delay).await;
            }
            match self.inner.invoke_action_async(call).await {
                Ok(()) => match interceptor.after_completion(call)? {
                    Advice::Retry(delay) => pending = Some(delay),
                    _ => return Ok(()),
                },
                Err(error) => match interceptor.on_error(call, &error)? {
                    Advice::Proceed => return Err(error),
                    Advice::Done => return Ok(()),
                    Advice::Retry(delay) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            method = %call.descriptor().name(),
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after failure"
                        );
                        pending = Some(delay);
                    }
                },
            }
        }
    }

    async fn invoke_function_async(&self, call: &MethodCall) -> Result<BoxValue, BoxError> {
        let Some(mut interceptor) = self.interceptor(call) else {
            return self.inner.invoke_function_async(call).await;
        };

        let mut pending = match interceptor.before_call(call)? {
            Advice::Done => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    method = %call.descriptor().name(),
                    "Call suppressed before invocation"
                );
                return Self::default_value(call, ShapeKind::AsyncFunction);
            }
            advice => advice.delay(),
        };

        loop {
            if let Some(delay) = pending.take() {
                tokio::time::sleep(delay).await;
            }
            match self.inner.invoke_function_async(call).await {
                Ok(value) => match interceptor.after_result(call, value.as_ref())? {
                    Advice::Retry(delay) => pending = Some(delay),
                    _ => return Ok(value),
                },
                Err(error) => match interceptor.on_error(call, &error)? {
                    Advice::Proceed => return Err(error),
                    Advice::Done => return Self::default_value(call, ShapeKind::AsyncFunction),
                    Advice::Retry(delay) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            method = %call.descriptor().name(),
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after failure"
                        );
                        pending = Some(delay);
                    }
                },
            }
        }
    }
}

/// Layer applying a [`Weave`] with a fixed interceptor factory.
#[derive(Clone)]
pub struct WeaveLayer {
    factory: InterceptorFactory,
}

impl WeaveLayer {
    /// Creates a layer from a factory closure.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&MethodDescriptor) -> Option<Box<dyn Interceptor>> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Creates a layer from an already shared factory.
    pub fn from_factory(factory: InterceptorFactory) -> Self {
        Self { factory }
    }
}

impl fmt::Debug for WeaveLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaveLayer")
            .field("factory", &"<factory>")
            .finish()
    }
}

impl InvokerLayer for WeaveLayer {
    fn wrap(&self, inner: Arc<dyn Invoker>) -> Arc<dyn Invoker> {
        Arc::new(Weave::new(inner, Arc::clone(&self.factory)))
    }
}
