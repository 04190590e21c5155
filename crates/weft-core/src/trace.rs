//! Structured tracing around woven calls.
//!
//! The in-tree demonstration of the interceptor authoring contract:
//! debug events on invocation and completion, a warning on failure, and
//! `Proceed` advice throughout so traced calls behave exactly like
//! untraced ones.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use crate::advice::Advice;
use crate::contract::{MethodCall, MethodDescriptor};
use crate::error::BoxError;
use crate::interceptor::{Interceptor, InterceptorFactory};

/// Interceptor emitting `tracing` events for one call.
#[derive(Debug)]
pub struct TraceInterceptor {
    interface: &'static str,
    method: &'static str,
    started: Instant,
}

impl TraceInterceptor {
    /// Creates a tracer for the described method.
    pub fn new(descriptor: &MethodDescriptor) -> Self {
        Self {
            interface: descriptor.interface(),
            method: descriptor.name(),
            started: Instant::now(),
        }
    }
}

impl Interceptor for TraceInterceptor {
    fn before_call(&mut self, call: &MethodCall) -> Result<Advice, BoxError> {
        self.started = Instant::now();
        tracing::debug!(
            interface = %self.interface,
            method = %self.method,
            args = call.args().len(),
            "Invoking"
        );
        Ok(Advice::Proceed)
    }

    fn after_completion(&mut self, _call: &MethodCall) -> Result<Advice, BoxError> {
        tracing::debug!(
            interface = %self.interface,
            method = %self.method,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "Completed"
        );
        Ok(Advice::Proceed)
    }

    fn after_result(
        &mut self,
        _call: &MethodCall,
        _result: &(dyn Any + Send),
    ) -> Result<Advice, BoxError> {
        tracing::debug!(
            interface = %self.interface,
            method = %self.method,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "Completed"
        );
        Ok(Advice::Proceed)
    }

    fn on_error(&mut self, _call: &MethodCall, error: &BoxError) -> Result<Advice, BoxError> {
        tracing::warn!(
            interface = %self.interface,
            method = %self.method,
            error = %error,
            "Call failed"
        );
        Ok(Advice::Proceed)
    }
}

/// Factory attaching a [`TraceInterceptor`] to every method.
pub fn trace_aspect() -> InterceptorFactory {
    Arc::new(|descriptor| Some(Box::new(TraceInterceptor::new(descriptor)) as Box<dyn Interceptor>))
}
