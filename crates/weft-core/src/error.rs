//! Error types for the interception pipeline.

use std::any::TypeId;

use crate::shape::ShapeKind;

/// The error type carried through invoker chains.
///
/// Intercepted methods declare `Result<_, BoxError>` returns; failures from
/// the real implementation travel through the chain as this type, unchanged,
/// unless an interceptor suppresses or replaces them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the pipeline itself, as opposed to failures of the
/// intercepted call.
///
/// Variants describing an invalid setup (`NotAnInterface`, `TargetMismatch`,
/// `DuplicateMethod`, `MissingHandler`, `ShapeMismatch`) surface at
/// construction time wherever the mistake is detectable there. The remaining
/// variants describe protocol violations that can only be observed while a
/// call is in flight, and surface through the call result.
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// The given type has not been registered as an interceptable interface.
    #[error("type {interface:?} is not a registered interceptable interface")]
    NotAnInterface {
        /// TypeId the caller asked the registry for.
        interface: TypeId,
    },
    /// The supplied target value does not implement the requested interface.
    #[error("target does not implement `{interface}`")]
    TargetMismatch {
        /// Name of the interface the target was checked against.
        interface: &'static str,
    },
    /// Two methods with the same name were declared on one contract.
    #[error("duplicate method `{method}` on interface `{interface}`")]
    DuplicateMethod {
        interface: &'static str,
        method: String,
    },
    /// A handler was registered twice for the same method.
    #[error("duplicate handler for method `{method}`")]
    DuplicateHandler { method: String },
    /// A handler was registered for a method the contract does not declare.
    #[error("interface `{interface}` has no method `{method}`")]
    UnknownMethod {
        interface: &'static str,
        method: String,
    },
    /// A contract method was left without a handler.
    #[error("no handler registered for method `{method}`")]
    MissingHandler { method: String },
    /// A method was invoked through the wrong shape protocol.
    #[error("method `{method}` has shape {expected:?}, invoked as {found:?}")]
    ShapeMismatch {
        method: String,
        expected: ShapeKind,
        found: ShapeKind,
    },
    /// A method index was out of range for the contract.
    #[error("method index {index} out of range for interface `{interface}`")]
    MethodIndex {
        interface: &'static str,
        index: usize,
    },
    /// An argument was requested past the end of the argument list.
    #[error("argument {index} requested but the call carries {found}")]
    ArgumentCount { index: usize, found: usize },
    /// An argument did not have the type the handler expected.
    #[error("argument {index} is not a `{expected}`")]
    ArgumentType {
        index: usize,
        expected: &'static str,
    },
    /// A function result could not be downcast to the declared type.
    #[error("result of `{method}` is not a `{expected}`")]
    ResultType {
        method: String,
        expected: &'static str,
    },
}
