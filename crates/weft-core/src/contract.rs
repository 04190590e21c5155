//! Interface contracts and the invocation-scoped call unit.
//!
//! An [`InterfaceContract`] is the metadata a proxy and its invoker chain
//! share: the interface name and an ordered list of [`MethodDescriptor`]s.
//! Contracts are built once per interface (generated proxies keep theirs in
//! a static) and shared as `Arc`s. A [`MethodCall`] pairs a contract with a
//! method index and the argument list for one invocation, and travels down
//! the chain by reference.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::WeaveError;
use crate::shape::ReturnShape;

/// Immutable, shared argument list for one invocation.
///
/// Arguments are type-erased; interceptors inspect them through
/// [`get`](CallArgs::get) or [`value`](CallArgs::value), and handlers take
/// typed copies. There is no mutation surface: hooks observe the same
/// argument values the real implementation receives.
#[derive(Clone, Default)]
pub struct CallArgs {
    values: Vec<Arc<dyn Any + Send + Sync>>,
}

impl CallArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty argument list with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends an argument value.
    pub fn push<A>(&mut self, value: A)
    where
        A: Any + Send + Sync,
    {
        self.values.push(Arc::new(value));
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the call carries no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows the argument at `index` untyped.
    pub fn get(&self, index: usize) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(index).map(|value| &**value)
    }

    /// Returns a typed copy of the argument at `index`.
    pub fn value<A>(&self, index: usize) -> Result<A, WeaveError>
    where
        A: Any + Clone,
    {
        let value = self.get(index).ok_or(WeaveError::ArgumentCount {
            index,
            found: self.values.len(),
        })?;
        value
            .downcast_ref::<A>()
            .cloned()
            .ok_or(WeaveError::ArgumentType {
                index,
                expected: std::any::type_name::<A>(),
            })
    }
}

impl fmt::Debug for CallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallArgs").field("len", &self.len()).finish()
    }
}

/// One method of an interface contract.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    interface: &'static str,
    name: &'static str,
    index: usize,
    shape: ReturnShape,
}

impl MethodDescriptor {
    /// Builds a descriptor. Used by generated code and the contract builder.
    #[doc(hidden)]
    pub fn new(interface: &'static str, name: &'static str, index: usize, shape: ReturnShape) -> Self {
        Self {
            interface,
            name,
            index,
            shape,
        }
    }

    /// Name of the interface this method belongs to.
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position of the method within its contract.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The method's invocation shape.
    pub fn shape(&self) -> &ReturnShape {
        &self.shape
    }
}

/// Ordered method metadata for one interceptable interface.
#[derive(Debug)]
pub struct InterfaceContract {
    name: &'static str,
    methods: Vec<MethodDescriptor>,
}

impl InterfaceContract {
    /// Starts a contract for the named interface.
    pub fn builder(name: &'static str) -> ContractBuilder {
        ContractBuilder {
            name,
            methods: Vec::new(),
        }
    }

    /// Builds a contract from pre-validated descriptors.
    ///
    /// Used by generated code, where method names are distinct by language
    /// rules. Hand-built contracts go through [`builder`](Self::builder),
    /// which checks for duplicates.
    #[doc(hidden)]
    pub fn from_parts(name: &'static str, methods: Vec<MethodDescriptor>) -> Self {
        Self { name, methods }
    }

    /// Interface name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The methods, in declaration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Looks up a method by index.
    pub fn method(&self, index: usize) -> Option<&MethodDescriptor> {
        self.methods.get(index)
    }

    /// Looks up a method by name.
    pub fn method_named(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true for an interface with no methods.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Builder for hand-written [`InterfaceContract`]s.
pub struct ContractBuilder {
    name: &'static str,
    methods: Vec<MethodDescriptor>,
}

impl ContractBuilder {
    fn push(mut self, name: &'static str, shape: ReturnShape) -> Self {
        let index = self.methods.len();
        self.methods
            .push(MethodDescriptor::new(self.name, name, index, shape));
        self
    }

    /// Declares a `fn(..) -> Result<(), BoxError>` method.
    pub fn action(self, name: &'static str) -> Self {
        self.push(name, ReturnShape::action())
    }

    /// Declares a `fn(..) -> Result<R, BoxError>` method.
    pub fn function<R>(self, name: &'static str) -> Self
    where
        R: Default + Send + 'static,
    {
        self.push(name, ReturnShape::function::<R>())
    }

    /// Declares an `async fn(..) -> Result<(), BoxError>` method.
    pub fn async_action(self, name: &'static str) -> Self {
        self.push(name, ReturnShape::async_action())
    }

    /// Declares an `async fn(..) -> Result<R, BoxError>` method.
    pub fn async_function<R>(self, name: &'static str) -> Self
    where
        R: Default + Send + 'static,
    {
        self.push(name, ReturnShape::async_function::<R>())
    }

    /// Validates and builds the contract.
    ///
    /// Fails with [`WeaveError::DuplicateMethod`] if two methods share a
    /// name.
    pub fn finish(self) -> Result<InterfaceContract, WeaveError> {
        for (position, method) in self.methods.iter().enumerate() {
            if self.methods[..position].iter().any(|m| m.name == method.name) {
                return Err(WeaveError::DuplicateMethod {
                    interface: self.name,
                    method: method.name.to_string(),
                });
            }
        }
        Ok(InterfaceContract::from_parts(self.name, self.methods))
    }
}

/// One invocation travelling down an invoker chain.
#[derive(Debug, Clone)]
pub struct MethodCall {
    contract: Arc<InterfaceContract>,
    index: usize,
    args: CallArgs,
}

impl MethodCall {
    /// Builds a call for the method at `index`.
    ///
    /// Fails with [`WeaveError::MethodIndex`] if the contract has no such
    /// method.
    pub fn new(
        contract: Arc<InterfaceContract>,
        index: usize,
        args: CallArgs,
    ) -> Result<Self, WeaveError> {
        if contract.method(index).is_none() {
            return Err(WeaveError::MethodIndex {
                interface: contract.name(),
                index,
            });
        }
        Ok(Self {
            contract,
            index,
            args,
        })
    }

    /// The contract this call belongs to.
    pub fn contract(&self) -> &Arc<InterfaceContract> {
        &self.contract
    }

    /// The invoked method's descriptor.
    pub fn descriptor(&self) -> &MethodDescriptor {
        // Index validated in new().
        &self.contract.methods()[self.index]
    }

    /// The argument list.
    pub fn args(&self) -> &CallArgs {
        &self.args
    }
}
