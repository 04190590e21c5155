//! Type-erased proxy construction keyed by interface `TypeId`.
//!
//! The typed entry points ([`wrap`], [`weave`]) need the interface trait
//! at compile time. The registry is the dynamic alternative: interfaces
//! are registered once under `TypeId::of::<dyn Trait>()`, then targets
//! arrive as boxed `Any` values alongside the interface id, and come back
//! wrapped. Lookup failures are configuration errors and fail fast.
//!
//! Registration is explicit; there is no registration-at-startup magic.
//! The process-wide instance behind [`InterfaceRegistry::global`] is
//! append-only; [`reset`](InterfaceRegistry::reset) exists for tests.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::WeaveError;
use crate::interceptor::InterceptorFactory;
use crate::layer::InvokerLayer;
use crate::proxy::{wrap, Interceptable};
use crate::weave::WeaveLayer;

/// A trait-object target in transit through the dynamic entry points.
///
/// Holds an `Arc<dyn Trait>` for some interceptable trait; the registry
/// downcasts it against the interface it was presented with.
pub type DynTarget = Box<dyn Any + Send + Sync>;

type DynWrap = fn(DynTarget, &dyn InvokerLayer) -> Result<DynTarget, WeaveError>;

#[derive(Clone, Copy)]
struct Registration {
    name: &'static str,
    wrap: DynWrap,
}

fn wrap_erased<T>(target: DynTarget, layer: &dyn InvokerLayer) -> Result<DynTarget, WeaveError>
where
    T: Interceptable + ?Sized,
{
    let target = target
        .downcast::<Arc<T>>()
        .map_err(|_| WeaveError::TargetMismatch {
            interface: T::contract().name(),
        })?;
    Ok(Box::new(wrap(*target, layer)))
}

/// Registry of interceptable interfaces, keyed by `TypeId`.
pub struct InterfaceRegistry {
    entries: RwLock<HashMap<TypeId, Registration>>,
}

impl InterfaceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static InterfaceRegistry {
        static GLOBAL: OnceLock<InterfaceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(InterfaceRegistry::new)
    }

    /// Registers `T` (a `dyn Trait` type) as an interceptable interface.
    ///
    /// Registering the same interface again is a no-op.
    pub fn register<T>(&self)
    where
        T: Interceptable + ?Sized,
    {
        let mut entries = self.entries.write().unwrap();
        entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Registration {
                name: T::contract().name(),
                wrap: wrap_erased::<T>,
            });
    }

    /// Whether the given id names a registered interface.
    pub fn is_registered(&self, interface: TypeId) -> bool {
        self.entries.read().unwrap().contains_key(&interface)
    }

    /// The registered name for an interface id.
    pub fn name_of(&self, interface: TypeId) -> Option<&'static str> {
        self.entries
            .read()
            .unwrap()
            .get(&interface)
            .map(|registration| registration.name)
    }

    /// Wraps a boxed target behind a proxy for the given interface.
    ///
    /// The target must hold an `Arc<dyn Trait>` for the registered trait.
    /// Fails with [`WeaveError::NotAnInterface`] for an unknown id and
    /// [`WeaveError::TargetMismatch`] when the target holds anything else.
    pub fn wrap_dyn(
        &self,
        interface: TypeId,
        target: DynTarget,
        layer: &dyn InvokerLayer,
    ) -> Result<DynTarget, WeaveError> {
        // Copy the registration out so no caller code runs under the lock.
        let registration = {
            let entries = self.entries.read().unwrap();
            entries.get(&interface).copied()
        };
        let registration = registration.ok_or(WeaveError::NotAnInterface { interface })?;
        (registration.wrap)(target, layer)
    }

    /// Weaves an interceptor factory around a boxed target.
    ///
    /// The dynamic counterpart of [`weave`](crate::proxy::weave).
    pub fn weave_dyn(
        &self,
        interface: TypeId,
        target: DynTarget,
        factory: InterceptorFactory,
    ) -> Result<DynTarget, WeaveError> {
        self.wrap_dyn(interface, target, &WeaveLayer::from_factory(factory))
    }

    /// Number of registered interfaces.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether no interface is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Clears every registration.
    ///
    /// Tests sharing the [`global`](Self::global) registry use this to
    /// start from a clean slate; production code has no reason to call it.
    pub fn reset(&self) {
        self.entries.write().unwrap().clear();
    }
}

impl Default for InterfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceRegistry")
            .field("interfaces", &self.len())
            .finish()
    }
}
