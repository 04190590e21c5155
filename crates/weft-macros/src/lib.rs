//! Procedural macros for weft.
//!
//! This crate provides `#[interceptable]`, the attribute that turns a trait
//! into an interceptable interface: it builds the interface contract once,
//! binds implementations to a base invoker, and generates the hidden proxy
//! type that routes every call through an invoker chain.
//!
//! The expansion refers to `weft-core` by name, so that crate must be in
//! the dependency graph of any crate using the attribute.

mod interceptable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemTrait};

/// Makes a trait interceptable.
///
/// Applied to a trait, this attribute:
///
/// - re-emits the trait (adding `Send + Sync` supertraits and, when the
///   trait has async methods, `#[async_trait]`),
/// - builds an `InterfaceContract` describing every method's invocation
///   shape, shared process-wide,
/// - implements `Interceptable` for `dyn Trait`, so `wrap` and `weave`
///   accept `Arc<dyn Trait>` and hand back a proxy of the same type.
///
/// # Requirements
///
/// Every method must take `&self`, return `Result<_, BoxError>`, and take
/// owned argument types that are `Clone + Send + Sync + 'static`. Function
/// shapes additionally need `Default` result types, which is what an
/// interceptor's `Done` short-circuit conjures.
///
/// Traits with async methods expand through `#[async_trait]`; annotate
/// implementations of such traits with `#[weft_core::async_trait]` (or the
/// `weft` re-export).
///
/// # Example
///
/// ```rust,ignore
/// use weft_core::BoxError;
/// use weft_macros::interceptable;
///
/// #[interceptable]
/// pub trait Creature {
///     fn hop(&self) -> Result<i32, BoxError>;
///     async fn forage(&self, spot: String) -> Result<String, BoxError>;
/// }
/// ```
#[proc_macro_attribute]
pub fn interceptable(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[interceptable] takes no arguments",
        )
        .to_compile_error()
        .into();
    }

    let item = parse_macro_input!(item as ItemTrait);

    match interceptable::expand(item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
