//! Expansion of the `#[interceptable]` attribute.
//!
//! For a trait `Creature` the attribute emits:
//!
//! 1. The trait itself, re-emitted with `Send + Sync` supertraits, a hidden
//!    `__weft_chain` accessor defaulting to `None`, and `#[async_trait]`
//!    when any method is async.
//! 2. An anonymous `const` block holding the contract constructor (memoized
//!    in a `OnceLock`), a private proxy struct implementing the trait by
//!    routing each method through its invoker chain, and the
//!    `Interceptable` impl for `dyn Creature`.
//!
//! The proxy overrides `__weft_chain` to expose its chain, which is how a
//! re-wrap extends an existing chain instead of stacking proxies.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, Ident, ItemTrait, Pat, ReturnType, TraitItem, TraitItemFn, Type};

/// One of the four invocation shapes a method resolves to.
enum Shape {
    Action,
    Function(Type),
    AsyncAction,
    AsyncFunction(Type),
}

/// A validated trait method, ready for code generation.
struct Method {
    ident: Ident,
    index: usize,
    shape: Shape,
    args: Vec<(Ident, Type)>,
    sig: syn::Signature,
}

pub fn expand(mut item: ItemTrait) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(
            item.generics.span(),
            "#[interceptable] traits cannot have generic parameters",
        ));
    }

    let methods = collect_methods(&item)?;
    let has_async = methods
        .iter()
        .any(|m| matches!(m.shape, Shape::AsyncAction | Shape::AsyncFunction(_)));

    let trait_ident = item.ident.clone();
    let trait_name = trait_ident.to_string();
    let chain_ident = format_ident!("__weft_chain");

    // dyn Trait must be Send + Sync for Interceptable; duplicates are fine.
    item.supertraits
        .push(syn::parse_quote!(::core::marker::Send));
    item.supertraits
        .push(syn::parse_quote!(::core::marker::Sync));
    item.items.push(syn::parse_quote! {
        #[doc(hidden)]
        fn #chain_ident(
            &self,
        ) -> ::core::option::Option<::std::sync::Arc<dyn ::weft_core::__private::Invoker>> {
            ::core::option::Option::None
        }
    });

    let async_attr = has_async.then(|| quote!(#[::weft_core::__private::async_trait]));

    let descriptors = methods
        .iter()
        .map(|m| descriptor(&trait_name, m))
        .collect::<Vec<_>>();
    let handlers = methods.iter().map(handler).collect::<Vec<_>>();
    let proxy_methods = methods.iter().map(proxy_method).collect::<Vec<_>>();

    Ok(quote! {
        #async_attr
        #item

        const _: () = {
            fn __contract() -> ::std::sync::Arc<::weft_core::__private::InterfaceContract> {
                static CONTRACT: ::std::sync::OnceLock<
                    ::std::sync::Arc<::weft_core::__private::InterfaceContract>,
                > = ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(CONTRACT.get_or_init(|| {
                    ::std::sync::Arc::new(::weft_core::__private::InterfaceContract::from_parts(
                        #trait_name,
                        ::std::vec![#(#descriptors),*],
                    ))
                }))
            }

            struct WeftProxy {
                chain: ::std::sync::Arc<dyn ::weft_core::__private::Invoker>,
            }

            #async_attr
            impl #trait_ident for WeftProxy {
                #(#proxy_methods)*

                fn #chain_ident(
                    &self,
                ) -> ::core::option::Option<::std::sync::Arc<dyn ::weft_core::__private::Invoker>>
                {
                    ::core::option::Option::Some(::std::sync::Arc::clone(&self.chain))
                }
            }

            impl ::weft_core::__private::Interceptable for dyn #trait_ident {
                fn contract() -> ::std::sync::Arc<::weft_core::__private::InterfaceContract> {
                    __contract()
                }

                fn bind(
                    target: ::std::sync::Arc<Self>,
                ) -> ::weft_core::__private::BaseInvoker {
                    let handlers = ::std::vec![#(#handlers),*];
                    ::weft_core::__private::BaseInvoker::from_handlers(__contract(), handlers)
                }

                fn from_chain(
                    chain: ::std::sync::Arc<dyn ::weft_core::__private::Invoker>,
                ) -> ::std::sync::Arc<Self> {
                    ::std::sync::Arc::new(WeftProxy { chain })
                }

                fn chain_of(
                    proxy: &::std::sync::Arc<Self>,
                ) -> ::core::option::Option<::std::sync::Arc<dyn ::weft_core::__private::Invoker>>
                {
                    proxy.#chain_ident()
                }
            }
        };
    })
}

fn collect_methods(item: &ItemTrait) -> syn::Result<Vec<Method>> {
    let mut methods = Vec::new();
    for trait_item in &item.items {
        let method = match trait_item {
            TraitItem::Fn(method) => method,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "#[interceptable] traits may only contain methods",
                ))
            }
        };
        methods.push(validate_method(method, methods.len())?);
    }
    Ok(methods)
}

fn validate_method(method: &TraitItemFn, index: usize) -> syn::Result<Method> {
    let sig = &method.sig;

    if method.default.is_some() {
        return Err(syn::Error::new(
            sig.span(),
            "interceptable methods cannot have default bodies; the proxy must route every call",
        ));
    }
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "interceptable methods cannot be generic",
        ));
    }
    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new(
                sig.span(),
                "interceptable methods must take `&self`",
            ))
        }
    }

    let mut args = Vec::new();
    for input in sig.inputs.iter().skip(1) {
        let FnArg::Typed(arg) = input else {
            return Err(syn::Error::new(input.span(), "unexpected receiver"));
        };
        let ident = match &*arg.pat {
            Pat::Ident(pat) if pat.subpat.is_none() => pat.ident.clone(),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "interceptable method arguments must be plain identifiers",
                ))
            }
        };
        if matches!(&*arg.ty, Type::Reference(_)) {
            return Err(syn::Error::new(
                arg.ty.span(),
                "interceptable method arguments must be owned types; \
                 they cross the chain as shared values",
            ));
        }
        args.push((ident, (*arg.ty).clone()));
    }

    let ok_type = result_ok_type(&sig.output)?;
    let is_async = sig.asyncness.is_some();
    let shape = match (is_async, is_unit(&ok_type)) {
        (false, true) => Shape::Action,
        (false, false) => Shape::Function(ok_type),
        (true, true) => Shape::AsyncAction,
        (true, false) => Shape::AsyncFunction(ok_type),
    };

    Ok(Method {
        ident: sig.ident.clone(),
        index,
        shape,
        args,
        sig: sig.clone(),
    })
}

/// Extracts `R` from a `Result<R, _>` return type.
fn result_ok_type(output: &ReturnType) -> syn::Result<Type> {
    let err = || {
        syn::Error::new(
            output.span(),
            "interceptable methods must return `Result<_, BoxError>`; \
             the pipeline propagates failures through the `Err` channel",
        )
    };
    let ReturnType::Type(_, ty) = output else {
        return Err(err());
    };
    let Type::Path(path) = &**ty else {
        return Err(err());
    };
    let segment = path.path.segments.last().ok_or_else(err)?;
    if segment.ident != "Result" {
        return Err(err());
    }
    let syn::PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return Err(err());
    };
    match generics.args.first() {
        Some(syn::GenericArgument::Type(ok)) => Ok(ok.clone()),
        _ => Err(err()),
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

fn descriptor(trait_name: &str, method: &Method) -> TokenStream {
    let name = method.ident.to_string();
    let index = method.index;
    let shape = match &method.shape {
        Shape::Action => quote!(::weft_core::__private::ReturnShape::action()),
        Shape::Function(ok) => quote!(::weft_core::__private::ReturnShape::function::<#ok>()),
        Shape::AsyncAction => quote!(::weft_core::__private::ReturnShape::async_action()),
        Shape::AsyncFunction(ok) => {
            quote!(::weft_core::__private::ReturnShape::async_function::<#ok>())
        }
    };
    quote! {
        ::weft_core::__private::MethodDescriptor::new(#trait_name, #name, #index, #shape)
    }
}

/// The handler closing over `target` for one method, in descriptor order.
fn handler(method: &Method) -> TokenStream {
    let ident = &method.ident;
    let extract = method.args.iter().enumerate().map(|(i, (arg, ty))| {
        quote! { let #arg: #ty = args.value(#i)?; }
    });
    let names = method.args.iter().map(|(arg, _)| arg);

    match &method.shape {
        Shape::Action => quote! {{
            let target = ::std::sync::Arc::clone(&target);
            ::weft_core::__private::MethodHandler::action(move |args| {
                #(#extract)*
                target.#ident(#(#names),*)
            })
        }},
        Shape::Function(ok) => quote! {{
            let target = ::std::sync::Arc::clone(&target);
            ::weft_core::__private::MethodHandler::function::<#ok, _>(move |args| {
                #(#extract)*
                target.#ident(#(#names),*)
            })
        }},
        Shape::AsyncAction => quote! {{
            let target = ::std::sync::Arc::clone(&target);
            ::weft_core::__private::MethodHandler::async_action(move |args| {
                let target = ::std::sync::Arc::clone(&target);
                let args = args.clone();
                ::std::boxed::Box::pin(async move {
                    #(#extract)*
                    target.#ident(#(#names),*).await
                })
            })
        }},
        Shape::AsyncFunction(ok) => quote! {{
            let target = ::std::sync::Arc::clone(&target);
            ::weft_core::__private::MethodHandler::async_function::<#ok, _>(move |args| {
                let target = ::std::sync::Arc::clone(&target);
                let args = args.clone();
                ::std::boxed::Box::pin(async move {
                    #(#extract)*
                    target.#ident(#(#names),*).await
                })
            })
        }},
    }
}

/// The proxy's implementation of one method: pack the arguments, build the
/// call, dispatch through the shape helper.
fn proxy_method(method: &Method) -> TokenStream {
    let sig = &method.sig;
    let index = method.index;
    let arg_count = method.args.len();
    let names = method.args.iter().map(|(arg, _)| arg);

    let pack = if arg_count == 0 {
        quote! { let args = ::weft_core::__private::CallArgs::new(); }
    } else {
        quote! {
            let mut args = ::weft_core::__private::CallArgs::with_capacity(#arg_count);
            #(args.push(#names);)*
        }
    };

    let dispatch = match &method.shape {
        Shape::Action => quote! {
            ::weft_core::__private::call_action(&*self.chain, &call)
        },
        Shape::Function(ok) => quote! {
            ::weft_core::__private::call_function::<#ok>(&*self.chain, &call)
        },
        Shape::AsyncAction => quote! {
            ::weft_core::__private::call_action_async(&*self.chain, &call).await
        },
        Shape::AsyncFunction(ok) => quote! {
            ::weft_core::__private::call_function_async::<#ok>(&*self.chain, &call).await
        },
    };

    quote! {
        #sig {
            #pack
            let call = ::weft_core::__private::MethodCall::new(__contract(), #index, args)?;
            #dispatch
        }
    }
}
