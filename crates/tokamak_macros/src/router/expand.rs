/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use super::ast::RouteSpec;
use crate::internals::Ctxt;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{ImplItem, ItemImpl, Lit, Meta, parse2, spanned::Spanned};

pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "`#[router]` does not take any arguments")
            .to_compile_error();
    }

    let mut item_impl: ItemImpl = match parse2(item) {
        Ok(item_impl) => item_impl,
        Err(err) => return err.to_compile_error(),
    };

    let cx = Ctxt::new();
    let mut routes = Vec::new();

    for impl_item in &mut item_impl.items {
        let ImplItem::Fn(method) = impl_item else { continue };

        let Some(index) = method
            .attrs
            .iter()
            .position(|attr| attr.path().is_ident("route"))
        else {
            continue;
        };

        let attr = method.attrs.remove(index);
        let ident = method.sig.ident.clone();

        let Meta::List(meta_list) = &attr.meta else {
            cx.error_spanned_by(&attr, "expected `#[route(\"METHOD /path\")]`");
            continue;
        };

        let lit: Lit = match parse2(meta_list.tokens.clone()) {
            Ok(lit) => lit,
            Err(err) => {
                cx.syn_error(err);
                continue;
            }
        };

        let Lit::Str(lit_str) = lit else {
            cx.error(lit.span(), "expected a string literal");
            continue;
        };

        if let Some(spec) = RouteSpec::parse(&cx, &lit_str) {
            routes.push((spec, ident));
        }
    }

    if let Err(err) = cx.check() {
        return err.to_compile_error();
    }

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    let route_defs = routes.into_iter().map(|(spec, ident)| {
        let method = spec.method;
        let path = spec.path;

        quote! {
            ::tokamak::routing::RouteDef::new(#method, #path, #self_ty::#ident)
        }
    });

    quote! {
        #item_impl

        impl #impl_generics ::tokamak::routing::Routed for #self_ty #where_clause {
            fn route_defs() -> ::std::vec::Vec<::tokamak::routing::RouteDef> {
                ::std::vec![
                    #(#route_defs),*
                ]
            }
        }
    }
}

pub(crate) fn expand_route(item: TokenStream) -> TokenStream {
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_format::{Formatter, RustFmt};

    fn fmt(tokens: TokenStream) -> String {
        RustFmt::default().format_str(tokens.to_string()).unwrap()
    }

    #[test]
    fn collects_routes_and_strips_attribute() {
        let input = quote! {
            impl UserController {
                #[route("GET /users/:id")]
                fn get_user(id: PathParam<u64>) -> Json<User> {}

                #[route("POST /users")]
                fn create_user(body: Json<NewUser>) -> Json<User> {}

                fn helper() -> bool {}
            }
        };

        let expanded = fmt(expand(TokenStream::new(), input));

        let expected = fmt(quote! {
            impl UserController {
                fn get_user(id: PathParam<u64>) -> Json<User> {}

                fn create_user(body: Json<NewUser>) -> Json<User> {}

                fn helper() -> bool {}
            }

            impl ::tokamak::routing::Routed for UserController {
                fn route_defs() -> ::std::vec::Vec<::tokamak::routing::RouteDef> {
                    ::std::vec![
                        ::tokamak::routing::RouteDef::new("GET", "/users/:id", UserController::get_user),
                        ::tokamak::routing::RouteDef::new("POST", "/users", UserController::create_user)
                    ]
                }
            }
        });

        assert_eq!(expanded, expected);
    }

    #[test]
    fn rejects_unknown_method() {
        let input = quote! {
            impl UserController {
                #[route("FETCH /users")]
                fn get_user() {}
            }
        };

        let expanded = expand(TokenStream::new(), input).to_string();
        assert!(expanded.contains("unknown HTTP method"));
    }

    #[test]
    fn rejects_path_without_leading_slash() {
        let input = quote! {
            impl UserController {
                #[route("GET users")]
                fn get_user() {}
            }
        };

        let expanded = expand(TokenStream::new(), input).to_string();
        assert!(expanded.contains("must start with"));
    }
}
