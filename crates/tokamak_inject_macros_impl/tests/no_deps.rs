/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use tokamak_inject_macros_impl::expand_injectable;
use quote::quote;
use rust_format::{Formatter, RustFmt};

static EXPECTED: &str = stringify! {
    impl Basic {
        pub fn new() -> Self {}
    }
    #[doc(hidden)]
    #[allow(
        non_upper_case_globals,
        unused_attributes,
        unused_qualifications,
        clippy::absolute_paths,
        non_camel_case_types,
        deprecated
    )]
    const _: () = {
        #[allow(unused_extern_crates, clippy::useless_attribute)]
        extern crate tokamak_inject as _tokamak_inject;
        #[automatically_derived]
        impl _tokamak_inject::FromInjector for Basic {
            fn from_injector(
                injector: &_tokamak_inject::Injector,
            ) -> _tokamak_inject::ConstructionResult<Self> {
                _tokamak_inject::IntoConstructionResult::into_construction_result(Self::new())
            }
        }
        #[automatically_derived]
        impl _tokamak_inject::Injectable for Basic {}
        #[automatically_derived]
        impl _tokamak_inject::IntoConstructionResult for Basic {
            type Service = Basic;
            fn into_construction_result(self) -> _tokamak_inject::ConstructionResult<Self::Service> {
                _tokamak_inject::ConstructionResult::Ok(self)
            }
        }
    };
};

#[test]
fn test_no_deps() {
    let attr = quote! {};
    let input = quote! {
        // #[injectable]
        impl Basic {
            pub fn new() -> Self {}
        }
    };

    let expected = RustFmt::default()
        .format_str(EXPECTED)
        .unwrap()
        .replace("\r\n", "\n");

    let actual = RustFmt::default()
        .format_tokens(expand_injectable(attr, input).unwrap())
        .unwrap()
        .replace("\r\n", "\n");

    assert_eq!(actual, expected);
}
