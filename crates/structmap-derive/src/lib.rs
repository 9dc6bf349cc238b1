//! Derive macro for structmap records
//!
//! `#[derive(Mapped)]` enumerates the fields carrying an `#[sm("...")]`
//! annotation and generates the static shape and per-instance field values
//! the structmap engine walks instead of runtime reflection.

mod mapped;

use proc_macro::TokenStream;
use proc_macro_error::{abort, proc_macro_error};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput};

#[proc_macro_derive(Mapped, attributes(sm))]
#[proc_macro_error]
pub fn mapped_fn(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    if input.generics.lt_token.is_some() {
        abort!(input.generics.span(), "Generics are not supported");
    }

    match input.data {
        Data::Struct(ds) => mapped::process_struct(&input.ident, &input.attrs, ds).into(),
        Data::Enum(de) => {
            abort!(de.enum_token.span(), "Enums are not supported, only structs with named fields");
        }
        Data::Union(du) => {
            abort!(du.union_token.span(), "Unions are not supported");
        }
    }
}
