//! Derive macros for the `arenals` crate.

mod flat;
mod util;

use proc_macro::TokenStream;
use syn::{Data, parse_macro_input};

/// Derive `Flat` for values that live in an `arenals::Arena`.
///
/// The arena reclaims memory in bulk and never runs destructors, so every
/// field must itself be `Flat`. The generated impl carries one
/// `FieldType: Flat` bound per field type, and one `T: Flat` bound per type
/// parameter, so a non-`Flat` field is rejected where the type is defined.
///
/// ```ignore
/// #[derive(Flat, Clone, Copy)]
/// struct Entry<'a> {
///   path: Str<'a>,
///   kind: EntryKind,
/// }
/// ```
///
/// Unions are rejected.
#[proc_macro_derive(Flat)]
pub fn derive_flat(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as syn::DeriveInput);
  if let Data::Union(ref u) = input.data {
    return TokenStream::from(
      syn::Error::new_spanned(u.union_token, "Flat cannot be derived for unions")
        .to_compile_error(),
    );
  }
  TokenStream::from(flat::gen_flat_impl(&input))
}
