use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::util::{
  collect_field_types, combine_where, dedup_types, flat_bounded_param_names, is_type_param_ident,
};

pub fn gen_flat_impl(input: &DeriveInput) -> TokenStream {
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
  let field_types = dedup_types(collect_field_types(&input.data));
  let already_bounded = flat_bounded_param_names(&input.generics);

  let mut where_predicates: Vec<_> = field_types
    .iter()
    .filter(|ty| !already_bounded.iter().any(|name| is_type_param_ident(ty, name)))
    .map(|ty| quote! { #ty: ::arenals::Flat })
    .collect();

  for tp in input.generics.type_params() {
    let ident = &tp.ident;
    if !already_bounded.contains(&ident.to_string()) {
      where_predicates.push(quote! { #ident: ::arenals::Flat });
    }
  }

  let combined_where = combine_where(where_clause, &where_predicates);

  quote! {
    // SAFETY: every field type is bounded by `Flat`; `Arena::alloc` rejects
    // any `Self` that still needs `Drop`.
    unsafe impl #impl_generics ::arenals::Flat for #name #ty_generics #combined_where {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn expand(src: &str) -> String {
    let input: DeriveInput = syn::parse_str(src).unwrap();
    gen_flat_impl(&input).to_string().split_whitespace().collect()
  }

  #[test]
  fn struct_fields_become_bounds() {
    let out = expand("struct Entry<'a> { path: Str<'a>, kind: EntryKind }");
    assert!(out.contains("Str<'a>:::arenals::Flat"), "{out}");
    assert!(out.contains("EntryKind:::arenals::Flat"), "{out}");
  }

  #[test]
  fn unit_enum_has_no_where_clause() {
    let out = expand("enum Kind { File, Directory }");
    assert!(!out.contains("where"), "{out}");
  }

  #[test]
  fn type_params_bounded_once() {
    let out = expand("struct Pair<T: Flat> { a: T, b: T, n: u32 }");
    assert!(!out.contains("T:::arenals::Flat"), "{out}");
    assert_eq!(out.matches("u32:::arenals::Flat").count(), 1, "{out}");
  }
}
