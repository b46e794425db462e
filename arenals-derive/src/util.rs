use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, Fields};

/// Returns true if a type parameter already has `Flat` (or `::arenals::Flat`) in
/// its bounds list.
pub fn has_flat_bound(tp: &syn::TypeParam) -> bool {
  tp.bounds.iter().any(|bound| {
    if let syn::TypeParamBound::Trait(tb) = bound
      && let Some(seg) = tb.path.segments.last()
    {
      seg.ident == "Flat"
    } else {
      false
    }
  })
}

/// Returns true if `ty` is a simple ident path matching `name`.
pub fn is_type_param_ident(ty: &syn::Type, name: &str) -> bool {
  if let syn::Type::Path(p) = ty
    && let Some(ident) = p.path.get_ident()
  {
    return ident == name;
  }
  false
}

/// Collect the names of type parameters that already have a `Flat` bound.
pub fn flat_bounded_param_names(generics: &syn::Generics) -> Vec<String> {
  generics.type_params().filter(|tp| has_flat_bound(tp)).map(|tp| tp.ident.to_string()).collect()
}

pub fn collect_field_types(data: &Data) -> Vec<syn::Type> {
  match data {
    Data::Struct(s) => fields_types(&s.fields),
    Data::Enum(e) => e.variants.iter().flat_map(|v| fields_types(&v.fields)).collect(),
    Data::Union(_) => Vec::new(),
  }
}

fn fields_types(fields: &Fields) -> Vec<syn::Type> {
  fields.iter().map(|f| f.ty.clone()).collect()
}

/// Drop repeated field types so each bound is emitted once.
pub fn dedup_types(types: Vec<syn::Type>) -> Vec<syn::Type> {
  let mut seen: Vec<String> = Vec::with_capacity(types.len());
  types
    .into_iter()
    .filter(|ty| {
      let key = ty.to_token_stream().to_string();
      if seen.contains(&key) {
        return false;
      }
      seen.push(key);
      true
    })
    .collect()
}

pub fn combine_where(
  existing: Option<&syn::WhereClause>,
  predicates: &[TokenStream],
) -> TokenStream {
  match existing {
    Some(existing) if existing.predicates.trailing_punct() || existing.predicates.is_empty() => {
      quote! { #existing #(#predicates),* }
    }
    Some(existing) => quote! { #existing #(, #predicates)* },
    None if predicates.is_empty() => quote! {},
    None => quote! { where #(#predicates),* },
  }
}
