use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, Ident, LitStr, Variant};

/// Derives `fmt::Display` for an instruction enum from per-variant templates.
///
/// Every variant carries a `#[mnemonic("...")]` attribute holding a format
/// string. Named fields of the variant can be referenced inside the template
/// by name, with any format spec:
///
/// ```ignore
/// #[derive(Mnemonic)]
/// enum Instruction {
///     #[mnemonic("CLS")]
///     Clear,
///     #[mnemonic("LD V{x:X}, {kk:#04X}")]
///     Load { x: u8, kk: u8 },
/// }
/// ```
#[proc_macro_derive(Mnemonic, attributes(mnemonic))]
pub fn derive_mnemonic(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "Mnemonic can only be derived for enums",
        ));
    };

    let enum_name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let arms = data
        .variants
        .iter()
        .map(|variant| variant_arm(enum_name, variant))
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #enum_name #type_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms,)*
                }
            }
        }
    })
}

fn variant_arm(enum_name: &Ident, variant: &Variant) -> syn::Result<TokenStream2> {
    let template = template_of(variant)?;
    let variant_name = &variant.ident;

    let fields: Vec<&Ident> = match &variant.fields {
        Fields::Named(named) => named.named.iter().filter_map(|f| f.ident.as_ref()).collect(),
        Fields::Unit => vec![],
        Fields::Unnamed(_) => {
            return Err(Error::new_spanned(
                variant,
                "Mnemonic templates refer to fields by name, use named fields",
            ))
        }
    };

    // Only fields the template mentions are bound, unused named format
    // arguments are a hard error in `format_args!`.
    let mut used = vec![];
    for name in placeholders(&template.value()) {
        match field_named(&fields, &name) {
            Some(field) => {
                if !used.contains(&field) {
                    used.push(field);
                }
            }
            None => {
                return Err(Error::new_spanned(
                    &template,
                    format!("`{variant_name}` has no field named `{name}`"),
                ))
            }
        }
    }

    let pattern = match &variant.fields {
        Fields::Unit => quote! { #enum_name::#variant_name },
        _ => quote! { #enum_name::#variant_name { #(#used,)* .. } },
    };

    Ok(quote! {
        #pattern => write!(f, #template, #(#used = #used),*)
    })
}

fn field_named<'a>(fields: &[&'a Ident], name: &str) -> Option<&'a Ident> {
    fields.iter().copied().find(|field| **field == *name)
}

fn template_of(variant: &Variant) -> syn::Result<LitStr> {
    let attribute = variant
        .attrs
        .iter()
        .find(|attribute| attribute.path().is_ident("mnemonic"))
        .ok_or_else(|| {
            Error::new_spanned(
                &variant.ident,
                "every variant needs a #[mnemonic(\"...\")] template",
            )
        })?;

    attribute.parse_args::<LitStr>()
}

/// Names referenced by `{name}` or `{name:spec}` placeholders, in order.
/// Escaped braces (`{{`) are skipped.
fn placeholders(template: &str) -> Vec<String> {
    let mut names = vec![];
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            continue;
        }

        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if c == '}' || c == ':' {
                break;
            }
            name.push(c);
            chars.next();
        }
        if !name.is_empty() {
            names.push(name);
        }
    }

    names
}
