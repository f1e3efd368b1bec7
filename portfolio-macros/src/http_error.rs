use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr, Token};

struct VariantSpec {
    ident: Ident,
    fields: Fields,
    code: TokenStream,
    message: Option<LitStr>,
}

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let data = match input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "HttpError can only be derived for enums",
            ))
        }
    };

    let mut specs = Vec::with_capacity(data.variants.len());
    for variant in data.variants {
        let (code, message) = match find_attr(&variant.attrs) {
            Some(attr) => parse_attr(attr)?,
            None => (
                quote! { ::axum::http::StatusCode::INTERNAL_SERVER_ERROR },
                None,
            ),
        };
        specs.push(VariantSpec {
            ident: variant.ident,
            fields: variant.fields,
            code,
            message,
        });
    }

    let code_arms = specs.iter().map(|spec| {
        let pattern = wildcard_pattern(spec);
        let code = &spec.code;
        quote! { #pattern => #code, }
    });
    let message_arms = specs.iter().map(message_arm);

    Ok(quote! {
        impl #name {
            pub fn http_code(&self) -> ::axum::http::StatusCode {
                match self {
                    #(#code_arms)*
                }
            }

            pub fn http_message(&self) -> ::std::string::String {
                match self {
                    #(#message_arms)*
                }
            }
        }
    })
}

fn find_attr(attrs: &[Attribute]) -> Option<&Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident("http_error"))
}

fn parse_attr(attr: &Attribute) -> syn::Result<(TokenStream, Option<LitStr>)> {
    let args = attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?;
    let mut args = args.into_iter();

    let code = match args.next() {
        Some(Expr::Path(path)) => {
            let path = path.path;
            quote! { ::axum::http::StatusCode::#path }
        }
        Some(Expr::Lit(expr)) => match expr.lit {
            Lit::Int(int) => {
                let code = int.base10_parse::<u16>()?;
                if !(100..=999).contains(&code) {
                    return Err(syn::Error::new_spanned(int, "invalid HTTP status code"));
                }
                quote! {
                    match ::axum::http::StatusCode::from_u16(#code) {
                        Ok(code) => code,
                        Err(_) => ::axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    }
                }
            }
            other => return Err(syn::Error::new_spanned(other, "expected a status code")),
        },
        Some(other) => return Err(syn::Error::new_spanned(other, "expected a status code")),
        None => return Err(syn::Error::new_spanned(attr, "missing status code")),
    };

    let message = match args.next() {
        Some(Expr::Lit(expr)) => match expr.lit {
            Lit::Str(message) => Some(message),
            other => return Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        Some(other) => return Err(syn::Error::new_spanned(other, "expected a string literal")),
        None => None,
    };

    if let Some(extra) = args.next() {
        return Err(syn::Error::new_spanned(extra, "unexpected argument"));
    }

    Ok((code, message))
}

fn wildcard_pattern(spec: &VariantSpec) -> TokenStream {
    let ident = &spec.ident;
    match spec.fields {
        Fields::Unit => quote! { Self::#ident },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Named(_) => quote! { Self::#ident { .. } },
    }
}

fn message_arm(spec: &VariantSpec) -> TokenStream {
    let ident = &spec.ident;
    let Some(message) = &spec.message else {
        let pattern = wildcard_pattern(spec);
        return quote! { #pattern => ::std::string::ToString::to_string(self), };
    };

    match &spec.fields {
        Fields::Unit => quote! { Self::#ident => ::std::string::String::from(#message), },
        Fields::Unnamed(fields) => {
            let bindings: Vec<Ident> = (0..fields.unnamed.len())
                .map(|i| format_ident!("__field_{}", i))
                .collect();
            let template = LitStr::new(&index_to_binding(&message.value()), message.span());
            quote! {
                #[allow(unused_variables)]
                Self::#ident(#(#bindings),*) => format!(#template),
            }
        }
        Fields::Named(fields) => {
            let names: Vec<&Ident> = fields
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .collect();
            quote! {
                #[allow(unused_variables)]
                Self::#ident { #(#names),* } => format!(#message),
            }
        }
    }
}

/// Rewrites positional placeholders (`{0}`, `{1:?}`) to the names bound in the match arm.
fn index_to_binding(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '{' {
            continue;
        }
        if chars.peek() == Some(&'{') {
            out.push(chars.next().unwrap_or('{'));
            continue;
        }
        if chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            out.push_str("__field_");
        }
    }

    out
}
