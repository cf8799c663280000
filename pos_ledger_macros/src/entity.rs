use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, LitStr};

struct EntityArgs {
    kinds: Vec<String>,
    name: Option<String>,
    plural: Option<String>,
}

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let args = match extract_args(&input) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    if args.kinds.is_empty() {
        return syn::Error::new(
            Span::call_site(),
            "Entity derive: missing #[entity(kind = \"...\")] or #[entity(kinds = \"...\")]",
        )
        .to_compile_error()
        .into();
    }

    let singular = args
        .name
        .unwrap_or_else(|| to_lower_camel_case(&name.to_string()));
    let plural = args.plural.unwrap_or_else(|| format!("{}s", singular));

    let kind_variants: Vec<Ident> = args
        .kinds
        .iter()
        .map(|kind| format_ident!("{}", to_pascal_case(kind)))
        .collect();

    let date_field = match extract_date_field(&input) {
        Ok(field) => field,
        Err(err) => return err.to_compile_error().into(),
    };

    let occurred_at = match date_field {
        Some(field) => quote! {
            fn occurred_at(&self) -> Option<pos_ledger::Timestamp> {
                pos_ledger::BusinessDate::business_date(&self.#field)
            }
        },
        None => quote! {},
    };

    let expanded = quote! {
        impl pos_ledger::Entity for #name {
            const NAME: &'static str = #singular;
            const PLURAL: &'static str = #plural;
            const KINDS: &'static [pos_ledger::RecordKind] = &[
                #( pos_ledger::RecordKind::#kind_variants ),*
            ];

            #occurred_at
        }
    };

    TokenStream::from(expanded)
}

fn extract_args(input: &DeriveInput) -> syn::Result<EntityArgs> {
    let mut args = EntityArgs {
        kinds: Vec::new(),
        name: None,
        plural: None,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let value: LitStr = meta.value()?.parse()?;
                args.kinds.push(value.value());
            } else if meta.path.is_ident("kinds") {
                let value: LitStr = meta.value()?.parse()?;
                args.kinds.extend(
                    value
                        .value()
                        .split(',')
                        .map(|kind| kind.trim().to_string())
                        .filter(|kind| !kind.is_empty()),
                );
            } else if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                args.name = Some(value.value());
            } else if meta.path.is_ident("plural") {
                let value: LitStr = meta.value()?.parse()?;
                args.plural = Some(value.value());
            } else {
                return Err(meta.error("unsupported entity attribute"));
            }
            Ok(())
        })?;
    }

    Ok(args)
}

fn extract_date_field(input: &DeriveInput) -> syn::Result<Option<Ident>> {
    let Data::Struct(data_struct) = &input.data else {
        return Ok(None);
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Ok(None);
    };

    let mut date_field = None;
    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("entity") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if !meta.path.is_ident("date") {
                    return Err(meta.error("unsupported entity field attribute, expected `date`"));
                }
                if date_field.is_some() {
                    return Err(meta.error("only one field can be marked #[entity(date)]"));
                }
                date_field = field.ident.clone();
                Ok(())
            })?;
        }
    }

    Ok(date_field)
}

fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn to_lower_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
