use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, parse_macro_input, spanned::Spanned};

/// Implements `relmap::Entity` for a struct with named fields.
///
/// Fields marked `#[id]` or `#[column]` are persisted; everything else is
/// transient and left at its `Default` value when a row is read.
#[proc_macro_derive(Entity, attributes(entity, id, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Entity does not support generic structs",
        ));
    }

    let options = parse_entity_options(&input.attrs)?;

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity requires named fields",
            ));
        }
    };

    let mut fields = Vec::<MappedField>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Entity requires named fields"))?;
        let column = parse_column_options(&field.attrs)?;
        fields.push(MappedField { ident, column });
    }

    if !fields.iter().any(|field| field.column.is_some()) {
        return Err(syn::Error::new(
            struct_name.span(),
            "Entity requires at least one #[id] or #[column] field",
        ));
    }

    let table = options
        .table_name
        .as_ref()
        .map(|table| quote!(.table(#table)));

    let constructor = if options.immutable {
        let mut position = 0usize;
        let mut initializers = Vec::<TokenStream2>::new();
        for field in &fields {
            let ident = &field.ident;
            if field.column.is_some() {
                initializers.push(quote!(#ident: arguments.take(#position)?));
                position += 1;
            } else {
                initializers.push(quote!(#ident: ::core::default::Default::default()));
            }
        }
        quote! {
            ::relmap::EntityDescription::immutable(
                stringify!(#struct_name),
                |mut arguments| ::core::result::Result::Ok(Self { #(#initializers),* }),
            )
        }
    } else {
        quote! {
            ::relmap::EntityDescription::mutable(
                stringify!(#struct_name),
                <Self as ::core::default::Default>::default,
            )
        }
    };

    let members = fields.iter().filter_map(|field| {
        let column = field.column.as_ref()?;
        let ident = &field.ident;
        let spec = column.spec_tokens(&ident.to_string());
        Some(if options.immutable {
            quote!(.parameter(#spec, |entity| &entity.#ident))
        } else {
            quote!(.field(#spec, |entity| &entity.#ident, |entity| &mut entity.#ident))
        })
    });

    let callbacks = options.callbacks.iter().map(|(phase, method)| {
        quote! {
            .#phase(|entity| ::relmap::IntoCallbackResult::into_callback_result(Self::#method(entity)))
        }
    });

    Ok(quote! {
        impl ::relmap::Entity for #struct_name {
            fn describe() -> ::relmap::EntityDescription<Self> {
                #constructor
                    #table
                    #(#members)*
                    #(#callbacks)*
            }
        }
    })
}

struct MappedField {
    ident: Ident,
    column: Option<ColumnOptions>,
}

#[derive(Default)]
struct EntityOptions {
    table_name: Option<String>,
    immutable: bool,
    callbacks: Vec<(Ident, Ident)>,
}

#[derive(Default)]
struct ColumnOptions {
    id_order: Option<u32>,
    name: Option<String>,
    sql_type: Option<String>,
}

impl ColumnOptions {
    fn spec_tokens(&self, field_name: &str) -> TokenStream2 {
        let base = match self.id_order {
            Some(0) => quote!(::relmap::FieldSpec::id(#field_name)),
            Some(order) => quote!(::relmap::FieldSpec::column(#field_name).order(#order)),
            None => quote!(::relmap::FieldSpec::column(#field_name)),
        };
        let renamed = self.name.as_ref().map(|name| quote!(.renamed(#name)));
        let sql_type = self.sql_type.as_ref().map(|ty| quote!(.sql_type(#ty)));
        quote!(#base #renamed #sql_type)
    }
}

const CALLBACK_PHASES: [&str; 4] = ["before_insert", "before_update", "before_delete", "after_load"];

fn parse_entity_options(attrs: &[syn::Attribute]) -> syn::Result<EntityOptions> {
    let mut options = EntityOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                options.table_name = Some(lit.value());
                return Ok(());
            }

            if meta.path.is_ident("immutable") {
                options.immutable = true;
                return Ok(());
            }

            if let Some(phase) = CALLBACK_PHASES
                .iter()
                .find(|phase| meta.path.is_ident(phase))
            {
                let lit: LitStr = meta.value()?.parse()?;
                let method: Ident = lit.parse()?;
                options
                    .callbacks
                    .push((Ident::new(phase, meta.path.span()), method));
                return Ok(());
            }

            Err(meta.error(
                "Unsupported entity attribute. Supported: table = \"...\", immutable, \
                 before_insert/before_update/before_delete/after_load = \"method\"",
            ))
        })?;
    }

    Ok(options)
}

fn parse_column_options(attrs: &[syn::Attribute]) -> syn::Result<Option<ColumnOptions>> {
    let mut options: Option<ColumnOptions> = None;

    for attr in attrs {
        let is_id = attr.path().is_ident("id");
        if !is_id && !attr.path().is_ident("column") {
            continue;
        }

        let parsed = options.get_or_insert_with(ColumnOptions::default);
        if is_id {
            if parsed.id_order.is_some() {
                return Err(syn::Error::new(attr.span(), "Duplicate #[id] attribute on field"));
            }
            parsed.id_order = Some(0);
        }

        match &attr.meta {
            syn::Meta::Path(_) => {}
            syn::Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if is_id && meta.path.is_ident("order") {
                        let lit: syn::LitInt = meta.value()?.parse()?;
                        parsed.id_order = Some(lit.base10_parse::<u32>()?);
                        return Ok(());
                    }

                    if !is_id && meta.path.is_ident("name") {
                        let lit: LitStr = meta.value()?.parse()?;
                        parsed.name = Some(lit.value());
                        return Ok(());
                    }

                    if !is_id && meta.path.is_ident("sql_type") {
                        let lit: LitStr = meta.value()?.parse()?;
                        parsed.sql_type = Some(lit.value());
                        return Ok(());
                    }

                    Err(meta.error(if is_id {
                        "Unsupported #[id(...)] option. Supported: order = <u32>"
                    } else {
                        "Unsupported #[column(...)] option. Supported: name = \"...\", sql_type = \"...\""
                    }))
                })?;
            }
            syn::Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "Unsupported name-value syntax. Use #[id], #[id(order = N)], #[column] or #[column(name = \"...\")]",
                ));
            }
        }
    }

    Ok(options)
}
