//! AbyssBench Macros
//!
//! Procedural macros for benchmark registration.
//!
//! ## Macros
//!
//! - `#[benchmarks]` - Generate a `Benchmarkable` impl from an `impl` block
//! - `#[benchmark]` - Marker on methods inside a `#[benchmarks]` block

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, Visibility, parse_macro_input};

// ============================================================================
// Attribute Parsing Helpers
// ============================================================================

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Generate a `Benchmarkable` impl for the type of an `impl` block.
///
/// Methods marked `#[benchmark]` become tagged operations, discovered in
/// declaration order. Other visible zero-argument `&self` methods are
/// registered untagged: they can be run by name but are never discovered.
///
/// # Example
///
/// ```ignore
/// #[benchmarks]
/// impl Hashes {
///     #[benchmark]
///     pub fn sha256(&self) -> Vec<u8> { ... }
///
///     #[benchmark(name = "SHA-512")]
///     pub fn sha512(&self) -> Vec<u8> { ... }
///
///     #[benchmark(fallible)]
///     pub fn decode(&self) -> Result<Vec<u8>, DecodeError> { ... }
/// }
///
/// // Also list the type in the runner catalog (requires `Default`)
/// #[benchmarks(register)]
/// impl Workloads { ... }
/// ```
#[proc_macro_attribute]
pub fn benchmarks(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let item = parse_macro_input!(item as ItemImpl);

    benchmarks_impl(args, item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Mark a method as a benchmark target.
///
/// Only meaningful inside an `impl` block annotated with `#[benchmarks]`,
/// which consumes the marker before this macro would run.
#[proc_macro_attribute]
pub fn benchmark(_args: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    let err = syn::Error::new(
        proc_macro2::Span::call_site(),
        "#[benchmark] must be used on a method inside a #[benchmarks] impl block",
    )
    .to_compile_error();
    quote! { #err #item }.into()
}

#[derive(Default)]
struct BenchmarksConfig {
    register: bool,
}

fn parse_benchmarks_config(args: TokenStream2) -> Result<BenchmarksConfig, syn::Error> {
    let mut config = BenchmarksConfig::default();
    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "register" => config.register = true,
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });
    syn::parse::Parser::parse2(parser, args)?;
    Ok(config)
}

#[derive(Default)]
struct MarkerConfig {
    name: Option<String>,
    fallible: bool,
}

/// A method selected for the registry
struct Entry {
    ident: syn::Ident,
    name: String,
    tagged: bool,
    fallible: bool,
    /// `#[cfg]` attributes on the method, repeated on its registration
    cfgs: Vec<syn::Attribute>,
}

fn benchmarks_impl(args: TokenStream2, mut item: ItemImpl) -> Result<TokenStream2, syn::Error> {
    let config = parse_benchmarks_config(args)?;

    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[benchmarks] must be placed on an inherent impl block",
        ));
    }

    let mut entries = Vec::new();
    for impl_item in &mut item.items {
        if let ImplItem::Fn(method) = impl_item {
            if let Some(entry) = take_entry(method)? {
                entries.push(entry);
            }
        }
    }

    let self_ty = &item.self_ty;
    let type_name = type_display_name(self_ty);
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    // One statement per entry so a method's cfg gates its registration too
    let registrations = entries.iter().map(|entry| {
        let ident = &entry.ident;
        let name = &entry.name;
        let cfgs = &entry.cfgs;
        let call = match (entry.tagged, entry.fallible) {
            (true, false) => quote! {
                benchmark(#name, |target: &Self| {
                    ::std::hint::black_box(target.#ident());
                })
            },
            (true, true) => quote! {
                try_benchmark(#name, |target: &Self| {
                    target.#ident().map(|value| {
                        ::std::hint::black_box(value);
                    })
                })
            },
            (false, _) => quote! {
                operation(#name, |target: &Self| {
                    ::std::hint::black_box(target.#ident());
                })
            },
        };
        quote! {
            #(#cfgs)*
            let registry = registry.#call;
        }
    });

    let catalog = if config.register {
        if !item.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &item.generics,
                "#[benchmarks(register)] does not support generic impl blocks",
            ));
        }
        quote! {
            ::abyssbench::internal::inventory::submit! {
                ::abyssbench::TargetDef {
                    name: #type_name,
                    module_path: module_path!(),
                    file: file!(),
                    line: line!(),
                    operations: ::abyssbench::operations_of::<#self_ty>,
                    run: ::abyssbench::run_registered::<#self_ty>,
                    run_method: ::abyssbench::run_registered_method::<#self_ty>,
                }
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        #item

        impl #impl_generics ::abyssbench::Benchmarkable for #self_ty #where_clause {
            fn operations() -> ::abyssbench::OperationRegistry<Self> {
                let registry = ::abyssbench::OperationRegistry::builder(#type_name);
                #(#registrations)*
                registry.build()
            }
        }

        #catalog
    })
}

/// Strip `#[benchmark]` markers from `method` and decide whether it joins the
/// registry.
fn take_entry(method: &mut ImplItemFn) -> Result<Option<Entry>, syn::Error> {
    let mut marker: Option<MarkerConfig> = None;
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attribute in method.attrs.drain(..) {
        if !attribute.path().is_ident("benchmark") {
            kept.push(attribute);
            continue;
        }
        if marker.is_some() {
            return Err(syn::Error::new_spanned(
                attribute,
                "duplicate #[benchmark] marker",
            ));
        }
        marker = Some(parse_marker(&attribute)?);
    }
    method.attrs = kept;

    let cfgs: Vec<_> = method
        .attrs
        .iter()
        .filter(|a| a.path().is_ident("cfg"))
        .cloned()
        .collect();
    let shape_error = zero_arg_ref_self(method);

    match marker {
        Some(config) => {
            if let Some(msg) = shape_error {
                return Err(syn::Error::new_spanned(&method.sig, msg));
            }
            if config.fallible && matches!(method.sig.output, ReturnType::Default) {
                return Err(syn::Error::new_spanned(
                    &method.sig,
                    "#[benchmark(fallible)] methods must return a Result",
                ));
            }
            let ident = method.sig.ident.clone();
            Ok(Some(Entry {
                name: config.name.unwrap_or_else(|| ident.to_string()),
                ident,
                tagged: true,
                fallible: config.fallible,
                cfgs,
            }))
        }
        None if shape_error.is_none() && !matches!(method.vis, Visibility::Inherited) => {
            let ident = method.sig.ident.clone();
            Ok(Some(Entry {
                name: ident.to_string(),
                ident,
                tagged: false,
                fallible: false,
                cfgs,
            }))
        }
        None => Ok(None),
    }
}

fn parse_marker(attribute: &syn::Attribute) -> Result<MarkerConfig, syn::Error> {
    let mut config = MarkerConfig::default();
    if matches!(attribute.meta, syn::Meta::Path(_)) {
        return Ok(config);
    }

    attribute.parse_nested_meta(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "name" => config.name = Some(attr::string(&meta)?),
            "fallible" => config.fallible = true,
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    })?;
    Ok(config)
}

/// `None` if the method can be invoked as `target.method()` with `&self`,
/// otherwise the reason it cannot.
fn zero_arg_ref_self(method: &ImplItemFn) -> Option<&'static str> {
    let sig = &method.sig;

    if sig.asyncness.is_some() {
        return Some("benchmark methods cannot be async");
    }
    if sig.unsafety.is_some() {
        return Some("benchmark methods cannot be unsafe");
    }
    if !sig.generics.params.is_empty() {
        return Some("benchmark methods cannot be generic");
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver)) => {
            if receiver.reference.is_none() || receiver.mutability.is_some() {
                return Some("benchmark methods must take `&self`");
            }
        }
        _ => return Some("benchmark methods must take `&self`"),
    }

    if inputs.next().is_some() {
        return Some("benchmark methods cannot take arguments besides `&self`");
    }

    None
}

fn type_display_name(ty: &syn::Type) -> String {
    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident.to_string();
        }
    }
    quote!(#ty).to_string().replace(' ', "")
}
