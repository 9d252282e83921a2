#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace: error enums, feature slices,
//! API models/handlers and the runtime entry point.
//!
//! Examples are `ignore`d here because the expansions reference crates
//! (`campus_kernel`, `campus_runtime`, `utoipa`) that a proc-macro crate
//! cannot depend on.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Bootstraps a Tokio runtime profile around an `async fn main`.
///
/// # Arguments
///
/// * `high_performance` - HTTP server profile.
/// * `worker` - Background task worker profile (fewer, larger threads).
/// * `default` - Worker threads detected from available parallelism.
///
/// ```rust,ignore
/// #[campus_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares an API data model.
///
/// Adds `Debug`, `Serialize`, `Deserialize` when missing, `utoipa::ToSchema`
/// when the consumer's `server` feature is on, `rename_all = "camelCase"` and
/// `deny_unknown_fields` unless overridden.
///
/// ```rust,ignore
/// #[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
/// pub struct SwitchState {
///     pub name: String,
///     pub enabled: bool,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an Axum handler with `utoipa::path`.
///
/// Accepts the regular `utoipa::path` arguments (`get`, `post`, `path = ..`,
/// `responses(..)`, `tag = ..`).
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)))]
/// pub async fn health_handler() -> impl IntoResponse { .. }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a workspace error type.
///
/// * Derives `Debug` and `thiserror::Error` when they are not already derived.
/// * Generates a `<Name>Ext` trait with `.context(..)` for `Result<T, Name>` and
///   for `Result<T, Source>` of every source-carrying variant.
/// * Implements `From<Source>` for those variants, so `?` works upstream.
/// * Implements `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
///
/// Variants must have named fields; a variant with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[campus_error]
/// pub enum ConfigError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal config error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn campus_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares a feature slice handle.
///
/// `struct Certificates { .. }` becomes `CertificatesInner { .. }` plus an
/// `Arc`-backed `Certificates` that derefs to it and implements
/// `FeatureSlice` for registration in the API state.
///
/// ```rust,ignore
/// #[campus_derive::campus_slice]
/// pub struct Toggles {
///     pub registry: &'static SwitchRegistry,
/// }
///
/// let slice = Toggles::new(TogglesInner { registry: SwitchRegistry::global() });
/// ```
#[proc_macro_attribute]
pub fn campus_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
