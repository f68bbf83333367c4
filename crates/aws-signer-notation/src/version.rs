//! Build version.

/// Version reported in plugin metadata and debug logs.
///
/// Release builds stamp `AWS_SIGNER_NOTATION_PLUGIN_VERSION` at compile time;
/// otherwise the crate version is used.
pub const VERSION: &str = match option_env!("AWS_SIGNER_NOTATION_PLUGIN_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
