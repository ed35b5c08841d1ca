//! # Assembly Editor Core
//!
//! Command and history primitives shared by the assembly editor crates.

pub mod abstract_editor;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the crate version once at startup.
pub fn init() {
    log::info!("Assembly core v{} initialized", VERSION);
}
