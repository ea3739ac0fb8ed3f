//! Host-facing wrapper for the exprkit expression engine.
//!
//! Binds the core engine — rule compilation, transcoding, completion, and
//! validation — to a hosting editor widget through the [`EditorHost`] trait.
//! The main entry point is [`ExpressionEngine`]: construct it with a host,
//! the stored document content, [`EngineOptions`], and an
//! [`IdentifierCatalog`](exprkit_catalog::IdentifierCatalog); drive it from
//! the host's text-change notifications.

#![warn(missing_docs)]

/// Engine lifecycle and snapshot management.
pub mod engine;
/// The host editor trait.
pub mod host;
/// Engine configuration surface.
pub mod options;
/// Color/style themes for the lexical categories.
pub mod theme;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use engine::{
    DIAGNOSTICS_OWNER, EngineSnapshot, ExpressionEngine, LANGUAGE_ID, PositionedDiagnostic,
    position_diagnostics,
};
pub use host::{CompletionSource, EditorHost};
pub use options::{ContentHook, EngineOptions};
pub use theme::{CLASSIC_THEME, CategoryStyle, Theme};

// Catalog types (re-exported from the catalog crate)
pub use exprkit_catalog::{CatalogError, IdentifierCatalog};
