//! exprkit core engine library.
//!
//! Provides the catalog-driven expression engine: lexical rule compilation,
//! display/storage transcoding, completion resolution, and static
//! validation. The main entry points are [`compile_rules`] for matchers,
//! [`Transcoder`] for encoding conversion, [`resolve`] for completion, and
//! [`validate`] for diagnostics.

#![warn(missing_docs)]

/// Context-sensitive completion resolution.
pub mod complete;
/// Lexical rule compilation and substitution tables.
pub mod rules;
/// Display/storage transcoding.
pub mod transcode;
/// Static expression validation.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Rule compiler
pub use rules::{ClassifiedSpan, LexCategory, LexicalRule, LexicalRules, classify, compile_rules};

// Transcoder
pub use transcode::Transcoder;

// Completion
pub use complete::{Candidate, CandidateKind, resolve};

// Validator
pub use validate::{ValidationResult, validate};

// Diagnostics (re-exported from the diagnostics crate)
pub use exprkit_diagnostics::{Diagnostic, Severity, Span, codes};
