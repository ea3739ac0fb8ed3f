//! The editor-widget surface the engine drives.

use crate::engine::PositionedDiagnostic;
use crate::theme::Theme;
use exprkit_core::{Candidate, LexicalRules};

/// A completion resolver the host invokes with the current text and cursor
/// offset whenever it wants candidates.
pub type CompletionSource = Box<dyn Fn(&str, usize) -> Vec<Candidate>>;

/// Capabilities the hosting editor widget must provide.
///
/// The widget itself — text buffer, caret model, undo/redo, rendering, key
/// capture — is out of the engine's scope; the engine only reads the current
/// text and cursor, replaces text on load, and hands the host compiled
/// lexical rules, completion results, and positioned diagnostics.
pub trait EditorHost {
    /// The current display-encoded document text.
    fn text(&self) -> String;

    /// Replace the whole document text.
    fn set_text(&mut self, text: &str);

    /// The cursor position as a byte offset into the current text.
    fn cursor_offset(&self) -> usize;

    /// Register the lexical rules and theme under a language id.
    ///
    /// Must be idempotent per id: re-registering with a new rule set
    /// replaces the prior one rather than accumulating, so repeated catalog
    /// refreshes and multiple engine instances do not leak registrations.
    fn register_language(&mut self, language_id: &str, rules: &LexicalRules, theme: &Theme);

    /// Register the completion resolver for a language id.
    ///
    /// Same idempotency contract as [`register_language`](Self::register_language):
    /// re-registration replaces the prior source.
    fn register_completion_source(&mut self, language_id: &str, source: CompletionSource);

    /// Publish the diagnostics owned by `owner_id`, replacing that owner's
    /// previous list (never appending to it).
    fn set_diagnostics(&mut self, owner_id: &str, diagnostics: &[PositionedDiagnostic]);

    /// Open the completion popup at the cursor. Invoked when the user has
    /// just typed a `.` so dotted-path candidates appear without a manual
    /// request.
    fn trigger_completion(&mut self);
}
