//! Engine lifecycle: snapshot compilation, host wiring, and the
//! edit/validate/transcode loop.

use crate::host::{CompletionSource, EditorHost};
use crate::options::EngineOptions;
use crate::theme::Theme;
use exprkit_catalog::{CatalogError, IdentifierCatalog};
use exprkit_core::{Candidate, LexicalRules, Transcoder, compile_rules, resolve, validate};
use exprkit_diagnostics::{Diagnostic, LineIndex, Severity};
use serde::Serialize;
use std::sync::Arc;

/// Language id the engine registers its lexical rules under. Registration is
/// idempotent per id, so repeated refreshes replace rather than accumulate.
pub const LANGUAGE_ID: &str = "expression-language";

/// Owner id the engine publishes diagnostics under, so re-validation
/// replaces the previous list instead of appending.
pub const DIAGNOSTICS_OWNER: &str = "expression-validator";

/// Everything derived from one catalog: the catalog itself, its compiled
/// lexical rules, and its transcoder tables.
///
/// Snapshots are immutable. A refresh builds a complete new snapshot and
/// swaps the engine's reference in one assignment — any read started before
/// the swap keeps the old snapshot alive through its `Arc`, and any read
/// started after sees the new one as a whole.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    /// The catalog this snapshot was compiled from.
    pub catalog: IdentifierCatalog,
    /// Lexical matchers, in classification priority order.
    pub rules: LexicalRules,
    /// Display/storage substitution tables.
    pub transcoder: Transcoder,
}

impl EngineSnapshot {
    /// Compile every derived structure from a catalog.
    pub fn compile(catalog: IdentifierCatalog) -> Self {
        let rules = compile_rules(&catalog);
        let transcoder = Transcoder::new(&catalog);
        Self {
            catalog,
            rules,
            transcoder,
        }
    }
}

/// A diagnostic positioned for host publication.
///
/// `line` is the 1-based count of newlines preceding the finding plus one.
/// `column` is the raw character offset of the finding within the full text,
/// not remapped per line — hosts wanting exact columns can re-map the
/// underlying spans with [`LineIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedDiagnostic {
    /// 1-based line of the finding.
    pub line: usize,
    /// Raw character offset of the finding within the full text.
    pub column: usize,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: Severity,
    /// Stable diagnostic code (e.g., `"EXP1101"`).
    pub code: String,
}

/// Position validator diagnostics against the text they were produced from.
pub fn position_diagnostics(text: &str, issues: &[Diagnostic]) -> Vec<PositionedDiagnostic> {
    let index = LineIndex::new(text);
    issues
        .iter()
        .map(|diag| {
            let offset = diag.span.map_or(0, |s| s.start);
            PositionedDiagnostic {
                line: index.line_col(offset).0 + 1,
                column: offset,
                message: diag.message.clone(),
                severity: diag.severity.clone(),
                code: diag.id.to_string(),
            }
        })
        .collect()
}

/// The expression engine bound to one host editor instance.
///
/// Owns the active [`EngineSnapshot`] and drives the host on every text
/// change: transcoding on load/save, re-validation with diagnostic
/// publication, and proactive completion after a typed `.`.
pub struct ExpressionEngine<H: EditorHost> {
    host: H,
    options: EngineOptions,
    theme: Theme,
    snapshot: Arc<EngineSnapshot>,
}

impl<H: EditorHost> ExpressionEngine<H> {
    /// Create an engine: validate the catalog, compile the snapshot,
    /// register the language, convert the stored content to display form,
    /// and run an initial validation pass.
    pub fn new(
        mut host: H,
        stored_content: &str,
        options: EngineOptions,
        catalog: IdentifierCatalog,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let snapshot = Arc::new(EngineSnapshot::compile(catalog));
        let theme = options
            .theme
            .as_deref()
            .and_then(Theme::named)
            .unwrap_or_else(Theme::classic);
        host.register_language(LANGUAGE_ID, &snapshot.rules, &theme);
        host.register_completion_source(LANGUAGE_ID, Self::completion_source(&snapshot));
        let display = snapshot.transcoder.to_display(stored_content);
        host.set_text(&display);
        log::debug!("engine initialized; language registered as {LANGUAGE_ID}");

        let mut engine = Self {
            host,
            options,
            theme,
            snapshot,
        };
        engine.revalidate();
        Ok(engine)
    }

    /// The active snapshot. Cheap to clone; stays valid even across a
    /// concurrent refresh.
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// A completion source bound to one snapshot. The closure holds its own
    /// `Arc`, so a source registered before a refresh keeps resolving
    /// against the snapshot it was compiled from until it is replaced.
    fn completion_source(snapshot: &Arc<EngineSnapshot>) -> CompletionSource {
        let snapshot = Arc::clone(snapshot);
        Box::new(move |text, offset| resolve(text, offset, &snapshot.catalog))
    }

    /// The engine's configuration, including the opaque host passthroughs
    /// (`editor_options`, `custom_toolbar_buttons`).
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The active theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The host, for reads.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, for direct manipulation in tests and embedders.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Notify the engine of an edit. `last_inserted` is the text fragment of
    /// the most recent change; a just-typed `.` proactively re-triggers
    /// completion so dotted-path candidates appear immediately.
    pub fn on_text_changed(&mut self, last_inserted: &str) {
        if last_inserted == "." {
            self.host.trigger_completion();
        }
        if self.options.on_change.is_some() {
            let storage = self.snapshot.transcoder.to_storage(&self.host.text());
            if let Some(hook) = self.options.on_change.as_mut() {
                hook(&storage);
            }
        }
        self.revalidate();
    }

    /// Convert the current display text to its storage encoding, invoke the
    /// `on_save` hook, and return the storage text.
    pub fn save(&mut self) -> String {
        let storage = self.snapshot.transcoder.to_storage(&self.host.text());
        if let Some(hook) = self.options.on_save.as_mut() {
            hook(&storage);
        }
        storage
    }

    /// Replace the document with new storage-encoded content, shown in
    /// display form.
    pub fn load_stored(&mut self, stored: &str) {
        let display = self.snapshot.transcoder.to_display(stored);
        self.host.set_text(&display);
        self.revalidate();
    }

    /// Resolve completion candidates at the host's cursor.
    pub fn complete(&self) -> Vec<Candidate> {
        let text = self.host.text();
        resolve(&text, self.host.cursor_offset(), &self.snapshot.catalog)
    }

    /// Replace the catalog wholesale.
    ///
    /// All-or-nothing: on any validation error the previous snapshot stays
    /// fully in effect. On success the new snapshot is swapped in as a whole
    /// and the language registration is replaced under the same id.
    pub fn refresh_catalog(&mut self, catalog: IdentifierCatalog) -> Result<(), CatalogError> {
        catalog.validate()?;
        self.snapshot = Arc::new(EngineSnapshot::compile(catalog));
        self.host
            .register_language(LANGUAGE_ID, &self.snapshot.rules, &self.theme);
        self.host
            .register_completion_source(LANGUAGE_ID, Self::completion_source(&self.snapshot));
        log::debug!("catalog refreshed; rules re-registered under {LANGUAGE_ID}");
        self.revalidate();
        Ok(())
    }

    /// Re-validate the current text and publish the diagnostics, replacing
    /// the engine's previous list.
    fn revalidate(&mut self) {
        let text = self.host.text();
        let result = validate(&text, &self.snapshot.catalog);
        log::debug!(
            "validated {} byte(s): {} issue(s)",
            text.len(),
            result.issues.len()
        );
        let positioned = position_diagnostics(&text, &result.issues);
        self.host.set_diagnostics(DIAGNOSTICS_OWNER, &positioned);
    }
}
