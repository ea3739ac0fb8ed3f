//! Engine configuration surface.

/// Callback invoked with storage-encoded document text.
pub type ContentHook = Box<dyn FnMut(&str)>;

/// Recognized engine options.
///
/// `editor_options` and `custom_toolbar_buttons` are opaque passthroughs for
/// the host; the engine never inspects them.
pub struct EngineOptions {
    /// Name of the color/style theme to register. Unknown names fall back to
    /// the built-in default.
    pub theme: Option<String>,
    /// Opaque host widget options, forwarded verbatim.
    pub editor_options: serde_json::Value,
    /// Invoked with the storage-encoded text on [`save`](crate::ExpressionEngine::save).
    pub on_save: Option<ContentHook>,
    /// Invoked with the storage-encoded text after every edit.
    pub on_change: Option<ContentHook>,
    /// Opaque toolbar button descriptors, forwarded verbatim (UI-only).
    pub custom_toolbar_buttons: Vec<serde_json::Value>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            theme: None,
            editor_options: serde_json::Value::Null,
            on_save: None,
            on_change: None,
            custom_toolbar_buttons: Vec::new(),
        }
    }
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("theme", &self.theme)
            .field("editor_options", &self.editor_options)
            .field("on_save", &self.on_save.is_some())
            .field("on_change", &self.on_change.is_some())
            .field(
                "custom_toolbar_buttons",
                &self.custom_toolbar_buttons.len(),
            )
            .finish()
    }
}
