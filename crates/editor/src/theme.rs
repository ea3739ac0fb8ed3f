//! Color/style mappings for the lexical categories.

use exprkit_core::LexCategory;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the built-in default theme.
pub const CLASSIC_THEME: &str = "expression-classic";

/// Style applied to one lexical category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStyle {
    /// Foreground color as an RGB hex string (no leading `#`).
    pub foreground: String,
    /// Optional font style (`"bold"`, `"italic"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
}

impl CategoryStyle {
    fn new(foreground: &str, font_style: Option<&str>) -> Self {
        Self {
            foreground: foreground.to_string(),
            font_style: font_style.map(str::to_string),
        }
    }
}

/// A named style mapping for the lexical categories plus editor colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// The theme's registration name.
    pub name: String,
    /// Per-category styles, keyed by [`LexCategory::token`] order.
    pub rules: Vec<(LexCategory, CategoryStyle)>,
    /// Editor chrome colors (background, selection, line numbers).
    pub colors: BTreeMap<String, String>,
}

impl Theme {
    /// The built-in default theme.
    pub fn classic() -> Self {
        Self {
            name: CLASSIC_THEME.to_string(),
            rules: vec![
                (
                    LexCategory::Keyword,
                    CategoryStyle::new("FF0000", Some("bold")),
                ),
                (LexCategory::Function, CategoryStyle::new("008800", None)),
                (LexCategory::Variable, CategoryStyle::new("0000FF", None)),
                (
                    LexCategory::SystemVariable,
                    CategoryStyle::new("800000", None),
                ),
                (
                    LexCategory::SheetColumn,
                    CategoryStyle::new("FF00FF", None),
                ),
                (
                    LexCategory::CustomVariableType,
                    CategoryStyle::new("800080", None),
                ),
            ],
            colors: BTreeMap::from([
                ("editor.foreground".to_string(), "#000000".to_string()),
                ("editor.background".to_string(), "#FFFFFF".to_string()),
                ("editorCursor.foreground".to_string(), "#000000".to_string()),
                (
                    "editor.lineHighlightBackground".to_string(),
                    "#F0F0F0".to_string(),
                ),
                (
                    "editorLineNumber.foreground".to_string(),
                    "#AAAAAA".to_string(),
                ),
                (
                    "editor.selectionBackground".to_string(),
                    "#D0D0D0".to_string(),
                ),
                (
                    "editor.inactiveSelectionBackground".to_string(),
                    "#E0E0E0".to_string(),
                ),
            ]),
        }
    }

    /// Look up a built-in theme by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            CLASSIC_THEME => Some(Self::classic()),
            _ => None,
        }
    }

    /// The style for a category, if the theme defines one.
    pub fn style_for(&self, category: LexCategory) -> Option<&CategoryStyle> {
        self.rules
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, style)| style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_covers_every_category() {
        let theme = Theme::classic();
        for &category in LexCategory::ALL {
            assert!(
                theme.style_for(category).is_some(),
                "missing style for {category}"
            );
        }
    }

    #[test]
    fn named_lookup() {
        assert!(Theme::named(CLASSIC_THEME).is_some());
        assert!(Theme::named("no-such-theme").is_none());
    }

    #[test]
    fn keyword_style_is_bold_red() {
        let theme = Theme::classic();
        let style = theme.style_for(LexCategory::Keyword).unwrap();
        assert_eq!(style.foreground, "FF0000");
        assert_eq!(style.font_style.as_deref(), Some("bold"));
    }
}
