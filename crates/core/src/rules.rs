//! Lexical rule compilation.
//!
//! Derives, from an [`IdentifierCatalog`], the ordered set of category
//! matchers used for syntax highlighting and the per-direction substitution
//! tables consumed by the transcoder. Compilation runs once per catalog
//! (re)assignment; every matcher is rebuilt from the new snapshot before any
//! component reads it.

use exprkit_catalog::IdentifierCatalog;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A pattern that can never match any input, used for empty catalog
/// collections so classification degrades to "no tokens" instead of erroring.
const NEVER_MATCH: &str = r"[^\s\S]";

/// Lexical category of a classified token.
///
/// The variant order here is the classification priority order: textual
/// forms can overlap (a variable display form may be a prefix of a custom
/// type name), so matchers are applied in this order and the first match
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LexCategory {
    /// A custom-typed reference (`TYPE` or `TYPE.remainder`).
    CustomVariableType,
    /// A `sheet.column` qualified reference.
    SheetColumn,
    /// A plain variable display form.
    Variable,
    /// A language keyword.
    Keyword,
    /// A callable function name.
    Function,
    /// A system-variable display form.
    SystemVariable,
}

impl LexCategory {
    /// All categories, in classification priority order.
    pub const ALL: &[Self] = &[
        Self::CustomVariableType,
        Self::SheetColumn,
        Self::Variable,
        Self::Keyword,
        Self::Function,
        Self::SystemVariable,
    ];

    /// The style token name used by themes and host tokenizers.
    pub fn token(&self) -> &'static str {
        match self {
            LexCategory::CustomVariableType => "custom-variable",
            LexCategory::SheetColumn => "sheet-reference",
            LexCategory::Variable => "variable",
            LexCategory::Keyword => "keyword",
            LexCategory::Function => "function",
            LexCategory::SystemVariable => "system-variable",
        }
    }
}

impl std::fmt::Display for LexCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// One compiled `(category, matcher)` pair.
#[derive(Debug, Clone)]
pub struct LexicalRule {
    /// The category this matcher classifies.
    pub category: LexCategory,
    /// The compiled matcher. All literal forms are escaped before pattern
    /// composition and boundary-anchored at their word-character edges.
    pub pattern: Regex,
}

/// The ordered matcher set compiled from one catalog snapshot.
#[derive(Debug, Clone)]
pub struct LexicalRules {
    rules: Vec<LexicalRule>,
}

impl LexicalRules {
    /// The rules, in classification priority order.
    pub fn rules(&self) -> &[LexicalRule] {
        &self.rules
    }

    /// The rule for a specific category.
    pub fn rule_for(&self, category: LexCategory) -> Option<&LexicalRule> {
        self.rules.iter().find(|r| r.category == category)
    }
}

/// A classified region of input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassifiedSpan {
    /// The winning category.
    pub category: LexCategory,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Compile the ordered lexical matcher set for a catalog.
///
/// An empty collection yields an always-non-matching rule for its category,
/// not an error; callers wanting stricter behavior should pre-validate the
/// catalog.
pub fn compile_rules(catalog: &IdentifierCatalog) -> LexicalRules {
    let rules = LexCategory::ALL
        .iter()
        .map(|&category| LexicalRule {
            category,
            pattern: compile_category(catalog, category),
        })
        .collect();
    LexicalRules { rules }
}

fn compile_category(catalog: &IdentifierCatalog, category: LexCategory) -> Regex {
    let body = match category {
        LexCategory::Keyword => alternation(catalog.keywords.iter().map(|k| k.label.as_str())),
        LexCategory::Function => alternation(catalog.functions.iter().map(|f| f.name.as_str())),
        LexCategory::Variable => {
            alternation(catalog.variables.iter().map(|v| v.display_form.as_str()))
        }
        LexCategory::SystemVariable => alternation(
            catalog
                .system_variables
                .iter()
                .map(|v| v.display_form.as_str()),
        ),
        LexCategory::SheetColumn => sheet_alternation(&catalog.sheets),
        LexCategory::CustomVariableType => {
            let parts: Vec<String> = catalog
                .custom_variable_types
                .iter()
                .map(custom_type_pattern)
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("|"))
            }
        }
    };
    let pattern = match body {
        Some(body) => format!("(?:{body})"),
        None => NEVER_MATCH.to_string(),
    };
    // Escaped literal alternations always compile; NEVER_MATCH is static.
    Regex::new(&pattern).expect("compiled lexical pattern is valid")
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `\b` when the form starts with a word character, empty otherwise.
///
/// Boundary assertions only exist between word and non-word characters, so
/// blanket anchoring would make forms with punctuation edges unmatchable.
fn start_bound(form: &str) -> &'static str {
    if form.chars().next().is_some_and(is_word) {
        r"\b"
    } else {
        ""
    }
}

/// `\b` when the form ends with a word character, empty otherwise.
fn end_bound(form: &str) -> &'static str {
    if form.chars().next_back().is_some_and(is_word) {
        r"\b"
    } else {
        ""
    }
}

/// One escaped, boundary-anchored literal alternative.
fn bounded_literal(form: &str) -> String {
    format!("{}{}{}", start_bound(form), regex::escape(form), end_bound(form))
}

/// `a|b|c` alternation over boundary-anchored literal forms, or `None` when
/// empty.
fn alternation<'a>(forms: impl Iterator<Item = &'a str>) -> Option<String> {
    let escaped: Vec<String> = forms.map(bounded_literal).collect();
    if escaped.is_empty() {
        None
    } else {
        Some(escaped.join("|"))
    }
}

/// `(sheet)\.(col1|col2)` alternation across all sheets. The trailing
/// boundary rides on each column alternative.
fn sheet_alternation(sheets: &[exprkit_catalog::Sheet]) -> Option<String> {
    let parts: Vec<String> = sheets
        .iter()
        .filter_map(|sheet| {
            let columns: Vec<String> = sheet
                .columns
                .iter()
                .map(|c| format!("{}{}", regex::escape(&c.display_form), end_bound(&c.display_form)))
                .collect();
            if columns.is_empty() {
                return None;
            }
            Some(format!(
                r"{}({})\.({})",
                start_bound(&sheet.display_form),
                regex::escape(&sheet.display_form),
                columns.join("|")
            ))
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}

/// The type name with an optional dotted suffix drawn from the union of the
/// type's allowed variables and allowed-sheet qualified columns.
///
/// The bare-name arm carries its own trailing boundary so a type name never
/// swallows the prefix of a longer identifier (`A` must not match inside
/// `AB`); the dotted-suffix arm is listed first so the longer form wins.
fn custom_type_pattern(custom: &exprkit_catalog::CustomVariableType) -> String {
    let base = custom.base_name();
    let mut suffixes: Vec<String> = custom
        .allowed_variables
        .iter()
        .map(|v| format!("{}{}", regex::escape(&v.display_form), end_bound(&v.display_form)))
        .collect();
    for sheet in &custom.allowed_sheets {
        for column in &sheet.columns {
            let qualified = sheet.qualified_display(column);
            suffixes.push(format!("{}{}", regex::escape(&qualified), end_bound(&qualified)));
        }
    }
    if suffixes.is_empty() {
        return bounded_literal(base);
    }
    let bare_end = end_bound(base);
    if bare_end.is_empty() {
        format!(
            r"{}({})(?:\.(?:{}))?",
            start_bound(base),
            regex::escape(base),
            suffixes.join("|")
        )
    } else {
        format!(
            r"{}({})(?:\.(?:{})|{bare_end})",
            start_bound(base),
            regex::escape(base),
            suffixes.join("|")
        )
    }
}

/// Classify input text with the compiled rules.
///
/// At each position the matchers are tried in priority order; the first one
/// that matches exactly at the position wins and the scan resumes after the
/// matched region. Unmatched characters are skipped.
pub fn classify(rules: &LexicalRules, text: &str) -> Vec<ClassifiedSpan> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    'scan: while pos < text.len() {
        for rule in rules.rules() {
            if let Some(m) = rule.pattern.find_at(text, pos)
                && m.start() == pos
            {
                spans.push(ClassifiedSpan {
                    category: rule.category,
                    start: m.start(),
                    end: m.end(),
                });
                pos = m.end();
                continue 'scan;
            }
        }
        // No rule matched here — advance one character.
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }
    spans
}

// ─── Substitution tables ────────────────────────────────────────────────────

/// Transcoding direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeDirection {
    /// Storage encoding → display encoding.
    ToDisplay,
    /// Display encoding → storage encoding.
    ToStorage,
}

/// The ordered `(from, to)` substitution pairs for one direction.
///
/// Category order is fixed: plain variables, system variables,
/// sheet-qualified columns, then for every custom variable type its
/// dot-prefixed variables and dot-prefixed sheet-qualified columns.
pub fn substitution_pairs(
    catalog: &IdentifierCatalog,
    direction: TranscodeDirection,
) -> Vec<(String, String)> {
    let pick = |stored: &str, display: &str| -> (String, String) {
        match direction {
            TranscodeDirection::ToDisplay => (stored.to_string(), display.to_string()),
            TranscodeDirection::ToStorage => (display.to_string(), stored.to_string()),
        }
    };

    let mut pairs = Vec::new();
    for variable in &catalog.variables {
        pairs.push(pick(&variable.stored_form, &variable.display_form));
    }
    for variable in &catalog.system_variables {
        pairs.push(pick(&variable.stored_form, &variable.display_form));
    }
    for sheet in &catalog.sheets {
        for column in &sheet.columns {
            pairs.push(pick(
                &sheet.qualified_stored(column),
                &sheet.qualified_display(column),
            ));
        }
    }
    for custom in &catalog.custom_variable_types {
        let prefix = custom.base_name();
        for variable in &custom.allowed_variables {
            pairs.push(pick(
                &format!("{prefix}.{}", variable.stored_form),
                &format!("{prefix}.{}", variable.display_form),
            ));
        }
        for sheet in &custom.allowed_sheets {
            for column in &sheet.columns {
                pairs.push(pick(
                    &format!("{prefix}.{}", sheet.qualified_stored(column)),
                    &format!("{prefix}.{}", sheet.qualified_display(column)),
                ));
            }
        }
    }
    pairs
}
