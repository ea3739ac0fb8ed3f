//! Context-sensitive completion resolution.
//!
//! Given the full document text and a cursor offset, determines the lexical
//! context (plain word vs dotted reference path) and returns an ordered list
//! of candidate identifiers with metadata. Dotted paths may nest two levels:
//! custom type → sheet → column.

use exprkit_catalog::{CustomVariableType, IdentifierCatalog, Sheet};
use serde::Serialize;

/// Kind of a completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateKind {
    /// A language keyword.
    Keyword,
    /// A callable function. Insert text appends `()`.
    Function,
    /// A plain or custom-type-scoped variable.
    Variable,
    /// A system variable.
    SystemVariable,
    /// A sheet name, completable further with `.column`.
    Sheet,
    /// A column of a resolved sheet.
    Column,
    /// A custom variable type name, completable further with `.`.
    CustomType,
}

/// A completion candidate offered at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The label shown in the completion list.
    pub label: String,
    /// The candidate's kind.
    pub kind: CandidateKind,
    /// The text inserted when the candidate is accepted.
    pub insert_text: String,
    /// Optional documentation shown alongside the candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Candidate {
    fn new(
        label: &str,
        kind: CandidateKind,
        insert_text: impl Into<String>,
        documentation: Option<&String>,
    ) -> Self {
        Self {
            label: label.to_string(),
            kind,
            insert_text: insert_text.into(),
            documentation: documentation.cloned(),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Resolve completion candidates for the cursor position.
///
/// Context detection inspects the character immediately preceding the cursor
/// on the cursor's line. No matching context yields an empty list, never an
/// error.
pub fn resolve(text: &str, offset: usize, catalog: &IdentifierCatalog) -> Vec<Candidate> {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }

    // The current line, including text after the cursor — a column fragment
    // typed before the cursor was moved still filters candidates.
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[offset..]
        .find('\n')
        .map_or(text.len(), |i| offset + i);
    let line = &text[line_start..line_end];
    let cursor = offset - line_start;

    match line[..cursor].chars().next_back() {
        Some('.') => {
            let dot_index = cursor - 1;
            dotted_candidates(line, dot_index, catalog)
        }
        _ => {
            let fragment = word_fragment_before(line, cursor).to_lowercase();
            plain_candidates(&fragment, catalog)
        }
    }
}

/// Contiguous word characters immediately before `cursor`.
fn word_fragment_before(line: &str, cursor: usize) -> &str {
    let before = &line[..cursor];
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map_or(cursor, |(i, _)| i);
    &before[start..]
}

/// Longest leading run of word characters after the dot, leading whitespace
/// skipped.
fn column_fragment_after(line: &str, dot_index: usize) -> &str {
    let after = line[dot_index + 1..].trim_start();
    let end = after
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(after.len(), |(i, _)| i);
    &after[..end]
}

/// Longest trailing run of word/space characters before the dot, trimmed.
fn base_before(line: &str, dot_index: usize) -> &str {
    let before = line[..dot_index].trim_end();
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c) || c.is_whitespace())
        .last()
        .map_or(before.len(), |(i, _)| i);
    before[start..].trim()
}

/// The reference segment ending at the dot: scan backward through word,
/// space, and dot characters, stopping at an arithmetic or grouping
/// operator.
fn segment_before(line: &str, dot_index: usize) -> &str {
    let before = &line[..dot_index];
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| !matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '=' | ','))
        .last()
        .map_or(before.len(), |(i, _)| i);
    before[start..].trim()
}

fn plain_candidates(fragment: &str, catalog: &IdentifierCatalog) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let matches = |label: &str| label.to_lowercase().starts_with(fragment);

    for keyword in &catalog.keywords {
        if matches(&keyword.label) {
            candidates.push(Candidate::new(
                &keyword.label,
                CandidateKind::Keyword,
                keyword.label.clone(),
                keyword.documentation.as_ref(),
            ));
        }
    }
    for function in &catalog.functions {
        if matches(&function.name) {
            candidates.push(Candidate::new(
                &function.name,
                CandidateKind::Function,
                format!("{}()", function.name),
                function.documentation.as_ref(),
            ));
        }
    }
    for variable in &catalog.variables {
        if matches(&variable.display_form) {
            candidates.push(Candidate::new(
                &variable.display_form,
                CandidateKind::Variable,
                variable.display_form.clone(),
                variable.documentation.as_ref(),
            ));
        }
    }
    for variable in &catalog.system_variables {
        if matches(&variable.display_form) {
            candidates.push(Candidate::new(
                &variable.display_form,
                CandidateKind::SystemVariable,
                variable.display_form.clone(),
                variable.documentation.as_ref(),
            ));
        }
    }
    for sheet in &catalog.sheets {
        if matches(&sheet.display_form) {
            candidates.push(Candidate::new(
                &sheet.display_form,
                CandidateKind::Sheet,
                sheet.display_form.clone(),
                sheet.documentation.as_ref(),
            ));
        }
    }
    for custom in &catalog.custom_variable_types {
        if matches(custom.base_name()) {
            candidates.push(Candidate::new(
                custom.base_name(),
                CandidateKind::CustomType,
                custom.base_name().to_string(),
                custom.documentation.as_ref(),
            ));
        }
    }
    candidates
}

fn dotted_candidates(
    line: &str,
    dot_index: usize,
    catalog: &IdentifierCatalog,
) -> Vec<Candidate> {
    let base = base_before(line, dot_index);
    let column_fragment = column_fragment_after(line, dot_index).to_lowercase();

    // Sheet columns: `Sheet1.` offers Sheet1's columns.
    if let Some(sheet) = catalog
        .sheets
        .iter()
        .find(|s| s.display_form.to_lowercase() == base.to_lowercase())
    {
        return column_candidates(sheet, &column_fragment);
    }

    // Custom-typed paths: `TYPE.` offers the type's allowed variables and
    // sheets; `TYPE.Sheet.` offers that sheet's columns.
    let segment = segment_before(line, dot_index);
    let mut candidates = Vec::new();
    for custom in &catalog.custom_variable_types {
        let type_name = custom.base_name();
        let Some(remainder) = segment.strip_prefix(type_name) else {
            continue;
        };
        let remainder = remainder
            .trim()
            .trim_start_matches('.')
            .trim()
            .trim_end_matches('.')
            .trim();

        if remainder.is_empty() {
            candidates.extend(custom_member_candidates(custom));
            continue;
        }
        if let Some(sheet) = custom
            .allowed_sheets
            .iter()
            .find(|s| s.display_form.to_lowercase() == remainder.to_lowercase())
        {
            candidates.extend(column_candidates(sheet, &column_fragment));
        }
    }
    candidates
}

fn column_candidates(sheet: &Sheet, column_fragment: &str) -> Vec<Candidate> {
    sheet
        .columns
        .iter()
        .filter(|c| {
            column_fragment.is_empty()
                || c.display_form.to_lowercase().starts_with(column_fragment)
        })
        .map(|c| {
            Candidate::new(
                &c.display_form,
                CandidateKind::Column,
                c.display_form.clone(),
                c.documentation.as_ref(),
            )
        })
        .collect()
}

fn custom_member_candidates(custom: &CustomVariableType) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = custom
        .allowed_variables
        .iter()
        .map(|v| {
            Candidate::new(
                &v.display_form,
                CandidateKind::Variable,
                v.display_form.clone(),
                v.documentation.as_ref(),
            )
        })
        .collect();
    for sheet in &custom.allowed_sheets {
        candidates.push(Candidate::new(
            &sheet.display_form,
            CandidateKind::Sheet,
            sheet.display_form.clone(),
            sheet.documentation.as_ref(),
        ));
    }
    candidates
}
