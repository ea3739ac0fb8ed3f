//! Static expression validation.
//!
//! Checks the full document text for parenthesis balance and for
//! function-call correctness: known names, arity bounds, and per-argument
//! type constraints. Argument text is split at top-level commas only — a
//! depth counter keeps commas inside nested calls from splitting the outer
//! argument list. Findings are non-fatal and always returned as a diagnostic
//! list, never thrown.

use exprkit_catalog::{ArgType, IdentifierCatalog};
use exprkit_diagnostics::{Diagnostic, Severity, Span, codes};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("function" => name, "expected" => range, "actual" => count)
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Nested call shape: an identifier, optional whitespace, and a non-empty
/// parenthesized group.
static CALL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+\s*\(.+\)").expect("static pattern is valid"));

/// Result of validating expression text against a catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` if no errors were found (warnings and info are allowed).
    pub ok: bool,
    /// All diagnostics produced during validation.
    pub issues: Vec<Diagnostic>,
}

/// A function-call occurrence found in the text.
struct Call<'a> {
    name: &'a str,
    name_span: Span,
    args_text: &'a str,
}

/// Validate the full document text.
///
/// The parenthesis-balance and function-call checks run independently; an
/// unbalanced document still gets call diagnostics for every balanced call.
pub fn validate(text: &str, catalog: &IdentifierCatalog) -> ValidationResult {
    let mut issues = Vec::new();

    check_parentheses(text, &mut issues);
    for call in scan_calls(text) {
        check_call(&call, catalog, &mut issues);
    }

    let ok = !issues.iter().any(|d| d.severity == Severity::Error);
    ValidationResult { ok, issues }
}

/// Opening and closing parenthesis counts must be equal. A mismatch produces
/// one diagnostic pointing at the first `(` (or the start of the text when
/// none exists).
fn check_parentheses(text: &str, issues: &mut Vec<Diagnostic>) {
    let opens = text.matches('(').count();
    let closes = text.matches(')').count();
    if opens == closes {
        return;
    }
    let span = match text.find('(') {
        Some(pos) => Span::new(pos, pos + 1),
        None => Span::empty(0),
    };
    issues.push(
        Diagnostic::error(
            codes::PARENS_MISMATCH,
            "Mismatched parentheses detected.",
            Some(span),
        )
        .with_context(ctx!(
            "open" => opens.to_string(),
            "close" => closes.to_string(),
        )),
    );
}

/// Find every call: an uppercase-led identifier immediately followed
/// (optionally across whitespace) by a balanced parenthesized group.
///
/// Scanning resumes inside each group, so nested calls are found as calls in
/// their own right. Groups left unclosed are skipped — the parenthesis
/// balance check already covers them.
///
/// The scan is byte-wise: UTF-8 continuation bytes are in 0x80..=0xBF and
/// never match the ASCII tests below, so multi-byte characters are skipped
/// without full decoding.
fn scan_calls(text: &str) -> Vec<Call<'_>> {
    let bytes = text.as_bytes();
    let mut calls = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        if !bytes[i].is_ascii_uppercase() || (i > 0 && is_word_byte(bytes[i - 1])) {
            i += 1;
            continue;
        }
        let name_start = i;
        let mut name_end = i + 1;
        while name_end < bytes.len() && is_name_byte(bytes[name_end]) {
            name_end += 1;
        }
        let mut paren = name_end;
        while paren < bytes.len() && bytes[paren].is_ascii_whitespace() {
            paren += 1;
        }
        if paren >= bytes.len() || bytes[paren] != b'(' {
            i = name_end;
            continue;
        }
        let mut depth = 1i32;
        let mut close = paren + 1;
        while close < bytes.len() && depth > 0 {
            match bytes[close] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
            close += 1;
        }
        if depth == 0 {
            calls.push(Call {
                name: &text[name_start..name_end],
                name_span: Span::new(name_start, name_end),
                args_text: &text[paren + 1..close - 1],
            });
        }
        // Resume inside the group so nested calls are validated too.
        i = paren + 1;
    }
    calls
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Split argument text at top-level commas only.
fn split_arguments(args_text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for ch in args_text.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

/// Check one call: known name, arity, then per-argument types.
fn check_call(call: &Call<'_>, catalog: &IdentifierCatalog, issues: &mut Vec<Diagnostic>) {
    let Some(signature) = catalog.function_by_name(call.name) else {
        issues.push(
            Diagnostic::error(
                codes::UNKNOWN_FUNCTION,
                format!("Unknown function: {}.", call.name),
                Some(call.name_span),
            )
            .with_context(ctx!("function" => call.name)),
        );
        return;
    };

    let args = split_arguments(call.args_text);
    if !signature.accepts_arity(args.len()) {
        issues.push(
            Diagnostic::error(
                codes::ARITY,
                format!(
                    "Function {} expects {} arguments but got {}.",
                    call.name,
                    signature.arity_range(),
                    args.len()
                ),
                Some(call.name_span),
            )
            .with_context(ctx!(
                "function" => call.name,
                "expected" => signature.arity_range(),
                "actual" => args.len().to_string(),
            )),
        );
        // Positional type constraints are meaningless at the wrong arity.
        return;
    }

    for (index, arg) in args.iter().enumerate() {
        let allowed = signature.allowed_types_at(index);
        if argument_matches(arg, &allowed, catalog) {
            continue;
        }
        let expected = allowed
            .iter()
            .map(ArgType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        issues.push(
            Diagnostic::error(
                codes::ARG_TYPE,
                format!(
                    "Invalid argument type for function {}. Expected {} but got {}.",
                    call.name, expected, arg
                ),
                Some(call.name_span),
            )
            .with_context(ctx!(
                "function" => call.name,
                "argument" => arg.clone(),
                "position" => index.to_string(),
                "expected" => expected,
            )),
        );
    }
}

/// Whether `arg` satisfies any tag in the allowed set. The tags form a
/// union — any single match suffices.
fn argument_matches(arg: &str, allowed: &[ArgType], catalog: &IdentifierCatalog) -> bool {
    for tag in allowed {
        let matched = match tag {
            ArgType::Variable => catalog.variables.iter().any(|v| v.display_form == arg),
            ArgType::SystemVariable => catalog
                .system_variables
                .iter()
                .any(|v| v.display_form == arg),
            ArgType::SheetColumn => catalog.sheets.iter().any(|sheet| {
                sheet
                    .columns
                    .iter()
                    .any(|column| sheet.qualified_display(column) == arg)
            }),
            ArgType::Number => arg.parse::<f64>().is_ok(),
            ArgType::Expression => {
                arg.contains(['+', '-', '*', '/']) || CALL_SHAPE.is_match(arg)
            }
            ArgType::Custom(type_name) => resolves_as_custom_reference(arg, type_name, catalog),
        };
        if matched {
            return true;
        }
    }
    false
}

/// Whether `arg` is `type.remainder` for the named custom type, with the
/// remainder resolving to one of the type's allowed variables or allowed
/// sheet-qualified columns.
fn resolves_as_custom_reference(
    arg: &str,
    type_name: &str,
    catalog: &IdentifierCatalog,
) -> bool {
    let Some((leading, remainder)) = arg.split_once('.') else {
        return false;
    };
    if leading != type_name {
        return false;
    }
    let Some(custom) = catalog.custom_type_by_name(type_name) else {
        return false;
    };
    custom
        .allowed_variables
        .iter()
        .any(|v| v.display_form == remainder)
        || custom.allowed_sheets.iter().any(|sheet| {
            sheet
                .columns
                .iter()
                .any(|column| sheet.qualified_display(column) == remainder)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_arguments_top_level_only() {
        assert_eq!(
            split_arguments("1, SUM(2, 3), 4"),
            vec!["1", "SUM(2, 3)", "4"]
        );
    }

    #[test]
    fn split_arguments_empty_text_is_no_args() {
        assert!(split_arguments("").is_empty());
    }

    #[test]
    fn split_arguments_nested_depth_two() {
        assert_eq!(
            split_arguments("MAX(MIN(1, 2), 3), 4"),
            vec!["MAX(MIN(1, 2), 3)", "4"]
        );
    }

    #[test]
    fn scan_finds_nested_calls() {
        let calls = scan_calls("IF(SUM(1,2), 3)");
        let names: Vec<&str> = calls.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["IF", "SUM"]);
    }

    #[test]
    fn scan_sibling_calls_do_not_merge() {
        let calls = scan_calls("SUM(1) + MAX(2)");
        let names: Vec<&str> = calls.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["SUM", "MAX"]);
        assert_eq!(calls[0].args_text, "1");
        assert_eq!(calls[1].args_text, "2");
    }

    #[test]
    fn scan_skips_lowercase_and_mid_word_names() {
        assert!(scan_calls("sum(1)").is_empty());
        // "SUM" here is the tail of a longer word, not a call of its own.
        assert!(scan_calls("mySUM(1)").is_empty());
    }

    #[test]
    fn scan_allows_whitespace_before_parens() {
        let calls = scan_calls("SUM (1, 2)");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args_text, "1, 2");
    }

    #[test]
    fn scan_skips_unclosed_group() {
        assert!(scan_calls("IF(A>1").is_empty());
    }
}
