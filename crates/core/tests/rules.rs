//! Rule compiler tests: matcher ordering, escaping, boundary anchoring, and
//! classification priority.

mod common;

use exprkit_catalog::IdentifierCatalog;
use exprkit_core::rules::{LexCategory, classify, compile_rules};

// ─── Ordering ────────────────────────────────────────────────────────────────

#[test]
fn rules_are_emitted_in_priority_order() {
    let rules = compile_rules(&common::CATALOG);
    let categories: Vec<LexCategory> = rules.rules().iter().map(|r| r.category).collect();
    assert_eq!(categories, LexCategory::ALL);
}

// ─── Classification ─────────────────────────────────────────────────────────

#[test]
fn lexical_priority_variable_beats_shorter_type_name() {
    // Custom type "A" must not swallow the "A" of variable "AB".
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "AB");
    assert_eq!(spans.len(), 1, "{spans:?}");
    assert_eq!(spans[0].category, LexCategory::Variable);
    assert_eq!((spans[0].start, spans[0].end), (0, 2));
}

#[test]
fn custom_type_wins_over_later_categories() {
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "A.X");
    assert_eq!(spans.len(), 1, "{spans:?}");
    assert_eq!(spans[0].category, LexCategory::CustomVariableType);
    assert_eq!((spans[0].start, spans[0].end), (0, 3));
}

#[test]
fn bare_custom_type_name_classifies_as_custom_type() {
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "A + 1");
    assert_eq!(spans[0].category, LexCategory::CustomVariableType);
    assert_eq!((spans[0].start, spans[0].end), (0, 1));
}

#[test]
fn sheet_column_classifies_as_one_span() {
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "Sheet1.Col2");
    assert_eq!(spans.len(), 1, "{spans:?}");
    assert_eq!(spans[0].category, LexCategory::SheetColumn);
    assert_eq!((spans[0].start, spans[0].end), (0, 11));
}

#[test]
fn keywords_functions_and_system_variables_classify() {
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "AND SUM Now");
    let categories: Vec<LexCategory> = spans.iter().map(|s| s.category).collect();
    assert_eq!(
        categories,
        vec![
            LexCategory::Keyword,
            LexCategory::Function,
            LexCategory::SystemVariable,
        ]
    );
}

#[test]
fn keyword_if_beats_function_if() {
    // "IF" is both a keyword and a function; keyword comes first in the
    // priority order.
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "IF(1, 2)");
    assert_eq!(spans[0].category, LexCategory::Keyword);
}

#[test]
fn operators_and_literals_stay_unclassified() {
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "1 + 2 * 3");
    assert!(spans.is_empty(), "{spans:?}");
}

#[test]
fn nested_custom_sheet_column_classifies_with_suffix() {
    let rules = compile_rules(&common::CATALOG);
    let spans = classify(&rules, "BR_IN_PARENT.Input Sheet 1.Col1");
    assert_eq!(spans.len(), 1, "{spans:?}");
    assert_eq!(spans[0].category, LexCategory::CustomVariableType);
    assert_eq!((spans[0].start, spans[0].end), (0, 31));
}

// ─── Escaping ───────────────────────────────────────────────────────────────

#[test]
fn metacharacters_in_forms_are_neutralized() {
    let catalog = IdentifierCatalog::from_json(
        r#"{
            "functions": [],
            "variables": [{"storedForm": "${v}", "displayForm": "Total (net)"}],
            "systemVariables": [],
            "sheets": [],
            "customVariableTypes": []
        }"#,
    )
    .expect("valid catalog");
    let rules = compile_rules(&catalog);
    let spans = classify(&rules, "Total (net)");
    assert_eq!(spans.len(), 1, "{spans:?}");
    assert_eq!(spans[0].category, LexCategory::Variable);
    // A parenthesis in the form must match literally, not as a group.
    assert_eq!((spans[0].start, spans[0].end), (0, 11));
}

// ─── Empty collections ──────────────────────────────────────────────────────

#[test]
fn empty_collections_yield_non_matching_rules() {
    let catalog = IdentifierCatalog::new(vec![], vec![], vec![], vec![], vec![], vec![]);
    let rules = compile_rules(&catalog);
    assert_eq!(rules.rules().len(), LexCategory::ALL.len());
    let spans = classify(&rules, "IF(Amount + Sheet1.Col1)");
    assert!(spans.is_empty(), "{spans:?}");
}
