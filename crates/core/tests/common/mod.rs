//! Shared test helpers for `exprkit_core` integration tests.

#![allow(unreachable_pub)]

use exprkit_catalog::IdentifierCatalog;
use exprkit_diagnostics::Diagnostic;
use std::sync::LazyLock;

/// Catalog fixture parsed once per test binary via LazyLock.
pub static CATALOG: LazyLock<IdentifierCatalog> = LazyLock::new(|| {
    IdentifierCatalog::from_json(FIXTURE_JSON).expect("test fixture catalog is valid")
});

/// A catalog exercising every entity kind: plain and system variables, a
/// sheet with two columns, a one-letter custom type overlapping a variable
/// prefix, and a nested custom type with an allowed sheet.
pub const FIXTURE_JSON: &str = r#"{
    "keywords": [
        {"label": "IF"},
        {"label": "AND"},
        {"label": "OR"},
        {"label": "NOT"}
    ],
    "functions": [
        {"name": "SUM", "minArgs": 1, "maxArgs": "unbounded",
         "defaultArgTypes": ["number", "expression"],
         "documentation": "Sum of the arguments."},
        {"name": "IF", "minArgs": 2, "maxArgs": 3,
         "argTypes": [["expression"], "default", "default"],
         "defaultArgTypes": ["number", "variable", "expression"]},
        {"name": "COUNT", "minArgs": 1, "maxArgs": 1,
         "defaultArgTypes": ["sheetColumn"]},
        {"name": "VAL", "minArgs": 1, "maxArgs": 1,
         "defaultArgTypes": ["systemVariable"]},
        {"name": "LINK", "minArgs": 1, "maxArgs": 1,
         "argTypes": [["BR_IN_PARENT"]],
         "defaultArgTypes": []}
    ],
    "variables": [
        {"storedForm": "${v.amount}", "displayForm": "Amount",
         "documentation": "Order amount."},
        {"storedForm": "${v.rate}", "displayForm": "Rate"},
        {"storedForm": "${v.ab}", "displayForm": "AB"}
    ],
    "systemVariables": [
        {"storedForm": "${sys.now}", "displayForm": "Now"}
    ],
    "sheets": [
        {"storedForm": "${s1}", "displayForm": "Sheet1",
         "columns": [
            {"storedForm": "${s1c1}", "displayForm": "Col1"},
            {"storedForm": "${s1c2}", "displayForm": "Col2"}
         ]}
    ],
    "customVariableTypes": [
        {"typeName": "A",
         "allowedVariables": [
            {"storedForm": "${a.x}", "displayForm": "X"}
         ],
         "allowedSheets": []},
        {"typeName": "BR_IN_PARENT",
         "allowedVariables": [
            {"storedForm": "${p.total}", "displayForm": "Total"}
         ],
         "allowedSheets": [
            {"storedForm": "${ps1}", "displayForm": "Input Sheet 1",
             "columns": [
                {"storedForm": "${ps1c1}", "displayForm": "Col1"}
             ]}
         ]}
    ]
}"#;

// ─── Diagnostic helpers ──────────────────────────────────────────────────────

/// Collect diagnostic codes in emission order.
#[allow(dead_code)]
pub fn extract_codes(issues: &[Diagnostic]) -> Vec<String> {
    issues.iter().map(|d| d.id.to_string()).collect()
}

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| &*d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code}"))
}
