//! Identifier catalog for the exprkit expression engine.
//!
//! Defines the data structures describing every named entity an expression
//! may reference: keywords, functions, variables, system variables, sheets
//! with their columns, and custom variable types with their nested allowed
//! variables and sheets. The catalog is pure data — it is deserialized from
//! host-supplied JSON and consumed by the rule compiler, transcoder,
//! completion resolver, and validator.
//!
//! Catalogs are immutable snapshots: they are constructed once via
//! [`IdentifierCatalog::from_json`] (or [`IdentifierCatalog::new`]) and
//! replaced wholesale on refresh, never mutated in place.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

/// Keywords installed when the host supplies none.
pub const DEFAULT_KEYWORDS: &[&str] = &["IF", "AND", "OR", "NOT"];

/// Errors that can occur when constructing or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// JSON deserialization failed — a required collection is missing or has
    /// the wrong shape.
    #[error("invalid catalog field: {0}")]
    InvalidField(#[from] serde_json::Error),

    /// A stored form appears more than once within a collection.
    #[error("duplicate stored form `{form}` in {collection}")]
    DuplicateStoredForm {
        /// The collection containing the duplicate.
        collection: String,
        /// The offending stored form.
        form: String,
    },

    /// A display form appears more than once within a collection.
    #[error("duplicate display form `{form}` in {collection}")]
    DuplicateDisplayForm {
        /// The collection containing the duplicate.
        collection: String,
        /// The offending display form.
        form: String,
    },

    /// A `sheet.column` qualified display reference is not unique across all
    /// sheets in the catalog.
    #[error("duplicate qualified column reference `{0}`")]
    DuplicateQualifiedColumn(String),

    /// A function name appears more than once.
    #[error("duplicate function `{0}`")]
    DuplicateFunction(String),

    /// A custom variable type name appears more than once.
    #[error("duplicate custom variable type `{0}`")]
    DuplicateCustomType(String),

    /// A function's minimum argument count exceeds its bounded maximum.
    #[error("function `{name}` has minArgs {min} greater than maxArgs {max}")]
    ArityRange {
        /// The function name.
        name: String,
        /// The declared minimum argument count.
        min: u32,
        /// The declared (bounded) maximum argument count.
        max: u32,
    },
}

/// A named entity with distinct machine-persisted and human-readable forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    /// The machine-persisted textual representation.
    pub stored_form: String,
    /// The human-readable representation shown in the editor.
    pub display_form: String,
    /// Optional documentation shown alongside completion candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// A language keyword. Keywords have no storage/display distinction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    /// The keyword text.
    pub label: String,
    /// Optional documentation shown alongside completion candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// A column owned by exactly one [`Sheet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// The machine-persisted column name.
    pub stored_form: String,
    /// The human-readable column name.
    pub display_form: String,
    /// Optional documentation shown alongside completion candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// A named table whose columns are referenced as `sheet.column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    /// The machine-persisted sheet name.
    pub stored_form: String,
    /// The human-readable sheet name.
    pub display_form: String,
    /// Optional documentation shown alongside completion candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// The sheet's columns, in catalog order.
    pub columns: Vec<Column>,
}

impl Sheet {
    /// The qualified display reference for one of this sheet's columns.
    pub fn qualified_display(&self, column: &Column) -> String {
        format!("{}.{}", self.display_form, column.display_form)
    }

    /// The qualified stored reference for one of this sheet's columns.
    pub fn qualified_stored(&self, column: &Column) -> String {
        format!("{}.{}", self.stored_form, column.stored_form)
    }
}

/// A named namespace restricting which variables and sheets may be
/// referenced under its prefix.
///
/// A custom-typed reference has the shape `typeName.remainder`, where
/// `remainder` is an allowed variable's display form or an allowed-sheet
/// qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomVariableType {
    /// The namespace prefix.
    pub type_name: String,
    /// Optional documentation shown alongside completion candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Variables reachable under this type's prefix.
    #[serde(default)]
    pub allowed_variables: Vec<Identifier>,
    /// Sheets whose columns are reachable under this type's prefix.
    #[serde(default)]
    pub allowed_sheets: Vec<Sheet>,
}

impl CustomVariableType {
    /// The type name with any trailing dot stripped.
    ///
    /// Legacy catalog data sometimes encodes the namespace joiner inside the
    /// type name (`"PARENT."`); the engine always treats the dot as
    /// structural, so matching goes through this accessor.
    pub fn base_name(&self) -> &str {
        self.type_name.trim_end_matches('.')
    }
}

// ─── Function signatures ────────────────────────────────────────────────────

/// A type tag naming one way a function argument may be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// A plain variable display form.
    Variable,
    /// A system-variable display form.
    SystemVariable,
    /// A `sheet.column` qualified display reference.
    SheetColumn,
    /// Numeric-parseable text.
    Number,
    /// Text containing an arithmetic operator or a nested call shape.
    Expression,
    /// A custom-typed reference under the named custom variable type.
    Custom(String),
}

impl ArgType {
    /// The wire token for this tag.
    pub fn as_str(&self) -> &str {
        match self {
            ArgType::Variable => "variable",
            ArgType::SystemVariable => "systemVariable",
            ArgType::SheetColumn => "sheetColumn",
            ArgType::Number => "number",
            ArgType::Expression => "expression",
            ArgType::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for ArgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ArgType {
    fn from(token: &str) -> Self {
        match token {
            "variable" => ArgType::Variable,
            "systemVariable" => ArgType::SystemVariable,
            "sheetColumn" => ArgType::SheetColumn,
            "number" => ArgType::Number,
            "expression" => ArgType::Expression,
            other => ArgType::Custom(other.to_string()),
        }
    }
}

impl Serialize for ArgType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArgType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(ArgType::from(token.as_str()))
    }
}

/// Upper bound on a function's argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxArgs {
    /// At most this many arguments.
    Bounded(u32),
    /// No upper bound.
    Unbounded,
}

impl Serialize for MaxArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaxArgs::Bounded(n) => serializer.serialize_u32(*n),
            MaxArgs::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for MaxArgs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A JSON number means a bounded count; the strings "unbounded" and
        // "infinity" (legacy data) mean no upper bound.
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(MaxArgs::Bounded)
                .ok_or_else(|| serde::de::Error::custom("maxArgs out of range")),
            serde_json::Value::String(s) if s == "unbounded" || s == "infinity" => {
                Ok(MaxArgs::Unbounded)
            }
            other => Err(serde::de::Error::custom(format!(
                "maxArgs must be a number or \"unbounded\", got {other}"
            ))),
        }
    }
}

/// Declared type constraint for one argument position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgTypeSpec {
    /// Fall back to the signature's `defaultArgTypes`.
    UseDefault,
    /// Allow these tags in addition to `defaultArgTypes`.
    Types(Vec<ArgType>),
}

impl Serialize for ArgTypeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ArgTypeSpec::UseDefault => serializer.serialize_str("default"),
            ArgTypeSpec::Types(tags) => tags.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ArgTypeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A JSON array lists explicit tags; the strings "default" and
        // "...default" (legacy sentinel) defer to defaultArgTypes.
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) if s == "default" || s == "...default" => {
                Ok(ArgTypeSpec::UseDefault)
            }
            serde_json::Value::Array(_) => {
                let tags: Vec<ArgType> =
                    serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(ArgTypeSpec::Types(tags))
            }
            other => Err(serde::de::Error::custom(format!(
                "argTypes entry must be an array or \"default\", got {other}"
            ))),
        }
    }
}

/// Static signature of a callable function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    /// The function name, as written in expressions.
    pub name: String,
    /// Minimum number of arguments.
    pub min_args: u32,
    /// Maximum number of arguments, possibly unbounded.
    pub max_args: MaxArgs,
    /// Per-position type constraints. Positions past the end of this list
    /// use `defaultArgTypes`.
    #[serde(default)]
    pub arg_types: Vec<ArgTypeSpec>,
    /// Tags accepted at every argument position.
    #[serde(default)]
    pub default_arg_types: Vec<ArgType>,
    /// Optional documentation shown alongside completion candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl FunctionSignature {
    /// The allowed tag set for argument position `index`: `defaultArgTypes`
    /// when the position is unspecified or deferred, otherwise the union of
    /// `defaultArgTypes` and the position's tags.
    pub fn allowed_types_at(&self, index: usize) -> Vec<ArgType> {
        match self.arg_types.get(index) {
            None | Some(ArgTypeSpec::UseDefault) => self.default_arg_types.clone(),
            Some(ArgTypeSpec::Types(tags)) => {
                let mut allowed = self.default_arg_types.clone();
                for tag in tags {
                    if !allowed.contains(tag) {
                        allowed.push(tag.clone());
                    }
                }
                allowed
            }
        }
    }

    /// Whether `count` satisfies this signature's arity bounds.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if (count as u64) < u64::from(self.min_args) {
            return false;
        }
        match self.max_args {
            MaxArgs::Unbounded => true,
            MaxArgs::Bounded(max) => (count as u64) <= u64::from(max),
        }
    }

    /// Human-readable expected argument range, for diagnostics.
    pub fn arity_range(&self) -> String {
        match self.max_args {
            MaxArgs::Unbounded => format!("at least {}", self.min_args),
            MaxArgs::Bounded(max) if max == self.min_args => format!("exactly {max}"),
            MaxArgs::Bounded(max) => format!("{}-{}", self.min_args, max),
        }
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────────

fn default_keywords() -> Vec<Keyword> {
    DEFAULT_KEYWORDS
        .iter()
        .map(|label| Keyword {
            label: (*label).to_string(),
            documentation: None,
        })
        .collect()
}

/// An immutable snapshot of all named entities known to the engine.
///
/// Constructed from host-supplied JSON and replaced wholesale on refresh.
/// Every derived structure (lexical rules, substitution tables) is rebuilt
/// from the new snapshot before any component reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierCatalog {
    /// Language keywords. Defaults to [`DEFAULT_KEYWORDS`] when absent.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<Keyword>,
    /// Callable function signatures.
    pub functions: Vec<FunctionSignature>,
    /// Plain variables.
    pub variables: Vec<Identifier>,
    /// System variables.
    pub system_variables: Vec<Identifier>,
    /// Sheets and their columns.
    pub sheets: Vec<Sheet>,
    /// Custom variable types.
    pub custom_variable_types: Vec<CustomVariableType>,

    /// Cached map from function name → index into `functions` (lazily
    /// initialized).
    #[serde(skip)]
    function_map: OnceLock<HashMap<String, usize>>,
}

impl IdentifierCatalog {
    /// Create a catalog from its collections. Caches are initialized lazily
    /// on first access.
    pub fn new(
        keywords: Vec<Keyword>,
        functions: Vec<FunctionSignature>,
        variables: Vec<Identifier>,
        system_variables: Vec<Identifier>,
        sheets: Vec<Sheet>,
        custom_variable_types: Vec<CustomVariableType>,
    ) -> Self {
        Self {
            keywords,
            functions,
            variables,
            system_variables,
            sheets,
            custom_variable_types,
            function_map: OnceLock::new(),
        }
    }

    /// Deserialize and validate a catalog from host-supplied JSON.
    ///
    /// Fails with a named [`CatalogError`] on malformed input rather than
    /// silently substituting empty collections.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: IdentifierCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Returns the cached name → index map, building it lazily on first
    /// access.
    fn function_map(&self) -> &HashMap<String, usize> {
        self.function_map.get_or_init(|| {
            self.functions
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect()
        })
    }

    /// Look up a function signature by name. O(1) via a cached map.
    pub fn function_by_name(&self, name: &str) -> Option<&FunctionSignature> {
        self.function_map().get(name).map(|&i| &self.functions[i])
    }

    /// Look up a custom variable type by its base name (trailing dot
    /// stripped).
    pub fn custom_type_by_name(&self, name: &str) -> Option<&CustomVariableType> {
        self.custom_variable_types
            .iter()
            .find(|t| t.base_name() == name)
    }

    /// Check the catalog's structural invariants.
    ///
    /// An empty collection is not an error — it merely yields non-matching
    /// rules downstream. Duplicates and impossible arities are errors.
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_identifier_forms("variables", &self.variables)?;
        check_identifier_forms("systemVariables", &self.system_variables)?;
        check_sheets("sheets", &self.sheets)?;

        let mut qualified = HashSet::new();
        for sheet in &self.sheets {
            for column in &sheet.columns {
                let reference = sheet.qualified_display(column);
                if !qualified.insert(reference.clone()) {
                    return Err(CatalogError::DuplicateQualifiedColumn(reference));
                }
            }
        }

        let mut functions = HashSet::new();
        for function in &self.functions {
            if !functions.insert(function.name.as_str()) {
                return Err(CatalogError::DuplicateFunction(function.name.clone()));
            }
            if let MaxArgs::Bounded(max) = function.max_args
                && function.min_args > max
            {
                return Err(CatalogError::ArityRange {
                    name: function.name.clone(),
                    min: function.min_args,
                    max,
                });
            }
        }

        let mut type_names = HashSet::new();
        for custom in &self.custom_variable_types {
            if !type_names.insert(custom.base_name()) {
                return Err(CatalogError::DuplicateCustomType(
                    custom.base_name().to_string(),
                ));
            }
            let scope = format!("customVariableTypes[{}].allowedVariables", custom.base_name());
            check_identifier_forms(&scope, &custom.allowed_variables)?;
            let scope = format!("customVariableTypes[{}].allowedSheets", custom.base_name());
            check_sheets(&scope, &custom.allowed_sheets)?;
        }

        Ok(())
    }
}

fn check_identifier_forms(collection: &str, entries: &[Identifier]) -> Result<(), CatalogError> {
    let mut stored = HashSet::new();
    let mut display = HashSet::new();
    for entry in entries {
        if !stored.insert(entry.stored_form.as_str()) {
            return Err(CatalogError::DuplicateStoredForm {
                collection: collection.to_string(),
                form: entry.stored_form.clone(),
            });
        }
        if !display.insert(entry.display_form.as_str()) {
            return Err(CatalogError::DuplicateDisplayForm {
                collection: collection.to_string(),
                form: entry.display_form.clone(),
            });
        }
    }
    Ok(())
}

fn check_sheets(collection: &str, sheets: &[Sheet]) -> Result<(), CatalogError> {
    let mut stored = HashSet::new();
    let mut display = HashSet::new();
    for sheet in sheets {
        if !stored.insert(sheet.stored_form.as_str()) {
            return Err(CatalogError::DuplicateStoredForm {
                collection: collection.to_string(),
                form: sheet.stored_form.clone(),
            });
        }
        if !display.insert(sheet.display_form.as_str()) {
            return Err(CatalogError::DuplicateDisplayForm {
                collection: collection.to_string(),
                form: sheet.display_form.clone(),
            });
        }
        let mut column_display = HashSet::new();
        for column in &sheet.columns {
            if !column_display.insert(column.display_form.as_str()) {
                return Err(CatalogError::DuplicateDisplayForm {
                    collection: format!("{collection}[{}].columns", sheet.display_form),
                    form: column.display_form.clone(),
                });
            }
        }
    }
    Ok(())
}
