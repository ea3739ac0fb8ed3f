//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete.

/// Function called with an argument count outside its declared range.
pub const ARITY: &str = "EXP1101";
/// Function name not present in the identifier catalog.
pub const UNKNOWN_FUNCTION: &str = "EXP1102";
/// Argument does not match any allowed type tag for its position.
pub const ARG_TYPE: &str = "EXP1201";
/// Unequal counts of opening and closing parentheses.
pub const PARENS_MISMATCH: &str = "EXP2101";
