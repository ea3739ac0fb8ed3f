//! Display/storage transcoding.
//!
//! Converts document text between the machine-persisted storage encoding and
//! the human-readable display encoding. Each direction is a single
//! left-to-right pass over the text driven by a longest-match-first
//! multi-pattern trie built over every substitutable form, so no identifier
//! can corrupt text already substituted by an earlier pass and the result
//! does not depend on catalog iteration order.
//!
//! Unknown text — anything that is not a known form — passes through
//! unchanged.

use crate::rules::{TranscodeDirection, substitution_pairs};
use exprkit_catalog::IdentifierCatalog;
use std::collections::HashMap;

/// A node in the substitution trie.
///
/// `replacement` is set on nodes that terminate a known form; the walk
/// remembers the deepest terminal seen so the longest form wins.
#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    replacement: Option<String>,
}

/// A longest-match-first multi-pattern substitution automaton.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTrie {
    root: TrieNode,
}

impl SubstitutionTrie {
    /// Build a trie from `(from, to)` pairs.
    ///
    /// On duplicate `from` keys the first pair wins; catalogs satisfying the
    /// uniqueness invariants never produce duplicates.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut root = TrieNode::default();
        for (from, to) in pairs {
            if from.is_empty() {
                continue;
            }
            let mut node = &mut root;
            for ch in from.chars() {
                node = node.children.entry(ch).or_default();
            }
            if node.replacement.is_none() {
                node.replacement = Some(to);
            }
        }
        Self { root }
    }

    /// Longest known form starting exactly at `start`, as
    /// `(matched_byte_len, replacement)`.
    fn longest_match_at(&self, text: &str, start: usize) -> Option<(usize, &str)> {
        let mut node = &self.root;
        let mut best: Option<(usize, &str)> = None;
        let mut consumed = 0usize;
        for ch in text[start..].chars() {
            let Some(next) = node.children.get(&ch) else {
                break;
            };
            node = next;
            consumed += ch.len_utf8();
            if let Some(replacement) = node.replacement.as_deref() {
                best = Some((consumed, replacement));
            }
        }
        best
    }

    /// Apply the substitutions in one left-to-right pass.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0usize;
        while pos < text.len() {
            if let Some((len, replacement)) = self.longest_match_at(text, pos) {
                out.push_str(replacement);
                pos += len;
            } else {
                let ch = text[pos..].chars().next().expect("pos is a char boundary");
                out.push(ch);
                pos += ch.len_utf8();
            }
        }
        out
    }
}

/// Bidirectional display/storage transcoder for one catalog snapshot.
#[derive(Debug, Clone)]
pub struct Transcoder {
    to_display: SubstitutionTrie,
    to_storage: SubstitutionTrie,
}

impl Transcoder {
    /// Build both direction tries from a catalog.
    pub fn new(catalog: &IdentifierCatalog) -> Self {
        Self {
            to_display: SubstitutionTrie::from_pairs(substitution_pairs(
                catalog,
                TranscodeDirection::ToDisplay,
            )),
            to_storage: SubstitutionTrie::from_pairs(substitution_pairs(
                catalog,
                TranscodeDirection::ToStorage,
            )),
        }
    }

    /// Replace every stored form with its display form.
    pub fn to_display(&self, text: &str) -> String {
        self.to_display.apply(text)
    }

    /// Replace every display form with its stored form.
    pub fn to_storage(&self, text: &str) -> String {
        self.to_storage.apply(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trie_passes_text_through() {
        let trie = SubstitutionTrie::from_pairs(Vec::new());
        assert_eq!(trie.apply("a + b"), "a + b");
    }

    #[test]
    fn longest_form_wins() {
        let trie = SubstitutionTrie::from_pairs(vec![
            ("AB".to_string(), "short".to_string()),
            ("ABC".to_string(), "long".to_string()),
        ]);
        assert_eq!(trie.apply("ABC"), "long");
        assert_eq!(trie.apply("ABX"), "shortX");
    }

    #[test]
    fn overlapping_forms_do_not_corrupt_replacements() {
        // "Rate" is a substring of "Rated"; a sequential replace pass would
        // rewrite the inside of the longer form.
        let trie = SubstitutionTrie::from_pairs(vec![
            ("Rate".to_string(), "${r}".to_string()),
            ("Rated".to_string(), "${rd}".to_string()),
        ]);
        assert_eq!(trie.apply("Rate Rated"), "${r} ${rd}");
    }

    #[test]
    fn replacement_output_is_not_rescanned() {
        // A replacement that itself contains a known form must not be
        // substituted again.
        let trie = SubstitutionTrie::from_pairs(vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
        ]);
        assert_eq!(trie.apply("ab"), "bc");
    }

    #[test]
    fn duplicate_from_keeps_first_pair() {
        let trie = SubstitutionTrie::from_pairs(vec![
            ("X".to_string(), "first".to_string()),
            ("X".to_string(), "second".to_string()),
        ]);
        assert_eq!(trie.apply("X"), "first");
    }

    #[test]
    fn multibyte_forms_match() {
        let trie = SubstitutionTrie::from_pairs(vec![("金額".to_string(), "Amount".to_string())]);
        assert_eq!(trie.apply("金額 + 1"), "Amount + 1");
    }
}
