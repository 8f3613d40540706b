//! Description standardization.
//!
//! Uppercases a description, expands whole-word abbreviations in a single
//! pass, and collapses whitespace.

mod abbreviations;

use regex::{Captures, Regex};

pub use abbreviations::{AbbreviationTable, TableError};

/// Compiled abbreviation expander.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    table: AbbreviationTable,
    pattern: Option<Regex>,
}

impl Preprocessor {
    /// Compile a preprocessor for the given table.
    pub fn new(table: AbbreviationTable) -> Result<Self, regex::Error> {
        let pattern = if table.is_empty() {
            None
        } else {
            // Alternation order is table order, so earlier entries win ties.
            let alternation = table
                .iter()
                .map(|(token, _)| regex::escape(token))
                .collect::<Vec<_>>()
                .join("|");
            let source = format!(r"\b(?:{})\b", alternation);
            Some(Regex::new(&source)?)
        };

        Ok(Self { table, pattern })
    }

    pub fn table(&self) -> &AbbreviationTable {
        &self.table
    }

    /// Standardize a single description.
    pub fn standardize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let upper = text.to_uppercase();
        let expanded = match &self.pattern {
            Some(pattern) => pattern
                .replace_all(&upper, |caps: &Captures| {
                    let token = &caps[0];
                    self.table.expansion(token).unwrap_or(token).to_string()
                })
                .into_owned(),
            None => upper,
        };

        expanded.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(AbbreviationTable::builtin()).expect("builtin abbreviation table compiles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_examples() {
        let pre = Preprocessor::default();
        assert_eq!(pre.standardize("FR VEG"), "FRESH VEGETABLE");
        assert_eq!(pre.standardize("BEVE CKD"), "BEVERAGE COOKED");
        assert_eq!(pre.standardize("raw"), "RAW");
    }

    #[test]
    fn test_lowercase_input_is_expanded() {
        let pre = Preprocessor::default();
        assert_eq!(
            pre.standardize("chkn  sndwch, frd "),
            "CHICKEN SANDWICH, FRIED"
        );
    }

    #[test]
    fn test_empty_passes_through() {
        let pre = Preprocessor::default();
        assert_eq!(pre.standardize(""), "");
        assert_eq!(pre.standardize("   "), "");
    }

    #[test]
    fn test_embedded_tokens_untouched() {
        let pre = Preprocessor::default();
        // FR inside FRUIT, VEG inside VEGAN, CKD inside CKDX
        assert_eq!(pre.standardize("fruit vegan ckdx"), "FRUIT VEGAN CKDX");
    }

    #[test]
    fn test_punctuation_is_a_word_boundary() {
        let pre = Preprocessor::default();
        assert_eq!(pre.standardize("FR-VEG,CND"), "FRESH-VEGETABLE,CANNED");
    }

    #[test]
    fn test_every_builtin_token_is_replaced_as_whole_word() {
        let pre = Preprocessor::default();
        for (token, expansion) in pre.table().iter() {
            let input = format!("X {} Y", token);
            assert_eq!(
                pre.standardize(&input),
                format!("X {} Y", expansion),
                "token {}",
                token
            );

            let embedded = format!("Q{}Q", token);
            assert_eq!(pre.standardize(&embedded), embedded, "token {}", token);
        }
    }

    #[test]
    fn test_longer_token_matches_when_shorter_is_a_prefix() {
        let pre = Preprocessor::default();
        assert_eq!(pre.standardize("VEGS"), "VEGETABLES");
        assert_eq!(pre.standardize("PREPD"), "PREPARED");
    }

    #[test]
    fn test_single_pass_does_not_reexpand() {
        let table = AbbreviationTable::from_pairs([("A", "B"), ("B", "C")]);
        let pre = Preprocessor::new(table).unwrap();
        assert_eq!(pre.standardize("a b"), "B C");
    }

    #[test]
    fn test_idempotent() {
        let pre = Preprocessor::default();
        let samples = [
            "FR VEG",
            "beve ckd",
            "Chkn brst, sknls, bnls, rstd",
            "PNUT BUTTR, SMOOTH STYLE, W/ SALT",
            "cereals rte, kellogg's",
            "  mixed   whitespace\tand\nlines ",
            "ßtraße",
            "",
        ];
        for sample in samples {
            let once = pre.standardize(sample);
            assert_eq!(pre.standardize(&once), once, "input {:?}", sample);
        }
    }

    #[test]
    fn test_merged_table_stays_idempotent() {
        let mut table = AbbreviationTable::builtin();
        let conflicting = AbbreviationTable::from_pairs([("FRT", "FR FRUIT")]);
        assert!(table.extend(conflicting).is_err());

        let extra = AbbreviationTable::from_pairs([("FRT", "FRUIT"), ("GF", "GLUTEN FREE")]);
        table.extend(extra).unwrap();
        let pre = Preprocessor::new(table).unwrap();

        let once = pre.standardize("frt cktl, gf, fr");
        assert_eq!(once, "FRUIT CKTL, GLUTEN FREE, FRESH");
        assert_eq!(pre.standardize(&once), once);
    }

    #[test]
    fn test_empty_table_only_normalizes() {
        let pre = Preprocessor::new(AbbreviationTable::default()).unwrap();
        assert_eq!(pre.standardize(" fr  veg "), "FR VEG");
    }
}
