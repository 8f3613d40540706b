//! Abbreviation table used to expand shorthand in food descriptions.

use std::path::Path;

use thiserror::Error;

/// Builtin abbreviations, in match priority order.
///
/// Tokens are uppercase single words. No expansion word may itself be a token.
const BUILTIN: &[(&str, &str)] = &[
    ("FR", "FRESH"),
    ("VEG", "VEGETABLE"),
    ("VEGS", "VEGETABLES"),
    ("BEVE", "BEVERAGE"),
    ("BEV", "BEVERAGE"),
    ("CKD", "COOKED"),
    ("UNCKD", "UNCOOKED"),
    ("RTE", "READY TO EAT"),
    ("RTS", "READY TO SERVE"),
    ("RTD", "READY TO DRINK"),
    ("FRZ", "FROZEN"),
    ("FZN", "FROZEN"),
    ("CND", "CANNED"),
    ("DRND", "DRAINED"),
    ("BLD", "BOILED"),
    ("BRLD", "BROILED"),
    ("RSTD", "ROASTED"),
    ("FRD", "FRIED"),
    ("STMD", "STEAMED"),
    ("BKD", "BAKED"),
    ("SWTND", "SWEETENED"),
    ("UNSWTND", "UNSWEETENED"),
    ("UNSWTD", "UNSWEETENED"),
    ("CHOC", "CHOCOLATE"),
    ("CHS", "CHEESE"),
    ("CRM", "CREAM"),
    ("MLK", "MILK"),
    ("BUTTRMLK", "BUTTERMILK"),
    ("BF", "BEEF"),
    ("CHKN", "CHICKEN"),
    ("CHIX", "CHICKEN"),
    ("TURK", "TURKEY"),
    ("SAUS", "SAUSAGE"),
    ("SNDWCH", "SANDWICH"),
    ("WHL", "WHOLE"),
    ("WHT", "WHEAT"),
    ("ENR", "ENRICHED"),
    ("FORT", "FORTIFIED"),
    ("PREP", "PREPARED"),
    ("PREPD", "PREPARED"),
    ("WTR", "WATER"),
    ("SOL", "SOLIDS"),
    ("LIQ", "LIQUID"),
    ("LIQS", "LIQUIDS"),
    ("CONC", "CONCENTRATE"),
    ("DEHYD", "DEHYDRATED"),
    ("LOFAT", "LOW FAT"),
    ("SKNLS", "SKINLESS"),
    ("BNLS", "BONELESS"),
    ("BNLESS", "BONELESS"),
    ("LN", "LEAN"),
    ("SL", "SLICED"),
    ("SHRD", "SHREDDED"),
    ("CHPD", "CHOPPED"),
    ("ORG", "ORGANIC"),
    ("NAT", "NATURAL"),
    ("ARTIF", "ARTIFICIAL"),
    ("FLVR", "FLAVOR"),
    ("FLAV", "FLAVORED"),
    ("FLVRD", "FLAVORED"),
    ("PDR", "POWDER"),
    ("PWD", "POWDER"),
    ("SCE", "SAUCE"),
    ("SAU", "SAUCE"),
    ("SSNG", "SEASONING"),
    ("TOM", "TOMATO"),
    ("PNUT", "PEANUT"),
    ("JUC", "JUICE"),
    ("JCE", "JUICE"),
    ("CKY", "COOKIE"),
    ("CRKR", "CRACKER"),
    ("BRD", "BREAD"),
    ("CRL", "CEREAL"),
    ("INST", "INSTANT"),
    ("REG", "REGULAR"),
    ("COMM", "COMMERCIAL"),
    ("COMMLY", "COMMERCIALLY"),
    ("IMMAT", "IMMATURE"),
    ("NFS", "NOT FURTHER SPECIFIED"),
    ("NS", "NOT SPECIFIED"),
];

/// Errors loading an abbreviation table from disk.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read abbreviation table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid abbreviation on line {line}: {reason}")]
    InvalidEntry { line: u64, reason: String },

    #[error("Expansion of {token} contains abbreviation {word}, which would expand again")]
    ExpansionContainsToken { token: String, word: String },
}

/// Ordered token -> expansion mapping.
///
/// Insertion order is match priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationTable {
    entries: Vec<(String, String)>,
}

impl AbbreviationTable {
    /// The builtin food-description table.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }

    /// Build a table from (token, expansion) pairs, normalizing tokens to uppercase.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = Self::default();
        for (token, expansion) in pairs {
            table.insert(token.as_ref(), expansion.as_ref());
        }
        table
    }

    /// Load a two-column `token,expansion` CSV file (with header).
    pub fn from_csv_path(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut table = Self::default();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let token = record.get(0).unwrap_or("").trim();
            let expansion = record.get(1).unwrap_or("").trim();

            if token.is_empty() || expansion.is_empty() {
                return Err(TableError::InvalidEntry {
                    line,
                    reason: "token and expansion must both be non-empty".to_string(),
                });
            }
            if token.chars().any(char::is_whitespace) {
                return Err(TableError::InvalidEntry {
                    line,
                    reason: format!("token '{}' must be a single word", token),
                });
            }
            // Matching is on word boundaries, so punctuation in a token never matches.
            if !token.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(TableError::InvalidEntry {
                    line,
                    reason: format!("token '{}' must contain only letters and digits", token),
                });
            }

            table.insert(token, expansion);
        }

        Ok(table)
    }

    /// Insert or replace an entry. A replaced token keeps its original position.
    pub fn insert(&mut self, token: &str, expansion: &str) {
        let token = token.trim().to_uppercase();
        let expansion = expansion.trim().to_uppercase();

        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = expansion,
            None => self.entries.push((token, expansion)),
        }
    }

    /// Merge another table into this one.
    ///
    /// The merged table must still pass [`validate`](Self::validate); on
    /// failure `self` is left unchanged.
    pub fn extend(&mut self, other: AbbreviationTable) -> Result<(), TableError> {
        let mut merged = self.clone();
        for (token, expansion) in other.entries {
            merged.insert(&token, &expansion);
        }
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Check that no expansion contains a word that is itself a token.
    /// Standardization is only idempotent when this holds.
    pub fn validate(&self) -> Result<(), TableError> {
        for (token, expansion) in self.iter() {
            if let Some(word) = expansion
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .find(|word| self.expansion(word).is_some())
            {
                return Err(TableError::ExpansionContainsToken {
                    token: token.to_string(),
                    word: word.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Look up the expansion for an uppercase token.
    pub fn expansion(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, e)| e.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, e)| (t.as_str(), e.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    fn csv_table(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token,expansion").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_builtin_expansions_never_contain_tokens() {
        let table = AbbreviationTable::builtin();
        let tokens: HashSet<&str> = table.iter().map(|(t, _)| t).collect();

        for (token, expansion) in table.iter() {
            for word in expansion.split_whitespace() {
                assert!(
                    !tokens.contains(word),
                    "expansion of {} contains token {}",
                    token,
                    word
                );
            }
        }
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_extend_rejects_expansion_containing_builtin_token() {
        let file = csv_table(&["FRT,FR FRUIT"]);
        let extra = AbbreviationTable::from_csv_path(file.path()).unwrap();

        let mut table = AbbreviationTable::builtin();
        let err = table.extend(extra).unwrap_err();

        assert!(matches!(
            err,
            TableError::ExpansionContainsToken { ref token, ref word }
                if token == "FRT" && word == "FR"
        ));
        assert_eq!(table.expansion("FRT"), None);
        assert_eq!(table, AbbreviationTable::builtin());
    }

    #[test]
    fn test_extend_rejects_token_found_in_builtin_expansion() {
        // FR expands to FRESH, so FRESH may not become a token.
        let extra = AbbreviationTable::from_pairs([("FRESH", "JUST PICKED")]);
        let mut table = AbbreviationTable::builtin();
        assert!(table.extend(extra).is_err());
        assert_eq!(table.expansion("FRESH"), None);
    }

    #[test]
    fn test_extend_accepts_compatible_entries() {
        let file = csv_table(&["gf,gluten free", "FR,FRENCH"]);
        let extra = AbbreviationTable::from_csv_path(file.path()).unwrap();

        let mut table = AbbreviationTable::builtin();
        table.extend(extra).unwrap();

        assert_eq!(table.expansion("GF"), Some("GLUTEN FREE"));
        assert_eq!(table.expansion("FR"), Some("FRENCH"));
        assert_eq!(table.len(), BUILTIN.len() + 1);
    }

    #[test]
    fn test_from_csv_path_rejects_punctuated_token() {
        let file = csv_table(&["W/,WITH"]);
        let err = AbbreviationTable::from_csv_path(file.path()).unwrap_err();
        assert!(matches!(err, TableError::InvalidEntry { line: 2, .. }));
    }

    #[test]
    fn test_builtin_has_no_duplicate_tokens() {
        let table = AbbreviationTable::builtin();
        assert_eq!(table.len(), BUILTIN.len());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = AbbreviationTable::from_pairs([("a", "alpha"), ("b", "beta")]);
        table.insert("A", "apple");
        table.insert("c", "gamma");

        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![("A", "APPLE"), ("B", "BETA"), ("C", "GAMMA")]);
    }

    #[test]
    fn test_from_csv_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token,expansion").unwrap();
        writeln!(file, "gf,gluten free").unwrap();
        writeln!(file, "SF , sugar free").unwrap();
        file.flush().unwrap();

        let table = AbbreviationTable::from_csv_path(file.path()).unwrap();
        assert_eq!(table.expansion("GF"), Some("GLUTEN FREE"));
        assert_eq!(table.expansion("SF"), Some("SUGAR FREE"));
    }

    #[test]
    fn test_from_csv_path_rejects_multi_word_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token,expansion").unwrap();
        writeln!(file, "lo fat,low fat").unwrap();
        file.flush().unwrap();

        let err = AbbreviationTable::from_csv_path(file.path()).unwrap_err();
        assert!(matches!(err, TableError::InvalidEntry { .. }));
    }
}
