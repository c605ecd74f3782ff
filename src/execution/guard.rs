//! Write-keyword guard for ad-hoc query text.
//!
//! A case-insensitive substring denylist, layered under the store's
//! read-only mode. It over-blocks (a string literal containing "create" is
//! rejected) and under-blocks (writes through procedure calls pass), so it is
//! never the only control.

use crate::{Error, Result};

/// Keywords rejected by default.
pub const DEFAULT_DENYLIST: [&str; 6] = ["DELETE", "DETACH", "CREATE", "SET", "MERGE", "REMOVE"];

#[derive(Debug, Clone)]
pub struct WriteGuard {
    /// Upper-cased keywords.
    keywords: Vec<String>,
}

impl Default for WriteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST)
    }
}

impl WriteGuard {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Reject text containing any denied keyword anywhere.
    pub fn check(&self, cypher: &str) -> Result<()> {
        let upper = cypher.to_uppercase();
        match self.keywords.iter().find(|k| upper.contains(k.as_str())) {
            Some(keyword) => {
                tracing::warn!(keyword = %keyword, "rejected raw query containing write keyword");
                Err(Error::SecurityRejected { keyword: keyword.clone() })
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_pass() {
        let guard = WriteGuard::default();
        assert!(guard.check("MATCH (n:Person) RETURN n LIMIT 5").is_ok());
    }

    #[test]
    fn test_writes_rejected_case_insensitively() {
        let guard = WriteGuard::default();
        for q in [
            "MATCH (n) DETACH DELETE n",
            "create (n:X)",
            "MATCH (n) set n.a = 1",
            "merge (n:X {id: 1})",
            "MATCH (n) REMOVE n:Label",
        ] {
            assert!(matches!(guard.check(q), Err(Error::SecurityRejected { .. })), "{q}");
        }
    }

    #[test]
    fn test_substring_overblocks_literals() {
        // Known imprecision: property values and identifiers trip the guard too.
        let guard = WriteGuard::default();
        let err = guard.check("MATCH (n {title: 'How to create art'}) RETURN n").unwrap_err();
        assert!(matches!(err, Error::SecurityRejected { ref keyword } if keyword == "CREATE"));
        assert!(guard.check("MATCH (n:Dataset) RETURN n").is_err());
    }

    #[test]
    fn test_custom_denylist() {
        let guard = WriteGuard::new(["drop", " "]);
        assert!(guard.check("MATCH (n) DELETE n").is_ok());
        assert!(guard.check("DROP INDEX x").is_err());
    }
}
