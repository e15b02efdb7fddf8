//! Compiler path-alias expansion
//!
//! An alias table maps a pattern to an ordered list of target templates.
//! Exact patterns are checked first; after that, the first `/*` pattern in
//! declaration order that matches wins. There is no specificity scoring.

use indexmap::IndexMap;

/// Ordered alias table from the compiler configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathMappingTable {
    entries: IndexMap<String, Vec<String>>,
}

impl PathMappingTable {
    /// Create a table, keeping declaration order
    pub fn new(entries: IndexMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Expand `specifier` into candidate target paths
    ///
    /// A wildcard pattern `p/*` matches a specifier that starts with `p/`
    /// or equals `p`; the captured suffix (empty in the second case) replaces
    /// the `*` of every target.
    pub fn expand(&self, specifier: &str) -> Option<Vec<String>> {
        if let Some(targets) = self.entries.get(specifier) {
            return Some(targets.clone());
        }

        self.entries.iter().find_map(|(pattern, targets)| {
            let captured = match_wildcard(pattern, specifier)?;
            Some(
                targets
                    .iter()
                    .map(|target| target.replacen('*', captured, 1))
                    .collect(),
            )
        })
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no patterns
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patterns in declaration order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl From<IndexMap<String, Vec<String>>> for PathMappingTable {
    fn from(entries: IndexMap<String, Vec<String>>) -> Self {
        Self::new(entries)
    }
}

/// Suffix captured by a `/*` pattern, if it matches
fn match_wildcard<'a>(pattern: &str, specifier: &'a str) -> Option<&'a str> {
    let prefix = pattern.strip_suffix('*').filter(|_| pattern.ends_with("/*"))?;

    if let Some(rest) = specifier.strip_prefix(prefix) {
        return Some(rest);
    }

    let bare = &prefix[..prefix.len() - 1];
    (specifier == bare).then_some("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(entries: &[(&str, Vec<&str>)]) -> PathMappingTable {
        entries
            .iter()
            .map(|(pattern, targets)| {
                (
                    pattern.to_string(),
                    targets.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect::<IndexMap<String, Vec<String>>>()
            .into()
    }

    #[test]
    fn test_exact_match_returns_targets_unmodified() {
        let table = table(&[("@org/a", vec!["libs/a/src/index.ts", "libs/a/*"])]);

        assert_eq!(
            table.expand("@org/a"),
            Some(vec!["libs/a/src/index.ts".to_string(), "libs/a/*".to_string()])
        );
        assert_eq!(table.expand("@org/a/deep"), None);
    }

    #[test]
    fn test_wildcard_substitution() {
        let table = table(&[("@org/*", vec!["libs/*/src/index"])]);

        assert_eq!(
            table.expand("@org/shared"),
            Some(vec!["libs/shared/src/index".to_string()])
        );
        assert_eq!(
            table.expand("@org/shared/testing"),
            Some(vec!["libs/shared/testing/src/index".to_string()])
        );
        assert_eq!(table.expand("@other/shared"), None);
    }

    #[test]
    fn test_bare_prefix_matches_with_empty_capture() {
        let table = table(&[("@org/ui/*", vec!["libs/ui/src/*"])]);

        assert_eq!(table.expand("@org/ui"), Some(vec!["libs/ui/src/".to_string()]));
        assert_eq!(table.expand("@org/uikit"), None);
    }

    #[test]
    fn test_exact_before_wildcard() {
        let table = table(&[
            ("@org/*", vec!["libs/*"]),
            ("@org/special", vec!["special/index.ts"]),
        ]);

        assert_eq!(table.expand("@org/special"), Some(vec!["special/index.ts".to_string()]));
    }

    #[test]
    fn test_first_declared_wildcard_wins() {
        let table = table(&[
            ("@org/*", vec!["libs/*"]),
            ("@org/feature/*", vec!["features/*"]),
        ]);

        // No specificity scoring: the broader pattern was declared first
        assert_eq!(table.expand("@org/feature/x"), Some(vec!["libs/feature/x".to_string()]));
    }

    #[test]
    fn test_non_slash_wildcards_are_not_prefix_patterns() {
        let table = table(&[("~*", vec!["src/*"]), ("*", vec!["fallback/*"])]);

        assert_eq!(table.expand("~utils"), None);
        assert_eq!(table.expand("anything"), None);
        assert_eq!(table.expand("*"), Some(vec!["fallback/*".to_string()]));
    }

    #[test]
    fn test_empty_table() {
        let table = PathMappingTable::default();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.expand("@org/a"), None);
    }

    #[test]
    fn test_patterns_keep_declaration_order() {
        let table = table(&[("z", vec!["z"]), ("a/*", vec!["a/*"]), ("m", vec!["m"])]);
        assert_eq!(table.patterns().collect::<Vec<_>>(), vec!["z", "a/*", "m"]);
    }

    proptest! {
        #[test]
        fn wildcard_capture_round_trips(name in "[a-z][a-z0-9-]{0,12}") {
            let table = table(&[("@org/*", vec!["libs/*/src/index.ts"])]);
            let expanded = table.expand(&format!("@org/{}", name)).unwrap();
            prop_assert_eq!(expanded, vec![format!("libs/{}/src/index.ts", name)]);
        }
    }
}
