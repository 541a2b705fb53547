// Reference accumulator: a write-only map built as Reference containers
// close. Labels are normalized by NFC-normalizing, lowercasing, and
// collapsing whitespace.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDefinition {
    pub url: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    entries: HashMap<String, ReferenceDefinition>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(url, title)` under the normalized form of `label`.
    /// Unconditional: a later definition silently overwrites an earlier
    /// one with the same normalized label.
    pub fn insert(&mut self, label: &str, url: String, title: Option<String>) {
        self.entries
            .insert(normalize(label), ReferenceDefinition { url, title });
    }

    pub fn get(&self, label: &str) -> Option<&ReferenceDefinition> {
        self.entries.get(&normalize(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// NFC-normalize the label so canonically equivalent Unicode forms (e.g. a
/// precomposed `é` vs. `e` + combining acute) compare equal, then lowercase
/// and collapse runs of whitespace to a single space, trimming both ends.
pub fn normalize(label: &str) -> String {
    let nfc: String = label.nfc().collect();
    let mut normalized = String::with_capacity(nfc.len());
    let mut pending_space = false;
    for word in nfc.split_whitespace() {
        if pending_space {
            normalized.push(' ');
        }
        normalized.push_str(&word.to_lowercase());
        pending_space = true;
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Foo   Bar  "), "foo bar");
    }

    #[test]
    fn smoke_test_insert_and_get_is_case_insensitive() {
        let mut map = ReferenceMap::new();
        map.insert("Foo", "/url".to_string(), Some("t".to_string()));
        let found = map.get("foo").unwrap();
        assert_eq!(found.url, "/url");
        assert_eq!(found.title, Some("t".to_string()));
    }

    #[test]
    fn smoke_test_normalize_unifies_nfc_equivalent_forms() {
        // "e\u{301}" is "e" + combining acute accent; "\u{e9}" is the
        // precomposed "é". NFC normalization must unify them.
        assert_eq!(normalize("caf\u{65}\u{301}"), normalize("caf\u{e9}"));
    }

    #[test]
    fn smoke_test_later_definition_overwrites_earlier() {
        let mut map = ReferenceMap::new();
        map.insert("foo", "/first".to_string(), None);
        map.insert("foo", "/second".to_string(), None);
        assert_eq!(map.get("foo").unwrap().url, "/second");
        assert_eq!(map.len(), 1);
    }
}
