//! Header and query parameter maps.
//!
//! [`Headers`] compares names case-insensitively, so two messages that only
//! differ in the spelling of a header name are equal. [`Params`] is an ordered
//! map, which makes equality independent of insertion order.

use std::collections::BTreeMap;
use std::fmt;

/// Query parameters of a request.
pub type Params = BTreeMap<String, String>;

/// HTTP headers with case-insensitive names.
///
/// The most recently inserted spelling of a name is the one kept for
/// iteration (and therefore for the wire).
///
/// # Example
///
/// ```
/// use parley_core::Headers;
///
/// let headers: Headers = [("Content-Type", "text/plain")].into_iter().collect();
/// assert_eq!(headers.get("content-type"), Some("text/plain"));
/// ```
#[derive(Clone, Default)]
pub struct Headers {
    // keyed by the lower-cased name: (original name, value)
    entries: BTreeMap<String, (String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a header, looked up case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Sets a header, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()))
            .map(|(_, previous)| previous)
    }

    /// Removes a header, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl PartialEq for Headers {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((key, (_, value)), (other_key, (_, other_value)))| {
                    key == other_key && value == other_value
                })
    }
}

impl Eq for Headers {}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let headers: Headers = [("X-Token", "abc")].into_iter().collect();
        assert_eq!(headers.get("x-token"), Some("abc"));
        assert_eq!(headers.get("X-TOKEN"), Some("abc"));
        assert!(headers.contains("x-TOKEN"));
        assert!(!headers.contains("x-other"));
    }

    #[test]
    fn insert_replaces_and_keeps_latest_spelling() {
        let mut headers = Headers::new();
        headers.insert("content-type", "text/plain");
        let previous = headers.insert("Content-Type", "application/json");

        assert_eq!(previous.as_deref(), Some("text/plain"));
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("Content-Type", "application/json")]
        );
    }

    #[test]
    fn equality_ignores_name_case() {
        let lower: Headers = [("accept", "text/html")].into_iter().collect();
        let upper: Headers = [("ACCEPT", "text/html")].into_iter().collect();
        let other: Headers = [("accept", "text/plain")].into_iter().collect();

        assert_eq!(lower, upper);
        assert_ne!(lower, other);
    }

    #[test]
    fn remove_header() {
        let mut headers: Headers = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(headers.remove("a").as_deref(), Some("1"));
        assert_eq!(headers.len(), 1);
        assert!(headers.remove("a").is_none());
    }

    #[test]
    fn debug_lists_entries() {
        let headers: Headers = [("Accept", "*/*")].into_iter().collect();
        assert_eq!(format!("{headers:?}"), r#"{"Accept": "*/*"}"#);
    }
}
