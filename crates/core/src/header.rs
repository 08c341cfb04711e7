use serde::{Deserialize, Serialize};

/// Fold a header name to its case-insensitive lookup key.
pub fn fold_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// A header value that may carry one or several entries.
///
/// Deserializes from either a JSON string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// A single value.
    One(String),
    /// Several values, kept in order.
    Many(Vec<String>),
}

impl HeaderValue {
    /// All values as a slice, in order.
    pub fn values(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

/// Ordered, case-insensitive header multi-map.
///
/// Names keep the casing they were inserted with; lookups fold names to
/// lowercase. Several entries may share a (folded) name, and all entries are
/// kept in insertion order.
///
/// # Examples
///
/// ```
/// use courier_core::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.append("X-Source", "unit tests");
/// headers.append("x-source", "integration tests");
///
/// assert_eq!(headers.get("X-SOURCE"), Some("unit tests"));
/// assert_eq!(headers.get_all("x-source").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header entry, keeping any existing entries with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Append every value of a [`HeaderValue`] under `name`.
    pub fn append_value(&mut self, name: &str, value: &HeaderValue) {
        for v in value.values() {
            self.append(name, v.clone());
        }
    }

    /// Replace every entry named `name` (any casing) with a single entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.append(name, value);
    }

    /// First value stored under `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        let folded = fold_name(name);
        self.entries
            .iter()
            .find(|(n, _)| fold_name(n) == folded)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let folded = fold_name(name);
        self.entries
            .iter()
            .filter(|(n, _)| fold_name(n) == folded)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether any entry is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove every entry stored under `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let folded = fold_name(name);
        let before = self.entries.len();
        self.entries.retain(|(n, _)| fold_name(n) != folded);
        before - self.entries.len()
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `overrides` into this map, letting `overrides` win.
    ///
    /// For every folded name present in `overrides`, all entries of this map
    /// with that name are dropped, then every entry of `overrides` is
    /// appended in its original order. Names absent from `overrides` are
    /// left untouched.
    pub fn merge_overriding(&mut self, overrides: &HeaderMap) {
        let mut replaced: Vec<String> = Vec::new();
        for (name, _) in &overrides.entries {
            let folded = fold_name(name);
            if !replaced.contains(&folded) {
                self.remove(&folded);
                replaced.push(folded);
            }
        }
        self.entries.extend(overrides.entries.iter().cloned());
    }

    /// Collapse entries into one ordered value list per folded name.
    ///
    /// Names appear in the order they were first encountered; values keep
    /// their original casing and order.
    pub fn fold(&self) -> FoldedHeaders {
        let mut folded = FoldedHeaders::default();
        for (name, value) in &self.entries {
            folded.push(fold_name(name), value.clone());
        }
        folded
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

/// Case-folded view of a [`HeaderMap`]: folded name to ordered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldedHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl FoldedHeaders {
    fn push(&mut self, folded: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == folded) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((folded, vec![value])),
        }
    }

    /// Values stored under an already-folded name.
    pub fn get(&self, folded: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == folded)
            .map(|(_, v)| v.as_slice())
    }

    /// Iterate `(folded name, values)` in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
