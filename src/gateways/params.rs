use std::collections::{BTreeMap, HashMap};

/// Raw key/value pairs a gateway sent back on its redirect or form post.
///
/// Blank values are indistinguishable from missing ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    inner: BTreeMap<String, Option<String>>,
}

impl CallbackParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.inner.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// First populated key in priority order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Populated entries, sorted by key.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .keys()
            .filter_map(|k| self.get(k).map(|v| (k.as_str(), v)))
    }

    /// Non-empty entries exactly as received, sorted by key.
    pub fn raw_present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().filter_map(|(k, v)| {
            v.as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (k.as_str(), v))
        })
    }
}

impl From<HashMap<String, String>> for CallbackParams {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().map(|(k, v)| (k, Some(v))).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CallbackParams;

    #[test]
    fn blank_and_null_values_are_absent() {
        let params: CallbackParams = vec![
            ("a", None),
            ("b", Some("  ".to_string())),
            ("c", Some(" x ".to_string())),
        ]
        .into_iter()
        .collect();

        assert_eq!(params.get("a"), None);
        assert_eq!(params.get("b"), None);
        assert_eq!(params.first_of(&["a", "b", "c"]), Some("x"));
        assert_eq!(params.present().count(), 1);
    }

    #[test]
    fn raw_values_keep_whitespace() {
        let params: CallbackParams = vec![
            ("a", Some(String::new())),
            ("b", Some("  ".to_string())),
            ("c", Some(" x ".to_string())),
        ]
        .into_iter()
        .collect();

        let raw: Vec<_> = params.raw_present().collect();
        assert_eq!(raw, vec![("b", "  "), ("c", " x ")]);
    }
}
