//! Query descriptors and invalidation targets.

use std::collections::BTreeMap;

/// Tags naming the remote collections the console caches.
pub mod tags {
    pub const ANALYTICS: &str = "analytics";
    pub const ATTESTATIONS: &str = "attestations";
    pub const AUTH: &str = "auth";
    pub const COMMUNITIES: &str = "communities";
    pub const USERS: &str = "users";
}

/// Identifies a cached query: a tag plus named parameters.
///
/// Parameters live in a sorted map, so two keys built with the same tag and
/// parameters are equal regardless of insertion order.
///
/// # Example
///
/// ```
/// use nodes_admin_lib::query::QueryKey;
///
/// let a = QueryKey::new("attestations").param("id", 4).param("page", 1);
/// let b = QueryKey::new("attestations").param("page", 1).param("id", 4);
/// assert_eq!(a, b);
/// assert_eq!(a.cache_key(), "attestations?id=4&page=1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    tag: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    /// Creates a key with no parameters.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds or replaces a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Returns the tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the parameters in key order.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Canonical string form: `tag` or `tag?k1=v1&k2=v2`.
    pub fn cache_key(&self) -> String {
        if self.params.is_empty() {
            return self.tag.clone();
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}?{}", self.tag, params.join("&"))
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}

impl From<&str> for QueryKey {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Which entries an invalidation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidate {
    /// Every key carrying this tag, whatever its parameters.
    Tag(String),
    /// Exactly this key.
    Key(QueryKey),
    /// Every entry.
    All,
}

impl Invalidate {
    /// Returns `true` if the key is targeted.
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Tag(tag) => key.tag() == tag,
            Self::Key(target) => key == target,
            Self::All => true,
        }
    }
}

impl From<&str> for Invalidate {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

impl From<QueryKey> for Invalidate {
    fn from(key: QueryKey) -> Self {
        Self::Key(key)
    }
}

impl From<&QueryKey> for Invalidate {
    fn from(key: &QueryKey) -> Self {
        Self::Key(key.clone())
    }
}
