// Ordered query builder. Keys appear in the order they were declared and a
// key exists only when its flag was explicitly supplied.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Int(i64),
    UInt(u64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Int(v) => write!(f, "{v}"),
            QueryValue::UInt(v) => write!(f, "{v}"),
            QueryValue::Bool(v) => write!(f, "{v}"),
            QueryValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Int(i64::from(v))
    }
}

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        QueryValue::UInt(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

/// Ordered set of query parameters for a list-style request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(IndexMap<String, QueryValue>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `limit` and `offset`, always present on paginated listings.
    pub fn pagination(limit: u32, offset: u32) -> Self {
        let mut query = Self::new();
        query.set("limit", limit);
        query.set("offset", offset);
        query
    }

    /// Build from `(name, value)` pairs in declaration order. A flag that was
    /// not supplied is `None` and gets no key, even when its type has a zero
    /// value.
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Option<QueryValue>)>,
    {
        let mut query = Self::new();
        for (name, value) in flags {
            query.set_opt(name, value);
        }
        query
    }

    pub fn set(&mut self, name: &str, value: impl Into<QueryValue>) -> &mut Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Insert only when the flag was supplied. `Some(0)` and `Some("")` are
    /// still inserted.
    pub fn set_opt<V: Into<QueryValue>>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Pairs ready for `RequestBuilder::query`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}
