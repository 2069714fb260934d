//! Claims proposed by an upstream extractor, grouped by category.
//!
//! Extractors return loosely-typed JSON: a category may hold an array of
//! strings, numbers, or nested objects, or something that is not an array at
//! all. `ClaimSet::from_json` normalizes that payload once so the validator
//! only ever sees `category -> [claim strings]`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered mapping of category -> claim strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ClaimSet {
    categories: IndexMap<String, Vec<String>>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category with its claims (builder style).
    ///
    /// Adding an existing category replaces its claims in place.
    pub fn with_category<I, S>(mut self, category: impl Into<String>, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(category, claims);
        self
    }

    /// Insert or replace a category.
    pub fn insert<I, S>(&mut self, category: impl Into<String>, claims: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(category.into(), claims.into_iter().map(Into::into).collect());
    }

    /// Build a claim set from an extractor's JSON object.
    ///
    /// Categories whose value is not an array are dropped without error.
    /// Array elements are coerced to strings: JSON strings keep their
    /// content, anything else takes the display form extractors' own tooling
    /// prints (`None`, `True`, `{'a': 1}`). A payload that is not an object
    /// yields an empty set.
    pub fn from_json(value: &Value) -> Self {
        let mut set = Self::new();
        let Some(object) = value.as_object() else {
            tracing::debug!("Claims payload is not an object, nothing to validate");
            return set;
        };

        for (category, items) in object {
            match items {
                Value::Array(items) => {
                    set.insert(category.clone(), items.iter().map(claim_text));
                }
                _ => {
                    tracing::debug!(category = %category, "Skipping category that is not a list");
                }
            }
        }

        set
    }

    /// Parse a JSON document into a claim set (see [`ClaimSet::from_json`]).
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_json(&value))
    }

    /// Iterate categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(category, claims)| (category.as_str(), claims.as_slice()))
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of claims across all categories (duplicates included).
    pub fn claim_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

fn claim_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => display_form(other),
    }
}

/// Literal display form: `None`/`True`/`False`, quoted nested strings,
/// `", "` separators and `'key': value` pairs.
fn display_form(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quoted(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(display_form).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let pairs: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quoted(k), display_form(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
    }
}

/// Single-quoted unless the text contains a single quote and no double quote.
fn quoted(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
