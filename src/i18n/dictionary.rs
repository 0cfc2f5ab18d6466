//! Locale dictionaries: nested JSON trees of strings and their flat,
//! dot-path form.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Separator between path segments of a flat key
pub const KEY_SEPARATOR: char = '.';

/// Dot-path key -> string value
pub type FlatDictionary = BTreeMap<String, String>;

/// A locale dictionary node: a string leaf or a branch of named children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocaleNode {
    Leaf(String),
    Branch(BTreeMap<String, LocaleNode>),
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("locale root must be an object, found {0}")]
    RootNotObject(&'static str),

    #[error("unsupported {kind} value at '{path}': locale values must be strings or objects")]
    UnsupportedValue { path: String, kind: &'static str },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{KEY_SEPARATOR}{key}")
    }
}

impl LocaleNode {
    pub fn empty() -> Self {
        LocaleNode::Branch(BTreeMap::new())
    }

    /// Parse a locale file's contents
    pub fn from_json_str(contents: &str) -> Result<Self, DictionaryError> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_json(&value)
    }

    /// Convert a JSON value; the root must be an object.
    ///
    /// Arrays, numbers, booleans and nulls are rejected with the dot path of
    /// the offending entry.
    pub fn from_json(value: &Value) -> Result<Self, DictionaryError> {
        match value {
            Value::Object(_) => Self::from_json_at(value, ""),
            other => Err(DictionaryError::RootNotObject(kind_of(other))),
        }
    }

    fn from_json_at(value: &Value, path: &str) -> Result<Self, DictionaryError> {
        match value {
            Value::String(s) => Ok(LocaleNode::Leaf(s.clone())),
            Value::Object(map) => {
                let mut children = BTreeMap::new();
                for (key, child) in map {
                    let child_path = join_key(path, key);
                    children.insert(key.clone(), Self::from_json_at(child, &child_path)?);
                }
                Ok(LocaleNode::Branch(children))
            }
            other => Err(DictionaryError::UnsupportedValue {
                path: path.to_string(),
                kind: kind_of(other),
            }),
        }
    }

    /// Pretty JSON with 2-space indentation and a trailing newline
    pub fn to_json_string(&self) -> Result<String, DictionaryError> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

/// Flatten a dictionary into dot-path keys.
///
/// Empty branches produce no entries.
pub fn flatten(node: &LocaleNode) -> FlatDictionary {
    let mut result = FlatDictionary::new();
    flatten_into(node, "", &mut result);
    result
}

fn flatten_into(node: &LocaleNode, prefix: &str, result: &mut FlatDictionary) {
    match node {
        LocaleNode::Leaf(value) => {
            if !prefix.is_empty() {
                result.insert(prefix.to_string(), value.clone());
            }
        }
        LocaleNode::Branch(children) => {
            for (key, child) in children {
                flatten_into(child, &join_key(prefix, key), result);
            }
        }
    }
}

/// Rebuild the nested form of a flat dictionary.
///
/// When one key is a prefix of another (`a` and `a.b`) the branch wins and
/// the leaf is dropped with a warning.
pub fn unflatten(flat: &FlatDictionary) -> LocaleNode {
    let mut root = BTreeMap::new();

    for (key, value) in flat {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut current = &mut root;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(LocaleNode::empty);
            if let LocaleNode::Leaf(dropped) = entry {
                warn!(
                    "Locale key '{}' is both a value and a group; dropping value '{}'",
                    segment, dropped
                );
                *entry = LocaleNode::empty();
            }
            current = match entry {
                LocaleNode::Branch(children) => children,
                LocaleNode::Leaf(_) => unreachable!("leaf replaced by branch above"),
            };
        }

        match current.get(*last) {
            Some(LocaleNode::Branch(_)) => {
                warn!(
                    "Locale key '{}' is both a value and a group; dropping value '{}'",
                    key, value
                );
            }
            _ => {
                current.insert(last.to_string(), LocaleNode::Leaf(value.clone()));
            }
        }
    }

    LocaleNode::Branch(root)
}

/// Keys of `base` that still need a translation.
///
/// A key is missing when `existing` lacks it or holds an empty string; with
/// `force` every base key is returned.
pub fn missing_keys(base: &FlatDictionary, existing: &FlatDictionary, force: bool) -> Vec<String> {
    base.keys()
        .filter(|key| force || existing.get(*key).map_or(true, |value| value.is_empty()))
        .cloned()
        .collect()
}
