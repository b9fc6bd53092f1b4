// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Field values exposed by list-item-like elements.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Value of a lookup field (a reference to an item in another list).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLookupValue {
    /// Id of the referenced item
    pub lookup_id: i64,
    /// Display value of the referenced item
    #[serde(default)]
    pub lookup_value: Option<String>,
}

/// Value of a person field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUserValue {
    /// Id of the referenced user in the site user list
    pub lookup_id: i64,
    /// Display name
    #[serde(default)]
    pub lookup_value: Option<String>,
    /// E-mail address
    #[serde(default)]
    pub email: Option<String>,
}

/// Value of a hyperlink field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUrlValue {
    /// Target address
    pub url: String,
    /// Link text
    #[serde(default)]
    pub description: Option<String>,
}

impl FieldUrlValue {
    /// The `url;#description` form used when comparing hyperlink values
    pub fn composite(&self) -> String {
        format!("{};#{}", self.url, self.description.as_deref().unwrap_or_default())
    }
}

/// A site principal, used as an expected value against person fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Principal id
    pub id: i64,
    /// Login name
    pub login_name: String,
    /// Display name
    #[serde(default)]
    pub title: Option<String>,
}

/// A field value as returned by `get_item`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Missing or empty
    #[default]
    Null,
    /// Yes/No
    Bool(bool),
    /// Number, currency, counter
    Number(f64),
    /// Text, choice, note
    Text(String),
    /// Lookup reference
    Lookup(FieldLookupValue),
    /// Person reference
    User(FieldUserValue),
    /// Hyperlink
    Url(FieldUrlValue),
    /// Site principal
    Principal(Principal),
    /// Anything else, kept as raw JSON
    Json(serde_json::Value),
}

impl FieldValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Truthiness used by presence predicates.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => !n.is_nan() && *n != 0.0,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Lookup(_)
            | FieldValue::User(_)
            | FieldValue::Url(_)
            | FieldValue::Principal(_)
            | FieldValue::Json(_) => true,
        }
    }

    /// Loose equality between plain values.
    ///
    /// Numbers and text compare numerically, booleans count as 1/0 against
    /// numbers and text, everything else compares structurally.
    pub fn loose_eq(&self, other: &FieldValue) -> bool {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Number(a), Number(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Number(n), Text(s)) | (Text(s), Number(n)) => {
                text_to_number(s).is_some_and(|parsed| parsed == *n)
            }
            (Bool(b), other) | (other, Bool(b)) if matches!(other, Number(_) | Text(_)) => {
                Number(if *b { 1.0 } else { 0.0 }).loose_eq(other)
            }
            (a, b) => a == b,
        }
    }
}

fn text_to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Lookup(v) => write!(f, "{};#{}", v.lookup_id, v.lookup_value.as_deref().unwrap_or_default()),
            FieldValue::User(v) => write!(f, "{};#{}", v.lookup_id, v.lookup_value.as_deref().unwrap_or_default()),
            FieldValue::Url(v) => write!(f, "{}", v.composite()),
            FieldValue::Principal(p) => write!(f, "{}", p.login_name),
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<FieldLookupValue> for FieldValue {
    fn from(value: FieldLookupValue) -> Self {
        FieldValue::Lookup(value)
    }
}

impl From<FieldUserValue> for FieldValue {
    fn from(value: FieldUserValue) -> Self {
        FieldValue::User(value)
    }
}

impl From<FieldUrlValue> for FieldValue {
    fn from(value: FieldUrlValue) -> Self {
        FieldValue::Url(value)
    }
}

impl From<Principal> for FieldValue {
    fn from(value: Principal) -> Self {
        FieldValue::Principal(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => FieldValue::Null,
            Json::Bool(b) => FieldValue::Bool(*b),
            Json::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            Json::String(s) => FieldValue::Text(s.clone()),
            Json::Object(obj) => {
                let typed = if obj.contains_key("email") {
                    serde_json::from_value(value.clone()).ok().map(FieldValue::User)
                } else if obj.contains_key("lookupId") {
                    serde_json::from_value(value.clone()).ok().map(FieldValue::Lookup)
                } else if obj.contains_key("url") {
                    serde_json::from_value(value.clone()).ok().map(FieldValue::Url)
                } else {
                    None
                };
                typed.unwrap_or_else(|| FieldValue::Json(value.clone()))
            }
            Json::Array(_) => FieldValue::Json(value.clone()),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::from(&value)
    }
}

/// Generic "get field by name" access on an element.
///
/// Missing fields read as [`FieldValue::Null`].
pub trait Fields {
    /// Read the field called `name`
    fn get_item(&self, name: &str) -> FieldValue;
}

impl<T: Fields + ?Sized> Fields for &T {
    fn get_item(&self, name: &str) -> FieldValue {
        (**self).get_item(name)
    }
}

impl<T: Fields + ?Sized> Fields for Arc<T> {
    fn get_item(&self, name: &str) -> FieldValue {
        (**self).get_item(name)
    }
}

impl<T: Fields + ?Sized> Fields for Rc<T> {
    fn get_item(&self, name: &str) -> FieldValue {
        (**self).get_item(name)
    }
}

impl<T: Fields + ?Sized> Fields for Box<T> {
    fn get_item(&self, name: &str) -> FieldValue {
        (**self).get_item(name)
    }
}

impl<S: std::hash::BuildHasher> Fields for HashMap<String, FieldValue, S> {
    fn get_item(&self, name: &str) -> FieldValue {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl Fields for BTreeMap<String, FieldValue> {
    fn get_item(&self, name: &str) -> FieldValue {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl Fields for serde_json::Map<String, serde_json::Value> {
    fn get_item(&self, name: &str) -> FieldValue {
        self.get(name).map(FieldValue::from).unwrap_or_default()
    }
}
