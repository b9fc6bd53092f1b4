// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Predicate compilers and the tagged predicate accepted by `filter_by`.

use crate::cursor::Enumerable;
use crate::field::{FieldValue, Fields};
use std::collections::BTreeMap;

/// Field name → expected value, as accepted by [`matches`].
pub type FieldMap = BTreeMap<String, FieldValue>;

/// One or more field names, as accepted by [`property`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldNames(Vec<String>);

impl FieldNames {
    /// The names in declaration order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for FieldNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for FieldNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for FieldNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for FieldNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for FieldNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Compile a field-equality predicate.
///
/// Every field of `source` must match. Lookup and person values compare by
/// lookup id, hyperlinks by their `url;#description` form; other values use
/// [`FieldValue::loose_eq`].
pub fn matches<T: Fields + ?Sized>(source: FieldMap) -> impl Fn(&T) -> bool {
    move |item: &T| {
        source
            .iter()
            .all(|(name, expected)| field_matches(item.get_item(name), expected))
    }
}

/// Compile a presence predicate: every named field must be truthy.
pub fn property<T: Fields + ?Sized>(names: impl Into<FieldNames>) -> impl Fn(&T) -> bool {
    let names = names.into();
    move |item: &T| names.0.iter().all(|name| item.get_item(name).is_truthy())
}

fn field_matches(actual: FieldValue, expected: &FieldValue) -> bool {
    match actual {
        FieldValue::Lookup(value) => lookup_matches(value.lookup_id, expected),
        FieldValue::User(value) => lookup_matches(value.lookup_id, expected),
        FieldValue::Url(value) => {
            let composite = FieldValue::Text(value.composite());
            match expected {
                FieldValue::Url(other) => composite.loose_eq(&FieldValue::Text(other.composite())),
                other => composite.loose_eq(other),
            }
        }
        other => other.loose_eq(expected),
    }
}

fn lookup_matches(lookup_id: i64, expected: &FieldValue) -> bool {
    let id = FieldValue::from(lookup_id);
    match expected {
        FieldValue::Principal(principal) => id.loose_eq(&FieldValue::from(principal.id)),
        FieldValue::Lookup(other) => id.loose_eq(&FieldValue::from(other.lookup_id)),
        FieldValue::User(other) => id.loose_eq(&FieldValue::from(other.lookup_id)),
        other => id.loose_eq(other),
    }
}

/// Canonical predicate shape: `(item, index, collection) -> bool`.
pub type Iteratee<'a, C> =
    Box<dyn Fn(&<C as Enumerable>::Item, usize, &C) -> bool + 'a>;

/// The three interchangeable predicate forms.
pub enum Predicate<'a, C: Enumerable + ?Sized> {
    /// Arbitrary function of item, index and collection
    Function(Iteratee<'a, C>),
    /// Field-equality map
    Matches(FieldMap),
    /// Field names that must be present and truthy
    Property(FieldNames),
}

impl<'a, C: Enumerable + ?Sized> Predicate<'a, C> {
    /// Wrap a function predicate
    pub fn function<F>(predicate: F) -> Self
    where
        F: Fn(&C::Item, usize, &C) -> bool + 'a,
    {
        Predicate::Function(Box::new(predicate))
    }

    /// Resolve into the canonical function predicate.
    pub fn resolve(self) -> Iteratee<'a, C>
    where
        C: 'a,
        C::Item: Fields + 'a,
    {
        match self {
            Predicate::Function(predicate) => predicate,
            Predicate::Matches(source) => {
                let test = matches::<C::Item>(source);
                Box::new(move |item: &C::Item, _: usize, _: &C| test(item))
            }
            Predicate::Property(names) => {
                let test = property::<C::Item>(names);
                Box::new(move |item: &C::Item, _: usize, _: &C| test(item))
            }
        }
    }
}

impl<C: Enumerable + ?Sized> std::fmt::Debug for Predicate<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Function(_) => f.write_str("Predicate::Function"),
            Predicate::Matches(source) => f.debug_tuple("Predicate::Matches").field(source).finish(),
            Predicate::Property(names) => f.debug_tuple("Predicate::Property").field(names).finish(),
        }
    }
}

impl<C: Enumerable + ?Sized> From<FieldMap> for Predicate<'_, C> {
    fn from(source: FieldMap) -> Self {
        Predicate::Matches(source)
    }
}

impl<C: Enumerable + ?Sized> From<FieldNames> for Predicate<'_, C> {
    fn from(names: FieldNames) -> Self {
        Predicate::Property(names)
    }
}

impl<C: Enumerable + ?Sized> From<&str> for Predicate<'_, C> {
    fn from(name: &str) -> Self {
        Predicate::Property(name.into())
    }
}

impl<C: Enumerable + ?Sized> From<String> for Predicate<'_, C> {
    fn from(name: String) -> Self {
        Predicate::Property(name.into())
    }
}

impl<C: Enumerable + ?Sized> From<Vec<&str>> for Predicate<'_, C> {
    fn from(names: Vec<&str>) -> Self {
        Predicate::Property(names.into())
    }
}

impl<C: Enumerable + ?Sized> From<Vec<String>> for Predicate<'_, C> {
    fn from(names: Vec<String>) -> Self {
        Predicate::Property(names.into())
    }
}

impl<C: Enumerable + ?Sized, const N: usize> From<[&str; N]> for Predicate<'_, C> {
    fn from(names: [&str; N]) -> Self {
        Predicate::Property(names.into())
    }
}
