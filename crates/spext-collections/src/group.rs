// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Ordered group table produced by `group_by`.

use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Elements grouped by key.
///
/// Groups keep the order in which their keys were first seen, and each
/// group keeps its elements in source order.
#[derive(Debug, Clone)]
pub struct Groups<K, T> {
    index: FxHashMap<K, usize>,
    groups: Vec<(K, Vec<T>)>,
}

impl<K, T> Groups<K, T> {
    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no element has been grouped
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.iter().map(|(key, _)| key)
    }

    /// `(key, elements)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[T])> {
        self.groups.iter().map(|(key, items)| (key, items.as_slice()))
    }

    /// All elements, group after group
    pub fn flatten(self) -> Vec<T> {
        self.groups.into_iter().flat_map(|(_, items)| items).collect()
    }
}

impl<K: Hash + Eq + Clone, T> Groups<K, T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            groups: Vec::new(),
        }
    }

    /// Append `item` to the group for `key`
    pub fn push(&mut self, key: K, item: T) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(item),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![item]));
            }
        }
    }

    /// Elements grouped under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&[T]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .map(|&slot| self.groups[slot].1.as_slice())
    }
}

impl<K: Hash + Eq + Clone, T> Default for Groups<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> IntoIterator for Groups<K, T> {
    type Item = (K, Vec<T>);
    type IntoIter = std::vec::IntoIter<(K, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
