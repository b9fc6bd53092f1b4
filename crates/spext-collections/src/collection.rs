// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Functional surface over any [`Enumerable`].
//!
//! Every operation requests a fresh cursor. Short-circuiting traversals go
//! through [`CollectionExt::for_each`]; `reduce` folds over
//! [`CollectionExt::items`] because it always visits every element, and
//! `first_or_default` reads a single element.

use crate::cursor::{Cursor, CursorIter, Enumerable};
use crate::field::Fields;
use crate::group::Groups;
use crate::predicate::Predicate;
use std::hash::Hash;
use std::ops::ControlFlow;
use tracing::trace;

/// Return value of an iteratee passed to [`CollectionExt::for_each`].
///
/// `()` always continues, `false` stops the traversal, and
/// [`ControlFlow::Break`] stops it too.
pub trait Flow {
    /// Whether the traversal should visit the next element
    fn keep_going(self) -> bool;
}

impl Flow for () {
    fn keep_going(self) -> bool {
        true
    }
}

impl Flow for bool {
    fn keep_going(self) -> bool {
        self
    }
}

impl<B, C> Flow for ControlFlow<B, C> {
    fn keep_going(self) -> bool {
        matches!(self, ControlFlow::Continue(_))
    }
}

/// Functional operations available on every [`Enumerable`].
///
/// ```rust
/// use spext_collections::CollectionExt;
///
/// let totals = vec![4, 8, 15, 16, 23, 42];
/// assert!(totals.some(|n, _, _| *n > 40));
/// assert_eq!(totals.find(|n, _, _| n % 2 == 1), Some(15));
/// assert_eq!(totals.reduce(|sum, n, _, _| sum + n, 0), 108);
/// ```
pub trait CollectionExt: Enumerable {
    /// Call `iteratee(element, index, collection)` for each element.
    ///
    /// Returning `false` (or `ControlFlow::Break`) from the iteratee stops
    /// the traversal without visiting the remaining elements.
    fn for_each<F, R>(&self, mut iteratee: F)
    where
        F: FnMut(Self::Item, usize, &Self) -> R,
        R: Flow,
    {
        let mut cursor = self.get_enumerator();
        let mut index = 0;
        while cursor.advance() {
            if !iteratee(cursor.current(), index, self).keep_going() {
                trace!(index, "traversal short-circuited");
                return;
            }
            index += 1;
        }
    }

    /// Like [`for_each`](CollectionExt::for_each) for fallible iteratees.
    ///
    /// The first `Err` stops the traversal and is returned unchanged.
    fn try_for_each<F, R, E>(&self, mut iteratee: F) -> Result<(), E>
    where
        F: FnMut(Self::Item, usize, &Self) -> Result<R, E>,
        R: Flow,
    {
        let mut failure = None;
        self.for_each(|item, index, collection| match iteratee(item, index, collection) {
            Ok(flow) => flow.keep_going(),
            Err(e) => {
                failure = Some(e);
                false
            }
        });
        failure.map_or(Ok(()), Err)
    }

    /// Legacy traversal with a `(index, element)` callback.
    #[deprecated(note = "use `for_each` instead")]
    fn each<F, R>(&self, mut callback: F)
    where
        F: FnMut(usize, Self::Item) -> R,
        R: Flow,
    {
        self.for_each(|item, index, _| callback(index, item));
    }

    /// Map every element, preserving source order.
    fn map<U, F>(&self, mut iteratee: F) -> Vec<U>
    where
        F: FnMut(Self::Item, usize, &Self) -> U,
    {
        let mut mapped = Vec::new();
        self.for_each(|item, index, collection| {
            mapped.push(iteratee(item, index, collection));
        });
        mapped
    }

    /// Materialize the whole collection.
    fn to_array(&self) -> Vec<Self::Item> {
        let mut items = Vec::new();
        self.for_each(|item, _, _| items.push(item));
        items
    }

    /// Iterate the collection through a fresh cursor.
    fn items(&self) -> CursorIter<Self::Cursor<'_>> {
        CursorIter::new(self.get_enumerator())
    }

    /// Whether at least one element satisfies `predicate`.
    fn some<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Item, usize, &Self) -> bool,
    {
        let mut found = false;
        self.for_each(|item, index, collection| {
            found = predicate(&item, index, collection);
            !found
        });
        found
    }

    /// Whether every element satisfies `predicate`.
    ///
    /// An empty collection yields `false`.
    fn every<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Item, usize, &Self) -> bool,
    {
        let mut has_items = false;
        let mut all = true;
        self.for_each(|item, index, collection| {
            has_items = true;
            all = predicate(&item, index, collection);
            all
        });
        has_items && all
    }

    /// The first element satisfying `predicate`.
    fn find<P>(&self, mut predicate: P) -> Option<Self::Item>
    where
        P: FnMut(&Self::Item, usize, &Self) -> bool,
    {
        let mut found = None;
        self.for_each(|item, index, collection| {
            if predicate(&item, index, collection) {
                found = Some(item);
                return false;
            }
            true
        });
        found
    }

    /// The first element, if any.
    fn first_or_default(&self) -> Option<Self::Item> {
        let mut cursor = self.get_enumerator();
        cursor.advance().then(|| cursor.current())
    }

    /// The first element, only if it satisfies `predicate`.
    ///
    /// Only the first element is tested. Unlike [`find`](CollectionExt::find)
    /// this never looks further, so `[A, B]` with a predicate that rejects
    /// `A` and accepts `B` yields `None`.
    fn first_or_default_by<P>(&self, predicate: P) -> Option<Self::Item>
    where
        P: FnOnce(&Self::Item, usize, &Self) -> bool,
    {
        let first = self.first_or_default()?;
        predicate(&first, 0, self).then_some(first)
    }

    /// Left fold: `iteratee(accumulator, element, index, collection)`.
    fn reduce<A, F>(&self, mut iteratee: F, initial: A) -> A
    where
        F: FnMut(A, Self::Item, usize, &Self) -> A,
    {
        self.items()
            .enumerate()
            .fold(initial, |acc, (index, item)| iteratee(acc, item, index, self))
    }

    /// Group elements by `key(element)`.
    fn group_by<K, F>(&self, mut key: F) -> Groups<K, Self::Item>
    where
        K: Hash + Eq + Clone,
        F: FnMut(&Self::Item) -> K,
    {
        self.reduce(
            |mut groups, item, _, _| {
                groups.push(key(&item), item);
                groups
            },
            Groups::new(),
        )
    }

    /// Elements satisfying a function predicate, in source order.
    fn filter<P>(&self, mut predicate: P) -> Vec<Self::Item>
    where
        P: FnMut(&Self::Item, usize, &Self) -> bool,
    {
        let mut kept = Vec::new();
        self.for_each(|item, index, collection| {
            if predicate(&item, index, collection) {
                kept.push(item);
            }
        });
        kept
    }

    /// Elements satisfying any [`Predicate`] form.
    ///
    /// ```rust
    /// use spext_collections::{fields, CollectionExt, FieldValue};
    /// use std::collections::HashMap;
    ///
    /// let rows: Vec<HashMap<String, FieldValue>> = vec![
    ///     [("Title".to_string(), FieldValue::from("a"))].into(),
    ///     [("Title".to_string(), FieldValue::from(""))].into(),
    /// ];
    /// assert_eq!(rows.filter_by("Title").len(), 1);
    /// assert_eq!(rows.filter_by(fields! { "Title" => "" }).len(), 1);
    /// ```
    fn filter_by<'p>(&'p self, predicate: impl Into<Predicate<'p, Self>>) -> Vec<Self::Item>
    where
        Self::Item: Fields + 'p,
    {
        let predicate = predicate.into().resolve();
        self.filter(|item, index, collection| predicate(item, index, collection))
    }
}

impl<C: Enumerable + ?Sized> CollectionExt for C {}
