// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Cursor contract and the cursors shipped with the crate.
//!
//! A host collection never hands out its elements directly. It produces a
//! fresh [`Cursor`] per traversal, and the cursor is walked with the
//! advance-then-read protocol:
//!
//! ```rust
//! use spext_collections::{Cursor, Enumerable};
//!
//! let items = vec![1, 2, 3];
//! let mut cursor = items.get_enumerator();
//! let mut seen = Vec::new();
//! while cursor.advance() {
//!     seen.push(cursor.current());
//! }
//! assert_eq!(seen, items);
//! ```

/// A single-pass, forward-only traversal handle.
///
/// `current` is only meaningful after `advance` returned `true`. Once
/// `advance` has returned `false` the cursor is exhausted and callers must
/// not read from it again.
pub trait Cursor {
    /// Element type produced by the cursor
    type Item;

    /// Move to the next element, returning whether one exists
    fn advance(&mut self) -> bool;

    /// The element the cursor is positioned on
    fn current(&self) -> Self::Item;
}

/// A logical sequence that can only be traversed through a fresh cursor.
///
/// Each call to [`Enumerable::get_enumerator`] starts a new traversal, so the
/// collection is restartable even though none of its cursors are.
pub trait Enumerable {
    /// Element type of the collection
    type Item;

    /// Cursor type handed out per traversal
    type Cursor<'a>: Cursor<Item = Self::Item>
    where
        Self: 'a;

    /// Produce a cursor positioned before the first element
    fn get_enumerator(&self) -> Self::Cursor<'_>;
}

/// Cursor over a borrowed slice.
#[derive(Debug, Clone)]
pub struct SliceCursor<'a, T> {
    items: &'a [T],
    position: Option<usize>,
}

impl<'a, T> SliceCursor<'a, T> {
    /// Create a cursor positioned before the first element of `items`
    pub fn new(items: &'a [T]) -> Self {
        Self {
            items,
            position: None,
        }
    }
}

impl<T: Clone> Cursor for SliceCursor<'_, T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p.saturating_add(1));
        // Park one past the end so an exhausted cursor stays exhausted.
        self.position = Some(next.min(self.items.len()));
        next < self.items.len()
    }

    /// # Panics
    ///
    /// Panics when the cursor is not positioned on an element.
    fn current(&self) -> T {
        match self.position.and_then(|p| self.items.get(p)) {
            Some(item) => item.clone(),
            None => panic!("cursor is not positioned on an element"),
        }
    }
}

impl<T: Clone> Enumerable for [T] {
    type Item = T;
    type Cursor<'a>
        = SliceCursor<'a, T>
    where
        Self: 'a;

    fn get_enumerator(&self) -> SliceCursor<'_, T> {
        SliceCursor::new(self)
    }
}

impl<T: Clone> Enumerable for Vec<T> {
    type Item = T;
    type Cursor<'a>
        = SliceCursor<'a, T>
    where
        Self: 'a;

    fn get_enumerator(&self) -> SliceCursor<'_, T> {
        SliceCursor::new(self.as_slice())
    }
}

/// Cursor driven by an arbitrary iterator (paged or streamed sources).
#[derive(Debug)]
pub struct IterCursor<I: Iterator> {
    iter: I,
    current: Option<I::Item>,
}

impl<I: Iterator> IterCursor<I> {
    /// Wrap an iterator in the cursor protocol
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            current: None,
        }
    }
}

impl<I> Cursor for IterCursor<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    fn advance(&mut self) -> bool {
        self.current = self.iter.next();
        self.current.is_some()
    }

    /// # Panics
    ///
    /// Panics when the cursor is not positioned on an element.
    fn current(&self) -> I::Item {
        match &self.current {
            Some(item) => item.clone(),
            None => panic!("cursor is not positioned on an element"),
        }
    }
}

/// A restartable collection backed by an iterator factory.
///
/// Every traversal calls the factory again, which is how a paged or
/// network-backed source exposes itself as an [`Enumerable`].
#[derive(Debug, Clone)]
pub struct FromFn<F> {
    factory: F,
}

/// Build an [`Enumerable`] whose cursors come from `factory`.
pub fn from_fn<F, I>(factory: F) -> FromFn<F>
where
    F: Fn() -> I,
    I: Iterator,
    I::Item: Clone,
{
    FromFn { factory }
}

impl<F, I> Enumerable for FromFn<F>
where
    F: Fn() -> I,
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;
    type Cursor<'a>
        = IterCursor<I>
    where
        Self: 'a;

    fn get_enumerator(&self) -> IterCursor<I> {
        IterCursor::new((self.factory)())
    }
}

/// Adapts a cursor into a standard [`Iterator`].
#[derive(Debug)]
pub struct CursorIter<C> {
    cursor: C,
    done: bool,
}

impl<C: Cursor> CursorIter<C> {
    /// Wrap `cursor`; iteration starts at its next element
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<C::Item> {
        if self.done {
            return None;
        }
        if self.cursor.advance() {
            Some(self.cursor.current())
        } else {
            self.done = true;
            None
        }
    }
}

impl<C: Cursor> std::iter::FusedIterator for CursorIter<C> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_cursor_walks_in_order() {
        let items = [10, 20, 30];
        let mut cursor = SliceCursor::new(&items);
        assert!(cursor.advance());
        assert_eq!(cursor.current(), 10);
        assert!(cursor.advance());
        assert!(cursor.advance());
        assert_eq!(cursor.current(), 30);
        assert!(!cursor.advance());
    }

    #[test]
    fn test_exhausted_slice_cursor_stays_exhausted() {
        let items = [1];
        let mut cursor = SliceCursor::new(&items);
        assert!(cursor.advance());
        assert!(!cursor.advance());
        assert!(!cursor.advance());
        assert!(!cursor.advance());
    }

    #[test]
    fn test_empty_slice_cursor() {
        let items: [u8; 0] = [];
        let mut cursor = SliceCursor::new(&items);
        assert!(!cursor.advance());
    }

    #[test]
    #[should_panic(expected = "not positioned")]
    fn test_current_before_advance_panics() {
        let items = [1];
        let cursor = SliceCursor::new(&items);
        let _ = cursor.current();
    }

    #[test]
    fn test_from_fn_is_restartable() {
        let pages = from_fn(|| (1..=3).map(|n| n * 2));
        let first: Vec<_> = CursorIter::new(pages.get_enumerator()).collect();
        let second: Vec<_> = CursorIter::new(pages.get_enumerator()).collect();
        assert_eq!(first, vec![2, 4, 6]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cursor_iter_is_fused() {
        let items = vec!["a"];
        let mut iter = CursorIter::new(items.get_enumerator());
        assert_eq!(iter.next(), Some("a"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }
}
