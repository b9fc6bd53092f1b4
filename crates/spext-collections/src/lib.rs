// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spext-collections
//!
//! Functional operations over cursor-style collections.
//!
//! Host collections expose their elements only through a restartable
//! [`Enumerable::get_enumerator`] that yields a single-pass [`Cursor`]. This
//! crate layers a uniform functional surface on top of that protocol through
//! the [`CollectionExt`] extension trait, plus the field-level predicate
//! compilers ([`matches`], [`property`]) used to filter list items.
//!
//! ```rust
//! use spext_collections::{fields, CollectionExt, FieldValue};
//! use std::collections::HashMap;
//!
//! type Item = HashMap<String, FieldValue>;
//!
//! let items: Vec<Item> = vec![
//!     [("Status".to_string(), "Open".into())].into(),
//!     [("Status".to_string(), "Closed".into())].into(),
//!     [("Status".to_string(), "Open".into())].into(),
//! ];
//!
//! let open = items.filter_by(fields! { "Status" => "Open" });
//! assert_eq!(open.len(), 2);
//!
//! let by_status = items.group_by(|item| item["Status"].to_string());
//! assert_eq!(by_status.len(), 2);
//! ```

#![warn(missing_docs)]

mod collection;
mod cursor;
mod field;
mod group;
mod macros;
mod predicate;

pub use collection::{CollectionExt, Flow};
pub use cursor::{from_fn, Cursor, CursorIter, Enumerable, FromFn, IterCursor, SliceCursor};
pub use field::{FieldLookupValue, FieldUrlValue, FieldUserValue, FieldValue, Fields, Principal};
pub use group::Groups;
pub use predicate::{matches, property, FieldMap, FieldNames, Iteratee, Predicate};
