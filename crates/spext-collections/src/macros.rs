// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field map construction macro.

/// Creates a [`FieldMap`](crate::FieldMap) from name/value pairs.
///
/// Values go through `FieldValue::from`, so plain literals and the typed
/// field values can be mixed.
///
/// # Example
///
/// ```
/// use spext_collections::{fields, FieldValue};
///
/// let source = fields! {
///     "Title" => "Quarterly plan",
///     "Total" => 3,
/// };
/// assert_eq!(source.get("Total"), Some(&FieldValue::Number(3.0)));
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::FieldMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::FieldMap::new();
        $(map.insert(::std::string::String::from($name), $crate::FieldValue::from($value));)+
        map
    }};
}
