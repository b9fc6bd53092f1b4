// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! List query shorthand.

use serde::{Deserialize, Serialize};

/// View used when no query text is given: every item, default order
pub const DEFAULT_VIEW_XML: &str = "<View><Query></Query></View>";

/// A CAML query as sent to the host's `get_items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CamlQuery {
    view_xml: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder_server_relative_url: Option<String>,
    #[serde(default)]
    dates_in_utc: bool,
}

impl Default for CamlQuery {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_XML)
    }
}

impl CamlQuery {
    /// Query with the given view xml
    pub fn new(view_xml: impl Into<String>) -> Self {
        Self {
            view_xml: view_xml.into(),
            folder_server_relative_url: None,
            dates_in_utc: false,
        }
    }

    /// The view xml
    pub fn view_xml(&self) -> &str {
        &self.view_xml
    }

    /// Replace the view xml
    pub fn set_view_xml(&mut self, view_xml: impl Into<String>) {
        self.view_xml = view_xml.into();
    }

    /// Folder the query is scoped to
    pub fn folder_server_relative_url(&self) -> Option<&str> {
        self.folder_server_relative_url.as_deref()
    }

    /// Scope the query to a folder
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder_server_relative_url = Some(folder.into());
        self
    }

    /// Whether dates come back in UTC
    pub fn dates_in_utc(&self) -> bool {
        self.dates_in_utc
    }

    /// Ask for dates in UTC
    pub fn with_dates_in_utc(mut self, dates_in_utc: bool) -> Self {
        self.dates_in_utc = dates_in_utc;
        self
    }
}

/// A host list able to run a CAML query.
pub trait ListSource {
    /// Item collection returned by the host
    type Items;

    /// Queue `query` and return the (not yet loaded) item collection
    fn get_items(&self, query: CamlQuery) -> Self::Items;
}

/// Shorthand over [`ListSource::get_items`].
pub trait ListExt: ListSource {
    /// Query the list with `query_text` as view xml.
    ///
    /// `None` or empty text selects [`DEFAULT_VIEW_XML`].
    fn query_result(&self, query_text: Option<&str>) -> Self::Items {
        let view_xml = query_text
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_VIEW_XML);
        self.get_items(CamlQuery::new(view_xml))
    }
}

impl<L: ListSource + ?Sized> ListExt for L {}
