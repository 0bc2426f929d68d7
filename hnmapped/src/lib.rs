/*
 * hnmapped - map and list views of "Who is hiring?" job posts
 * github.com/stevelr/hnmapped
 *
 * SPDX-FileCopyrightText: 2025-2026 Steve Schoettler
 * SPDX-License-Identifier: Apache-2.0
 */
//! # hnmapped
//!
//! Filter and render the job posts of a monthly "Who is hiring?" thread,
//! either as markers on a map or as a list of rendered posts.
//!
//! ## Features
//!
//! - month files loaded from a directory or over http, with an optional cache
//! - tri-state (any/yes/no) and regular-expression filters
//! - search-term highlighting that leaves html tags alone
//! - debounced recompute, so a burst of keystrokes renders once
//! - map and list views behind small collaborator traits
//! - async session driver for interactive front-ends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hnmapped::prelude::*;
//! # async fn example() -> Result<(), HnMappedError> {
//!
//! let source = DirSource::new("web/data");
//! let months = MonthList::new(source.available_months().await?);
//! let month = months.latest().cloned().expect("at least one month");
//!
//! let mut store = PostStore::default();
//! let dataset = store.load(month, source.fetch(&month).await?);
//!
//! let mut filters = FilterState::default();
//! filters.set(FilterKey::Remote, "yes")?;
//! filters.set(FilterKey::TextFilter, "rust")?;
//!
//! let mut list = HtmlList::default();
//! let mut map = MapCanvas::default();
//! let result = render(&dataset, &filters, ViewMode::List, &mut list, &mut map)?;
//! println!("Displaying {} posts", result.count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Structure
//!
//! The pipeline is split into pure pieces and one stateful owner:
//!
//! - [`posts`]: raw records, derived plain text, the active dataset
//! - [`filters`]: filter state and the [`matches`](filters::matches) predicate
//! - [`render`]: one pass over a dataset into list or map collaborators
//! - [`views`]: map/list mode and its toggle
//! - [`app`]: application state, event dispatch, debounce and the async session
//! - [`source`]: where month files come from
//!
//#![warn(clippy::pedantic)] // experimental
//#![warn(clippy::nursery)] // experimental
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::missing_const_for_fn)] //  nursery function
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::future_not_send)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::literal_string_with_formatting_args)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::min_ident_chars)]
#![warn(clippy::needless_raw_strings)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::ref_option)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unnecessary_wraps)]
#![warn(clippy::unused_async)]

pub mod app;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod html;
pub mod months;
pub mod posts;
pub mod render;
pub mod source;
pub mod surfaces;
pub mod template;
pub mod views;

pub mod test_util;

/// Result type alias using `HnMappedError` as the default error.
pub type Result<T, E = crate::error::HnMappedError> = std::result::Result<T, E>;

/// Prelude module - import (nearly) all the things with `use hnmapped::prelude::*;`
pub mod prelude {
    pub use super::DEFAULT_DEBOUNCE_MS;
    // Error types
    pub use crate::error::*;
    #[cfg(feature = "http")]
    pub use crate::source::HttpSource;
    pub use crate::{
        // Application state and session
        app::{App, AppConfig, Command, Event, Session, SessionHandle, Status},
        // Debounce timer
        debounce::Debouncer,
        // Filters and the predicate
        filters::{FilterKey, FilterState, TextPattern, TriState, matches},
        // Months
        months::{MonthEntry, MonthKey, MonthList},
        // Posts and datasets
        posts::{Dataset, Post, PostStore, RawPost},
        // Rendering
        render::{
            Bounds, LatLng, ListSurface, MapSurface, Marker, RenderResult, render, type_label,
        },
        // Data sources
        source::{CachedSource, DataSource, DirSource},
        // Concrete surfaces
        surfaces::{HtmlList, MapCanvas},
        // View mode
        views::{ViewMode, ViewModeController},
    };
}

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default quiet period before a filter change triggers a recompute (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub(crate) mod config {
    /// Environment variable overriding the debounce quiet period (milliseconds)
    pub const DEBOUNCE_MS_ENV: &str = "HNMAPPED_DEBOUNCE_MS";

    /// css class wrapped around highlighted search terms
    pub const HIGHLIGHT_CLASS: &str = "highlight";

    /// Separator between flags in a post's type label
    pub const TYPE_LABEL_SEPARATOR: &str = "/";

    /// Location shown for posts without an address
    pub const NO_LOCATION: &str = "None";

    /// Radius (degrees) of the circle coincident markers are spread on
    pub const SPIDERFY_RADIUS_DEG: f64 = 0.0005;
}
