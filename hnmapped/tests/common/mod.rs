//! Shared test utilities for hnmapped integration tests
//!
//! - dataset construction from fixtures
//! - one-shot render helpers returning the surfaces
//! - session setup with an in-memory source
#![allow(dead_code)]

use std::time::Duration;

use hnmapped::prelude::*;
use hnmapped::test_util::{MemorySource, month, sample_posts};

pub use hnmapped::test_util::nyc_engineers;

pub const QUIET: Duration = Duration::from_millis(300);

/// Loads raw posts as the March 2014 dataset.
pub fn dataset(raw: Vec<RawPost>) -> std::sync::Arc<Dataset> {
    PostStore::default().load(month("2014-03"), raw)
}

pub fn sample_dataset() -> std::sync::Arc<Dataset> {
    dataset(sample_posts())
}

/// Builds a filter state from `key=value` pairs.
pub fn filters(pairs: &[(FilterKey, &str)]) -> FilterState {
    let mut filters = FilterState::default();
    for (key, value) in pairs {
        if let Err(err) = filters.set(*key, value) {
            panic!("bad filter {key}={value}: {err}");
        }
    }
    filters
}

/// Renders into fresh surfaces.
pub fn render_with(
    dataset: &Dataset,
    filters: &FilterState,
    mode: ViewMode,
) -> (RenderResult, HtmlList, MapCanvas) {
    let mut list = HtmlList::default();
    let mut map = MapCanvas::default();
    match render(dataset, filters, mode, &mut list, &mut map) {
        Ok(result) => (result, list, map),
        Err(err) => panic!("render failed: {err}"),
    }
}

pub fn app() -> App<HtmlList, MapCanvas> {
    App::new(
        AppConfig::default().debounce(QUIET),
        HtmlList::default(),
        MapCanvas::default(),
    )
}

/// Source with the sample posts as March 2014 and a single post as April 2014.
pub fn memory_source() -> MemorySource {
    MemorySource::default()
        .with_month(month("2014-03"), sample_posts())
        .with_month(month("2014-04"), vec![nyc_engineers()])
}
