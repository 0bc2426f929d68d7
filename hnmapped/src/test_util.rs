//! Test utilities
//!
//! Fixtures and an in-memory data source used to test the `hnmapped` library.
//! These are not part of the supported api and are subject to change.
//!
#![doc(hidden)]

use std::{collections::HashMap, time::Duration};

use parking_lot::Mutex;
use snafu::prelude::*;
use tracing::debug;

use crate::{Result, months::MonthKey, posts::RawPost, prelude::*, source::DataSource};

// =============================================================================
// Fixtures
// =============================================================================

/// Parses a month key, panicking on bad input. Test use only.
#[doc(hidden)]
pub fn month(text: &str) -> MonthKey {
    match text.parse() {
        Ok(month) => month,
        Err(err) => panic!("bad month {text:?}: {err}"),
    }
}

/// H-1B post in New York, fresh, "Looking for engineers"
#[doc(hidden)]
pub fn nyc_engineers() -> RawPost {
    RawPost {
        url: "https://news.ycombinator.com/item?id=7324236".into(),
        user: "acme".into(),
        full_html: "<p>Looking for engineers</p>".into(),
        address: Some("NYC".into()),
        lat: Some(40.7128),
        lon: Some(-74.006),
        h1b: true,
        freshness: true,
        ..Default::default()
    }
}

/// A mixed month: flags, a post without address, a post with an address but
/// no coordinates, two posts sharing a position.
#[doc(hidden)]
pub fn sample_posts() -> Vec<RawPost> {
    vec![
        nyc_engineers(),
        RawPost {
            url: "https://news.ycombinator.com/item?id=7324300".into(),
            user: "remoteco".into(),
            full_html: "<p>Remote <b>Rust</b> developers</p><p>Anywhere</p>".into(),
            remote: true,
            freshness: true,
            ..Default::default()
        },
        RawPost {
            url: "https://news.ycombinator.com/item?id=7324400".into(),
            user: "sfstartup".into(),
            full_html: "<p>San Francisco | Interns welcome | <a href=\"https://sf.example/rust\">jobs</a></p>".into(),
            address: Some("San Francisco, CA, USA".into()),
            lat: Some(37.7749),
            lon: Some(-122.4194),
            intern: true,
            h1b: true,
            ..Default::default()
        },
        RawPost {
            url: "https://news.ycombinator.com/item?id=7324500".into(),
            user: "sfbigco".into(),
            full_html: "<p>San Francisco, Python and Go</p>".into(),
            address: Some("San Francisco, CA, USA".into()),
            lat: Some(37.7749),
            lon: Some(-122.4194),
            remote: true,
            freshness: true,
            ..Default::default()
        },
        RawPost {
            url: "https://news.ycombinator.com/item?id=7324600".into(),
            user: "berlin".into(),
            full_html: "<p>Berlin, Germany. Rust and C++</p>".into(),
            address: Some("Berlin, Germany".into()),
            ..Default::default()
        },
    ]
}

// =============================================================================
// MemorySource
// =============================================================================

/// In-memory data source with optional delays per month.
///
/// The nth fetch of a month waits for the nth delay; the last delay repeats.
/// Delays use `tokio::time::sleep`, so tests with a paused clock can order
/// responses deterministically.
#[doc(hidden)]
#[derive(Default)]
pub struct MemorySource {
    months: HashMap<MonthKey, (Vec<Duration>, Vec<RawPost>)>,
    fetched: Mutex<Vec<MonthKey>>,
}

impl MemorySource {
    pub fn with_month(self, month: MonthKey, posts: Vec<RawPost>) -> Self {
        self.with_delayed_month(month, Duration::ZERO, posts)
    }

    pub fn with_delayed_month(self, month: MonthKey, delay: Duration, posts: Vec<RawPost>) -> Self {
        self.with_fetch_delays(month, [delay], posts)
    }

    pub fn with_fetch_delays(
        mut self,
        month: MonthKey,
        delays: impl IntoIterator<Item = Duration>,
        posts: Vec<RawPost>,
    ) -> Self {
        self.months.insert(month, (delays.into_iter().collect(), posts));
        self
    }

    /// Months fetched so far, in request order
    pub fn fetched(&self) -> Vec<MonthKey> {
        self.fetched.lock().clone()
    }
}

impl DataSource for MemorySource {
    async fn fetch(&self, month: &MonthKey) -> Result<Vec<RawPost>> {
        let nth = {
            let mut fetched = self.fetched.lock();
            let nth = fetched.iter().filter(|seen| *seen == month).count();
            fetched.push(*month);
            nth
        };
        let (delays, posts) = self.months.get(month).context(NoDataSnafu {
            month: month.to_string(),
        })?;
        let delay = delays.get(nth).or(delays.last()).copied().unwrap_or_default();
        if !delay.is_zero() {
            debug!(%month, ?delay, "delaying fetch");
            tokio::time::sleep(delay).await;
        }
        Ok(posts.clone())
    }

    async fn available_months(&self) -> Result<Vec<MonthKey>> {
        let mut months: Vec<MonthKey> = self.months.keys().copied().collect();
        months.sort_unstable();
        Ok(months)
    }
}
