//! # Posts and the post store
//!
//! A month file is a json array of [`RawPost`] records. Loading them through
//! [`PostStore::load`] produces [`Post`]s with the derived `full_text` field,
//! and makes the resulting [`Dataset`] the active one.
//!
//! Records are not validated beyond deserialization: missing fields take
//! default values, and an empty `address` counts as no address.

use std::{ops::Deref, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{html::strip_tags, months::MonthKey};

/// One record as stored in a month file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPost {
    /// Link to the post on the forum
    pub url: String,
    /// Author's user name
    pub user: String,
    /// Post body, html
    pub full_html: String,
    /// Geocoded address
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Employer sponsors H-1B visas
    pub h1b: bool,
    /// Internship position
    pub intern: bool,
    /// Remote work allowed
    pub remote: bool,
    /// Author did not post in the previous month's thread
    pub freshness: bool,
    /// Location as guessed from the post's first line, before geocoding
    pub location: Option<String>,
    /// Country short name of the geocoded address
    pub country: Option<String>,
}

/// A loaded post: the raw record plus text derived from its html.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    #[serde(flatten)]
    raw: RawPost,
    full_text: String,
}

impl Post {
    /// Builds a post, deriving `full_text` from `full_html`.
    pub fn new(raw: RawPost) -> Self {
        let full_text = strip_tags(&raw.full_html).into_owned();
        Self { raw, full_text }
    }

    /// Post body with markup replaced by spaces. Used for text search.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Address, if the post has a non-empty one.
    pub fn address(&self) -> Option<&str> {
        self.raw.address.as_deref().filter(|addr| !addr.is_empty())
    }

    pub fn has_address(&self) -> bool {
        self.address().is_some()
    }

    /// Coordinates as (lat, lon), if both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.raw.lat.zip(self.raw.lon)
    }

    pub fn is_stale(&self) -> bool {
        !self.raw.freshness
    }

    pub fn raw(&self) -> &RawPost {
        &self.raw
    }
}

impl Deref for Post {
    type Target = RawPost;

    fn deref(&self) -> &RawPost {
        &self.raw
    }
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self::new(raw)
    }
}

/// Posts of one month, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    month: MonthKey,
    posts: Vec<Post>,
}

impl Dataset {
    pub fn new(month: MonthKey, posts: Vec<Post>) -> Self {
        Self { month, posts }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

/// Holds the active dataset.
///
/// Loading replaces the previous dataset wholesale; earlier `Arc<Dataset>`
/// handles stay valid but are no longer active.
#[derive(Debug, Default)]
pub struct PostStore {
    active: Option<Arc<Dataset>>,
}

impl PostStore {
    /// Converts raw records to posts, preserving order, and makes them the active dataset.
    pub fn load(&mut self, month: MonthKey, raw: Vec<RawPost>) -> Arc<Dataset> {
        let posts: Vec<Post> = raw.into_iter().map(Post::new).collect();
        info!(%month, posts = posts.len(), "loaded dataset");
        let dataset = Arc::new(Dataset::new(month, posts));
        self.active = Some(dataset.clone());
        dataset
    }

    /// Drops the active dataset.
    pub fn clear(&mut self) {
        self.active.take();
    }

    pub fn active(&self) -> Option<&Arc<Dataset>> {
        self.active.as_ref()
    }

    pub fn active_month(&self) -> Option<MonthKey> {
        self.active.as_ref().map(|dataset| dataset.month())
    }
}
