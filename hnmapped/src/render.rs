//! # View renderer
//!
//! [`render`] makes one pass over a dataset: each post that passes the
//! filters is turned into an html fragment and either appended to the list
//! or placed on the map as a marker. Drawing is delegated to the
//! [`ListSurface`] and [`MapSurface`] collaborators.
//!
//! The returned [`RenderResult::count`] is the number of matching posts in
//! either mode. In map mode, posts without coordinates are counted but not
//! placed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    config::{NO_LOCATION, TYPE_LABEL_SEPARATOR},
    filters::{FilterState, matches},
    html::highlight,
    posts::{Dataset, Post},
    template::{self, POST_TEMPLATE, View},
    views::ViewMode,
};

/// A point on the map, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Smallest box containing a set of points
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// A box around a single point
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lon = self.south_west.lon.min(point.lon);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lon = self.north_east.lon.max(point.lon);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&point.lon)
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: f64::midpoint(self.south_west.lat, self.north_east.lat),
            lon: f64::midpoint(self.south_west.lon, self.north_east.lon),
        }
    }
}

/// A map marker with hover title and popup html
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub title: String,
    pub payload: String,
}

/// Container of rendered list items
pub trait ListSurface {
    /// Removes all items.
    fn clear(&mut self);
    /// Appends one rendered post.
    fn append(&mut self, fragment: String);
}

/// Map widget
pub trait MapSurface {
    /// Creates a fresh, empty map.
    fn init(&mut self);
    /// Destroys the map and its markers. Harmless if there is no map.
    fn teardown(&mut self);
    fn place(&mut self, marker: Marker);
    /// Moves the viewport to show `bounds`.
    fn fit_bounds(&mut self, bounds: Bounds);
}

/// Outcome of one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    /// Posts that passed the filters
    pub count: usize,
    /// Markers placed (map mode)
    pub placed: usize,
    /// Matching posts left off the map for lack of coordinates (map mode)
    pub unplaced: usize,
}

/// Flags of a post, in the order H-1B, Remote, Intern, joined with `/`.
pub fn type_label(post: &Post) -> String {
    [
        (post.h1b, "H-1B"),
        (post.remote, "Remote"),
        (post.intern, "Intern"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .collect::<Vec<_>>()
    .join(TYPE_LABEL_SEPARATOR)
}

/// Renders the matching posts of `dataset` into the surface for `mode`.
pub fn render<L, M>(
    dataset: &Dataset,
    filters: &FilterState,
    mode: ViewMode,
    list: &mut L,
    map: &mut M,
) -> Result<RenderResult>
where
    L: ListSurface + ?Sized,
    M: MapSurface + ?Sized,
{
    render_posts(dataset.posts(), filters, mode, list, map)
}

/// Same as [`render`], over a slice of posts. An empty slice clears the surfaces.
pub fn render_posts<L, M>(
    posts: &[Post],
    filters: &FilterState,
    mode: ViewMode,
    list: &mut L,
    map: &mut M,
) -> Result<RenderResult>
where
    L: ListSurface + ?Sized,
    M: MapSurface + ?Sized,
{
    list.clear();
    map.teardown();
    if mode == ViewMode::Map {
        map.init();
    }

    let mut result = RenderResult::default();
    let mut bounds: Option<Bounds> = None;

    for post in posts.iter().filter(|post| matches(post, filters)) {
        result.count += 1;
        let label = type_label(post);
        let location = post.address().unwrap_or(NO_LOCATION);
        let fragment = fragment(post, location, &label, filters)?;

        match mode {
            ViewMode::List => list.append(fragment),
            ViewMode::Map => {
                let Some(point) = post.coordinates().map(LatLng::from) else {
                    debug!(url = %post.url, "post has no coordinates, not placed");
                    result.unplaced += 1;
                    continue;
                };
                match bounds.as_mut() {
                    Some(bounds) => bounds.extend(point),
                    None => bounds = Some(Bounds::from_point(point)),
                }
                map.place(Marker {
                    position: point,
                    title: format!("{location} {label}"),
                    payload: format!("<div style=\"max-height: 300px;\">{fragment}</div>"),
                });
                result.placed += 1;
            }
        }
    }

    if let Some(bounds) = bounds {
        map.fit_bounds(bounds);
    }
    debug!(
        %mode,
        count = result.count,
        placed = result.placed,
        unplaced = result.unplaced,
        "rendered"
    );
    Ok(result)
}

fn fragment(post: &Post, location: &str, label: &str, filters: &FilterState) -> Result<String> {
    let body = match filters.text_filter.regex() {
        Some(pattern) => highlight(&post.full_html, pattern),
        None => post.full_html.clone(),
    };
    let view = View::from([
        ("location", location.to_string()),
        ("type_of_post", label.to_string()),
        ("link", post.url.clone()),
        ("user", post.user.clone()),
        ("post_html", body),
    ]);
    template::render(POST_TEMPLATE, &view)
}
