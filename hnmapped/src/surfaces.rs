//! # In-process surfaces
//!
//! [`HtmlList`] and [`MapCanvas`] implement the renderer's collaborator
//! traits without a browser. They record what would be drawn so it can be
//! printed, exported, or inspected in tests.
//!
//! ## Coincident markers
//!
//! Many posts share exactly the same coordinates (every company geocoded to
//! "San Francisco", for instance), which would stack their markers into a
//! single clickable point. [`MapCanvas::clusters`] groups markers with
//! identical positions, and [`MapCanvas::spiderfied`] spreads each group
//! evenly on a small circle around its shared point.

use std::{collections::HashMap, f64::consts::TAU};

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    config::SPIDERFY_RADIUS_DEG,
    render::{Bounds, LatLng, ListSurface, MapSurface, Marker},
};

// ============================================================================
// LIST
// ============================================================================

/// Collects rendered list items in order.
#[derive(Debug, Clone, Default)]
pub struct HtmlList {
    items: Vec<String>,
}

impl HtmlList {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, one per line
    pub fn to_html(&self) -> String {
        self.items.join("\n")
    }
}

impl ListSurface for HtmlList {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn append(&mut self, fragment: String) {
        self.items.push(fragment);
    }
}

// ============================================================================
// MAP
// ============================================================================

/// Markers sharing one position
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub position: LatLng,
    /// Indices into [`MapCanvas::markers`], in placement order
    pub members: Vec<usize>,
}

/// Records markers and the fitted viewport.
#[derive(Debug, Clone, Default)]
pub struct MapCanvas {
    active: bool,
    markers: Vec<Marker>,
    viewport: Option<Bounds>,
}

impl MapCanvas {
    /// True between `init` and `teardown`
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Bounds passed to the last `fit_bounds`
    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    /// Groups markers by identical position, in order of first appearance.
    pub fn clusters(&self) -> Vec<Cluster> {
        let mut index: HashMap<(u64, u64), usize> = HashMap::new();
        let mut clusters: Vec<Cluster> = Vec::new();
        for (i, marker) in self.markers.iter().enumerate() {
            let key = (marker.position.lat.to_bits(), marker.position.lon.to_bits());
            match index.get(&key) {
                Some(&cluster) => clusters[cluster].members.push(i),
                None => {
                    index.insert(key, clusters.len());
                    clusters.push(Cluster {
                        position: marker.position,
                        members: vec![i],
                    });
                }
            }
        }
        clusters
    }

    /// Markers with coincident groups spread on a circle of
    /// `SPIDERFY_RADIUS_DEG` around their shared position. Single markers
    /// keep their position. Order matches [`markers`](Self::markers).
    pub fn spiderfied(&self) -> Vec<Marker> {
        let mut out = self.markers.clone();
        for cluster in self.clusters() {
            let size = cluster.members.len();
            if size < 2 {
                continue;
            }
            for (slot, &i) in cluster.members.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let angle = TAU * slot as f64 / size as f64;
                out[i].position = LatLng {
                    lat: cluster.position.lat + SPIDERFY_RADIUS_DEG * angle.sin(),
                    lon: cluster.position.lon + SPIDERFY_RADIUS_DEG * angle.cos(),
                };
            }
        }
        out
    }

    /// GeoJSON `FeatureCollection` of the spiderfied markers, with `title`
    /// and `popup` properties.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .spiderfied()
            .into_iter()
            .map(|marker| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [marker.position.lon, marker.position.lat],
                    },
                    "properties": {
                        "title": marker.title,
                        "popup": marker.payload,
                    },
                })
            })
            .collect();
        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        if let Some(bounds) = self.viewport {
            collection["bbox"] = json!([
                bounds.south_west.lon,
                bounds.south_west.lat,
                bounds.north_east.lon,
                bounds.north_east.lat,
            ]);
        }
        collection
    }
}

impl MapSurface for MapCanvas {
    fn init(&mut self) {
        self.active = true;
        self.markers.clear();
        self.viewport = None;
    }

    fn teardown(&mut self) {
        if self.active {
            debug!(markers = self.markers.len(), "map teardown");
        }
        self.active = false;
        self.markers.clear();
        self.viewport = None;
    }

    fn place(&mut self, marker: Marker) {
        if !self.active {
            warn!(title = %marker.title, "marker placed on inactive map, ignored");
            return;
        }
        self.markers.push(marker);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport = Some(bounds);
    }
}
