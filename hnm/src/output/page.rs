//! Standalone html pages for `hnm render --page`

use hnmapped::html::escape;
use serde_json::Value;

const LEAFLET_VERSION: &str = "1.9.4";

const STYLE: &str = r"
body { font-family: sans-serif; margin: 0 1em; }
#map { height: 85vh; }
.post { border-bottom: 1px solid #ddd; padding: 0.5em 0; }
.highlight { background: #ff0; }
";

/// A page listing the rendered posts under the status line.
pub fn list_page(title: &str, status_line: &str, items: &[String]) -> String {
    let mut body = String::from(status_line);
    for item in items {
        body.push('\n');
        body.push_str(item);
    }
    page(title, "", &body)
}

/// A Leaflet map page showing the markers of a GeoJSON feature collection.
/// Each marker has the post title on hover and the post in its popup.
pub fn map_page(title: &str, status_line: &str, geojson: &Value) -> String {
    let head = format!(
        r#"<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>"#
    );
    let body = format!(
        r#"{status_line}
<div id="map"></div>
<script>
const posts = {data};
const map = L.map("map").setView([20, 0], 2);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors",
}}).addTo(map);
L.geoJSON(posts, {{
  pointToLayer: (feature, latlng) => L.marker(latlng, {{ title: feature.properties.title }}),
  onEachFeature: (feature, layer) => layer.bindPopup(feature.properties.popup),
}}).addTo(map);
if (posts.bbox) {{
  map.fitBounds([[posts.bbox[1], posts.bbox[0]], [posts.bbox[3], posts.bbox[2]]]);
}}
</script>"#,
        data = script_json(geojson),
    );
    page(title, &head, &body)
}

fn page(title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
{head}
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape(title),
    )
}

// json that can sit inside a <script> element: no "</" sequences
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}
