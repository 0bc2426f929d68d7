//! Integration tests for the view renderer
//!
//! Covers:
//! - list fragments: labels, location fallback, highlighting
//! - map markers: titles, payloads, bounds, unplaced posts
//! - idempotence and the map/list toggle round trip

mod common;

use hnmapped::{Result, prelude::*};
use regex::Regex;

use crate::common::{dataset, filters, nyc_engineers, render_with, sample_dataset};

#[test_log::test]
fn test_scenario_text_filter_highlights() {
    let month = dataset(vec![nyc_engineers()]);
    let state = filters(&[(FilterKey::TextFilter, "engineers")]);
    let (result, list, _) = render_with(&month, &state, ViewMode::List);

    assert_eq!(result.count, 1);
    assert_eq!(list.len(), 1);
    let item = &list.items()[0];
    assert!(item.contains("<h3>NYC</h3>"), "{item}");
    assert!(item.contains("<h4>H-1B</h4>"), "{item}");
    assert!(
        item.contains(r#"<p><p>Looking for <span class="highlight">engineers</span></p></p>"#),
        "{item}"
    );
    assert!(item.contains("user?id=acme\">acme</a>"), "{item}");
}

#[test_log::test]
fn test_highlight_never_inside_tags() {
    let month = sample_dataset();
    let state = filters(&[(FilterKey::TextFilter, "rust|interns")]);
    let (result, list, _) = render_with(&month, &state, ViewMode::List);
    assert_eq!(result.count, list.len());

    let span = Regex::new(r#"<span class="highlight">[^<]+</span>"#).expect("regex");
    let tag = Regex::new(r"<[^<>]*>").expect("regex");
    for item in list.items() {
        assert!(span.is_match(item), "no highlight in {item}");
        for found in tag.find_iter(item) {
            assert!(
                !found.as_str().contains("highlight") || found.as_str() == r#"<span class="highlight">"#,
                "highlight inside tag {}",
                found.as_str()
            );
        }
    }
    // the href in the sf post keeps its text
    assert!(list.to_html().contains(r#"href="https://sf.example/rust""#));
}

#[test_log::test]
fn test_location_fallback_and_labels() {
    let month = sample_dataset();
    let (_, list, _) = render_with(&month, &FilterState::default(), ViewMode::List);
    let headings: Vec<(&str, &str)> = list
        .items()
        .iter()
        .map(|item| (between(item, "<h3>", "</h3>"), between(item, "<h4>", "</h4>")))
        .collect();
    assert_eq!(
        headings,
        [
            ("NYC", "H-1B"),
            ("None", "Remote"),
            ("San Francisco, CA, USA", "H-1B&#x2F;Intern"),
            ("San Francisco, CA, USA", "Remote"),
            ("Berlin, Germany", ""),
        ]
    );
}

#[test_log::test]
fn test_map_mode_places_and_counts() {
    let month = sample_dataset();
    let (result, list, map) = render_with(&month, &FilterState::default(), ViewMode::Map);

    assert_eq!(result.count, 5);
    assert_eq!(result.placed, 3);
    assert_eq!(result.unplaced, 2, "no coordinates: remoteco and berlin");
    assert!(list.is_empty());
    assert!(map.is_active());

    let marker = &map.markers()[0];
    assert_eq!(marker.title, "NYC H-1B");
    assert!(marker.payload.starts_with(r#"<div style="max-height: 300px;"><div class="post">"#));
    assert!(marker.payload.ends_with("</div></div>"));

    let viewport = map.viewport().expect("bounds fitted");
    assert_eq!(viewport.south_west, LatLng::new(37.7749, -122.4194));
    assert_eq!(viewport.north_east, LatLng::new(40.7128, -74.006));

    // the two san francisco posts share a position
    assert_eq!(map.clusters().len(), 2);
    let spread = map.spiderfied();
    assert_ne!(spread[1].position, spread[2].position);
}

#[test_log::test]
fn test_map_without_placeable_posts() {
    let month = dataset(vec![RawPost {
        user: "nowhere".into(),
        ..Default::default()
    }]);
    let (result, _, map) = render_with(&month, &FilterState::default(), ViewMode::Map);
    assert_eq!(result.count, 1);
    assert_eq!(result.placed, 0);
    assert!(map.viewport().is_none());
    assert!(map.to_geojson()["features"].as_array().is_some_and(Vec::is_empty));
}

#[test_log::test]
fn test_invalid_pattern_renders_nothing() {
    let month = sample_dataset();
    let state = filters(&[(FilterKey::TextFilter, "[")]);
    let (result, list, _) = render_with(&month, &state, ViewMode::List);
    assert_eq!(result, RenderResult::default());
    assert!(list.is_empty());
}

#[test_log::test]
fn test_render_is_idempotent() -> Result<()> {
    let month = sample_dataset();
    let state = filters(&[(FilterKey::Location, "yes")]);
    let mut list = HtmlList::default();
    let mut map = MapCanvas::default();

    let first = render(&month, &state, ViewMode::List, &mut list, &mut map)?;
    let items = list.items().to_vec();
    let second = render(&month, &state, ViewMode::List, &mut list, &mut map)?;
    assert_eq!(first, second);
    assert_eq!(list.items(), items.as_slice(), "list is cleared, not appended to");
    Ok(())
}

#[test_log::test]
fn test_toggle_round_trip_keeps_count() -> Result<()> {
    let month = sample_dataset();
    let state = filters(&[(FilterKey::Remote, "yes")]);
    let mut views = ViewModeController::default();
    let mut list = HtmlList::default();
    let mut map = MapCanvas::default();

    let on_map = render(&month, &state, views.mode(), &mut list, &mut map)?;
    let as_list = render(&month, &state, views.toggle(), &mut list, &mut map)?;
    assert!(!map.is_active(), "map torn down in list mode");
    assert_eq!(list.len(), 2);
    let back = render(&month, &state, views.toggle(), &mut list, &mut map)?;

    assert_eq!(views.mode(), ViewMode::Map);
    assert_eq!(on_map.count, as_list.count);
    assert_eq!(on_map, back);
    assert!(list.is_empty(), "list cleared in map mode");
    Ok(())
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    text.split_once(start)
        .and_then(|(_, rest)| rest.split_once(end))
        .map_or("", |(inner, _)| inner)
}
