use std::fmt::Write as _;

use hnmapped::{html::strip_tags, prelude::*};
use serde::Serialize;

pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();
    let widths = column_widths(headers, &rows);

    let mut out = String::new();
    out.push_str(&format_row(
        &headers.iter().map(ToString::to_string).collect::<Vec<_>>(),
        &widths,
    ));
    out.push('\n');
    out.push_str(&format_separator(&widths));

    for row in rows {
        out.push('\n');
        out.push_str(&format_row(&row, &widths));
    }

    out
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if idx >= widths.len() {
                widths.push(len);
            } else {
                widths[idx] = widths[idx].max(len);
            }
        }
    }
    widths
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    for (idx, cell) in row.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        let width = widths.get(idx).copied().unwrap_or(0);
        let _ = write!(out, "{cell:<width$}");
    }
    out.truncate(out.trim_end().len());
    out
}

fn format_separator(widths: &[usize]) -> String {
    let mut out = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        out.push_str(&"-".repeat(*width));
    }
    out
}

/// One matching post, for table and json listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRow {
    pub user: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub type_of_post: String,
    pub stale: bool,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub url: String,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            user: post.user.clone(),
            location: post.address().map(ToString::to_string),
            type_of_post: type_label(post),
            stale: post.is_stale(),
            lat: post.lat,
            lon: post.lon,
            url: post.url.clone(),
        }
    }
}

impl TableRow for PostRow {
    fn headers() -> &'static [&'static str] {
        &["user", "location", "type", "stale", "coordinates", "url"]
    }

    fn row(&self) -> Vec<String> {
        let coordinates = self
            .lat
            .zip(self.lon)
            .map(|(lat, lon)| format!("{lat:.4},{lon:.4}"))
            .unwrap_or_default();
        vec![
            self.user.clone(),
            self.location.clone().unwrap_or_default(),
            self.type_of_post.clone(),
            self.stale.to_string(),
            coordinates,
            self.url.clone(),
        ]
    }
}

impl TableRow for MonthEntry {
    fn headers() -> &'static [&'static str] {
        &["month", "label"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.key.to_string(), self.label.clone()]
    }
}

/// Status line as plain text, with the month, mode, and marker counts
pub fn status_text(status: &Status) -> String {
    let month = status
        .month
        .or(status.requested)
        .map(|month| month.to_string())
        .unwrap_or_default();
    let line = strip_tags(&status.line);
    let line = line.trim();
    let mut text = format!("[{month} {}] {line}", status.mode);
    if status.mode == ViewMode::Map {
        let _ = write!(
            text,
            " ({} on map, {} without coordinates)",
            status.result.placed, status.result.unplaced
        );
    }
    // a failed load shows its message as the status line already
    if let Some(message) = status.message.as_deref().filter(|message| *message != line) {
        let _ = write!(text, " ({message})");
    }
    text
}
