use anyhow::Result;
use hnmapped::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    cli::{AppContext, RenderArgs},
    output::{OutputFormat, PostRow, list_page, map_page},
};

#[derive(Debug, Serialize)]
struct RenderOutput<'a> {
    month: MonthKey,
    mode: ViewMode,
    result: RenderResult,
    line: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geojson: Option<Value>,
}

pub async fn handle(ctx: &AppContext, args: RenderArgs) -> Result<()> {
    let month = ctx.resolve_month(args.month.as_deref()).await?;
    let filters = args.filters.collect()?;
    let config = AppConfig::default().initial_view(ctx.view(args.view));
    let app = load(&ctx.source, config, month, filters).await?;
    let status = app.status();
    if let Some(message) = &status.message {
        warn!("{message}");
    }
    info!(
        %month,
        count = status.result.count,
        placed = status.result.placed,
        unplaced = status.result.unplaced,
        "rendered"
    );

    if args.page {
        let title = format!("Who is hiring? {}", month.label());
        let html = match status.mode {
            ViewMode::List => list_page(&title, &status.line, app.list().items()),
            ViewMode::Map => map_page(&title, &status.line, &app.map().to_geojson()),
        };
        return ctx.output.emit_html(&html);
    }

    if ctx.output.format() == OutputFormat::Table {
        let rows: Vec<PostRow> = app
            .dataset()
            .map(|dataset| {
                dataset
                    .iter()
                    .filter(|post| matches(post, app.filters()))
                    .map(PostRow::from)
                    .collect()
            })
            .unwrap_or_default();
        return ctx.output.emit_table(&rows);
    }

    let out = RenderOutput {
        month,
        mode: status.mode,
        result: status.result,
        line: &status.line,
        message: status.message.clone(),
        items: (status.mode == ViewMode::List).then(|| app.list().items()),
        geojson: (status.mode == ViewMode::Map).then(|| app.map().to_geojson()),
    };
    ctx.output.emit_json(&out)
}

/// Applies the filters, loads the month and renders it once.
/// A month that can't be loaded is an error here rather than a status message.
async fn load<S: DataSource>(
    source: &S,
    config: AppConfig,
    month: MonthKey,
    filters: Vec<(FilterKey, String)>,
) -> Result<App<HtmlList, MapCanvas>> {
    let mut app = App::new(config, HtmlList::default(), MapCanvas::default());
    let now = Instant::now();
    for (key, value) in filters {
        app.dispatch(Event::FilterChanged { key, value }, now)?;
    }
    if let Some(Command::Fetch { month, request }) = app.dispatch(Event::MonthSelected(month), now)? {
        let posts = source.fetch(&month).await?;
        app.dispatch(
            Event::DataLoaded {
                month,
                request,
                result: Ok(posts),
            },
            now,
        )?;
    }
    Ok(app)
}
