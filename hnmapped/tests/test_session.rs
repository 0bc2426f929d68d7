//! Integration tests for the async session
//!
//! All tests run on tokio's paused clock: time only moves when every task is
//! idle, so debounce deadlines and fetch delays are deterministic.
//!
//! Covers:
//! - a burst of filter changes rendering once, with the final state
//! - responses for a month no longer requested being dropped, including a
//!   month that was requested again
//! - pending changes flushed when the session ends
//! - fetch failures and rejected input reported in the status

mod common;

use std::{sync::Arc, time::Duration};

use hnmapped::prelude::*;
use hnmapped::test_util::{MemorySource, month, sample_posts};
use tokio::{task::JoinHandle, time::sleep};

use crate::common::{QUIET, app, memory_source, nyc_engineers};

type Running = JoinHandle<hnmapped::Result<App<HtmlList, MapCanvas>>>;

fn start(source: MemorySource) -> (Running, SessionHandle) {
    let (session, handle) = Session::new(app(), source);
    (tokio::spawn(session.run()), handle)
}

/// Waits until the published status satisfies `done`.
async fn wait_status(handle: &SessionHandle, done: impl FnMut(&Status) -> bool) -> anyhow::Result<Status> {
    let mut status = handle.subscribe();
    let found = status.wait_for(done).await?;
    Ok(found.clone())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_burst_of_changes_renders_once() -> anyhow::Result<()> {
    let (task, handle) = start(memory_source());
    handle.select_month(month("2014-03")).await?;
    let loaded = wait_status(&handle, |status| status.renders == 1).await?;
    assert_eq!(loaded.result.count, 5);

    for (key, value) in [
        (FilterKey::Remote, "yes"),
        (FilterKey::TextFilter, "r"),
        (FilterKey::TextFilter, "ru"),
        (FilterKey::TextFilter, "rus"),
        (FilterKey::TextFilter, "rust"),
    ] {
        handle.set_filter(key, value).await?;
        sleep(QUIET / 3).await;
        assert_eq!(handle.status().renders, 1, "rendered before the burst ended");
    }

    let rendered = wait_status(&handle, |status| status.renders == 2).await?;
    assert_eq!(rendered.result.count, 1, "remote posts mentioning rust");
    assert_eq!(rendered.line, "<p>Displaying 1 posts</p>");
    assert!(!rendered.pending);

    sleep(QUIET * 10).await;
    assert_eq!(handle.status().renders, 2);

    drop(handle);
    let app = task.await??;
    assert_eq!(app.filters().get(FilterKey::TextFilter), "rust");
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_stale_response_is_ignored() -> anyhow::Result<()> {
    let source = MemorySource::default()
        .with_delayed_month(month("2014-03"), Duration::from_secs(2), sample_posts())
        .with_delayed_month(month("2014-04"), Duration::from_millis(10), vec![nyc_engineers()]);
    let (task, handle) = start(source);

    handle.select_month(month("2014-03")).await?;
    handle.select_month(month("2014-04")).await?;
    let loaded = wait_status(&handle, |status| status.month.is_some()).await?;
    assert_eq!(loaded.month, Some(month("2014-04")));
    assert_eq!(loaded.result.count, 1);

    // march arrives late and must not replace april
    sleep(Duration::from_secs(5)).await;
    let status = handle.status();
    assert_eq!(status.month, Some(month("2014-04")));
    assert_eq!(status.renders, 1);

    drop(handle);
    task.await??;
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_reselected_month_ignores_first_response() -> anyhow::Result<()> {
    let source = MemorySource::default()
        .with_fetch_delays(
            month("2014-03"),
            [Duration::from_secs(2), Duration::from_millis(10)],
            sample_posts(),
        )
        .with_delayed_month(month("2014-04"), Duration::from_millis(10), vec![nyc_engineers()]);
    let (task, handle) = start(source);

    for name in ["2014-03", "2014-04", "2014-03"] {
        handle.select_month(month(name)).await?;
    }
    let loaded = wait_status(&handle, |status| status.month.is_some()).await?;
    assert_eq!(loaded.month, Some(month("2014-03")));
    assert_eq!(loaded.renders, 1);

    // the first march fetch finishes last and is dropped
    sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.status().renders, 1);

    drop(handle);
    task.await??;
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_pending_change_flushed_on_close() -> anyhow::Result<()> {
    let (task, handle) = start(memory_source());
    handle.select_month(month("2014-03")).await?;
    wait_status(&handle, |status| status.renders == 1).await?;

    handle.set_filter(FilterKey::H1b, "yes").await?;
    handle.toggle_view().await?;
    wait_status(&handle, |status| status.mode == ViewMode::List).await?;
    drop(handle);

    let app = task.await??;
    // toggle rendered with h1b already set, leaving nothing to flush
    assert_eq!(app.render_count(), 2);
    assert_eq!(app.list().len(), 2);
    assert!(app.debounce_deadline().is_none());
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_fetch_failure_reported() -> anyhow::Result<()> {
    let (task, handle) = start(memory_source());
    handle.select_month(month("2014-03")).await?;
    wait_status(&handle, |status| status.renders == 1).await?;

    handle.select_month(month("2099-01")).await?;
    let failed = wait_status(&handle, |status| status.renders == 2).await?;
    assert_eq!(failed.month, None);
    assert_eq!(failed.result.count, 0);
    assert_eq!(failed.message.as_deref(), Some("No data available for 2099-01"));
    assert_eq!(failed.line, "<p>No data available for 2099-01</p>");

    drop(handle);
    task.await??;
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_rejected_filter_reported() -> anyhow::Result<()> {
    let (task, handle) = start(memory_source());
    handle.set_filter(FilterKey::Intern, "maybe").await?;
    let status = wait_status(&handle, |status| status.message.is_some()).await?;
    let message = status.message.unwrap_or_default();
    assert!(message.contains("invalid value \"maybe\" for filter intern"), "{message}");
    assert!(!status.pending);

    drop(handle);
    task.await??;
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_shared_cached_source() -> anyhow::Result<()> {
    let source = Arc::new(CachedSource::new(memory_source()));
    let (session, handle) = Session::with_shared_source(app(), source.clone());
    let task = tokio::spawn(session.run());

    for (renders, name) in [(1, "2014-03"), (2, "2014-04"), (3, "2014-03")] {
        handle.select_month(month(name)).await?;
        wait_status(&handle, |status| status.renders == renders).await?;
    }
    assert_eq!(source.len(), 2);
    assert_eq!(source.inner().fetched(), [month("2014-03"), month("2014-04")]);

    drop(handle);
    task.await??;
    Ok(())
}
