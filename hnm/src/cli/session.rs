//! `hnm session`: drive a debounced session from lines on stdin
//!
//! ```text
//! set text_filter=rust     change a filter (renders after the quiet period)
//! toggle                   switch between map and list
//! month 2014-03            load another month
//! status                   print the current status
//! quit                     flush any pending change and exit
//! ```

use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use hnmapped::prelude::*;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    cli::{AppContext, SessionArgs},
    filter::parse_filter,
    output::Output,
};

/// One line of session input
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Set(FilterKey, String),
    Toggle,
    Month(MonthKey),
    Status,
    Quit,
}

impl Input {
    /// Parses a line. Blank lines and `#` comments are `None`.
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let input = match command {
            "set" => {
                let (key, value) = parse_filter(rest.trim_start())?;
                Self::Set(key, value)
            }
            "toggle" => Self::Toggle,
            "month" => Self::Month(rest.trim().parse()?),
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command \"{other}\". Expected set, toggle, month, status or quit"),
        };
        Ok(Some(input))
    }
}

pub async fn handle(ctx: &AppContext, args: SessionArgs) -> Result<()> {
    let mut config = AppConfig::default().initial_view(ctx.view(args.view));
    if let Some(ms) = args.debounce_ms.or(ctx.config.debounce_ms) {
        config = config.debounce(Duration::from_millis(ms));
    }
    let month = ctx.resolve_month(args.month.as_deref()).await?;
    let filters = args.filters.collect()?;

    let source = Arc::new(CachedSource::new(ctx.source.clone()));
    let app = App::new(config, HtmlList::default(), MapCanvas::default());
    let (session, handle) = Session::with_shared_source(app, source);
    let printer = spawn_printer(handle.subscribe(), ctx.output.clone());
    let task = tokio::spawn(session.run());

    for (key, value) in filters {
        handle.set_filter(key, value).await?;
    }
    handle.select_month(month).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match Input::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                warn!("{err:#}");
                continue;
            }
        };
        debug!(?input, "session input");
        match input {
            Input::Set(key, value) => handle.set_filter(key, value).await?,
            Input::Toggle => handle.toggle_view().await?,
            Input::Month(month) => handle.select_month(month).await?,
            Input::Status => ctx.output.emit_status(&handle.status())?,
            Input::Quit => break,
        }
    }

    // the session flushes and exits once the last handle is gone
    drop(handle);
    let app = task.await??;
    printer.await??;
    info!(renders = app.render_count(), "session finished");
    Ok(())
}

/// Prints the status after every render, and any new message.
fn spawn_printer(mut status: watch::Receiver<Status>, output: Output) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut renders = status.borrow().renders;
        let mut message = status.borrow().message.clone();
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if current.message != message {
                message.clone_from(&current.message);
                if let Some(message) = &message {
                    warn!("{message}");
                }
            }
            if current.renders != renders {
                renders = current.renders;
                output.emit_status(&current)?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use hnmapped::test_util::month;

    use super::*;

    #[test]
    fn test_parse_input() -> Result<()> {
        assert_eq!(
            Input::parse("set text_filter=rust|go")?,
            Some(Input::Set(FilterKey::TextFilter, "rust|go".to_string()))
        );
        assert_eq!(Input::parse("  toggle ")?, Some(Input::Toggle));
        assert_eq!(Input::parse("month 2014-03")?, Some(Input::Month(month("2014-03"))));
        assert_eq!(Input::parse("quit")?, Some(Input::Quit));
        assert_eq!(Input::parse("")?, None);
        assert_eq!(Input::parse("# comment")?, None);
        Ok(())
    }

    #[test]
    fn test_parse_input_errors() {
        assert!(Input::parse("zoom 3").is_err());
        assert!(Input::parse("month March").is_err());
        assert!(Input::parse("set h1b").is_err());
    }
}
