//! Where command output goes and in which format
//!
//! Every command writes through [`Output`]. With `-o FILE` the first write
//! truncates the file and later writes append to it, so a session's status
//! lines accumulate in one file.

use std::{
    fs::OpenOptions,
    io::Write as _,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use hnmapped::prelude::Status;
use serde::Serialize;

mod page;
mod table;

pub use page::{list_page, map_page};
pub use table::PostRow;
use table::{TableRow, render_table, status_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
    Quiet,
}

#[derive(Clone, Debug)]
pub struct Output {
    format: OutputFormat,
    path: Option<PathBuf>,
    // shared by clones, so a printer task and the main task append to the same file
    started: Arc<AtomicBool>,
}

impl Output {
    pub fn new(format: OutputFormat, path: Option<PathBuf>) -> Self {
        Self {
            format,
            path,
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn emit_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let data = match self.format {
            OutputFormat::Quiet => return Ok(()),
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
            _ => serde_json::to_string(value)?,
        };
        self.write(&data)
    }

    /// A table in table format, a json array otherwise
    pub fn emit_table<T: TableRow + Serialize>(&self, items: &[T]) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.write(&render_table(items)),
            _ => self.emit_json(items),
        }
    }

    /// A complete html page. Written in every format except quiet.
    pub fn emit_html(&self, html: &str) -> Result<()> {
        if self.format == OutputFormat::Quiet {
            return Ok(());
        }
        self.write(html)
    }

    /// One status line in table format, the status object otherwise
    pub fn emit_status(&self, status: &Status) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.write(&status_text(status)),
            _ => self.emit_json(status),
        }
    }

    fn write(&self, data: &str) -> Result<()> {
        let mut output = data.to_string();
        if !output.ends_with('\n') {
            output.push('\n');
        }

        let Some(path) = &self.path else {
            print!("{output}");
            return Ok(());
        };
        let append = self.started.swap(true, Ordering::SeqCst);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .with_context(|| format!("open {}", path.display()))?;
        file.write_all(output.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}
