/*
 * hnm - filter and render "Who is hiring?" job posts
 * github.com/stevelr/hnmapped
 *
 * SPDX-FileCopyrightText: 2025-2026 Steve Schoettler
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use hnmapped::prelude::*;
use tracing::{debug, warn};

use crate::{
    config::CliConfig,
    output::{Output, OutputFormat},
};

pub mod config;
pub mod months;
pub mod render;
pub mod session;
pub mod source;

use source::Source;

/// Month files are read from here when neither a data dir nor a url is set
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "hnm")]
#[command(author, version, about = "hnm: filter and render \"Who is hiring?\" job posts as a map or a list", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Directory of month files (yyyy-mm.json). Default: environment `HNMAPPED_DATA_DIR`, config, or ./data
    #[arg(short = 'd', long, env = "HNMAPPED_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base url of a published site, month files are read from <url>/data/. Overrides the data dir
    #[arg(short = 'u', long, env = "HNMAPPED_URL", global = true)]
    pub url: Option<String>,

    /// Write output to file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// JSON output (default)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Table output format
    #[arg(short, long, global = true)]
    pub table: bool,

    /// Quiet mode - suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global=true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available months, newest first
    Months,

    /// Filter one month and render it as a map or a list
    Render(RenderArgs),

    /// Interactive session: read commands from stdin, print the status after every render
    Session(SessionArgs),

    /// Show or change persisted defaults
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Month (yyyy-mm). Default: latest available
    pub month: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// map or list. Default: config, or map
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,

    /// Emit a standalone html page (Leaflet map in map view)
    #[arg(long)]
    pub page: bool,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Month to load first (yyyy-mm). Default: latest available
    pub month: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Initial view. Default: config, or map
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,

    /// Debounce quiet period in milliseconds. Default: environment `HNMAPPED_DEBOUNCE_MS`, config, or 300
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// H-1B sponsorship
    #[arg(long, value_enum)]
    pub h1b: Option<TriStateArg>,

    /// internship
    #[arg(long, value_enum)]
    pub intern: Option<TriStateArg>,

    /// remote work
    #[arg(long, value_enum)]
    pub remote: Option<TriStateArg>,

    /// author also posted last month
    #[arg(long, value_enum)]
    pub stale: Option<TriStateArg>,

    /// post has an address
    #[arg(long, value_enum)]
    pub location: Option<TriStateArg>,

    /// case-insensitive regular expression matched against the address
    #[arg(long, value_name = "REGEX")]
    pub location_filter: Option<String>,

    /// case-insensitive regular expression matched against the post text
    #[arg(long = "text", value_name = "REGEX")]
    pub text_filter: Option<String>,

    /// add filter(s) as key=value
    #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
}

impl FilterArgs {
    /// Named flags first, then generic `-f` filters in order.
    pub fn collect(&self) -> Result<Vec<(FilterKey, String)>> {
        let mut out: Vec<(FilterKey, String)> = [
            (FilterKey::H1b, self.h1b),
            (FilterKey::Intern, self.intern),
            (FilterKey::Remote, self.remote),
            (FilterKey::Stale, self.stale),
            (FilterKey::Location, self.location),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, TriState::from(value).to_string())))
        .collect();
        if let Some(pattern) = &self.location_filter {
            out.push((FilterKey::LocationFilter, pattern.clone()));
        }
        if let Some(pattern) = &self.text_filter {
            out.push((FilterKey::TextFilter, pattern.clone()));
        }
        out.extend(crate::filter::parse_filters(&self.filters)?);
        Ok(out)
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TriStateArg {
    Any,
    Yes,
    No,
}

impl From<TriStateArg> for TriState {
    fn from(value: TriStateArg) -> Self {
        match value {
            TriStateArg::Any => Self::Any,
            TriStateArg::Yes => Self::Yes,
            TriStateArg::No => Self::No,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ViewArg {
    Map,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Map => Self::Map,
            ViewArg::List => Self::List,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the config file
    Show,

    /// Set a value
    Set {
        #[arg(value_enum)]
        key: ConfigKeyArg,
        value: String,
    },

    /// Delete the config file
    Reset,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ConfigKeyArg {
    DataDir,
    Url,
    View,
    DebounceMs,
}

pub struct AppContext {
    pub output: Output,
    pub config: CliConfig,
    pub source: Source,
}

impl AppContext {
    /// `--view`, else the configured view, else map
    pub fn view(&self, arg: Option<ViewArg>) -> ViewMode {
        arg.map(ViewMode::from)
            .or(self.config.view)
            .unwrap_or_default()
    }

    /// The requested month, or the latest available one
    pub async fn resolve_month(&self, month: Option<&str>) -> Result<MonthKey> {
        if let Some(month) = month {
            return Ok(month.parse()?);
        }
        let months = MonthList::new(self.source.available_months().await?);
        let latest = months.latest().copied().ok_or_else(|| {
            anyhow::anyhow!(
                "no month files found in {}. Use --data-dir or --url",
                self.source.describe()
            )
        })?;
        debug!(%latest, "using latest month");
        Ok(latest)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(resolve_output_format(&cli), cli.output.clone());

    // config commands don't need a data source
    if let Commands::Config(args) = &cli.command {
        return config::handle(args, &output);
    }

    let config = CliConfig::load()?;
    let source = build_source(&cli, &config);
    let ctx = AppContext {
        output,
        config,
        source,
    };

    match cli.command {
        Commands::Months => months::handle(&ctx).await,
        Commands::Render(args) => render::handle(&ctx, args).await,
        Commands::Session(args) => session::handle(&ctx, args).await,
        Commands::Config(_) => Ok(()),
    }
}

fn resolve_output_format(cli: &Cli) -> OutputFormat {
    if cli.quiet {
        OutputFormat::Quiet
    } else if cli.pretty {
        if cli.table {
            warn!("--pretty conflicts with --table. Using json pretty format");
        }
        OutputFormat::Pretty
    } else if cli.json {
        if cli.table {
            warn!("--json conflicts with --table. Using json format");
        }
        OutputFormat::Json
    } else if cli.table {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn build_source(cli: &Cli, config: &CliConfig) -> Source {
    if let Some(url) = cli.url.as_ref().or(config.url.as_ref()) {
        return Source::Http(HttpSource::new(url.clone()));
    }
    let dir = cli
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    Source::Dir(DirSource::new(dir))
}
