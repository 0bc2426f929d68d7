use hnmapped::{Result, prelude::*};

/// The data source picked from `--url` / `--data-dir` and the config file
#[derive(Debug, Clone)]
pub enum Source {
    Dir(DirSource),
    Http(HttpSource),
}

impl Source {
    /// Where months are read from, for messages
    pub fn describe(&self) -> String {
        match self {
            Self::Dir(dir) => dir.root().display().to_string(),
            Self::Http(http) => format!("{}/data", http.base_url()),
        }
    }
}

impl DataSource for Source {
    async fn fetch(&self, month: &MonthKey) -> Result<Vec<RawPost>> {
        match self {
            Self::Dir(dir) => dir.fetch(month).await,
            Self::Http(http) => http.fetch(month).await,
        }
    }

    async fn available_months(&self) -> Result<Vec<MonthKey>> {
        match self {
            Self::Dir(dir) => dir.available_months().await,
            Self::Http(http) => http.available_months().await,
        }
    }
}
