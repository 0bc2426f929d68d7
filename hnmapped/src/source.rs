//! # Data sources
//!
//! Month files are fetched through the [`DataSource`] trait:
//!
//! - [`DirSource`] reads `<root>/<yyyy-mm>.json` from the local file system
//! - [`HttpSource`] (feature `http`) GETs `<base>/data/<yyyy-mm>.json`
//! - [`CachedSource`] wraps either and keeps successful fetches in memory
//!
//! A month that does not exist is reported as `NoData`, distinct from
//! transport and parse failures.
//!

/*
 Locking notes for CachedSource:

 - The cache lock is never held across an await. A lookup takes the lock,
   clones the Arc out and releases it before any fetch starts.
 - Two concurrent fetches of an uncached month both go to the inner source;
   the second insert replaces the first with equal data. Extra fetches are
   the only cost.
 - parking_lot mutexes don't poison. Each locked section performs exactly
   one get, insert, or clear.
*/

use std::{
    collections::HashMap,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use snafu::prelude::*;
use tracing::{debug, error, info};

use crate::{Result, months::MonthKey, posts::RawPost, prelude::*};

/// Where month files come from.
pub trait DataSource: Send + Sync {
    /// Fetches one month's raw posts. A month that doesn't exist is `NoData`.
    fn fetch(&self, month: &MonthKey) -> impl Future<Output = Result<Vec<RawPost>>> + Send;

    /// Months available from this source, oldest first.
    fn available_months(&self) -> impl Future<Output = Result<Vec<MonthKey>>> + Send;
}

impl<S: DataSource> DataSource for Arc<S> {
    fn fetch(&self, month: &MonthKey) -> impl Future<Output = Result<Vec<RawPost>>> + Send {
        self.as_ref().fetch(month)
    }

    fn available_months(&self) -> impl Future<Output = Result<Vec<MonthKey>>> + Send {
        self.as_ref().available_months()
    }
}

/// Parses the body of a month file.
///
/// Reports type errors with the json path of the offending value,
/// for example `[12].lat: invalid type: string "n/a", expected f64`.
pub fn parse_posts(body: &[u8], context: &str) -> Result<Vec<RawPost>> {
    deserialize_json(body, context)
}

// deserialize, reporting errors with 'serde_path_to_error', which provides
// detailed json path to the error
fn deserialize_json<T: DeserializeOwned>(body: &[u8], context: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        error!("Deserialization of {context} failed at {}: {err}", err.path());
        HnMappedError::Deserialization {
            context: context.to_string(),
            source: err,
        }
    })
}

// ============================================================================
// DIRECTORY
// ============================================================================

/// Month files in a local directory
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a month's file
    pub fn path_for(&self, month: &MonthKey) -> PathBuf {
        self.root.join(month.file_name())
    }
}

impl DataSource for DirSource {
    async fn fetch(&self, month: &MonthKey) -> Result<Vec<RawPost>> {
        let path = self.path_for(month);
        debug!(path = %path.display(), "reading month file");
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return NoDataSnafu {
                    month: month.to_string(),
                }
                .fail();
            }
            Err(source) => return Err(HnMappedError::Io { path, source }),
        };
        parse_posts(&body, &path.display().to_string())
    }

    async fn available_months(&self) -> Result<Vec<MonthKey>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.context(IoSnafu {
            path: self.root.clone(),
        })?;
        let mut months = Vec::new();
        while let Some(entry) = entries.next_entry().await.context(IoSnafu {
            path: self.root.clone(),
        })? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            // months.json and other non-month files are skipped
            if let Ok(month) = stem.parse::<MonthKey>() {
                months.push(month);
            }
        }
        months.sort_unstable();
        months.dedup();
        Ok(months)
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Month files served over http, as published alongside the web map.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// Source rooted at `base_url`. Files are read from `<base_url>/data/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Url of a month's file
    pub fn url_for(&self, month: &MonthKey) -> String {
        format!("{}/data/{}", self.base_url, month.file_name())
    }

    /// Url of the month index, a json array of `yyyy-mm` strings
    pub fn index_url(&self) -> String {
        format!("{}/data/months.json", self.base_url)
    }

    // GET url; Ok(None) on 404
    async fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        debug!("get {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context(HttpSnafu { url })?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure!(
            status.is_success(),
            HttpStatusSnafu {
                code: status.as_u16(),
                url,
            }
        );
        let body = response.bytes().await.context(HttpSnafu { url })?;
        Ok(Some(body.to_vec()))
    }
}

#[cfg(feature = "http")]
impl DataSource for HttpSource {
    async fn fetch(&self, month: &MonthKey) -> Result<Vec<RawPost>> {
        let url = self.url_for(month);
        let body = self.get(&url).await?.context(NoDataSnafu {
            month: month.to_string(),
        })?;
        parse_posts(&body, &url)
    }

    async fn available_months(&self) -> Result<Vec<MonthKey>> {
        let url = self.index_url();
        let Some(body) = self.get(&url).await? else {
            return Ok(Vec::new());
        };
        let mut months: Vec<MonthKey> = deserialize_json(&body, &url)?;
        months.sort_unstable();
        months.dedup();
        Ok(months)
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Memoizes successful fetches per month. Failures are not cached.
pub struct CachedSource<S> {
    inner: S,
    months: Mutex<HashMap<MonthKey, Arc<Vec<RawPost>>>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            months: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Clears the entire cache.
    pub fn clear(&self) {
        self.months.lock().clear();
    }

    pub fn is_cached(&self, month: &MonthKey) -> bool {
        self.months.lock().contains_key(month)
    }

    /// Number of cached months
    pub fn len(&self) -> usize {
        self.months.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.lock().is_empty()
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    async fn fetch(&self, month: &MonthKey) -> Result<Vec<RawPost>> {
        let cached = self.months.lock().get(month).cloned();
        if let Some(posts) = cached {
            debug!(%month, "cache hit");
            return Ok(posts.as_ref().clone());
        }
        let posts = Arc::new(self.inner.fetch(month).await?);
        info!(%month, posts = posts.len(), "cached month");
        self.months.lock().insert(*month, posts.clone());
        Ok(posts.as_ref().clone())
    }

    async fn available_months(&self) -> Result<Vec<MonthKey>> {
        self.inner.available_months().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn march() -> MonthKey {
        MonthKey::new(2014, 3).expect("month")
    }

    #[test]
    fn test_parse_posts_reports_path() {
        let body = br#"[{"user": "a"}, {"user": "b", "lat": "n/a"}]"#;
        let err = parse_posts(body, "2014-03.json").unwrap_err();
        let HnMappedError::Deserialization { context, source } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(context, "2014-03.json");
        assert_eq!(source.path().to_string(), "[1].lat");
    }

    #[test]
    fn test_parse_posts_rejects_non_array() {
        assert!(parse_posts(br#"{"user": "a"}"#, "x").is_err());
        assert!(parse_posts(b"not json", "x").is_err());
        assert_eq!(parse_posts(b"[]", "x").map(|posts| posts.len()).ok(), Some(0));
    }

    #[tokio::test]
    async fn test_dir_source() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("2014-03.json"), r#"[{"user": "pg"}]"#)?;
        std::fs::write(dir.path().join("2013-12.json"), "[]")?;
        std::fs::write(dir.path().join("months.json"), "[]")?;
        std::fs::write(dir.path().join(".2014-01.json"), "[]")?;
        std::fs::write(dir.path().join("notes.txt"), "")?;

        let source = DirSource::new(dir.path());
        let months = source.available_months().await?;
        let months: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(months, ["2013-12", "2014-03"]);

        let posts = source.fetch(&march()).await?;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].user, "pg");

        let missing = source.fetch(&MonthKey::new(2015, 1)?).await.unwrap_err();
        assert!(missing.is_no_data(), "{missing:?}");
        Ok(())
    }

    struct Counting {
        fetches: AtomicUsize,
    }

    impl DataSource for Counting {
        async fn fetch(&self, month: &MonthKey) -> Result<Vec<RawPost>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            ensure!(
                month.year() == 2014,
                NoDataSnafu {
                    month: month.to_string()
                }
            );
            Ok(vec![RawPost {
                user: month.to_string(),
                ..Default::default()
            }])
        }

        async fn available_months(&self) -> Result<Vec<MonthKey>> {
            Ok(vec![march()])
        }
    }

    #[tokio::test]
    async fn test_cached_source_memoizes_success_only() -> Result<()> {
        let source = CachedSource::new(Counting {
            fetches: AtomicUsize::new(0),
        });
        assert_eq!(source.fetch(&march()).await?[0].user, "2014-03");
        assert_eq!(source.fetch(&march()).await?[0].user, "2014-03");
        assert_eq!(source.inner().fetches.load(Ordering::SeqCst), 1);
        assert!(source.is_cached(&march()));

        let old = MonthKey::new(2010, 1)?;
        assert!(source.fetch(&old).await.is_err());
        assert!(source.fetch(&old).await.is_err());
        assert_eq!(source.inner().fetches.load(Ordering::SeqCst), 3);
        assert_eq!(source.len(), 1);

        source.clear();
        assert!(source.is_empty());
        assert_eq!(source.available_months().await?, [march()]);
        Ok(())
    }
}
