//! Page fetching and caching.
//!
//! Detail-page joins fetch linked pages one at a time. [`CachedFetcher`]
//! keeps every page in memory for the run and, when given a directory,
//! on disk under a slug of the normalized URL so later runs (and offline
//! runs) can reuse it.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::encoding::decode_page;
use crate::error::{Error, Result};
use crate::url_utils::{normalize_url, url_slug};

/// Capability: turn a URL into markup.
pub trait Fetcher {
    /// Fetch the page at `url` as a UTF-8 string.
    fn fetch(&self, url: &Url) -> Result<String>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &Url) -> Result<String> {
        (**self).fetch(url)
    }
}

/// Settings for [`HttpFetcher`] and [`CachedFetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory for cached pages; `None` keeps the cache in memory only.
    pub cache_dir: Option<PathBuf>,
    /// Never touch the network; a cache miss is an error.
    pub offline: bool,
    /// `User-Agent` header sent with requests.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            user_agent: concat!("rs-recipe-miner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking HTTP fetcher. Response bodies are transcoded to UTF-8 using the
/// `Content-Type` charset or the page's meta declaration.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a client from `opts`.
    pub fn new(opts: &FetchOptions) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(opts.timeout)
            .build()
            .map_err(|e| Error::Fetch {
                url: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String> {
        let fetch_error = |reason: String| Error::Fetch {
            url: url.to_string(),
            reason,
        };

        debug!(%url, "fetching page");
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| fetch_error(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;

        Ok(decode_page(&bytes, content_type.as_deref()))
    }
}

/// Caching wrapper around another fetcher.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    cache_dir: Option<PathBuf>,
    offline: bool,
    memory: Mutex<HashMap<String, String>>,
}

impl<F: Fetcher> CachedFetcher<F> {
    /// Cache pages from `inner` according to `opts`.
    pub fn new(inner: F, opts: &FetchOptions) -> Result<Self> {
        if let Some(dir) = &opts.cache_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            inner,
            cache_dir: opts.cache_dir.clone(),
            offline: opts.offline,
            memory: Mutex::new(HashMap::new()),
        })
    }

    /// Memoize `inner` for the lifetime of the wrapper, without a disk cache.
    pub fn in_memory(inner: F) -> Self {
        Self {
            inner,
            cache_dir: None,
            offline: false,
            memory: Mutex::new(HashMap::new()),
        }
    }

    fn cache_file(&self, url: &Url) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.html", url_slug(url))))
    }

    fn remember(&self, key: &str, page: &str) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), page.to_string());
        }
    }
}

impl<F: Fetcher> Fetcher for CachedFetcher<F> {
    fn fetch(&self, url: &Url) -> Result<String> {
        let key = normalize_url(url).to_string();
        if let Some(page) = self.memory.lock().ok().and_then(|m| m.get(&key).cloned()) {
            return Ok(page);
        }

        let cache_file = self.cache_file(url);
        if let Some(path) = cache_file.as_ref().filter(|p| p.is_file()) {
            debug!(%url, path = %path.display(), "page cache hit");
            let page = fs::read_to_string(path)?;
            self.remember(&key, &page);
            return Ok(page);
        }

        if self.offline {
            return Err(Error::Offline(url.to_string()));
        }

        let page = self.inner.fetch(url)?;
        if let Some(path) = cache_file {
            if let Err(err) = fs::write(&path, &page) {
                warn!(%url, path = %path.display(), error = %err, "failed to write page cache");
            }
        }
        self.remember(&key, &page);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingFetcher {
        calls: Cell<usize>,
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, url: &Url) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("<html><body>{}</body></html>", url.path()))
        }
    }

    fn counting() -> CountingFetcher {
        CountingFetcher { calls: Cell::new(0) }
    }

    #[test]
    fn test_in_memory_cache_fetches_once() {
        let cached = CachedFetcher::in_memory(counting());
        let url = Url::parse("https://example.com/e/1").unwrap();
        let same = Url::parse("https://example.com/e/1#details").unwrap();

        assert!(cached.fetch(&url).unwrap().contains("/e/1"));
        assert!(cached.fetch(&same).unwrap().contains("/e/1"));
        assert_eq!(cached.inner.calls.get(), 1);
    }

    #[test]
    fn test_disk_cache_survives_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let opts = FetchOptions {
            cache_dir: Some(dir.path().to_path_buf()),
            ..FetchOptions::default()
        };
        let url = Url::parse("https://example.com/e/2").unwrap();

        let first = CachedFetcher::new(counting(), &opts).unwrap();
        first.fetch(&url).unwrap();
        assert!(dir.path().join("example-com-e-2.html").is_file());

        let offline = FetchOptions {
            offline: true,
            ..opts
        };
        let second = CachedFetcher::new(counting(), &offline).unwrap();
        assert!(second.fetch(&url).unwrap().contains("/e/2"));
        assert_eq!(second.inner.calls.get(), 0);
    }

    #[test]
    fn test_offline_miss_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let opts = FetchOptions {
            cache_dir: Some(dir.path().to_path_buf()),
            offline: true,
            ..FetchOptions::default()
        };
        let cached = CachedFetcher::new(counting(), &opts).unwrap();
        let err = cached
            .fetch(&Url::parse("https://example.com/missing").unwrap())
            .unwrap_err();

        assert!(matches!(err, Error::Offline(_)));
        assert_eq!(cached.inner.calls.get(), 0);
    }

    #[test]
    fn test_fetcher_through_reference() {
        let inner = counting();
        let by_ref: &dyn Fetcher = &inner;
        let cached = CachedFetcher::in_memory(by_ref);
        cached.fetch(&Url::parse("https://example.com/x").unwrap()).unwrap();
        assert_eq!(inner.calls.get(), 1);
    }
}
