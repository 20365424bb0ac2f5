//! Single-stream GET into memory.
//!
//! `CurlFetcher` drives a blocking libcurl Easy handle, so the same code path
//! serves the `ftp://` archive mirrors and plain HTTP(S) servers.

use crate::config::DemofetchConfig;
use crate::error::FetchError;
use std::time::Duration;
use url::Url;

/// Retrieves a whole payload into memory.
///
/// `on_progress` is called with the running byte count after every chunk.
pub trait Fetch {
    fn fetch(&self, url: &Url, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, FetchError>;
}

/// Transfer tuning for `CurlFetcher`.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Receive buffer size; libcurl hands data over in chunks of at most this many bytes.
    pub chunk_size: usize,
    pub connect_timeout: Duration,
    /// Abort when the rate stays below `low_speed_limit` bytes/sec for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&DemofetchConfig::default())
    }
}

impl FetchOptions {
    pub fn from_config(cfg: &DemofetchConfig) -> Self {
        Self {
            chunk_size: cfg.chunk_size,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
        }
    }
}

/// libcurl-backed fetcher (HTTP, HTTPS, FTP).
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    opts: FetchOptions,
}

impl CurlFetcher {
    pub fn new(opts: FetchOptions) -> Self {
        Self { opts }
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &Url, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.buffer_size(self.opts.chunk_size)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.low_speed_limit(self.opts.low_speed_limit)?;
        easy.low_speed_time(self.opts.low_speed_time)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                on_progress(body.len() as u64);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        if matches!(url.scheme(), "http" | "https") {
            let code = easy.response_code()?;
            if !(200..300).contains(&code) {
                return Err(FetchError::Http(code));
            }
        }

        tracing::debug!(url = %url, bytes = body.len(), "transfer complete");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_ten_kib_chunks() {
        let opts = FetchOptions::default();
        assert_eq!(opts.chunk_size, 10 * 1024);
        assert_eq!(opts.connect_timeout, Duration::from_secs(30));
    }
}
