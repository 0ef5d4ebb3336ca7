use std::time::Duration;

use data_url::DataUrl;
use url::Url;

use crate::foundation::config::AvatarConfig;
use crate::foundation::error::{QuoteError, QuoteResult};

const USER_AGENT: &str = concat!("quotestick/", env!("CARGO_PKG_VERSION"));

/// Where a sender's profile picture comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarSource {
    /// `http`, `https`, `data` or `file` URL.
    Url(String),
    /// Already-encoded image bytes.
    Bytes(Vec<u8>),
}

impl AvatarSource {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }
}

/// Loads avatar bytes. Failures come back as [`QuoteError::AvatarFetch`].
#[derive(Clone, Debug)]
pub struct AvatarFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl AvatarFetcher {
    pub fn new(cfg: &AvatarConfig) -> QuoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| QuoteError::config(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            max_bytes: cfg.max_bytes,
        })
    }

    pub async fn fetch(&self, source: &AvatarSource) -> QuoteResult<Vec<u8>> {
        let bytes = match source {
            AvatarSource::Bytes(bytes) => bytes.clone(),
            AvatarSource::Url(raw) => self.fetch_url(raw).await?,
        };
        self.check_len(bytes.len())?;
        Ok(bytes)
    }

    async fn fetch_url(&self, raw: &str) -> QuoteResult<Vec<u8>> {
        let url = Url::parse(raw.trim())
            .map_err(|e| QuoteError::avatar_fetch(format!("invalid avatar url '{raw}': {e}")))?;

        match url.scheme() {
            "data" => {
                let data_url = DataUrl::process(url.as_str())
                    .map_err(|e| QuoteError::avatar_fetch(format!("malformed data url: {e:?}")))?;
                let (body, _fragment) = data_url
                    .decode_to_vec()
                    .map_err(|e| QuoteError::avatar_fetch(format!("bad data url body: {e:?}")))?;
                Ok(body)
            }
            "file" => {
                let path = url.to_file_path().map_err(|()| {
                    QuoteError::avatar_fetch(format!("file url has no local path: {url}"))
                })?;
                tokio::fs::read(&path).await.map_err(|e| {
                    QuoteError::avatar_fetch(format!("read '{}': {e}", path.display()))
                })
            }
            "http" | "https" => {
                let mut response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| QuoteError::avatar_fetch(format!("GET {url}: {e}")))?;
                if let Some(len) = response.content_length() {
                    self.check_len(usize::try_from(len).unwrap_or(usize::MAX))?;
                }
                let mut body = Vec::new();
                while let Some(chunk) = response
                    .chunk()
                    .await
                    .map_err(|e| QuoteError::avatar_fetch(format!("read body of {url}: {e}")))?
                {
                    self.check_len(body.len().saturating_add(chunk.len()))?;
                    body.extend_from_slice(&chunk);
                }
                Ok(body)
            }
            other => Err(QuoteError::avatar_fetch(format!(
                "unsupported avatar url scheme '{other}'"
            ))),
        }
    }

    fn check_len(&self, len: usize) -> QuoteResult<()> {
        if len > self.max_bytes {
            return Err(QuoteError::avatar_fetch(format!(
                "avatar is {len} bytes, limit is {}",
                self.max_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
