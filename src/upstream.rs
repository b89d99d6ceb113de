//! Client for the inference server's generate, pull and tags endpoints.

use async_stream::stream;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;
use serde::Serialize;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::config::{Timeouts, normalize_base_url};
use crate::error::UpstreamError;
use crate::reshape::{self, LineOutcome, SegmentBuffer};

/// Lazy, single-pass sequence of generated text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

// Ollama /api/generate request body
#[derive(Serialize)]
struct UpstreamGenerate<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Serialize)]
struct UpstreamPull<'a> {
    name: &'a str,
    stream: bool,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeouts: Timeouts,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeouts: Timeouts) -> Self {
        let base_url = normalize_base_url(base_url);
        info!(url = %base_url, ?timeouts, "ollama client initialized");
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeouts,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-streaming generate: one string holding every fragment in order.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str, model: &str) -> Result<String, UpstreamError> {
        let url = self.endpoint("/api/generate");
        let limit = self.timeouts.generate;

        let res = self
            .client
            .post(&url)
            .json(&UpstreamGenerate { model, prompt, stream: false })
            .timeout(limit)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        let res = expect_status(res, |s| s == StatusCode::OK, limit).await?;

        let body = res
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        let reshaped = reshape::concat_lines(&body);
        debug!(chars = reshaped.text.len(), skipped = reshaped.skipped, "generate complete");
        Ok(reshaped.text)
    }

    /// Streaming generate.
    ///
    /// Fails up front on connection errors and non-200 answers. Afterwards the
    /// generate timeout applies to the gap between body chunks. Dropping the
    /// stream drops the upstream response, which closes that connection.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate_stream(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<FragmentStream, UpstreamError> {
        let url = self.endpoint("/api/generate");
        let limit = self.timeouts.generate;

        let send = self
            .client
            .post(&url)
            .json(&UpstreamGenerate { model, prompt, stream: true })
            .send();
        let res = timeout(limit, send)
            .await
            .map_err(|_| UpstreamError::Timeout(limit))?
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        let res = expect_status(res, |s| s == StatusCode::OK, limit).await?;

        let mut body = Box::pin(res.bytes_stream());
        let stream = stream! {
            let mut guard = DropGuard { url: url.clone(), finished: false };
            let mut segments = SegmentBuffer::new();
            loop {
                let chunk = match timeout(limit, body.next()).await {
                    Err(_) => {
                        guard.finished = true;
                        yield Err(UpstreamError::Timeout(limit));
                        return;
                    }
                    Ok(None) => break,
                    Ok(Some(Err(e))) => {
                        guard.finished = true;
                        yield Err(UpstreamError::from_reqwest(e, &url, limit));
                        return;
                    }
                    Ok(Some(Ok(chunk))) => chunk,
                };
                for fragment in reshape::fragments_of(&mut segments, &chunk) {
                    yield Ok(fragment);
                }
            }
            if let Some(LineOutcome::Fragment(text)) = segments.finish().map(|s| reshape::parse_line(&s)) {
                yield Ok(text);
            }
            guard.finished = true;
            debug!("upstream stream finished");
        };
        Ok(Box::pin(stream))
    }

    /// Ask the server to download `name`; resolves once the pull is done.
    #[instrument(skip(self))]
    pub async fn pull_model(&self, name: &str) -> Result<(), UpstreamError> {
        let url = self.endpoint("/api/pull");
        let limit = self.timeouts.pull;

        let res = self
            .client
            .post(&url)
            .json(&UpstreamPull { name, stream: false })
            .timeout(limit)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        let res = expect_status(res, |s| s.is_success(), limit).await?;

        // the pull only completes once the body has been read
        res.bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        info!(model = name, "model pulled");
        Ok(())
    }

    /// The upstream `models` array, untouched.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<serde_json::Value, UpstreamError> {
        let url = self.endpoint("/api/tags");
        let limit = self.timeouts.tags;

        let res = self
            .client
            .get(&url)
            .timeout(limit)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        let res = expect_status(res, |s| s.is_success(), limit).await?;

        let mut tags: serde_json::Value = res
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &url, limit))?;
        Ok(tags
            .get_mut("models")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }
}

// The error body is diagnostic only; an upstream that stalls on it must not
// hold the caller past `limit`.
async fn expect_status(
    res: reqwest::Response,
    ok: impl Fn(StatusCode) -> bool,
    limit: Duration,
) -> Result<reqwest::Response, UpstreamError> {
    let status = res.status();
    if ok(status) {
        return Ok(res);
    }
    let body = match timeout(limit, res.text()).await {
        Ok(text) => text.unwrap_or_default(),
        Err(_) => {
            debug!(%status, "gave up reading upstream error body");
            String::new()
        }
    };
    Err(UpstreamError::Status { status, body })
}

// Logs streams abandoned before the upstream finished (client went away).
struct DropGuard {
    url: String,
    finished: bool,
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!(url = %self.url, "stream dropped before upstream finished, releasing connection");
        }
    }
}
