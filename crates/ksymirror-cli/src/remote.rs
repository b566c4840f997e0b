//! Format gallery access over HTTP (untrusted boundary).
//!
//! - `HttpFetcher`: one blocking `reqwest` client, built once and reused for
//!   every page; no retries, any non-success status is fatal.
//! - `HtmlExtractor`: pulls the `.ksy` source out of the gallery page's
//!   `section#format-ksy` code block.
//!
//! The client is owned by the fetcher, so its connections are released when
//! the fetcher is dropped on any exit path.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ksymirror_core::{DocumentFetch, MirrorError, MirrorResult, SourceExtract, SpecId};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://formats.kaitai.io";

const KSY_SECTION_SELECTOR: &str = "section#format-ksy pre";

pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let base = normalize_base_url(base_url)?;
        let client = build_http_client(user_agent, timeout_secs)?;
        Ok(Self { client, base })
    }

    /// Gallery page for `spec`: `<base>/<name>/`.
    pub fn page_url(&self, spec: &SpecId) -> MirrorResult<Url> {
        self.base
            .join(&format!("{}/", spec.name()))
            .map_err(|e| MirrorError::Transport {
                spec: spec.clone(),
                message: format!("invalid page url: {e}"),
            })
    }
}

impl DocumentFetch for HttpFetcher {
    fn fetch(&mut self, spec: &SpecId) -> MirrorResult<String> {
        let url = self.page_url(spec)?;
        tracing::debug!(spec = %spec, url = %url, "GET");

        let transport = |e: reqwest::Error| MirrorError::Transport {
            spec: spec.clone(),
            message: e.to_string(),
        };

        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MirrorError::NotFound { spec: spec.clone() });
        }
        if !status.is_success() {
            return Err(MirrorError::RemoteError {
                spec: spec.clone(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(transport)
    }
}

fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut base =
        Url::parse(base_url.trim()).with_context(|| format!("invalid base url: {base_url}"))?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(anyhow!("base url must be http(s): {base_url}"));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn build_http_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).unwrap_or_else(|_| HeaderValue::from_static("ksymirror")),
    );

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| anyhow!("failed to build http client: {e}"))
}

pub struct HtmlExtractor {
    selector: Selector,
}

impl HtmlExtractor {
    pub fn new() -> Result<Self> {
        let selector = Selector::parse(KSY_SECTION_SELECTOR)
            .map_err(|e| anyhow!("invalid selector `{KSY_SECTION_SELECTOR}`: {e}"))?;
        Ok(Self { selector })
    }
}

impl SourceExtract for HtmlExtractor {
    fn extract(&self, spec: &SpecId, page: &str) -> MirrorResult<String> {
        let doc = Html::parse_document(page);
        let Some(pre) = doc.select(&self.selector).next() else {
            return Err(MirrorError::malformed(
                spec,
                "page has no `section#format-ksy` code block",
            ));
        };

        let text: String = pre.text().collect();
        if text.trim().is_empty() {
            return Err(MirrorError::malformed(spec, "`.ksy` code block is empty"));
        }
        Ok(text)
    }
}
