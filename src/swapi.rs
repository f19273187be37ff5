use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::model::{Cursor, Page, PeopleResponse};

const PEOPLE_PATH: &str = "people/";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to reach people API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("people API error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed people response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// What to fetch: the first page of a (possibly empty) query, or the page a
/// cursor points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    First { query: String },
    Next(Cursor),
}

#[async_trait]
pub trait PeopleService: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError>;
}

#[derive(Clone)]
pub struct SwapiClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for SwapiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SwapiClient {
    pub fn new() -> Result<Self, FetchError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        Self::with_base_url(
            base_url,
            DEFAULT_USER_AGENT,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
    }

    pub fn from_config(cfg: &Config) -> Result<Self, FetchError> {
        let base_url = cfg
            .api
            .resolved_base_url()
            .map_err(|err: ConfigError| FetchError::InvalidUrl(err.to_string()))?;
        Self::with_base_url(base_url, &cfg.api.user_agent, cfg.api.timeout())
    }

    pub fn with_base_url(
        base_url: Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_request(&self, request: &PageRequest) -> Result<reqwest::Request, FetchError> {
        let builder = match request {
            PageRequest::First { query } => {
                let endpoint = self
                    .base_url
                    .join(PEOPLE_PATH)
                    .map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
                let builder = self.http.get(endpoint);
                if query.is_empty() {
                    builder
                } else {
                    builder.query(&[("search", query.as_str())])
                }
            }
            PageRequest::Next(cursor) => {
                let url = Url::parse(cursor.as_str())
                    .map_err(|err| FetchError::InvalidUrl(format!("{}: {}", cursor, err)))?;
                self.http.get(url)
            }
        };
        builder
            .header("Accept", "application/json")
            .build()
            .map_err(FetchError::from)
    }

    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let req = self.build_request(request)?;
        debug!(url=%req.url(), "sending people request");
        let res = self.http.execute(req).await?;

        let status = res.status();
        debug!(%status, "people response status");
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, body=%body, "people API returned an error");
            return Err(FetchError::Status { status, body });
        }

        let body = res.text().await?;
        let payload: PeopleResponse = serde_json::from_str(&body)?;
        debug!(
            count = payload.count,
            received = payload.results.len(),
            next = ?payload.next,
            "decoded people page"
        );
        Ok(Page::from(payload))
    }
}

#[async_trait]
impl PeopleService for SwapiClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        SwapiClient::fetch_page(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_without_query_hits_people() {
        let client = SwapiClient::new().unwrap();
        let req = client
            .build_request(&PageRequest::First { query: String::new() })
            .unwrap();
        assert_eq!(req.method(), reqwest::Method::GET);
        assert_eq!(req.url().as_str(), "https://swapi.dev/api/people/");
        assert!(req.url().query().is_none());
        assert_eq!(
            req.headers()
                .get("Accept")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "application/json"
        );
    }

    #[test]
    fn search_query_is_encoded() {
        let client = SwapiClient::new().unwrap();
        let req = client
            .build_request(&PageRequest::First { query: "darth vader".into() })
            .unwrap();
        assert_eq!(req.url().path(), "/api/people/");
        let pairs: Vec<(String, String)> = req
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![("search".to_string(), "darth vader".to_string())]);
    }

    #[test]
    fn cursor_is_followed_verbatim() {
        let client = SwapiClient::new().unwrap();
        let cursor = Cursor::new("https://swapi.dev/api/people/?search=a&page=3");
        let req = client.build_request(&PageRequest::Next(cursor)).unwrap();
        assert_eq!(
            req.url().as_str(),
            "https://swapi.dev/api/people/?search=a&page=3"
        );
    }

    #[test]
    fn relative_cursor_is_rejected() {
        let client = SwapiClient::new().unwrap();
        let err = client
            .build_request(&PageRequest::Next(Cursor::new("page2")))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(msg) if msg.contains("page2")));
    }

    #[test]
    fn from_config_respects_base_url_prefix() {
        let mut cfg = Config::default();
        cfg.api.base_url = "http://localhost:9999/v1".into();
        let client = SwapiClient::from_config(&cfg).unwrap();
        let req = client
            .build_request(&PageRequest::First { query: String::new() })
            .unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:9999/v1/people/");
    }
}
