//! Content API client.
//!
//! `CatalogApi` is the seam between the tree builders and the network; the
//! builders only ever see already-decoded DTOs. `HttpCatalog` is the reqwest
//! implementation used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::dto::{
    Episode, Event, HomepageContent, SeasonList, Session, StreamsBundle, VodTypeList,
};

pub const DEFAULT_BASE_URL: &str = "https://f1tv.formula1.com";

/// Resource pattern of event references in the homepage feed.
pub const EVENT_OCCURRENCE_PATTERN: &str = "/api/event-occurrence/";

const SEASON_FIELDS: &str = "year,name,self,eventoccurrence_urls";
const EVENT_FIELDS: &str = "name,official_name,self,sessionoccurrence_urls";
const SESSION_FIELDS: &str = "name,status,slug,content_urls";
const STREAM_FIELDS: &str =
    "channel_urls,channel_urls__name,channel_urls__self,channel_urls__driver_urls";
const EPISODE_FIELDS: &str = "uid,title,items,data_source_id";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0} not found")]
    NotFound(String),
}

/// Everything the tree builders need from the content API.
///
/// Ids are the API's self URLs (`/api/session-occurrence/<uid>/`), passed
/// through untouched.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_seasons(&self) -> Result<SeasonList, FetchError>;

    async fn fetch_event(&self, id: &str) -> Result<Event, FetchError>;

    async fn fetch_session(&self, id: &str) -> Result<Session, FetchError>;

    async fn fetch_streams(&self, slug: &str) -> Result<StreamsBundle, FetchError>;

    /// Episodes for `ids`, in the order of `ids`.
    async fn fetch_episodes(&self, ids: &[String]) -> Result<Vec<Episode>, FetchError>;

    async fn fetch_homepage(&self) -> Result<HomepageContent, FetchError>;

    async fn fetch_vod_types(&self) -> Result<VodTypeList, FetchError>;

    /// Resolve a perspective or episode asset id into a playable HLS URL.
    async fn fetch_stream_url(&self, stream_id: &str) -> Result<String, FetchError>;
}

pub struct HttpCatalog {
    client: Client,
    base_url: String,
    language: String,
    /// Upper bound on simultaneous requests for multi-id calls; 0 is unbounded.
    parallel: usize,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, parallel: usize) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .user_agent(concat!("paddock/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| FetchError::Http {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: "en".to_string(),
            parallel,
        })
    }

    /// Language requested for titles and labels.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// In-flight requests for a multi-id call over `count` ids.
    fn buffer_size(&self, count: usize) -> usize {
        match self.parallel {
            0 => count.max(1),
            n => n,
        }
    }

    fn url(&self, path: &str, fields: &str) -> String {
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}fields={}", self.base_url, path, sep, fields)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Accept-Language", &self.language)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        response
            .json()
            .await
            .map_err(|source| FetchError::Decode { url, source })
    }
}

#[derive(Deserialize)]
struct TokenisedUrl {
    #[serde(rename = "tokenised_url")]
    url: String,
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn fetch_seasons(&self) -> Result<SeasonList, FetchError> {
        let url = self.url("/api/race-season/?order=-year&has_content=true", SEASON_FIELDS);
        self.get_json(url).await
    }

    async fn fetch_event(&self, id: &str) -> Result<Event, FetchError> {
        self.get_json(self.url(id, EVENT_FIELDS)).await
    }

    async fn fetch_session(&self, id: &str) -> Result<Session, FetchError> {
        self.get_json(self.url(id, SESSION_FIELDS)).await
    }

    async fn fetch_streams(&self, slug: &str) -> Result<StreamsBundle, FetchError> {
        // Each matching session occurrence is one stream group.
        let path = format!("/api/session-occurrence/?slug={}", slug);
        let url = self.url(&path, STREAM_FIELDS);
        self.get_json(url).await
    }

    async fn fetch_episodes(&self, ids: &[String]) -> Result<Vec<Episode>, FetchError> {
        let urls: Vec<String> = ids.iter().map(|id| self.url(id, EPISODE_FIELDS)).collect();
        let limit = self.buffer_size(urls.len());
        // `buffered` yields in input order regardless of completion order.
        stream::iter(urls.into_iter().map(|url| self.get_json::<Episode>(url)))
            .buffered(limit)
            .try_collect()
            .await
    }

    async fn fetch_homepage(&self) -> Result<HomepageContent, FetchError> {
        let url = self.url(
            "/api/sets/?slug=home",
            "items,items__content_url,items__content_url__items,items__content_url__items__content_url,items__content_url__items__content_url__self",
        );
        self.get_json(url).await
    }

    async fn fetch_vod_types(&self) -> Result<VodTypeList, FetchError> {
        self.get_json(self.url("/api/vod-type-tag/", "name,content_urls"))
            .await
    }

    async fn fetch_stream_url(&self, stream_id: &str) -> Result<String, FetchError> {
        let url = format!("{}/api/viewings/", self.base_url);
        debug!("POST {} for {}", url, stream_id);
        let body = if stream_id.contains("/api/channels/") {
            serde_json::json!({ "channel_url": stream_id })
        } else {
            serde_json::json!({ "asset_url": stream_id })
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        // Channel viewings answer with a bare object, asset viewings with an
        // `objects` list.
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;
        let entry = value
            .get("objects")
            .and_then(|o| o.get(0))
            .and_then(|o| o.get("tata"))
            .unwrap_or(&value);
        serde_json::from_value::<TokenisedUrl>(entry.clone())
            .map(|t| t.url)
            .map_err(|_| FetchError::NotFound(format!("stream url for {}", stream_id)))
    }
}
