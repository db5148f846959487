use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `channels.list` accepts at most this many ids per call.
pub const MAX_IDS_PER_REQUEST: usize = 50;

const CHANNELS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/channels";

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Latest public numbers and descriptive fields for one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStatistics {
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub custom_url: String,
    pub country: Option<String>,
    pub published_at: String,
    pub thumbnail_url: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
    pub hidden_subscriber_count: bool,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("BuildHttpClient: {source}")]
    BuildHttpClient {
        #[from]
        source: reqwest::Error,
    },
}

impl YouTubeClient {
    /// Every request made through this client is bounded by `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("rust-client")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: CHANNELS_ENDPOINT.to_string(),
        })
    }

    /// Points the client at another `channels.list` compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetches statistics and snippet for up to [`MAX_IDS_PER_REQUEST`] channels.
    ///
    /// Unknown ids are silently absent from the result, which is how the API
    /// reports them.
    pub async fn fetch_channels(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStatistics>, FetchChannelsError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_IDS_PER_REQUEST {
            return Err(FetchChannelsError::TooManyIds { requested: ids.len() });
        }

        // The key travels in a header and URLs are stripped from transport
        // errors, so error text never carries it.
        let joined = ids.join(",");
        let response = self
            .client
            .get(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("part", "statistics,snippet"), ("id", joined.as_str())])
            .send()
            .await
            .map_err(|source| FetchChannelsError::RequestSend {
                source: source.without_url(),
            })?;

        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|source| FetchChannelsError::ResponseRead {
                source: source.without_url(),
            })?;

        if !status.is_success() {
            return Err(classify_error(status, body));
        }

        parse_channel_list(&body, Utc::now())
    }
}

#[derive(Debug, Error)]
pub enum FetchChannelsError {
    #[error("TooManyIds: {requested} ids requested, at most 50 allowed")]
    TooManyIds { requested: usize },

    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("YouTube API quota exceeded")]
    QuotaExceeded,

    #[error("Invalid YouTube API key")]
    KeyInvalid,

    #[error("UnexpectedStatus: {status}: {message}")]
    UnexpectedStatus { status: StatusCode, message: String },

    #[error("DeserializeResponseBody: {source}")]
    DeserializeResponseBody {
        #[from]
        source: serde_json::Error,
    },
}

pub(crate) fn parse_channel_list(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<ChannelStatistics>, FetchChannelsError> {
    let parsed: ChannelListResponse = serde_json::from_str(body)?;

    Ok(parsed
        .items
        .into_iter()
        .map(|item| item.into_statistics(fetched_at))
        .collect())
}

pub(crate) fn classify_error(status: StatusCode, body: String) -> FetchChannelsError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(&body).ok();
    let reasons: Vec<String> = envelope
        .as_ref()
        .map(|e| e.error.errors.iter().map(|i| i.reason.clone()).collect())
        .unwrap_or_default();

    if reasons
        .iter()
        .any(|r| r == "quotaExceeded" || r == "dailyLimitExceeded" || r == "rateLimitExceeded")
    {
        return FetchChannelsError::QuotaExceeded;
    }
    if reasons.iter().any(|r| r == "keyInvalid") {
        return FetchChannelsError::KeyInvalid;
    }

    let message = envelope
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    FetchChannelsError::UnexpectedStatus { status, message }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

impl ChannelItem {
    fn into_statistics(self, fetched_at: DateTime<Utc>) -> ChannelStatistics {
        let thumbnail_url = self.snippet.thumbnails.best_url();

        ChannelStatistics {
            channel_id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            custom_url: self.snippet.custom_url,
            country: self.snippet.country,
            published_at: self.snippet.published_at,
            thumbnail_url,
            subscriber_count: parse_count(self.statistics.subscriber_count.as_deref()),
            view_count: parse_count(self.statistics.view_count.as_deref()),
            video_count: parse_count(self.statistics.video_count.as_deref()),
            hidden_subscriber_count: self.statistics.hidden_subscriber_count,
            fetched_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    custom_url: String,
    country: Option<String>,
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best_url(&self) -> String {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

// Counts arrive as decimal strings.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Statistics {
    subscriber_count: Option<String>,
    view_count: Option<String>,
    video_count: Option<String>,
    hidden_subscriber_count: bool,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
