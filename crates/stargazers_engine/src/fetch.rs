use std::fmt;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use stargazers_core::{PageRequest, RawPage};

use crate::query::{stargazers_query, GraphQlRequest, OwnershipPolicy, Variables, MAX_PAGE_SIZE};
use crate::{FailureKind, FetchError};

pub const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

#[derive(Clone)]
pub struct FetchSettings {
    pub endpoint: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub page_size: u32,
    pub ownership: OwnershipPolicy,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: GITHUB_GRAPHQL_ENDPOINT.to_string(),
            token: None,
            user_agent: concat!("stargazers/", env!("CARGO_PKG_VERSION")).to_string(),
            page_size: MAX_PAGE_SIZE,
            ownership: OwnershipPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for FetchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSettings")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("ownership", &self.ownership)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

/// The single I/O boundary of the aggregation: fetch one page of stargazers.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct GithubGraphqlFetcher {
    settings: FetchSettings,
    query: String,
    client: reqwest::Client,
}

impl GithubGraphqlFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        reqwest::Url::parse(&settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        let query = stargazers_query(settings.page_size, settings.ownership);
        Ok(Self {
            settings,
            query,
            client,
        })
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl PageFetcher for GithubGraphqlFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        engine_info!(
            "fetching stargazers of {} request_id={} cursor={:?}",
            request.target,
            request.request_id,
            request.cursor
        );
        let body = serde_json::to_vec(&GraphQlRequest {
            query: &self.query,
            variables: Variables::for_request(request),
        })
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;

        let mut builder = self
            .client
            .post(&self.settings.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.settings.user_agent)
            .body(body);
        if let Some(token) = &self.settings.token {
            builder = builder.header(AUTHORIZATION, format!("bearer {token}"));
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            engine_warn!("stargazers request for {} got {}", request.target, status);
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = self.read_body(response).await?;
        decode_response(&bytes)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default)]
    repository: Option<RepositoryData>,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    #[serde(default)]
    stargazers: Option<RawPage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Unwraps `data.repository.stargazers` from a GraphQL response body.
pub fn decode_response(bytes: &[u8]) -> Result<RawPage, FetchError> {
    let response: GraphQlResponse = serde_json::from_slice(bytes)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;

    if !response.errors.is_empty() {
        let not_found = response
            .errors
            .iter()
            .any(|err| err.kind.as_deref() == Some("NOT_FOUND"));
        let message = response
            .errors
            .iter()
            .map(|err| err.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let kind = if not_found {
            FailureKind::NotFound
        } else {
            FailureKind::GraphQl
        };
        return Err(FetchError::new(kind, message));
    }

    let repository = response
        .data
        .and_then(|data| data.repository)
        .ok_or_else(|| FetchError::new(FailureKind::NotFound, "repository is null"))?;
    repository
        .stargazers
        .ok_or_else(|| FetchError::new(FailureKind::Decode, "missing stargazers connection"))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
