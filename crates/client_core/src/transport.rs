//! reqwest-backed listing service for JSONPlaceholder-style REST endpoints.

use std::{error::Error as StdError, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Item, ItemDraft, ItemId},
    error::ListingError,
    protocol::PageRequest,
};
use tracing::debug;
use url::Url;

use crate::RemoteListingService;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const ITEMS_PATH: &str = "posts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Must end with `/` so relative endpoints join under it.
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Parses `raw`, appending the trailing `/` that endpoint joins rely on.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let raw = raw.trim();
        let base_url = if raw.ends_with('/') {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("{raw}/"))?
        };
        Ok(Self::new(base_url))
    }
}

pub struct HttpListingService {
    http: Client,
    base_url: Url,
}

impl HttpListingService {
    pub fn new(config: TransportConfig) -> Result<Self, ListingError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(classify_error)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ListingError> {
        self.base_url
            .join(path)
            .map_err(|e| ListingError::unclassified(format!("invalid endpoint {path:?}: {e}")))
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ListingError> {
        debug!(status = %response.status(), url = %response.url(), "listing: response received");
        response
            .error_for_status()
            .map_err(classify_error)?
            .json()
            .await
            .map_err(classify_error)
    }
}

#[async_trait]
impl RemoteListingService for HttpListingService {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>, ListingError> {
        let url = self.endpoint(ITEMS_PATH)?;
        debug!(%url, offset = request.offset, limit = request.limit, "listing: GET page");
        let response = self
            .http
            .get(url)
            .query(&request)
            .send()
            .await
            .map_err(classify_error)?;
        Self::decode(response).await
    }

    async fn create_item(&self, draft: ItemDraft) -> Result<Item, ListingError> {
        let url = self.endpoint(ITEMS_PATH)?;
        debug!(%url, "listing: POST item");
        let response = self
            .http
            .post(url)
            .json(&draft)
            .send()
            .await
            .map_err(classify_error)?;
        Self::decode(response).await
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Item, ListingError> {
        let url = self.endpoint(&format!("{ITEMS_PATH}/{id}"))?;
        debug!(%url, "listing: GET item");
        let response = self.http.get(url).send().await.map_err(classify_error)?;
        Self::decode(response).await
    }
}

/// Sorts a reqwest failure into the listing error taxonomy.
pub fn classify_error(err: reqwest::Error) -> ListingError {
    if let Some(status) = err.status() {
        return ListingError::Server {
            status: status.as_u16(),
        };
    }

    let detail = error_chain(&err);
    if err.is_connect()
        || err.is_timeout()
        || err.is_request()
        || err.is_body()
        || broke_mid_body(&err)
    {
        ListingError::Transport(detail)
    } else {
        ListingError::Unclassified(detail)
    }
}

/// A body that stops arriving surfaces as a decode error wrapping the IO or
/// body failure underneath; only genuine payload errors stay unclassified.
fn broke_mid_body(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        if let Some(inner) = cause.downcast_ref::<reqwest::Error>() {
            if inner.is_body() || inner.is_connect() || inner.is_timeout() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

fn error_chain(err: &dyn StdError) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
