//! Flickr REST API client.
//!
//! Implements the [`FlickrApi`] trait over the JSON flavour of the REST
//! endpoint.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://api.flickr.com/services/rest`
//! - **Calling convention**: every call is a GET with `method`, `api_key`,
//!   `format=json`, `nojsoncallback=1` plus per-method parameters.
//! - **Status**: every payload carries `stat`; anything other than `"ok"`
//!   maps to [`Error::RemoteLookup`] with the remote `code`/`message`.
//! - **Pagination**: `photos.search` and `photosets.getPhotos` are walked
//!   page by page to exhaustion before returning.
//! - **Normalization**: raw payload shapes are collapsed into the canonical
//!   records from `flickrs_core::remote` (see [`response`]).

pub mod request;
pub mod response;

pub use request::{AlbumRequest, SearchRequest};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flickrs_core::Error;
use flickrs_core::remote::{FlickrApi, OwnerInfo, PhotoInfo, SizeInfo};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use response::{AlbumResponse, Envelope, PersonResponse, PhotoInfoResponse, SearchResponse, SizesResponse};

/// Default REST endpoint.
const DEFAULT_BASE_URL: &str = "https://api.flickr.com/services/rest";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "flickrs/0.1";

/// Flickr API client configuration.
#[derive(Debug, Clone)]
pub struct FlickrConfig {
    /// API key, sent on every call.
    pub api_key: String,
    /// API secret paired with the key (used by signed calls; the read-only
    /// methods here go unsigned).
    pub api_secret: String,
    /// Base URL (default: https://api.flickr.com/services/rest).
    pub base_url: String,
    /// Request timeout (default: 10s). Expiry surfaces as
    /// [`Error::RemoteTimeout`].
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for FlickrConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FlickrConfig {
    /// Configuration with the given credential pair and defaults for the rest.
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            ..Default::default()
        }
    }
}

/// Flickr REST API client.
#[derive(Debug, Clone)]
pub struct FlickrClient {
    http: reqwest::Client,
    config: FlickrConfig,
}

impl FlickrClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FlickrConfig) -> Result<Self, Error> {
        if config.api_key.is_empty() {
            return Err(Error::InvalidInput("API key must not be empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::RemoteTransport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Execute one REST method call and decode the payload.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &impl Serialize) -> Result<T, Error> {
        tracing::debug!(method, "calling Flickr API");

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("method", method),
                ("api_key", self.config.api_key.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::RemoteTimeout { method: method.to_string() }
                } else {
                    Error::RemoteTransport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteTransport(format!("status {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::RemoteTransport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::RemoteParse(e.to_string()))
    }

    fn lookup_err(entity: &'static str, id: &str, envelope: Envelope) -> Error {
        Error::RemoteLookup {
            entity,
            id: id.to_string(),
            code: envelope.code,
            message: envelope.message.unwrap_or_else(|| "remote reported failure".to_string()),
        }
    }
}

#[async_trait]
impl FlickrApi for FlickrClient {
    async fn get_owner_info(&self, nsid: &str) -> Result<OwnerInfo, Error> {
        let response: PersonResponse = self
            .call("flickr.people.getInfo", &[("user_id", nsid)])
            .await?;
        if !response.envelope.is_ok() {
            return Err(Self::lookup_err("owner", nsid, response.envelope));
        }
        let person = response
            .person
            .ok_or_else(|| Error::RemoteParse("response missing person".to_string()))?;
        Ok(person.normalize())
    }

    async fn get_photo_info(&self, photo_id: &str) -> Result<PhotoInfo, Error> {
        let response: PhotoInfoResponse = self
            .call("flickr.photos.getInfo", &[("photo_id", photo_id)])
            .await?;
        if !response.envelope.is_ok() {
            return Err(Self::lookup_err("photo", photo_id, response.envelope));
        }
        let photo = response
            .photo
            .ok_or_else(|| Error::RemoteParse("response missing photo".to_string()))?;
        photo.normalize()
    }

    async fn get_photo_sizes(&self, photo_id: &str) -> Result<Vec<SizeInfo>, Error> {
        let response: SizesResponse = self
            .call("flickr.photos.getSizes", &[("photo_id", photo_id)])
            .await?;
        if !response.envelope.is_ok() {
            return Err(Self::lookup_err("photo", photo_id, response.envelope));
        }
        let sizes = response
            .sizes
            .ok_or_else(|| Error::RemoteParse("response missing sizes".to_string()))?;
        sizes.size.into_iter().map(response::RawSize::normalize).collect()
    }

    async fn search_photos(
        &self,
        owner_nsid: &str,
        tag: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PhotoInfo>, Error> {
        let mut req = SearchRequest::new(owner_nsid, tag, since.map(|d| d.timestamp()));
        req.validate()?;

        let mut photos = Vec::new();
        loop {
            let response: SearchResponse = self.call("flickr.photos.search", &req).await?;
            if !response.envelope.is_ok() {
                return Err(Self::lookup_err("tag", tag, response.envelope));
            }
            let page = response
                .photos
                .ok_or_else(|| Error::RemoteParse("response missing photos".to_string()))?;
            for raw in page.photo {
                photos.push(raw.normalize()?);
            }
            if page.page.value()? >= page.pages.value()? {
                break;
            }
            req.page += 1;
        }

        tracing::debug!(tag, count = photos.len(), "search complete");
        Ok(photos)
    }

    async fn list_album_photos(&self, owner_nsid: &str, album_id: &str) -> Result<Vec<PhotoInfo>, Error> {
        let mut req = AlbumRequest::new(owner_nsid, album_id);
        req.validate()?;

        let mut photos = Vec::new();
        loop {
            let response: AlbumResponse = self.call("flickr.photosets.getPhotos", &req).await?;
            if !response.envelope.is_ok() {
                return Err(Self::lookup_err("album", album_id, response.envelope));
            }
            let page = response
                .photoset
                .ok_or_else(|| Error::RemoteParse("response missing photoset".to_string()))?;
            for raw in page.photo {
                photos.push(raw.normalize_with_owner(Some(owner_nsid))?);
            }
            if page.page.value()? >= page.pages.value()? {
                break;
            }
            req.page += 1;
        }

        tracing::debug!(album_id, count = photos.len(), "album listing complete");
        Ok(photos)
    }
}
