//! The remote-client seam.
//!
//! The cache manager only needs "something that can fetch owner info, photo
//! info, photo sizes, tag search results, and album contents". That contract
//! lives here as the [`FlickrApi`] trait together with the canonical record
//! shapes every implementation must normalize into; the HTTP implementation
//! is in the `flickrs-client` crate and tests use an in-memory mock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;

/// Owner information as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerInfo {
    pub nsid: String,
    pub username: String,
    pub realname: String,
    pub path_alias: String,
}

/// Photo information normalized into one canonical shape.
///
/// The remote payload varies between endpoints and API versions (wrapped vs.
/// plain text fields, nested vs. bare owner, differing date field names);
/// implementations resolve all of that before handing records to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoInfo {
    pub id: String,
    pub secret: String,
    pub server: String,
    pub farm: String,
    /// Upload timestamp.
    pub uploaded: DateTime<Utc>,
    pub owner_nsid: String,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One rendition of a photo as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeInfo {
    pub label: String,
    pub width: i64,
    pub height: i64,
    pub source: String,
}

/// Remote operations the cache depends on.
///
/// Every method may fail with [`Error::RemoteLookup`] when the remote
/// reports a non-ok status, [`Error::RemoteTimeout`] when the configured
/// deadline expires, or [`Error::RemoteTransport`] on network failure.
/// Implementations paginate `search_photos` and `list_album_photos` to
/// exhaustion before returning.
#[async_trait]
pub trait FlickrApi: Send + Sync {
    /// Fetch owner information by nsid.
    async fn get_owner_info(&self, nsid: &str) -> Result<OwnerInfo, Error>;

    /// Fetch full photo information by photo id.
    async fn get_photo_info(&self, photo_id: &str) -> Result<PhotoInfo, Error>;

    /// Fetch all available renditions of a photo.
    async fn get_photo_sizes(&self, photo_id: &str) -> Result<Vec<SizeInfo>, Error>;

    /// Search an owner's photos by tag, optionally restricted to photos
    /// uploaded on or after `since`.
    async fn search_photos(
        &self,
        owner_nsid: &str,
        tag: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PhotoInfo>, Error>;

    /// List the member photos of an album (photoset).
    async fn list_album_photos(&self, owner_nsid: &str, album_id: &str) -> Result<Vec<PhotoInfo>, Error>;
}
