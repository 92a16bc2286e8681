//! Get-or-fetch-and-cache orchestration.
//!
//! [`PhotoCache`] is the sole writer to the entity store. Every operation
//! follows the same sequence: check the store, call the remote client on a
//! miss, persist the mapped records, return them. The remote client is
//! injected at construction; there is no ambient global handle.

use super::albums::Album;
use super::connection::CacheDb;
use super::owners::Owner;
use super::photos::Photo;
use super::tags::Tag;
use crate::Error;
use crate::remote::{FlickrApi, PhotoInfo};
use chrono::{Duration, Utc};

/// Albums are resynced only when unvisited or older than this.
const ALBUM_STALENESS_HOURS: i64 = 24;

/// The cache manager: answers entity lookups from local storage, fetching
/// and persisting through the remote client on a miss.
#[derive(Debug)]
pub struct PhotoCache<A> {
    db: CacheDb,
    api: A,
    default_user: Option<String>,
}

impl<A: FlickrApi> PhotoCache<A> {
    /// Create a cache over an open database and a remote client.
    ///
    /// `default_user` is the owner nsid used by tag and album lookups when
    /// the caller does not name one.
    pub fn new(db: CacheDb, api: A, default_user: Option<String>) -> Self {
        Self { db, api, default_user }
    }

    /// The underlying store, for read-only queries beyond the manager's own
    /// operations (size listings, best-size selection).
    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Get an owner by nsid, fetching and caching it on a miss.
    pub async fn get_owner(&self, nsid: &str) -> Result<Owner, Error> {
        if let Some(owner) = self.db.get_owner(nsid).await? {
            return Ok(owner);
        }
        tracing::debug!(nsid, "owner cache miss, fetching");
        let owner = Owner::from(self.api.get_owner_info(nsid).await?);
        self.db.insert_owner(&owner).await?;
        Ok(owner)
    }

    /// Get a photo by id, fetching info and sizes and caching both on a miss.
    pub async fn get_photo(&self, photo_id: &str) -> Result<Photo, Error> {
        if let Some(photo) = self.db.get_photo(photo_id).await? {
            return Ok(photo);
        }
        tracing::debug!(photo_id, "photo cache miss, fetching");
        let info = self.api.get_photo_info(photo_id).await?;
        self.ingest_photo(info).await
    }

    /// Cache one photo from an already-normalized record: ensure its owner
    /// exists, fetch sizes, and insert photo plus sizes as one unit.
    ///
    /// Shared by direct lookups and tag/album syncs. Leaves the store
    /// untouched when the sizes fetch fails.
    async fn ingest_photo(&self, info: PhotoInfo) -> Result<Photo, Error> {
        if let Some(photo) = self.db.get_photo(&info.id).await? {
            return Ok(photo);
        }
        self.get_owner(&info.owner_nsid).await?;
        let sizes = self.api.get_photo_sizes(&info.id).await?;
        let photo = Photo::from(info);
        self.db.insert_photo(&photo, &sizes).await?;
        Ok(photo)
    }

    /// Convenience composition of [`get_photo`](Self::get_photo) and
    /// [`CacheDb::best_size_url`].
    pub async fn get_photo_url(
        &self,
        photo_id: &str,
        min_width: Option<i64>,
        min_height: Option<i64>,
    ) -> Result<Option<String>, Error> {
        let photo = self.get_photo(photo_id).await?;
        self.db.best_size_url(&photo.id, min_width, min_height, None).await
    }

    /// The photo's page URL on the remote service.
    pub async fn get_photo_page_url(&self, photo_id: &str) -> Result<String, Error> {
        let photo = self.get_photo(photo_id).await?;
        let owner = self.get_owner(&photo.owner_id).await?;
        Ok(photo.page_url(&owner))
    }

    /// All cached photos for a tag, newest first, syncing new uploads from
    /// the remote first.
    ///
    /// The first visit fetches the tag's full history; later visits only ask
    /// the remote for photos uploaded since the last sync. Association rows
    /// accumulate across syncs and are never pruned, so the returned set can
    /// only grow between calls.
    pub async fn get_tagged_photos(&self, tag: &str, owner: Option<&str>) -> Result<Vec<Photo>, Error> {
        if tag.is_empty() {
            return Err(Error::InvalidInput("tag name cannot be empty".to_string()));
        }
        let owner_nsid = self.resolve_owner(owner)?.to_string();
        self.get_owner(&owner_nsid).await?;

        let record = self.find_or_create_tag(tag, &owner_nsid).await?;
        let since = record.last_visited;
        tracing::debug!(tag, owner = %owner_nsid, ?since, "syncing tag");

        let found = self.api.search_photos(&owner_nsid, tag, since).await?;
        let mut photo_ids = Vec::with_capacity(found.len());
        for info in found {
            photo_ids.push(self.ingest_photo(info).await?.id);
        }
        self.db.commit_tag_sync(record.id, &photo_ids, Utc::now()).await?;

        self.db.photos_for_tag(record.id).await
    }

    /// All cached member photos of an album, newest first, resyncing
    /// membership when the record is unvisited or past the staleness window.
    pub async fn get_album(&self, album_id: &str, owner: Option<&str>) -> Result<Vec<Photo>, Error> {
        if album_id.is_empty() {
            return Err(Error::InvalidInput("album id cannot be empty".to_string()));
        }
        let owner_nsid = self.resolve_owner(owner)?.to_string();
        self.get_owner(&owner_nsid).await?;

        let record = self.find_or_create_album(album_id, &owner_nsid).await?;
        let stale = match record.last_visited {
            None => true,
            Some(visited) => Utc::now() - visited > Duration::hours(ALBUM_STALENESS_HOURS),
        };

        if stale {
            tracing::debug!(album_id, owner = %owner_nsid, "album stale, resyncing");
            let members = self.api.list_album_photos(&owner_nsid, album_id).await?;
            let mut photo_ids = Vec::with_capacity(members.len());
            for info in members {
                photo_ids.push(self.ingest_photo(info).await?.id);
            }
            self.db.commit_album_sync(record.id, &photo_ids, Utc::now()).await?;
        }

        self.db.photos_for_album(record.id).await
    }

    fn resolve_owner<'a>(&'a self, owner: Option<&'a str>) -> Result<&'a str, Error> {
        owner.or(self.default_user.as_deref()).ok_or(Error::NoOwner)
    }

    async fn find_or_create_tag(&self, tag: &str, owner_nsid: &str) -> Result<Tag, Error> {
        match self.db.find_tag(tag, owner_nsid).await? {
            Some(record) => Ok(record),
            None => self.db.insert_tag(tag, owner_nsid).await,
        }
    }

    async fn find_or_create_album(&self, album: &str, owner_nsid: &str) -> Result<Album, Error> {
        match self.db.find_album(album, owner_nsid).await? {
            Some(record) => Ok(record),
            None => self.db.insert_album(album, owner_nsid).await,
        }
    }
}
