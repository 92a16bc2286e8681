//! Album records and album-photo membership.
//!
//! An album is a per-owner saved photoset id. Membership is resynced only
//! when the record is unvisited or past the staleness window (enforced by
//! the manager); each resync appends membership rows and updates
//! `last_visited` in one transaction.

use super::connection::CacheDb;
use super::photos::{PHOTO_COLUMNS, Photo, parse_date, photo_from_row};
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached per-owner album (photoset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    /// The remote photoset id.
    pub album: String,
    /// When this album's membership was last synced; None before the first
    /// sync completes.
    pub last_visited: Option<DateTime<Utc>>,
    pub owner_id: String,
}

impl CacheDb {
    /// Look up an album by photoset id and owner. Returns None if never seen.
    pub async fn find_album(&self, album: &str, owner_nsid: &str) -> Result<Option<Album>, Error> {
        let album = album.to_string();
        let owner_nsid = owner_nsid.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Album>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, album, last_visited, owner_id FROM album WHERE album = ?1 AND owner_id = ?2",
                )?;

                let result = stmt.query_row(params![album, owner_nsid], |row| {
                    Ok(Album {
                        id: row.get(0)?,
                        album: row.get(1)?,
                        last_visited: row
                            .get::<_, Option<String>>(2)?
                            .map(|s| parse_date(&s))
                            .transpose()?,
                        owner_id: row.get(3)?,
                    })
                });

                match result {
                    Ok(album) => Ok(Some(album)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a new album record with no sync history yet.
    pub async fn insert_album(&self, album: &str, owner_nsid: &str) -> Result<Album, Error> {
        let album = album.to_string();
        let owner_nsid = owner_nsid.to_string();
        self.conn
            .call(move |conn| -> Result<Album, Error> {
                conn.execute(
                    "INSERT INTO album (album, owner_id) VALUES (?1, ?2)",
                    params![album, owner_nsid],
                )
                .map_err(|e| Error::from_insert("album", &album, e))?;
                Ok(Album {
                    id: conn.last_insert_rowid(),
                    album,
                    last_visited: None,
                    owner_id: owner_nsid,
                })
            })
            .await
            .map_err(Error::from)
    }

    /// Commit one album-sync batch: append membership rows and update the
    /// visit timestamp, atomically. INSERT OR IGNORE against the composite
    /// primary key handles re-listed members.
    pub async fn commit_album_sync(
        &self,
        album_id: i64,
        photo_ids: &[String],
        visited_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let photo_ids = photo_ids.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for photo_id in &photo_ids {
                    tx.execute(
                        "INSERT OR IGNORE INTO albums (albumid, photoid) VALUES (?1, ?2)",
                        params![album_id, photo_id],
                    )
                    .map_err(Error::from)?;
                }
                tx.execute(
                    "UPDATE album SET last_visited = ?1 WHERE id = ?2",
                    params![visited_at.to_rfc3339(), album_id],
                )
                .map_err(Error::from)?;
                tx.commit().map_err(Error::from)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// The persisted membership set for an album, newest upload first.
    pub async fn photos_for_album(&self, album_id: i64) -> Result<Vec<Photo>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<Photo>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PHOTO_COLUMNS} FROM photo
                     JOIN albums ON albums.photoid = photo.id
                     WHERE albums.albumid = ?1
                     ORDER BY photo.date DESC"
                ))?;
                let rows = stmt.query_map(params![album_id], photo_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Backdate an album's visit timestamp. Test support for exercising the
    /// staleness window without waiting it out.
    #[doc(hidden)]
    pub async fn set_album_visited(&self, album_id: i64, visited_at: DateTime<Utc>) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "UPDATE album SET last_visited = ?1 WHERE id = ?2",
                    params![visited_at.to_rfc3339(), album_id],
                )
                .map_err(Error::from)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::owners::Owner;
    use chrono::TimeZone;

    async fn seeded_db() -> CacheDb {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.insert_owner(&Owner {
            nsid: "43405950@N07".to_string(),
            username: "alice".to_string(),
            realname: String::new(),
            path_alias: "alice".to_string(),
        })
        .await
        .unwrap();
        db
    }

    async fn seed_photo(db: &CacheDb, id: &str, day: u32) {
        let photo = Photo {
            id: id.to_string(),
            secret: "s".to_string(),
            server: "65535".to_string(),
            farm: "66".to_string(),
            date: Utc.with_ymd_and_hms(2021, 8, day, 0, 0, 0).unwrap(),
            owner_id: "43405950@N07".to_string(),
            title: String::new(),
            description: String::new(),
            latitude: None,
            longitude: None,
        };
        db.insert_photo(&photo, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_and_insert() {
        let db = seeded_db().await;
        assert!(db.find_album("72157719", "43405950@N07").await.unwrap().is_none());

        let album = db.insert_album("72157719", "43405950@N07").await.unwrap();
        assert!(album.last_visited.is_none());

        let found = db.find_album("72157719", "43405950@N07").await.unwrap().unwrap();
        assert_eq!(found, album);
    }

    #[tokio::test]
    async fn test_duplicate_album_rejected() {
        let db = seeded_db().await;
        db.insert_album("72157719", "43405950@N07").await.unwrap();

        let result = db.insert_album("72157719", "43405950@N07").await;
        assert!(matches!(result, Err(Error::DuplicateKey { table: "album", .. })));
    }

    #[tokio::test]
    async fn test_sync_and_membership_order() {
        let db = seeded_db().await;
        seed_photo(&db, "1", 3).await;
        seed_photo(&db, "2", 7).await;
        seed_photo(&db, "3", 5).await;
        let album = db.insert_album("72157719", "43405950@N07").await.unwrap();

        let visited = Utc.with_ymd_and_hms(2021, 9, 1, 0, 0, 0).unwrap();
        db.commit_album_sync(
            album.id,
            &["1".to_string(), "2".to_string(), "3".to_string()],
            visited,
        )
        .await
        .unwrap();

        let photos = db.photos_for_album(album.id).await.unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2", "3", "1"]);

        let synced = db.find_album("72157719", "43405950@N07").await.unwrap().unwrap();
        assert_eq!(synced.last_visited, Some(visited));
    }

    #[tokio::test]
    async fn test_resync_ignores_existing_members() {
        let db = seeded_db().await;
        seed_photo(&db, "1", 1).await;
        let album = db.insert_album("72157719", "43405950@N07").await.unwrap();

        let visited = Utc.with_ymd_and_hms(2021, 9, 1, 0, 0, 0).unwrap();
        db.commit_album_sync(album.id, &["1".to_string()], visited).await.unwrap();
        db.commit_album_sync(album.id, &["1".to_string()], visited).await.unwrap();

        assert_eq!(db.photos_for_album(album.id).await.unwrap().len(), 1);
    }
}
