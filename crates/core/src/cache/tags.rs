//! Tag records and tag-photo associations.
//!
//! A tag is a per-owner saved search term. Each sync adds association rows
//! and moves `last_visited` forward in one transaction; association rows are
//! never removed, so the local result set only ever grows.

use super::connection::CacheDb;
use super::photos::{PHOTO_COLUMNS, Photo, parse_date, photo_from_row};
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached per-owner tag search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub tag: String,
    /// When this tag was last synced against the remote; None before the
    /// first sync completes.
    pub last_visited: Option<DateTime<Utc>>,
    pub owner_id: String,
}

impl CacheDb {
    /// Look up a tag by name and owner. Returns None if never seen.
    pub async fn find_tag(&self, tag: &str, owner_nsid: &str) -> Result<Option<Tag>, Error> {
        let tag = tag.to_string();
        let owner_nsid = owner_nsid.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Tag>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, tag, last_visited, owner_id FROM tag WHERE tag = ?1 AND owner_id = ?2",
                )?;

                let result = stmt.query_row(params![tag, owner_nsid], |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        tag: row.get(1)?,
                        last_visited: row
                            .get::<_, Option<String>>(2)?
                            .map(|s| parse_date(&s))
                            .transpose()?,
                        owner_id: row.get(3)?,
                    })
                });

                match result {
                    Ok(tag) => Ok(Some(tag)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a new tag record with no sync history yet.
    pub async fn insert_tag(&self, tag: &str, owner_nsid: &str) -> Result<Tag, Error> {
        let tag = tag.to_string();
        let owner_nsid = owner_nsid.to_string();
        self.conn
            .call(move |conn| -> Result<Tag, Error> {
                conn.execute(
                    "INSERT INTO tag (tag, owner_id) VALUES (?1, ?2)",
                    params![tag, owner_nsid],
                )
                .map_err(|e| Error::from_insert("tag", &tag, e))?;
                Ok(Tag {
                    id: conn.last_insert_rowid(),
                    tag,
                    last_visited: None,
                    owner_id: owner_nsid,
                })
            })
            .await
            .map_err(Error::from)
    }

    /// Commit one tag-sync batch: associate the fetched photos and update
    /// the visit timestamp, atomically.
    ///
    /// Membership inserts use INSERT OR IGNORE; the association table's
    /// composite primary key is what prevents duplicates.
    pub async fn commit_tag_sync(
        &self,
        tag_id: i64,
        photo_ids: &[String],
        visited_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let photo_ids = photo_ids.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for photo_id in &photo_ids {
                    tx.execute(
                        "INSERT OR IGNORE INTO tags (tagid, photoid) VALUES (?1, ?2)",
                        params![tag_id, photo_id],
                    )
                    .map_err(Error::from)?;
                }
                tx.execute(
                    "UPDATE tag SET last_visited = ?1 WHERE id = ?2",
                    params![visited_at.to_rfc3339(), tag_id],
                )
                .map_err(Error::from)?;
                tx.commit().map_err(Error::from)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// The persisted association set for a tag, newest upload first.
    pub async fn photos_for_tag(&self, tag_id: i64) -> Result<Vec<Photo>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<Photo>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PHOTO_COLUMNS} FROM photo
                     JOIN tags ON tags.photoid = photo.id
                     WHERE tags.tagid = ?1
                     ORDER BY photo.date DESC"
                ))?;
                let rows = stmt.query_map(params![tag_id], photo_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
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
        assert!(db.find_tag("sunset", "43405950@N07").await.unwrap().is_none());

        let tag = db.insert_tag("sunset", "43405950@N07").await.unwrap();
        assert!(tag.last_visited.is_none());

        let found = db.find_tag("sunset", "43405950@N07").await.unwrap().unwrap();
        assert_eq!(found, tag);
    }

    #[tokio::test]
    async fn test_same_tag_different_owner_allowed() {
        let db = seeded_db().await;
        db.insert_owner(&Owner {
            nsid: "99999999@N01".to_string(),
            username: "bob".to_string(),
            realname: String::new(),
            path_alias: "bob".to_string(),
        })
        .await
        .unwrap();

        db.insert_tag("sunset", "43405950@N07").await.unwrap();
        db.insert_tag("sunset", "99999999@N01").await.unwrap();

        let result = db.insert_tag("sunset", "43405950@N07").await;
        assert!(matches!(result, Err(Error::DuplicateKey { table: "tag", .. })));
    }

    #[tokio::test]
    async fn test_sync_commits_visit_and_associations() {
        let db = seeded_db().await;
        seed_photo(&db, "1", 1).await;
        seed_photo(&db, "2", 2).await;
        let tag = db.insert_tag("sunset", "43405950@N07").await.unwrap();

        let visited = Utc.with_ymd_and_hms(2021, 9, 1, 0, 0, 0).unwrap();
        db.commit_tag_sync(tag.id, &["1".to_string(), "2".to_string()], visited)
            .await
            .unwrap();

        let synced = db.find_tag("sunset", "43405950@N07").await.unwrap().unwrap();
        assert_eq!(synced.last_visited, Some(visited));

        let photos = db.photos_for_tag(tag.id).await.unwrap();
        assert_eq!(photos.len(), 2);
        // Newest upload first.
        assert_eq!(photos[0].id, "2");
        assert_eq!(photos[1].id, "1");
    }

    #[tokio::test]
    async fn test_resync_accumulates_without_duplicates() {
        let db = seeded_db().await;
        seed_photo(&db, "1", 1).await;
        seed_photo(&db, "2", 2).await;
        let tag = db.insert_tag("sunset", "43405950@N07").await.unwrap();

        let first = Utc.with_ymd_and_hms(2021, 9, 1, 0, 0, 0).unwrap();
        db.commit_tag_sync(tag.id, &["1".to_string()], first).await.unwrap();

        // Overlapping second batch: "1" again plus the new "2".
        let second = Utc.with_ymd_and_hms(2021, 9, 2, 0, 0, 0).unwrap();
        db.commit_tag_sync(tag.id, &["1".to_string(), "2".to_string()], second)
            .await
            .unwrap();

        let photos = db.photos_for_tag(tag.id).await.unwrap();
        assert_eq!(photos.len(), 2);

        let synced = db.find_tag("sunset", "43405950@N07").await.unwrap().unwrap();
        assert_eq!(synced.last_visited, Some(second));
    }
}
