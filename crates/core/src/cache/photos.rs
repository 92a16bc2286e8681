//! Photo and size records.
//!
//! Photos are immutable snapshots: created once per remote id together with
//! all of their size renditions in a single transaction, never updated.
//! The size table also backs [`CacheDb::best_size_url`], the "give me at
//! least this big, but not excessively larger" selection.

use super::connection::CacheDb;
use super::owners::Owner;
use crate::Error;
use crate::remote::{PhotoInfo, SizeInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Named size presets and their URL suffixes, as published by the remote
/// service. Ordered roughly smallest to largest.
pub const SIZE_LABELS: &[(&str, &str)] = &[
    ("Square", "s"),
    ("Large Square", "q"),
    ("Thumbnail", "t"),
    ("Small", "m"),
    ("Small 320", "n"),
    ("Small 400", "w"),
    ("Medium 640", "z"),
    ("Medium 800", "c"),
    ("Large", "b"),
    ("Large 1600", "h"),
    ("Large 2048", "k"),
    ("X-Large 3K", "3k"),
    ("X-Large 4K", "4k"),
    ("X-Large 5K", "5k"),
    ("X-Large 6K", "6k"),
    ("Original", "o"),
];

/// Resolve a size label ("Medium 640") to its URL suffix ("z").
pub fn suffix_for_label(label: &str) -> Option<&'static str> {
    SIZE_LABELS.iter().find(|(l, _)| *l == label).map(|(_, s)| *s)
}

/// Resolve a URL suffix ("z") to its size label ("Medium 640").
pub fn label_for_suffix(suffix: &str) -> Option<&'static str> {
    SIZE_LABELS.iter().find(|(_, s)| *s == suffix).map(|(l, _)| *l)
}

/// A cached photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub secret: String,
    pub server: String,
    pub farm: String,
    /// Upload timestamp.
    pub date: DateTime<Utc>,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Photo {
    /// The photo's page on the remote service, derived from the owner's
    /// path alias.
    pub fn page_url(&self, owner: &Owner) -> String {
        format!("https://www.flickr.com/photos/{}/{}", owner.path_alias, self.id)
    }
}

impl From<PhotoInfo> for Photo {
    fn from(info: PhotoInfo) -> Self {
        Self {
            id: info.id,
            secret: info.secret,
            server: info.server,
            farm: info.farm,
            date: info.uploaded,
            owner_id: info.owner_nsid,
            title: info.title,
            description: info.description,
            latitude: info.latitude,
            longitude: info.longitude,
        }
    }
}

/// A cached size rendition of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: i64,
    pub label: String,
    pub width: i64,
    pub height: i64,
    pub photoid: String,
    pub url: String,
}

pub(crate) fn parse_date(s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

pub(crate) fn photo_from_row(row: &rusqlite::Row<'_>) -> Result<Photo, rusqlite::Error> {
    Ok(Photo {
        id: row.get(0)?,
        secret: row.get(1)?,
        server: row.get(2)?,
        farm: row.get(3)?,
        date: parse_date(&row.get::<_, String>(4)?)?,
        owner_id: row.get(5)?,
        title: row.get(6)?,
        description: row.get(7)?,
        latitude: row.get(8)?,
        longitude: row.get(9)?,
    })
}

pub(crate) const PHOTO_COLUMNS: &str =
    "id, secret, server, farm, date, owner_id, title, description, latitude, longitude";

impl CacheDb {
    /// Look up a photo by id. Returns None on a cache miss.
    pub async fn get_photo(&self, id: &str) -> Result<Option<Photo>, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Photo>, Error> {
                let mut stmt =
                    conn.prepare(&format!("SELECT {PHOTO_COLUMNS} FROM photo WHERE id = ?1"))?;

                let result = stmt.query_row(params![id], photo_from_row);

                match result {
                    Ok(photo) => Ok(Some(photo)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a photo and all of its size rows in one transaction.
    ///
    /// All-or-nothing: a failure while inserting sizes rolls back the photo
    /// row too, so a crash mid-fetch can never leave a photo without sizes.
    pub async fn insert_photo(&self, photo: &Photo, sizes: &[SizeInfo]) -> Result<(), Error> {
        let photo = photo.clone();
        let sizes = sizes.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO photo (id, secret, server, farm, date, owner_id,
                                        title, description, latitude, longitude)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        photo.id,
                        photo.secret,
                        photo.server,
                        photo.farm,
                        photo.date.to_rfc3339(),
                        photo.owner_id,
                        photo.title,
                        photo.description,
                        photo.latitude,
                        photo.longitude,
                    ],
                )
                .map_err(|e| Error::from_insert("photo", &photo.id, e))?;
                for size in &sizes {
                    tx.execute(
                        "INSERT INTO sizes (label, width, height, photoid, url)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![size.label, size.width, size.height, photo.id, size.source],
                    )
                    .map_err(Error::from)?;
                }
                tx.commit().map_err(Error::from)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List all cached size renditions of a photo, smallest first.
    pub async fn sizes_for_photo(&self, photo_id: &str) -> Result<Vec<Size>, Error> {
        let photo_id = photo_id.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Size>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, label, width, height, photoid, url
                     FROM sizes WHERE photoid = ?1 ORDER BY width, label",
                )?;
                let rows = stmt.query_map(params![photo_id], |row| {
                    Ok(Size {
                        id: row.get(0)?,
                        label: row.get(1)?,
                        width: row.get(2)?,
                        height: row.get(3)?,
                        photoid: row.get(4)?,
                        url: row.get(5)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Select the URL of the best-matching size for a photo.
    ///
    /// With a width and/or height bound, picks the smallest size whose
    /// dimension strictly exceeds the bound, ordered by (width, label).
    /// With no bound, matches the given label (default "Medium").
    /// Returns None when no size qualifies.
    pub async fn best_size_url(
        &self,
        photo_id: &str,
        min_width: Option<i64>,
        min_height: Option<i64>,
        label: Option<&str>,
    ) -> Result<Option<String>, Error> {
        let photo_id = photo_id.to_string();
        let label = label.unwrap_or("Medium").to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut sql = String::from("SELECT url FROM sizes WHERE photoid = ?1");
                let mut bind: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(photo_id)];
                if let Some(w) = min_width {
                    sql.push_str(&format!(" AND width > ?{}", bind.len() + 1));
                    bind.push(Box::new(w));
                }
                if let Some(h) = min_height {
                    sql.push_str(&format!(" AND height > ?{}", bind.len() + 1));
                    bind.push(Box::new(h));
                }
                if min_width.is_none() && min_height.is_none() {
                    sql.push_str(&format!(" AND label = ?{}", bind.len() + 1));
                    bind.push(Box::new(label));
                }
                sql.push_str(" ORDER BY width, label LIMIT 1");

                let bind: Vec<&dyn rusqlite::ToSql> = bind.iter().map(|b| b.as_ref()).collect();
                let result = conn.query_row(&sql, bind.as_slice(), |row| row.get::<_, String>(0));

                match result {
                    Ok(url) => Ok(Some(url)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
