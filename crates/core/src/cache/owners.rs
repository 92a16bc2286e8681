//! Owner records.
//!
//! Owners are immutable once fetched: created on first reference by any
//! photo, tag, or album lookup and never updated or deleted.

use super::connection::CacheDb;
use crate::Error;
use crate::remote::OwnerInfo;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached photo owner (user account on the remote service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// The remote service's unique identifier for this user.
    pub nsid: String,
    pub username: String,
    pub realname: String,
    pub path_alias: String,
}

impl From<OwnerInfo> for Owner {
    fn from(info: OwnerInfo) -> Self {
        Self {
            nsid: info.nsid,
            username: info.username,
            realname: info.realname,
            path_alias: info.path_alias,
        }
    }
}

impl CacheDb {
    /// Look up an owner by nsid. Returns None on a cache miss.
    pub async fn get_owner(&self, nsid: &str) -> Result<Option<Owner>, Error> {
        let nsid = nsid.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Owner>, Error> {
                let mut stmt = conn
                    .prepare("SELECT nsid, username, realname, path_alias FROM owner WHERE nsid = ?1")?;

                let result = stmt.query_row(params![nsid], |row| {
                    Ok(Owner {
                        nsid: row.get(0)?,
                        username: row.get(1)?,
                        realname: row.get(2)?,
                        path_alias: row.get(3)?,
                    })
                });

                match result {
                    Ok(owner) => Ok(Some(owner)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a new owner record.
    ///
    /// Fails with [`Error::DuplicateKey`] if the nsid is already present;
    /// get-or-create logic in the manager is expected to prevent that.
    pub async fn insert_owner(&self, owner: &Owner) -> Result<(), Error> {
        let owner = owner.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO owner (nsid, username, realname, path_alias) VALUES (?1, ?2, ?3, ?4)",
                    params![owner.nsid, owner.username, owner.realname, owner.path_alias],
                )
                .map_err(|e| Error::from_insert("owner", &owner.nsid, e))?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
