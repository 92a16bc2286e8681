//! SQLite-backed entity store and cache manager.
//!
//! This module provides persistent storage for the five entity kinds
//! (owners, photos, sizes, tags, albums) using SQLite with async access via
//! tokio-rusqlite, plus the get-or-fetch orchestration on top. It supports:
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Transactional logical units (photo + sizes, tag/album sync batches)
//! - Best-matching-size selection over cached renditions

pub mod albums;
pub mod connection;
pub mod manager;
pub mod migrations;
pub mod owners;
pub mod photos;
pub mod tags;

pub use crate::Error;

pub use albums::Album;
pub use connection::CacheDb;
pub use manager::PhotoCache;
pub use owners::Owner;
pub use photos::{Photo, Size, label_for_suffix, suffix_for_label};
pub use tags::Tag;
