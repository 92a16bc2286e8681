//! Core types and shared functionality for flickrs.
//!
//! This crate provides:
//! - The entity model and SQLite-backed cache with get-or-fetch orchestration
//! - The remote-client trait implemented by `flickrs-client`
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod remote;

pub use cache::{CacheDb, Owner, Photo, PhotoCache, Size};
pub use config::AppConfig;
pub use error::Error;
