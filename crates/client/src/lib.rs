//! Flickr REST API client for flickrs.
//!
//! This crate provides the HTTP implementation of the remote-client trait
//! defined in `flickrs-core`: typed request parameters, response-shape
//! normalization, and pagination.

pub mod api;

pub use api::{FlickrClient, FlickrConfig};
