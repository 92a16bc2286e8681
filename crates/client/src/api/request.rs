//! Flickr REST API request types and validation.

use flickrs_core::Error;
use serde::Serialize;

/// Extra per-photo fields requested on paginated listings so the results can
/// be ingested without a follow-up `photos.getInfo` round trip.
pub const PHOTO_EXTRAS: &str = "date_upload,description,geo";

/// Photos per page on paginated listings (remote maximum is 500).
pub const PER_PAGE: u32 = 250;

/// Parameters for `flickr.photos.search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Owner nsid the search is scoped to.
    pub user_id: String,

    /// Tag to search for.
    pub tags: String,

    /// Only return photos uploaded on or after this time (epoch seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_upload_date: Option<i64>,

    pub extras: &'static str,
    pub page: u32,
    pub per_page: u32,
}

impl SearchRequest {
    pub fn new(user_id: &str, tags: &str, min_upload_date: Option<i64>) -> Self {
        Self {
            user_id: user_id.to_string(),
            tags: tags.to_string(),
            min_upload_date,
            extras: PHOTO_EXTRAS,
            page: 1,
            per_page: PER_PAGE,
        }
    }

    /// Validate the search parameters before sending.
    pub fn validate(&self) -> Result<(), Error> {
        if self.user_id.is_empty() {
            return Err(Error::InvalidInput("search user_id cannot be empty".to_string()));
        }
        if self.tags.is_empty() {
            return Err(Error::InvalidInput("search tags cannot be empty".to_string()));
        }
        if self.page == 0 {
            return Err(Error::InvalidInput("page numbers start at 1".to_string()));
        }
        Ok(())
    }
}

/// Parameters for `flickr.photosets.getPhotos`.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumRequest {
    /// The photoset id.
    pub photoset_id: String,

    /// Owner nsid the photoset belongs to.
    pub user_id: String,

    pub extras: &'static str,
    pub page: u32,
    pub per_page: u32,
}

impl AlbumRequest {
    pub fn new(user_id: &str, photoset_id: &str) -> Self {
        Self {
            photoset_id: photoset_id.to_string(),
            user_id: user_id.to_string(),
            extras: PHOTO_EXTRAS,
            page: 1,
            per_page: PER_PAGE,
        }
    }

    /// Validate the listing parameters before sending.
    pub fn validate(&self) -> Result<(), Error> {
        if self.photoset_id.is_empty() {
            return Err(Error::InvalidInput("photoset_id cannot be empty".to_string()));
        }
        if self.user_id.is_empty() {
            return Err(Error::InvalidInput("user_id cannot be empty".to_string()));
        }
        if self.page == 0 {
            return Err(Error::InvalidInput("page numbers start at 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_search() {
        let req = SearchRequest::new("43405950@N07", "sunset", None);
        assert!(req.validate().is_ok());
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, PER_PAGE);
    }

    #[test]
    fn test_empty_tag_rejected() {
        let req = SearchRequest::new("43405950@N07", "", None);
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_user_rejected() {
        let req = SearchRequest::new("", "sunset", None);
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_since_date_serialized_only_when_set() {
        let req = SearchRequest::new("43405950@N07", "sunset", None);
        let qs = serde_json::to_value(&req).unwrap();
        assert!(qs.get("min_upload_date").is_none());

        let req = SearchRequest::new("43405950@N07", "sunset", Some(1_628_112_000));
        let qs = serde_json::to_value(&req).unwrap();
        assert_eq!(qs["min_upload_date"], 1_628_112_000);
    }

    #[test]
    fn test_album_request() {
        let req = AlbumRequest::new("43405950@N07", "72157719");
        assert!(req.validate().is_ok());

        let req = AlbumRequest::new("43405950@N07", "");
        assert!(matches!(req.validate(), Err(Error::InvalidInput(_))));
    }
}
