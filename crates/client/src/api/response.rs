//! Flickr REST API response types and normalization.
//!
//! The REST API is not consistent about field shapes: text fields arrive as
//! plain strings on some endpoints and as `{"_content": "..."}` objects on
//! others, the owner is a bare nsid in search results but a nested object in
//! photo info, the upload date is `dateuploaded` or `dateupload` depending
//! on the endpoint, and numbers are frequently encoded as strings. All of
//! that variance is absorbed here; the rest of the system only ever sees the
//! canonical types from `flickrs_core::remote`.

use chrono::{DateTime, Utc};
use flickrs_core::Error;
use flickrs_core::remote::{OwnerInfo, PhotoInfo, SizeInfo};
use serde::Deserialize;

/// A text field that may be plain or `_content`-wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Wrapped {
        #[serde(rename = "_content")]
        content: String,
    },
}

impl TextField {
    pub fn into_inner(self) -> String {
        match self {
            TextField::Plain(s) => s,
            TextField::Wrapped { content } => content,
        }
    }
}

impl Default for TextField {
    fn default() -> Self {
        TextField::Plain(String::new())
    }
}

/// An integer that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Num(i64),
    Str(String),
}

impl IntField {
    pub fn value(&self) -> Result<i64, Error> {
        match self {
            IntField::Num(n) => Ok(*n),
            IntField::Str(s) => s
                .parse()
                .map_err(|_| Error::RemoteParse(format!("expected integer, got {s:?}"))),
        }
    }
}

/// A float that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FloatField {
    Num(f64),
    Str(String),
}

impl FloatField {
    pub fn value(&self) -> Result<f64, Error> {
        match self {
            FloatField::Num(n) => Ok(*n),
            FloatField::Str(s) => s
                .parse()
                .map_err(|_| Error::RemoteParse(format!("expected float, got {s:?}"))),
        }
    }
}

/// A photo's owner: bare nsid in search results, nested object in photo info.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OwnerField {
    Nsid(String),
    Object { nsid: String },
}

impl OwnerField {
    pub fn into_nsid(self) -> String {
        match self {
            OwnerField::Nsid(nsid) | OwnerField::Object { nsid } => nsid,
        }
    }
}

/// Nested location block from photo info.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    pub latitude: FloatField,
    pub longitude: FloatField,
}

/// A photo record as any endpoint reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPhoto {
    pub id: IntField,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub farm: Option<IntField>,
    /// Absent in photoset listings, where the owner comes from the request.
    #[serde(default)]
    pub owner: Option<OwnerField>,
    #[serde(default)]
    pub title: Option<TextField>,
    #[serde(default)]
    pub description: Option<TextField>,
    /// Photo-info spelling of the upload date.
    #[serde(default)]
    pub dateuploaded: Option<IntField>,
    /// Search/photoset spelling of the upload date.
    #[serde(default)]
    pub dateupload: Option<IntField>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub latitude: Option<FloatField>,
    #[serde(default)]
    pub longitude: Option<FloatField>,
}

impl RawPhoto {
    /// Collapse the shape variance into one canonical record.
    pub fn normalize(self) -> Result<PhotoInfo, Error> {
        self.normalize_with_owner(None)
    }

    /// Like [`normalize`](Self::normalize), but fall back to `owner_nsid`
    /// when the payload carries no owner of its own (photoset listings).
    pub fn normalize_with_owner(self, owner_nsid: Option<&str>) -> Result<PhotoInfo, Error> {
        let id = self.id.value()?.to_string();
        let uploaded = self
            .dateuploaded
            .or(self.dateupload)
            .ok_or_else(|| Error::RemoteParse(format!("photo {id} has no upload date")))?
            .value()?;
        let uploaded = DateTime::<Utc>::from_timestamp(uploaded, 0)
            .ok_or_else(|| Error::RemoteParse(format!("photo {id} upload date out of range")))?;

        let (latitude, longitude) = match &self.location {
            Some(loc) => (Some(loc.latitude.value()?), Some(loc.longitude.value()?)),
            None => (
                self.latitude.as_ref().map(FloatField::value).transpose()?,
                self.longitude.as_ref().map(FloatField::value).transpose()?,
            ),
        };

        let owner_nsid = match self.owner {
            Some(owner) => owner.into_nsid(),
            None => owner_nsid
                .map(str::to_string)
                .ok_or_else(|| Error::RemoteParse(format!("photo {id} has no owner")))?,
        };

        Ok(PhotoInfo {
            id,
            secret: self.secret,
            server: self.server,
            farm: self.farm.map(|f| f.value().map(|v| v.to_string())).transpose()?.unwrap_or_default(),
            uploaded,
            owner_nsid,
            title: self.title.unwrap_or_default().into_inner(),
            description: self.description.unwrap_or_default().into_inner(),
            latitude,
            longitude,
        })
    }
}

/// An owner record from `people.getInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPerson {
    pub nsid: String,
    pub username: TextField,
    #[serde(default)]
    pub realname: Option<TextField>,
    #[serde(default)]
    pub path_alias: Option<String>,
}

impl RawPerson {
    pub fn normalize(self) -> OwnerInfo {
        OwnerInfo {
            nsid: self.nsid,
            username: self.username.into_inner(),
            realname: self.realname.unwrap_or_default().into_inner(),
            path_alias: self.path_alias.unwrap_or_default(),
        }
    }
}

/// One size entry from `photos.getSizes`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSize {
    pub label: String,
    pub width: IntField,
    pub height: IntField,
    pub source: String,
}

impl RawSize {
    pub fn normalize(self) -> Result<SizeInfo, Error> {
        Ok(SizeInfo {
            label: self.label,
            width: self.width.value()?,
            height: self.height.value()?,
            source: self.source,
        })
    }
}

/// The `stat`/`code`/`message` envelope every payload carries.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub stat: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.stat == "ok"
    }
}

#[derive(Debug, Deserialize)]
pub struct PersonResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub person: Option<RawPerson>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoInfoResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub photo: Option<RawPhoto>,
}

#[derive(Debug, Deserialize)]
pub struct RawSizeList {
    #[serde(default)]
    pub size: Vec<RawSize>,
}

#[derive(Debug, Deserialize)]
pub struct SizesResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub sizes: Option<RawSizeList>,
}

/// One page of photos from a paginated listing.
#[derive(Debug, Deserialize)]
pub struct RawPhotoPage {
    pub page: IntField,
    pub pages: IntField,
    #[serde(default)]
    pub photo: Vec<RawPhoto>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub photos: Option<RawPhotoPage>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub photoset: Option<RawPhotoPage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_FIXTURE: &str = r#"{
        "photo": {
            "id": "17214949923",
            "secret": "58ac95ef55",
            "server": "7719",
            "farm": 8,
            "dateuploaded": "1430581561",
            "owner": {
                "nsid": "43405950@N07",
                "username": "alice",
                "path_alias": "alice"
            },
            "title": {"_content": "Sunset over the bay"},
            "description": {"_content": "Taken from the pier."},
            "location": {"latitude": "49.28", "longitude": "-123.12"}
        },
        "stat": "ok"
    }"#;

    const SEARCH_FIXTURE: &str = r#"{
        "photos": {
            "page": 1,
            "pages": 1,
            "perpage": 250,
            "total": 2,
            "photo": [
                {
                    "id": 51348573568,
                    "owner": "43405950@N07",
                    "secret": "d51360e6cf",
                    "server": "65535",
                    "farm": 66,
                    "title": "Harbour at dusk",
                    "description": {"_content": ""},
                    "dateupload": "1628112000"
                },
                {
                    "id": "51348573570",
                    "owner": "43405950@N07",
                    "secret": "aa0322d2a9",
                    "server": "65535",
                    "farm": 66,
                    "title": "Gulls",
                    "description": {"_content": "three of them"},
                    "dateupload": 1628198400,
                    "latitude": 49.3,
                    "longitude": "-123.1"
                }
            ]
        },
        "stat": "ok"
    }"#;

    #[test]
    fn test_photo_info_wrapped_fields() {
        let response: PhotoInfoResponse = serde_json::from_str(INFO_FIXTURE).unwrap();
        assert!(response.envelope.is_ok());

        let info = response.photo.unwrap().normalize().unwrap();
        assert_eq!(info.id, "17214949923");
        assert_eq!(info.title, "Sunset over the bay");
        assert_eq!(info.description, "Taken from the pier.");
        assert_eq!(info.owner_nsid, "43405950@N07");
        assert_eq!(info.farm, "8");
        assert_eq!(info.uploaded.timestamp(), 1_430_581_561);
        assert_eq!(info.latitude, Some(49.28));
        assert_eq!(info.longitude, Some(-123.12));
    }

    #[test]
    fn test_search_plain_fields_and_bare_owner() {
        let response: SearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        assert!(response.envelope.is_ok());

        let page = response.photos.unwrap();
        assert_eq!(page.page.value().unwrap(), 1);
        assert_eq!(page.pages.value().unwrap(), 1);
        assert_eq!(page.photo.len(), 2);

        let first = page.photo[0].clone().normalize().unwrap();
        assert_eq!(first.id, "51348573568");
        assert_eq!(first.title, "Harbour at dusk");
        assert_eq!(first.owner_nsid, "43405950@N07");
        assert_eq!(first.uploaded.timestamp(), 1_628_112_000);
        assert_eq!(first.latitude, None);

        let second = page.photo[1].clone().normalize().unwrap();
        assert_eq!(second.uploaded.timestamp(), 1_628_198_400);
        assert_eq!(second.latitude, Some(49.3));
        assert_eq!(second.longitude, Some(-123.1));
    }

    #[test]
    fn test_missing_upload_date_is_parse_error() {
        let json = r#"{"id": "1", "owner": "x@N00", "title": "t"}"#;
        let raw: RawPhoto = serde_json::from_str(json).unwrap();
        assert!(matches!(raw.normalize(), Err(Error::RemoteParse(_))));
    }

    #[test]
    fn test_person_normalization() {
        let json = r#"{
            "person": {
                "nsid": "43405950@N07",
                "username": {"_content": "alice"},
                "realname": {"_content": "Alice A"},
                "path_alias": "alice"
            },
            "stat": "ok"
        }"#;
        let response: PersonResponse = serde_json::from_str(json).unwrap();
        let owner = response.person.unwrap().normalize();
        assert_eq!(owner.nsid, "43405950@N07");
        assert_eq!(owner.username, "alice");
        assert_eq!(owner.realname, "Alice A");
        assert_eq!(owner.path_alias, "alice");
    }

    #[test]
    fn test_person_missing_optionals() {
        let json = r#"{"person": {"nsid": "1@N00", "username": "bob"}, "stat": "ok"}"#;
        let response: PersonResponse = serde_json::from_str(json).unwrap();
        let owner = response.person.unwrap().normalize();
        assert_eq!(owner.username, "bob");
        assert_eq!(owner.realname, "");
        assert_eq!(owner.path_alias, "");
    }

    #[test]
    fn test_sizes_string_dimensions() {
        let json = r#"{
            "sizes": {
                "size": [
                    {"label": "Square", "width": "75", "height": 75,
                     "source": "https://live.staticflickr.com/x_s.jpg"},
                    {"label": "Medium", "width": 500, "height": "333",
                     "source": "https://live.staticflickr.com/x_m.jpg"}
                ]
            },
            "stat": "ok"
        }"#;
        let response: SizesResponse = serde_json::from_str(json).unwrap();
        let sizes: Vec<SizeInfo> = response
            .sizes
            .unwrap()
            .size
            .into_iter()
            .map(|s| s.normalize().unwrap())
            .collect();
        assert_eq!(sizes[0].width, 75);
        assert_eq!(sizes[1].height, 333);
    }

    #[test]
    fn test_photoset_photos_take_owner_from_request() {
        let json = r#"{
            "photoset": {
                "id": "72157719",
                "page": "1",
                "pages": 1,
                "photo": [
                    {"id": "51348573568", "secret": "d51360e6cf", "server": "65535",
                     "farm": 66, "title": "Harbour at dusk", "dateupload": "1628112000"}
                ]
            },
            "stat": "ok"
        }"#;
        let response: AlbumResponse = serde_json::from_str(json).unwrap();
        let page = response.photoset.unwrap();

        let raw = page.photo[0].clone();
        assert!(matches!(raw.clone().normalize(), Err(Error::RemoteParse(_))));

        let info = raw.normalize_with_owner(Some("43405950@N07")).unwrap();
        assert_eq!(info.owner_nsid, "43405950@N07");
    }

    #[test]
    fn test_fail_envelope() {
        let json = r#"{"stat": "fail", "code": 1, "message": "Photo not found"}"#;
        let response: PhotoInfoResponse = serde_json::from_str(json).unwrap();
        assert!(!response.envelope.is_ok());
        assert_eq!(response.envelope.code, Some(1));
        assert_eq!(response.envelope.message.as_deref(), Some("Photo not found"));
        assert!(response.photo.is_none());
    }
}
