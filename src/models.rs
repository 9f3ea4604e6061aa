// Request shapes sent to the API, with the validation each one needs
// before it may be transmitted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::error::ResolveError;
use crate::query::{Query, QueryValue};
use crate::resolve::{Confidence, Liveness, Timestamp};

/// Require a numeric identifier flag: absent and zero are both rejected.
pub fn require_id(field: &'static str, value: Option<u64>) -> Result<u64, ResolveError> {
    match value {
        None => Err(ResolveError::MissingRequiredField(field)),
        Some(0) => Err(ResolveError::invalid(field, "must be a positive integer")),
        Some(id) => Ok(id),
    }
}

/// Require a textual identifier or name; the result is trimmed.
pub fn require_text(field: &'static str, value: Option<&str>) -> Result<String, ResolveError> {
    let value = value.ok_or(ResolveError::MissingRequiredField(field))?;
    non_blank(field, value)
}

/// Require a textual identifier that becomes one URL path segment. Dot
/// segments and path, query or fragment delimiters are rejected.
pub fn require_segment(field: &'static str, value: Option<&str>) -> Result<String, ResolveError> {
    let id = require_text(field, value)?;
    if id == "." || id == ".." {
        return Err(ResolveError::invalid(field, "must not be a dot segment"));
    }
    if id.contains(['/', '\\', '?', '#']) {
        return Err(ResolveError::invalid(
            field,
            "must not contain '/', '\\', '?' or '#'",
        ));
    }
    Ok(id)
}

/// Reject blank names and identifiers that were supplied.
pub fn non_blank(field: &'static str, value: &str) -> Result<String, ResolveError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

/// An image read from disk, ready to be sent as a multipart part.
#[derive(Debug, Clone)]
pub struct Photo {
    pub name: String,
    pub data: Vec<u8>,
}

impl Photo {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read photo {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("photo.jpg")
            .to_string();
        Ok(Photo { name, data })
    }

    /// Load a photo whose flag is required.
    pub fn require(field: &'static str, path: Option<&PathBuf>) -> Result<Self> {
        let path = path.ok_or(ResolveError::MissingRequiredField(field))?;
        Self::load(path)
    }

    pub fn mime(&self) -> &'static str {
        let ext = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("bmp") => "image/bmp",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// Filters for `entries stats sources`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSourcesRequest {
    pub person_ids: Option<String>,
    pub conf: Option<Confidence>,
    pub liveness: Option<Liveness>,
    pub source: Option<u64>,
    pub entry_id_from: Option<u64>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
}

impl StatsSourcesRequest {
    pub fn to_query(&self) -> Query {
        Query::from_flags([
            ("person_ids", self.person_ids.clone().map(QueryValue::from)),
            ("conf", self.conf.map(|c| QueryValue::from(u32::from(c.code())))),
            ("liveness", self.liveness.map(|l| QueryValue::from(l.as_str()))),
            ("source", self.source.map(QueryValue::from)),
            ("entry_id_from", self.entry_id_from.map(QueryValue::from)),
            ("date_from", self.date_from.map(|d| QueryValue::from(d.to_wire()))),
            ("date_to", self.date_to.map(|d| QueryValue::from(d.to_wire()))),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_facesize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_min_facesize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_ha: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_junk: Option<bool>,
}

/// Partial origin update: absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OriginUpdateRequest {
    #[serde(skip)]
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_facesize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_storage_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_min_facesize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_ha: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_junk: Option<bool>,
}

impl OriginUpdateRequest {
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.id == 0 {
            return Err(ResolveError::invalid("id", "must be a positive integer"));
        }
        if let Some(name) = &self.name {
            non_blank("name", name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProfileCreateRequest {
    pub photo: Photo,
    pub origin_id: u64,
    pub create_min_facesize: Option<u32>,
    pub create_ha: Option<bool>,
    pub create_junk: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ProfileSearchRequest {
    pub photo: Photo,
    pub second_photo: Option<Photo>,
}

#[derive(Debug, Clone)]
pub struct ProfileReinitRequest {
    pub photo: Photo,
    pub create_min_facesize: Option<u32>,
    pub min_conf: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreateTokenRequest {
    pub permanent: bool,
}

/// Full replacement of a user: every field must be supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub is_active: bool,
}

impl UpdateUserRequest {
    pub fn from_flags(
        username: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Self, ResolveError> {
        let username = require_text("username", username)?;
        let is_active = is_active.ok_or(ResolveError::MissingRequiredField("is-active"))?;
        Ok(UpdateUserRequest {
            username,
            is_active,
        })
    }
}

/// Partial user update. An all-absent patch is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialUpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl PartialUpdateUserRequest {
    pub fn from_flags(
        username: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Self, ResolveError> {
        let username = username.map(|u| non_blank("username", u)).transpose()?;
        Ok(PartialUpdateUserRequest {
            username,
            is_active,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.is_active.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct AsmRequest {
    pub photo: Photo,
}

#[derive(Debug, Clone)]
pub struct LivenessRequest {
    pub photo1: Photo,
    pub photo2: Photo,
}

#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub photo1: Photo,
    pub photo2: Photo,
    pub conf: Option<Confidence>,
    pub liveness_photo1: bool,
    pub liveness_photo2: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_date;

    #[test]
    fn full_update_requires_every_field() {
        assert_eq!(
            UpdateUserRequest::from_flags(Some("admin"), None),
            Err(ResolveError::MissingRequiredField("is-active"))
        );
        assert_eq!(
            UpdateUserRequest::from_flags(None, Some(true)),
            Err(ResolveError::MissingRequiredField("username"))
        );
        let req = UpdateUserRequest::from_flags(Some(" admin "), Some(false)).unwrap();
        assert_eq!(req.username, "admin");
        assert!(!req.is_active);
    }

    #[test]
    fn patch_sends_only_supplied_fields() {
        let req = PartialUpdateUserRequest::from_flags(Some("admin"), None).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "admin" }));

        let empty = PartialUpdateUserRequest::from_flags(None, None).unwrap();
        assert!(empty.is_empty());
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }

    #[test]
    fn path_identifiers_stay_one_segment() {
        assert_eq!(
            require_segment("profile-id", Some(" 3f2a-91 ")),
            Ok("3f2a-91".to_string())
        );
        for raw in ["../origins/7", "..", ".", "abc?x=1#", "a#b", "a\\b"] {
            assert!(
                matches!(
                    require_segment("profile-id", Some(raw)),
                    Err(ResolveError::InvalidFieldValue {
                        field: "profile-id",
                        ..
                    })
                ),
                "{raw}"
            );
        }
        assert_eq!(
            require_segment("key", None),
            Err(ResolveError::MissingRequiredField("key"))
        );
    }

    #[test]
    fn blank_names_are_invalid() {
        for result in [
            UpdateUserRequest::from_flags(Some("  "), Some(true)).map(|_| ()),
            PartialUpdateUserRequest::from_flags(Some(""), None).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(ResolveError::InvalidFieldValue { field: "username", .. })
            ));
        }

        let origin = OriginUpdateRequest {
            id: 3,
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            origin.validate(),
            Err(ResolveError::InvalidFieldValue { field: "name", .. })
        ));
    }

    #[test]
    fn ids_must_be_present_and_positive() {
        assert_eq!(require_id("id", Some(7)), Ok(7));
        assert_eq!(
            require_id("id", None),
            Err(ResolveError::MissingRequiredField("id"))
        );
        assert!(matches!(
            require_id("id", Some(0)),
            Err(ResolveError::InvalidFieldValue { field: "id", .. })
        ));
    }

    #[test]
    fn origin_update_serializes_supplied_fields_in_order() {
        let req = OriginUpdateRequest {
            id: 3,
            name: Some("Lobby".into()),
            is_active: Some(false),
            entry_storage_days: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"name":"Lobby","is_active":false,"entry_storage_days":0}"#
        );
    }

    #[test]
    fn stats_query_encodes_resolved_values() {
        let req = StatsSourcesRequest {
            conf: Some(Confidence::Exact),
            liveness: Some(Liveness::Failed),
            date_from: resolve_date("2024-01-15").unwrap(),
            ..Default::default()
        };
        let query = req.to_query();
        let keys: Vec<_> = query.keys().collect();
        assert_eq!(keys, ["conf", "liveness", "date_from"]);
        assert_eq!(query.get("conf"), Some(&QueryValue::Int(2)));
        assert_eq!(
            query.get("date_from"),
            Some(&QueryValue::Text("2024-01-15T00:00:00Z".into()))
        );
    }

    #[test]
    fn photo_mime_follows_extension() {
        let photo = Photo {
            name: "face.PNG".into(),
            data: Vec::new(),
        };
        assert_eq!(photo.mime(), "image/png");
    }

    #[test]
    fn missing_photo_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Photo::load(&dir.path().join("absent.jpg")).unwrap_err();
        assert!(err.to_string().contains("Failed to read photo"));
    }
}
