use anyhow::Result;
use serde_json::Value;

use super::{require_path, Session};
use crate::cli::{ProfileCreateArgs, ProfileReinitArgs, ProfileSearchArgs, ProfilesCommand};
use crate::config::Credential;
use crate::models::{
    require_id, require_segment, Photo, ProfileCreateRequest, ProfileReinitRequest,
    ProfileSearchRequest,
};

pub fn run(cmd: &ProfilesCommand, session: &Session) -> Result<()> {
    match cmd {
        ProfilesCommand::Create(args) => {
            let req = create_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Creating profile", || client.create_profile(&req))?;
            session.write(&resp)
        }
        ProfilesCommand::Search(args) => {
            let req = search_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Searching profiles", || client.search_profiles(&req))?;
            session.write(&resp)
        }
        ProfilesCommand::Delete(args) => {
            let id = require_segment("profile-id", args.profile_id.as_deref())?;
            let client = session.client(Credential::Default)?;
            session.call("Deleting profile", || client.delete_profile(&id))?;
            session.output.message(&format!("profile {id} successfully deleted"));
            Ok(())
        }
        ProfilesCommand::Reinit(args) => {
            let (id, req) = reinit_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Reinitializing profile", || client.reinit_profile(&id, &req))?;
            if is_empty_response(&resp) {
                session.output.message("reinit completed");
                return Ok(());
            }
            session.write(&resp)
        }
    }
}

pub fn create_request(args: &ProfileCreateArgs) -> Result<ProfileCreateRequest> {
    let photo = require_path("photo", args.photo.as_ref())?;
    let origin_id = require_id("origin-id", args.origin_id)?;
    Ok(ProfileCreateRequest {
        photo: Photo::load(photo)?,
        origin_id,
        create_min_facesize: args.create_min_facesize,
        create_ha: args.create_ha,
        create_junk: args.create_junk,
    })
}

pub fn search_request(args: &ProfileSearchArgs) -> Result<ProfileSearchRequest> {
    let photo = Photo::require("photo", args.photo.as_ref())?;
    // An empty second path means no second photo.
    let second_photo = args
        .second_photo
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Photo::load)
        .transpose()?;
    Ok(ProfileSearchRequest {
        photo,
        second_photo,
    })
}

pub fn reinit_request(args: &ProfileReinitArgs) -> Result<(String, ProfileReinitRequest)> {
    let id = require_segment("profile-id", args.profile_id.as_deref())?;
    let photo = Photo::require("photo", args.photo.as_ref())?;
    let req = ProfileReinitRequest {
        photo,
        create_min_facesize: args.create_min_facesize,
        min_conf: args.min_conf,
    };
    Ok((id, req))
}

fn is_empty_response(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use std::path::PathBuf;

    fn resolve_err(err: &anyhow::Error) -> Option<&ResolveError> {
        err.downcast_ref::<ResolveError>()
    }

    #[test]
    fn create_checks_flags_before_reading_photo() {
        let args = ProfileCreateArgs {
            photo: Some(PathBuf::from("/nonexistent/face.jpg")),
            origin_id: None,
            create_min_facesize: None,
            create_ha: None,
            create_junk: None,
        };
        let err = create_request(&args).unwrap_err();
        assert_eq!(
            resolve_err(&err),
            Some(&ResolveError::MissingRequiredField("origin-id"))
        );
    }

    #[test]
    fn create_loads_photo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();
        let args = ProfileCreateArgs {
            photo: Some(path),
            origin_id: Some(42),
            create_min_facesize: Some(0),
            create_ha: None,
            create_junk: Some(true),
        };
        let req = create_request(&args).unwrap();
        assert_eq!(req.photo.name, "face.jpg");
        assert_eq!(req.photo.data, b"jpeg-bytes");
        assert_eq!(req.create_min_facesize, Some(0));
        assert_eq!(req.create_ha, None);
    }

    #[test]
    fn reinit_requires_profile_id() {
        let args = ProfileReinitArgs {
            profile_id: Some(" ".into()),
            photo: None,
            create_min_facesize: None,
            min_conf: None,
        };
        let err = reinit_request(&args).unwrap_err();
        assert!(matches!(
            resolve_err(&err),
            Some(ResolveError::InvalidFieldValue {
                field: "profile-id",
                ..
            })
        ));
    }

    #[test]
    fn search_requires_photo() {
        let args = ProfileSearchArgs {
            photo: None,
            second_photo: None,
        };
        let err = search_request(&args).unwrap_err();
        assert_eq!(
            resolve_err(&err),
            Some(&ResolveError::MissingRequiredField("photo"))
        );
    }

    #[test]
    fn search_skips_empty_second_photo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        std::fs::write(&path, b"png-bytes").unwrap();
        let args = ProfileSearchArgs {
            photo: Some(path),
            second_photo: Some(PathBuf::new()),
        };
        let req = search_request(&args).unwrap();
        assert_eq!(req.photo.name, "face.png");
        assert!(req.second_photo.is_none());
    }

    #[test]
    fn empty_reinit_responses() {
        assert!(is_empty_response(&Value::Null));
        assert!(is_empty_response(&serde_json::json!({})));
        assert!(!is_empty_response(&serde_json::json!({ "id": "p1" })));
    }
}
