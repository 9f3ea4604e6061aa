use anyhow::Result;

use super::Session;
use crate::cli::{AsmArgs, CompareArgs, PhotoPairArgs, UtilityCommand};
use crate::config::Credential;
use crate::models::{AsmRequest, CompareRequest, LivenessRequest, Photo};
use crate::resolve::resolve_confidence;

pub fn run(cmd: &UtilityCommand, session: &Session) -> Result<()> {
    match cmd {
        UtilityCommand::Health => {
            let client = session.client(Credential::Default)?;
            let resp = session.call("Checking health", || client.health())?;
            session.write(&resp)
        }
        UtilityCommand::Metrics => {
            let client = session.client(Credential::Default)?;
            let metrics = session.call("Fetching metrics", || client.metrics())?;
            session.output.text(&metrics)
        }
        UtilityCommand::Asm(args) => {
            let req = asm_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Predicting age/sex/mood", || client.asm(&req))?;
            session.write(&resp)
        }
        UtilityCommand::Liveness(args) => {
            let req = liveness_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Checking liveness", || client.liveness(&req))?;
            session.write(&resp)
        }
        UtilityCommand::Compare(args) => {
            let req = compare_request(args)?;
            let client = session.client(Credential::Access)?;
            let resp = session.call("Comparing faces", || client.compare(&req))?;
            session.write(&resp)
        }
    }
}

pub fn asm_request(args: &AsmArgs) -> Result<AsmRequest> {
    Ok(AsmRequest {
        photo: Photo::require("photo", args.photo.as_ref())?,
    })
}

pub fn liveness_request(args: &PhotoPairArgs) -> Result<LivenessRequest> {
    let (photo1, photo2) = load_pair(args)?;
    Ok(LivenessRequest { photo1, photo2 })
}

/// The confidence threshold is resolved before either photo is read.
pub fn compare_request(args: &CompareArgs) -> Result<CompareRequest> {
    let conf = args.conf.as_deref().map(resolve_confidence).transpose()?;
    let (photo1, photo2) = load_pair(&args.photos)?;
    Ok(CompareRequest {
        photo1,
        photo2,
        conf,
        liveness_photo1: args.liveness_photo1,
        liveness_photo2: args.liveness_photo2,
    })
}

fn load_pair(args: &PhotoPairArgs) -> Result<(Photo, Photo)> {
    let photo1 = Photo::require("photo1", args.photo1.as_ref())?;
    let photo2 = Photo::require("photo2", args.photo2.as_ref())?;
    Ok((photo1, photo2))
}
