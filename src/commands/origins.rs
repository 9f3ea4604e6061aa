use anyhow::Result;

use super::Session;
use crate::cli::{OriginFieldArgs, OriginUpdateArgs, OriginsCommand, OriginsListArgs};
use crate::config::Credential;
use crate::error::ResolveError;
use crate::models::{non_blank, require_id, require_text, OriginCreateRequest, OriginUpdateRequest};
use crate::query::Query;

pub fn run(cmd: &OriginsCommand, session: &Session) -> Result<()> {
    match cmd {
        OriginsCommand::List(args) => {
            let query = list_query(args, session.pagination());
            let client = session.client(Credential::Default)?;
            let resp = session.call("Listing origins", || client.list_origins(&query))?;
            session.write(&resp)
        }
        OriginsCommand::Get(args) => {
            let id = require_id("id", args.id)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Fetching origin", || client.get_origin(id))?;
            session.write(&resp)
        }
        OriginsCommand::Create(args) => {
            let req = create_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Creating origin", || client.create_origin(&req))?;
            session.write(&resp)
        }
        OriginsCommand::Update(args) => {
            let req = update_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Updating origin", || client.update_origin(&req))?;
            session.write(&resp)
        }
        OriginsCommand::Delete(args) => {
            let id = require_id("id", args.id)?;
            let client = session.client(Credential::Default)?;
            session.call("Deleting origin", || client.delete_origin(id))?;
            session.output.message(&format!("origin {id} successfully deleted"));
            Ok(())
        }
    }
}

/// A blank search term is not sent.
pub fn list_query(args: &OriginsListArgs, mut query: Query) -> Query {
    let search = args.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    query.set_opt("q", search);
    query
}

pub fn create_request(args: &OriginFieldArgs) -> Result<OriginCreateRequest, ResolveError> {
    let name = require_text("name", args.name.as_deref())?;
    if args.entry_storage_days.is_some() {
        return Err(ResolveError::invalid(
            "entry-storage-days",
            "not supported during origin creation; use update instead",
        ));
    }
    Ok(OriginCreateRequest {
        name,
        is_active: args.is_active,
        min_facesize: args.min_facesize,
        create_min_facesize: args.create_min_facesize,
        create_ha: args.create_ha,
        create_junk: args.create_junk,
    })
}

pub fn update_request(args: &OriginUpdateArgs) -> Result<OriginUpdateRequest, ResolveError> {
    let id = require_id("id", args.id)?;
    let fields = &args.fields;
    let req = OriginUpdateRequest {
        id,
        name: fields
            .name
            .as_deref()
            .map(|n| non_blank("name", n))
            .transpose()?,
        is_active: fields.is_active,
        min_facesize: fields.min_facesize,
        entry_storage_days: fields.entry_storage_days,
        create_min_facesize: fields.create_min_facesize,
        create_ha: fields.create_ha,
        create_junk: fields.create_junk,
    };
    req.validate()?;
    Ok(req)
}
