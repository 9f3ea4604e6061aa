use anyhow::Result;

use super::Session;
use crate::api::TokenKind;
use crate::cli::{UserFieldArgs, UsersCommand, UsersListArgs};
use crate::config::Credential;
use crate::error::ResolveError;
use crate::models::{require_id, PartialUpdateUserRequest, UpdateUserRequest};
use crate::query::Query;

pub fn run(cmd: &UsersCommand, session: &Session) -> Result<()> {
    match cmd {
        UsersCommand::Me => {
            let client = session.client(Credential::Default)?;
            let resp = session.call("Fetching current user", || client.me())?;
            session.write(&resp)
        }
        UsersCommand::ListTokens => {
            let client = session.client(Credential::Default)?;
            let resp = session.call("Listing tokens", || client.list_tokens(TokenKind::Access, None))?;
            session.write(&resp)
        }
        UsersCommand::Statistics => {
            let client = session.client(Credential::Default)?;
            let resp = session.call("Fetching statistics", || client.user_statistics())?;
            session.write(&resp)
        }
        UsersCommand::List(args) => {
            let query = list_query(args, session.pagination());
            let client = session.client(Credential::Root)?;
            let resp = session.call("Listing users", || client.list_users(&query))?;
            session.write(&resp)
        }
        UsersCommand::Get(args) => {
            let id = require_id("id", args.id)?;
            let client = session.client(Credential::Root)?;
            let resp = session.call("Fetching user", || client.get_user(id))?;
            session.write(&resp)
        }
        UsersCommand::Update(args) => {
            let (id, req) = update_request(args)?;
            let client = session.client(Credential::Root)?;
            let resp = session.call("Updating user", || client.update_user(id, &req))?;
            session.write(&resp)
        }
        UsersCommand::Patch(args) => {
            let (id, req) = patch_request(args)?;
            if req.is_empty() {
                log::warn!("patch for user {id} carries no fields");
            }
            let client = session.client(Credential::Root)?;
            let resp = session.call("Patching user", || client.patch_user(id, &req))?;
            session.write(&resp)
        }
    }
}

/// A blank query is not sent.
pub fn list_query(args: &UsersListArgs, mut query: Query) -> Query {
    let q = args.query.as_deref().map(str::trim).filter(|s| !s.is_empty());
    query.set_opt("q", q);
    query
}

pub fn update_request(args: &UserFieldArgs) -> Result<(u64, UpdateUserRequest), ResolveError> {
    let id = require_id("id", args.id)?;
    let req = UpdateUserRequest::from_flags(args.username.as_deref(), args.is_active)?;
    Ok((id, req))
}

pub fn patch_request(
    args: &UserFieldArgs,
) -> Result<(u64, PartialUpdateUserRequest), ResolveError> {
    let id = require_id("id", args.id)?;
    let req = PartialUpdateUserRequest::from_flags(args.username.as_deref(), args.is_active)?;
    Ok((id, req))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_active_flag_fails_but_patch_succeeds() {
        let args = UserFieldArgs {
            id: Some(12),
            username: Some("admin".into()),
            is_active: None,
        };
        assert_eq!(
            update_request(&args),
            Err(ResolveError::MissingRequiredField("is-active"))
        );

        let (id, req) = patch_request(&args).unwrap();
        assert_eq!(id, 12);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "username": "admin" })
        );
    }

    #[test]
    fn id_is_checked_first() {
        let args = UserFieldArgs {
            id: None,
            username: None,
            is_active: None,
        };
        assert_eq!(
            update_request(&args),
            Err(ResolveError::MissingRequiredField("id"))
        );
        assert_eq!(
            patch_request(&args),
            Err(ResolveError::MissingRequiredField("id"))
        );
    }

    #[test]
    fn full_update_with_every_field() {
        let args = UserFieldArgs {
            id: Some(12),
            username: Some("admin".into()),
            is_active: Some(false),
        };
        let (_, req) = update_request(&args).unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "username": "admin", "is_active": false })
        );
    }

    #[test]
    fn blank_query_is_dropped() {
        let query = list_query(
            &UsersListArgs {
                query: Some("".into()),
            },
            Query::pagination(50, 0),
        );
        assert!(!query.contains("q"));
    }
}
