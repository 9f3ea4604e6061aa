use anyhow::Result;

use super::Session;
use crate::api::TokenKind;
use crate::cli::{TokenAction, TokenListArgs, TokensCommand};
use crate::config::Credential;
use crate::models::{require_segment, CreateTokenRequest};
use crate::query::Query;

pub fn run(cmd: &TokensCommand, session: &Session) -> Result<()> {
    match cmd {
        TokensCommand::Access(action) => run_action(TokenKind::Access, action, session),
        TokensCommand::Streams(action) => run_action(TokenKind::Stream, action, session),
    }
}

fn run_action(kind: TokenKind, action: &TokenAction, session: &Session) -> Result<()> {
    match action {
        TokenAction::List(args) => {
            let query = list_query(args, session.pagination());
            let client = session.client(Credential::Default)?;
            let resp = session.call("Listing tokens", || client.list_tokens(kind, Some(&query)))?;
            session.write(&resp)
        }
        TokenAction::Create(args) => {
            let req = CreateTokenRequest {
                permanent: args.permanent,
            };
            let client = session.client(Credential::Default)?;
            let resp = session.call("Creating token", || client.create_token(kind, &req))?;
            session.write(&resp)
        }
        TokenAction::Delete(args) => {
            let key = require_segment("key", args.key.as_deref())?;
            let client = session.client(Credential::Default)?;
            session.call("Deleting token", || client.delete_token(kind, &key))?;
            session
                .output
                .message(&format!("{} token {key} successfully deleted", label(kind)));
            Ok(())
        }
    }
}

pub fn list_query(args: &TokenListArgs, mut query: Query) -> Query {
    query.set_opt("space_id", args.space_id);
    query
}

fn label(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => "access",
        TokenKind::Stream => "stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryValue;

    #[test]
    fn space_filter_only_when_supplied() {
        let query = list_query(&TokenListArgs { space_id: None }, Query::pagination(20, 0));
        assert_eq!(query.len(), 2);

        let query = list_query(&TokenListArgs { space_id: Some(0) }, Query::pagination(20, 0));
        assert_eq!(query.get("space_id"), Some(&QueryValue::UInt(0)));
    }
}
