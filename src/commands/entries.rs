use anyhow::Result;

use super::Session;
use crate::cli::{EntriesCommand, EntriesListArgs, EntriesStatsCommand, StatsSourcesArgs};
use crate::config::Credential;
use crate::error::ResolveError;
use crate::models::{require_id, StatsSourcesRequest};
use crate::query::Query;
use crate::resolve::{resolve_confidence, resolve_date, resolve_liveness};

pub fn run(cmd: &EntriesCommand, session: &Session) -> Result<()> {
    match cmd {
        EntriesCommand::List(args) => {
            let query = list_query(args, session.pagination())?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Listing entries", || client.list_entries(&query))?;
            session.write(&resp)
        }
        EntriesCommand::Delete(args) => {
            let id = require_id("id", args.id)?;
            let client = session.client(Credential::Default)?;
            session.call("Deleting entry", || client.delete_entry(id))?;
            session.output.message(&format!("entry {id} successfully deleted"));
            Ok(())
        }
        EntriesCommand::Stats(EntriesStatsCommand::Sources(args)) => {
            let req = stats_request(args)?;
            let client = session.client(Credential::Default)?;
            let resp = session.call("Fetching statistics", || client.entry_stats_sources(&req))?;
            session.write(&resp)
        }
    }
}

/// Pagination plus the filters that were supplied. Blank dates are dropped.
pub fn list_query(args: &EntriesListArgs, mut query: Query) -> Result<Query, ResolveError> {
    query
        .set_opt("origin_ids", trimmed(&args.origin_ids))
        .set_opt("spaces_ids", trimmed(&args.spaces_ids))
        .set_opt("person_ids", trimmed(&args.person_ids))
        .set_opt("conf", trimmed(&args.conf));

    if let Some(raw) = &args.date_from {
        query.set_opt("date_from", resolve_date(raw)?.map(|d| d.to_wire()));
    }
    if let Some(raw) = &args.date_to {
        query.set_opt("date_to", resolve_date(raw)?.map(|d| d.to_wire()));
    }
    Ok(query)
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim)
}

pub fn stats_request(args: &StatsSourcesArgs) -> Result<StatsSourcesRequest, ResolveError> {
    let date = |raw: &Option<String>| match raw {
        Some(raw) => resolve_date(raw),
        None => Ok(None),
    };

    Ok(StatsSourcesRequest {
        person_ids: trimmed(&args.person_ids).map(str::to_string),
        conf: args.conf.as_deref().map(resolve_confidence).transpose()?,
        liveness: args.liveness.as_deref().map(resolve_liveness).transpose()?,
        source: args.source_id,
        entry_id_from: args.entry_id_from,
        date_from: date(&args.date_from)?,
        date_to: date(&args.date_to)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryValue;
    use crate::resolve::{Confidence, Liveness};

    fn list_args() -> EntriesListArgs {
        EntriesListArgs {
            origin_ids: None,
            spaces_ids: None,
            person_ids: None,
            conf: None,
            date_from: None,
            date_to: None,
        }
    }

    fn stats_args() -> StatsSourcesArgs {
        StatsSourcesArgs {
            person_ids: None,
            conf: None,
            liveness: None,
            source_id: None,
            entry_id_from: None,
            date_from: None,
            date_to: None,
        }
    }

    #[test]
    fn list_query_has_only_supplied_filters() {
        let args = EntriesListArgs {
            person_ids: Some(" 1,2 ".into()),
            date_from: Some("2024-01-15".into()),
            date_to: Some("  ".into()),
            ..list_args()
        };
        let query = list_query(&args, Query::pagination(20, 0)).unwrap();
        let keys: Vec<_> = query.keys().collect();
        assert_eq!(keys, ["limit", "offset", "person_ids", "date_from"]);
        assert_eq!(query.get("person_ids"), Some(&QueryValue::Text("1,2".into())));
        assert_eq!(
            query.get("date_from"),
            Some(&QueryValue::Text("2024-01-15T00:00:00Z".into()))
        );
    }

    #[test]
    fn list_query_keeps_empty_supplied_text() {
        let args = EntriesListArgs {
            origin_ids: Some(String::new()),
            ..list_args()
        };
        let query = list_query(&args, Query::new()).unwrap();
        assert_eq!(query.get("origin_ids"), Some(&QueryValue::Text(String::new())));
    }

    #[test]
    fn list_query_rejects_bad_dates() {
        let args = EntriesListArgs {
            date_to: Some("15/01/2024".into()),
            ..list_args()
        };
        assert!(matches!(
            list_query(&args, Query::new()),
            Err(ResolveError::UnparseableDate(_))
        ));
    }

    #[test]
    fn stats_request_resolves_enums() {
        let args = StatsSourcesArgs {
            conf: Some("HA".into()),
            liveness: Some("Passed".into()),
            source_id: Some(0),
            ..stats_args()
        };
        let req = stats_request(&args).unwrap();
        assert_eq!(req.conf, Some(Confidence::HighAccuracy));
        assert_eq!(req.liveness, Some(Liveness::Passed));
        assert_eq!(req.source, Some(0));
        assert_eq!(req.entry_id_from, None);
    }

    #[test]
    fn stats_request_surfaces_resolver_errors() {
        let bad_conf = StatsSourcesArgs {
            conf: Some("99".into()),
            ..stats_args()
        };
        assert!(matches!(
            stats_request(&bad_conf),
            Err(ResolveError::OutOfRange { .. })
        ));

        let bad_liveness = StatsSourcesArgs {
            liveness: Some("".into()),
            ..stats_args()
        };
        assert!(matches!(
            stats_request(&bad_liveness),
            Err(ResolveError::MissingValue { what: "liveness" })
        ));
    }
}
