// Command handlers: one module per API resource.
//
// Each handler resolves its flags into a request first and only then
// builds a client, so a validation failure never reaches the network.

pub mod entries;
pub mod origins;
pub mod profiles;
pub mod tokens;
pub mod users;
pub mod utility;
pub mod version;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::api::ApiClient;
use crate::cli::{Command, GlobalArgs};
use crate::config::{Credential, Settings};
use crate::error::ResolveError;
use crate::output::Output;
use crate::query::Query;

/// Everything a handler needs beyond its own flags.
pub struct Session {
    pub settings: Settings,
    pub output: Output,
    limit: u32,
    offset: u32,
}

impl Session {
    pub fn new(settings: Settings, global: &GlobalArgs) -> Self {
        Session {
            settings,
            output: Output::new(global.output.clone()),
            limit: global.limit,
            offset: global.offset,
        }
    }

    /// `limit`/`offset` from the global flags.
    pub fn pagination(&self) -> Query {
        Query::pagination(self.limit, self.offset)
    }

    pub fn client(&self, credential: Credential) -> Result<ApiClient> {
        let token = self.settings.token_for(credential)?;
        ApiClient::new(&self.settings.base_url, token)
    }

    /// Run a request behind a spinner on stderr.
    pub fn call<T>(&self, label: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let spinner = if self.settings.debug {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner.set_message(format!("{label}..."));
        spinner.enable_steady_tick(Duration::from_millis(80));
        let result = f();
        spinner.finish_and_clear();
        result
    }

    pub fn write(&self, value: &Value) -> Result<()> {
        self.output.write(value)
    }
}

/// Dispatch a parsed `Command` to its handler.
pub fn dispatch(command: &Command, session: &Session) -> Result<()> {
    match command {
        Command::Entries(cmd) => entries::run(cmd, session),
        Command::Origins(cmd) => origins::run(cmd, session),
        Command::Profiles(cmd) => profiles::run(cmd, session),
        Command::Tokens(cmd) => tokens::run(cmd, session),
        Command::Users(cmd) => users::run(cmd, session),
        Command::Utility(cmd) => utility::run(cmd, session),
        Command::Version => version::run(session),
    }
}

/// Require a path flag without touching the filesystem.
pub(crate) fn require_path<'a>(
    field: &'static str,
    path: Option<&'a PathBuf>,
) -> Result<&'a Path, ResolveError> {
    path.map(PathBuf::as_path)
        .ok_or(ResolveError::MissingRequiredField(field))
}
