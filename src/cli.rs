// CLI argument definitions via clap derive.
//
// Every optional flag is an `Option` so that "not supplied" stays distinct
// from "supplied as zero/false/empty". Boolean flags that can be turned
// off take an optional `=true|=false` value.

use std::path::PathBuf;

use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{Args, Parser, Subcommand, ValueHint};

use crate::config::SettingsOverrides;

/// Command-line client for the SERP facial recognition platform.
#[derive(Debug, Parser)]
#[command(
    name = "serptech",
    about = "SERP is a real-time facial recognition platform.",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Debug the CLI and HTTP client (SERP_DEBUG).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Access token (SERP_ACCESS_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Root API token (SERP_ROOT_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub root_token: Option<String>,

    /// API base URL override (SERP_BASE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Path to file for writing the output result.
    #[arg(short, long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Number of output items, maximum 1000 per request.
    #[arg(
        long,
        global = true,
        value_name = "N",
        default_value_t = 20,
        value_parser = clap::value_parser!(u32).range(1..=1000)
    )]
    pub limit: u32,

    /// Sequential number of an output item to return a sampling after.
    #[arg(long, global = true, value_name = "N", default_value_t = 0)]
    pub offset: u32,
}

impl GlobalArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            access_token: self.token.clone(),
            root_token: self.root_token.clone(),
            base_url: self.base_url.clone(),
            debug: self.debug,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect recognition entries and statistics.
    #[command(subcommand)]
    Entries(EntriesCommand),
    /// Manage origin configuration.
    #[command(subcommand)]
    Origins(OriginsCommand),
    /// Manage recognition profiles.
    #[command(subcommand)]
    Profiles(ProfilesCommand),
    /// Manage API tokens.
    #[command(subcommand)]
    Tokens(TokensCommand),
    /// Interact with user-related endpoints.
    #[command(subcommand)]
    Users(UsersCommand),
    /// Access utility endpoints (health, metrics, checks).
    #[command(subcommand)]
    Utility(UtilityCommand),
    /// Display API version information.
    Version,
}

// --- entries ---

#[derive(Debug, Subcommand)]
pub enum EntriesCommand {
    /// List recognition entries.
    List(EntriesListArgs),
    /// Delete entry by identifier.
    Delete(IdArgs),
    /// Retrieve entry statistics.
    #[command(subcommand)]
    Stats(EntriesStatsCommand),
}

#[derive(Debug, Args)]
pub struct EntriesListArgs {
    /// Comma-separated list of origin identifiers.
    #[arg(long, value_name = "IDS")]
    pub origin_ids: Option<String>,

    /// Comma-separated list of space identifiers.
    #[arg(long, value_name = "IDS")]
    pub spaces_ids: Option<String>,

    /// Comma-separated list of person identifiers.
    #[arg(long, value_name = "IDS")]
    pub person_ids: Option<String>,

    /// Comma-separated list of confidence values.
    #[arg(long, value_name = "CONF")]
    pub conf: Option<String>,

    /// Entries created after the given date (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub date_from: Option<String>,

    /// Entries created before the given date (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub date_to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum EntriesStatsCommand {
    /// Show statistics grouped by origins.
    Sources(StatsSourcesArgs),
}

#[derive(Debug, Args)]
pub struct StatsSourcesArgs {
    /// Comma-separated list of person identifiers.
    #[arg(long, value_name = "IDS")]
    pub person_ids: Option<String>,

    /// Filter by confidence (name or integer value).
    #[arg(long, value_name = "CONF")]
    pub conf: Option<String>,

    /// Filter by liveness (passed|failed|undetermined).
    #[arg(long, value_name = "RESULT")]
    pub liveness: Option<String>,

    /// Filter by origin identifier.
    #[arg(long, value_name = "ID")]
    pub source_id: Option<u64>,

    /// Filter entries starting from identifier.
    #[arg(long, value_name = "ID")]
    pub entry_id_from: Option<u64>,

    /// Filter by start date (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub date_from: Option<String>,

    /// Filter by end date (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub date_to: Option<String>,
}

/// A single numeric identifier.
#[derive(Debug, Args)]
pub struct IdArgs {
    /// Target identifier.
    #[arg(long, value_name = "ID")]
    pub id: Option<u64>,
}

// --- origins ---

#[derive(Debug, Subcommand)]
pub enum OriginsCommand {
    /// List origins.
    List(OriginsListArgs),
    /// Show one origin.
    Get(IdArgs),
    /// Create an origin.
    Create(OriginFieldArgs),
    /// Update supplied fields of an origin.
    Update(OriginUpdateArgs),
    /// Delete an origin.
    Delete(IdArgs),
}

#[derive(Debug, Args)]
pub struct OriginsListArgs {
    /// Filter by partially specified name.
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct OriginFieldArgs {
    /// Origin name.
    #[arg(long)]
    pub name: Option<String>,

    /// Whether the origin is active.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub is_active: Option<bool>,

    /// Minimum face size for uploads.
    #[arg(long, value_name = "N")]
    pub min_facesize: Option<u32>,

    /// Number of days to keep entries (update only).
    #[arg(long, value_name = "DAYS")]
    pub entry_storage_days: Option<u32>,

    /// Minimum face size when creating profiles.
    #[arg(long, value_name = "N")]
    pub create_min_facesize: Option<u32>,

    /// Allow profile creation when confidence is HA.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub create_ha: Option<bool>,

    /// Allow profile creation when confidence is junk.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub create_junk: Option<bool>,
}

#[derive(Debug, Args)]
pub struct OriginUpdateArgs {
    /// Origin identifier.
    #[arg(long, value_name = "ID")]
    pub id: Option<u64>,

    #[command(flatten)]
    pub fields: OriginFieldArgs,
}

// --- profiles ---

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// Create a profile from a photo.
    Create(ProfileCreateArgs),
    /// Search profiles by photo.
    Search(ProfileSearchArgs),
    /// Delete a profile.
    Delete(ProfileIdArgs),
    /// Reinitialize a profile with a new photo.
    Reinit(ProfileReinitArgs),
}

#[derive(Debug, Args)]
pub struct ProfileCreateArgs {
    /// Path to the profile photo.
    #[arg(short, long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub photo: Option<PathBuf>,

    /// Origin identifier.
    #[arg(long, value_name = "ID")]
    pub origin_id: Option<u64>,

    /// Minimum face size when creating.
    #[arg(long, value_name = "N")]
    pub create_min_facesize: Option<u32>,

    /// Allow creation when result confidence is HA.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub create_ha: Option<bool>,

    /// Allow creation when result confidence is junk.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub create_junk: Option<bool>,
}

#[derive(Debug, Args)]
pub struct ProfileSearchArgs {
    /// Path to the primary photo.
    #[arg(short, long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub photo: Option<PathBuf>,

    /// Optional path to a secondary photo; an empty path is ignored.
    #[arg(
        long,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub second_photo: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProfileIdArgs {
    /// Profile identifier.
    #[arg(long, value_name = "ID")]
    pub profile_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileReinitArgs {
    /// Profile identifier.
    #[arg(long, value_name = "ID")]
    pub profile_id: Option<String>,

    /// Path to the new photo.
    #[arg(short, long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub photo: Option<PathBuf>,

    /// Minimum face size when reinitializing.
    #[arg(long, value_name = "N")]
    pub create_min_facesize: Option<u32>,

    /// Minimum match confidence.
    #[arg(long, value_name = "N")]
    pub min_conf: Option<u32>,
}

// --- tokens ---

#[derive(Debug, Subcommand)]
pub enum TokensCommand {
    /// Manage access tokens.
    #[command(subcommand)]
    Access(TokenAction),
    /// Manage stream tokens.
    #[command(subcommand)]
    Streams(TokenAction),
}

#[derive(Debug, Subcommand)]
pub enum TokenAction {
    /// List tokens.
    List(TokenListArgs),
    /// Create a token.
    Create(TokenCreateArgs),
    /// Delete a token.
    Delete(TokenDeleteArgs),
}

#[derive(Debug, Args)]
pub struct TokenListArgs {
    /// Filter by space identifier.
    #[arg(long, value_name = "ID")]
    pub space_id: Option<u64>,
}

#[derive(Debug, Args)]
pub struct TokenCreateArgs {
    /// Create a permanent token.
    #[arg(long)]
    pub permanent: bool,
}

#[derive(Debug, Args)]
pub struct TokenDeleteArgs {
    /// Token key.
    #[arg(long)]
    pub key: Option<String>,
}

// --- users ---

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Show the current user.
    Me,
    /// List access tokens of the current user.
    ListTokens,
    /// Show usage statistics.
    Statistics,
    /// List users (root token).
    List(UsersListArgs),
    /// Show one user (root token).
    Get(IdArgs),
    /// Replace a user; all fields are required (root token).
    Update(UserFieldArgs),
    /// Update supplied fields of a user (root token).
    Patch(UserFieldArgs),
}

#[derive(Debug, Args)]
pub struct UsersListArgs {
    /// Filter users by username substring.
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,
}

#[derive(Debug, Args)]
pub struct UserFieldArgs {
    /// Target user identifier.
    #[arg(long, value_name = "ID")]
    pub id: Option<u64>,

    /// Username value.
    #[arg(long)]
    pub username: Option<String>,

    /// Active status.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub is_active: Option<bool>,
}

// --- utility ---

#[derive(Debug, Subcommand)]
pub enum UtilityCommand {
    /// Health check.
    Health,
    /// Platform metrics.
    Metrics,
    /// Age/sex/mood prediction.
    Asm(AsmArgs),
    /// Run a liveness check.
    Liveness(PhotoPairArgs),
    /// Compare two faces (access token only).
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
pub struct AsmArgs {
    /// Path to photo.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PhotoPairArgs {
    /// Path to the first photo.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub photo1: Option<PathBuf>,

    /// Path to the second photo.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub photo2: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub photos: PhotoPairArgs,

    /// Optional confidence threshold (name or integer value).
    #[arg(long, value_name = "CONF")]
    pub conf: Option<String>,

    /// Mark the first photo as a liveness frame.
    #[arg(long)]
    pub liveness_photo1: bool,

    /// Mark the second photo as a liveness frame.
    #[arg(long)]
    pub liveness_photo2: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unset_flags_stay_none() {
        let cli = Cli::try_parse_from(["serptech", "users", "patch", "--id", "12"]).unwrap();
        let Command::Users(UsersCommand::Patch(args)) = cli.command else {
            panic!("unexpected command");
        };
        assert_eq!(args.id, Some(12));
        assert_eq!(args.username, None);
        assert_eq!(args.is_active, None);
    }

    #[test]
    fn optional_bool_flags() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["serptech", "users", "patch", "--id", "1"];
            argv.extend_from_slice(extra);
            let cli = Cli::try_parse_from(argv).unwrap();
            match cli.command {
                Command::Users(UsersCommand::Patch(args)) => args.is_active,
                _ => unreachable!(),
            }
        };
        assert_eq!(parse(&["--is-active"]), Some(true));
        assert_eq!(parse(&["--is-active=false"]), Some(false));
        assert_eq!(parse(&[]), None);
    }

    #[test]
    fn empty_second_photo_is_accepted() {
        let cli = Cli::try_parse_from([
            "serptech", "profiles", "search", "--photo", "a.jpg", "--second-photo", "",
        ])
        .unwrap();
        let Command::Profiles(ProfilesCommand::Search(args)) = cli.command else {
            panic!("unexpected command");
        };
        assert_eq!(args.second_photo, Some(PathBuf::new()));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["serptech", "origins", "list", "--limit", "50", "-o", "x.json"])
                .unwrap();
        assert_eq!(cli.global.limit, 50);
        assert_eq!(cli.global.offset, 0);
        assert_eq!(cli.global.output, Some(PathBuf::from("x.json")));
    }

    #[test]
    fn limit_is_bounded() {
        assert!(Cli::try_parse_from(["serptech", "users", "list", "--limit", "1001"]).is_err());
        assert!(Cli::try_parse_from(["serptech", "users", "list", "--limit", "0"]).is_err());
    }
}
