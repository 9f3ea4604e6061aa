// Library root
// -----------
// This crate exposes the pieces behind the `serptech` binary so they can be
// tested without spawning the process or reaching the network.
//
// Module responsibilities:
// - `resolve`: typed resolution of raw flag strings (confidence, liveness,
//   dates).
// - `query`: ordered query parameters that contain only supplied flags.
// - `models`: request shapes and their update/patch validation.
// - `config`: credentials and base URL from flags, environment and the
//   token file.
// - `api`: blocking HTTP client for the platform's resources.
// - `output`: pretty JSON to the terminal or to a file.
// - `cli` / `commands`: clap definitions and one handler per resource.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod query;
pub mod resolve;

pub use error::ResolveError;
