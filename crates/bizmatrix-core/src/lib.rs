//! Domain model and search orchestration for bizmatrix.
//!
//! Holds the provider-neutral pieces of the business lookup: the typed search
//! query, normalized business records, the two-provider merge, the
//! round-accumulating [`SearchSession`], CSV export, and application config.
//! HTTP clients for the concrete providers live in `bizmatrix-providers`.

pub mod app_config;
pub mod config;
pub mod export;
pub mod merge;
pub mod provider;
pub mod query;
pub mod record;
pub mod session;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use export::{all_results_filename, page_filename, to_csv};
pub use merge::{identity_key, merge_results};
pub use provider::{AiSource, DirectorySource};
pub use query::{GeoPoint, PriceTier, QueryError, SearchQuery};
pub use record::{BusinessRecord, SourceTag};
pub use session::{
    RoundFetch, RoundReport, RoundTicket, SearchSession, SessionError, SessionSnapshot,
    SessionState, NO_MORE_RESULTS_MESSAGE, NO_RESULTS_MESSAGE,
};

/// Errors raised while loading [`AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
