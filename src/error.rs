use thiserror::Error;

/// Everything that can go wrong outside of the silent refresh path.
///
/// Store failures inside a scheduled refresh are logged and swallowed at the
/// call site; this type only travels through `?` in handlers and `main`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("store query failed: {0}")]
    Store(#[from] sqlx::Error),
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error("report generation failed: {0}")]
    Report(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl warp::reject::Reject for Error {}
