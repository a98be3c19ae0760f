use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up a console session.
///
/// Nothing on the ingestion path returns these: once a session is running,
/// failures are absorbed and counted instead.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to open session log {path}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write session log header")]
    LogHeader(#[source] io::Error),

    #[error("failed to read config file {path}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
