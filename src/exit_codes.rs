//! Exit codes so pipelines can tell failure classes apart.

use drone_sentry::{Error, ErrorKind};

use crate::cli::UsageError;

/// Release or deploy failed on the server side, or anything unclassified.
pub const GENERAL_ERROR: i32 = 1;

/// Missing or invalid flags, or details rejected before sending.
pub const USAGE_ERROR: i32 = 2;

/// The settings file could not be read or parsed.
pub const CONFIG_ERROR: i32 = 3;

/// The server could not be reached or its answer could not be read.
pub const CONNECTION_ERROR: i32 = 4;

pub fn for_error(e: &anyhow::Error) -> i32 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<Error>() {
            return match err.kind() {
                ErrorKind::Validation => USAGE_ERROR,
                ErrorKind::Transport => CONNECTION_ERROR,
                ErrorKind::Api => GENERAL_ERROR,
            };
        }
        if cause.downcast_ref::<UsageError>().is_some() {
            return USAGE_ERROR;
        }
        if cause.downcast_ref::<toml::de::Error>().is_some()
            || cause.downcast_ref::<std::io::Error>().is_some()
        {
            return CONFIG_ERROR;
        }
    }
    GENERAL_ERROR
}
