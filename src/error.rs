use std::net::AddrParseError;
use thiserror::Error;

/// Failures that stop a timetable from being generated at all.
///
/// Missing or dangling entity references never end up here; they degrade to
/// placeholders or an empty timetable instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid evolution parameters: {0}")]
    InvalidParams(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}
