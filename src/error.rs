use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of any pipeline stage. Every variant aborts the whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("write failed: {0}")]
    Write(#[from] WriteError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for {year} failed: {source}")]
    Request {
        year: i32,
        #[source]
        source: reqwest::Error,
    },

    /// Any response other than `200 OK`.
    #[error("request for {year} returned {status}")]
    Status { year: i32, status: reqwest::StatusCode },

    #[error("page for {year} contains no table")]
    MissingTable { year: i32 },

    #[error("table for {year} is missing the `{column}` column")]
    MissingColumn { year: i32, column: &'static str },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid date `{value}` for `{name}`: {source}")]
    InvalidDate {
        value: String,
        name: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The date has no representable following day.
    #[error("date {date} is out of range")]
    DateOutOfRange { date: NaiveDate },
}

#[derive(Debug, Error)]
#[error("could not write {}: {source}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
