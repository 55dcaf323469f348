//! Errors raised while preparing and submitting jobs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Era5Error {
    #[error("invalid month {0}: expected 1-12")]
    InvalidMonth(u32),

    #[error("invalid day {day}: month {month} has {max} days")]
    InvalidDay { day: u32, month: u32, max: u32 },

    #[error("start day {start} is after end day {end}")]
    InvalidDayRange { start: u32, end: u32 },

    #[error("invalid hours `{0}`: expected hours 0-23 as a list or range, e.g. 0-23 or 0,6,12,18")]
    InvalidHours(String),

    #[error("unknown ERA5 variable `{0}`")]
    UnknownVariable(String),

    #[error("invalid area `{0}`: expected N,W,S,E")]
    InvalidArea(String),

    #[error("template file not found: {}", .0.display())]
    MissingTemplate(PathBuf),

    #[error("template {} has no `{name}=` line", .path.display())]
    TemplateVariableMissing { name: String, path: PathBuf },

    #[error("RDA credentials not found at {}", .path.display())]
    MissingCredentials { path: PathBuf },

    #[error("job submission failed (exit code {code}): {stderr}")]
    SubmissionFailed { code: i32, stderr: String },

    #[error("no job identifier in scheduler output: `{0}`")]
    NoJobId(String),

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("configuration error in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Era5Error>;
