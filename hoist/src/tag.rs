//! Build tag codec
//!
//! A build tag has the shape `<branch>-<sha>-<timestamp>`, where `sha` is a
//! 7-character commit token and `timestamp` is a 14-digit UTC
//! `YYYYMMDDHHMMSS`. Branch names may contain hyphens, so decoding splits
//! from the right.
//!
//! A branch whose last two segments happen to look like a sha and a
//! timestamp decodes as if it were a build tag; nothing in the string can
//! tell the two apart.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::HoistError;

/// Length of the commit token in a tag
pub const SHA_LEN: usize = 7;

/// Timestamp layout in a tag
pub const TIME_FORMAT: &str = "%Y%m%d%H%M%S";

const TIME_LEN: usize = 14;

/// Decoded build tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTag {
    pub branch: String,
    pub sha: String,
    pub time: DateTime<Utc>,
}

impl BuildTag {
    pub fn new(branch: impl Into<String>, sha: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            branch: branch.into(),
            sha: sha.into(),
            time,
        }
    }

    /// Encode back into the tag string
    pub fn encode(&self) -> String {
        format!("{}-{}-{}", self.branch, self.sha, self.time.format(TIME_FORMAT))
    }
}

impl fmt::Display for BuildTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for BuildTag {
    type Err = HoistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tag(s)
    }
}

/// Decode a tag string into branch, sha and build time
pub fn parse_tag(tag: &str) -> Result<BuildTag, HoistError> {
    let invalid = |reason: &str| HoistError::InvalidTag {
        tag: tag.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = tag.rsplitn(3, '-');
    let (timestamp, sha, branch) = match (parts.next(), parts.next(), parts.next()) {
        (Some(ts), Some(sha), Some(branch)) => (ts, sha, branch),
        _ => return Err(invalid("expected <branch>-<sha>-<timestamp>")),
    };

    if branch.is_empty() {
        return Err(invalid("empty branch"));
    }

    if timestamp.len() != TIME_LEN || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("timestamp is not 14 digits"));
    }
    // chrono takes second 60 as a leap second at any minute
    if &timestamp[12..] >= "60" {
        return Err(invalid("seconds out of range"));
    }
    let time = NaiveDateTime::parse_from_str(timestamp, TIME_FORMAT)
        .map_err(|e| invalid(&format!("bad timestamp: {}", e)))?
        .and_utc();

    if sha.len() != SHA_LEN || !sha.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(invalid("malformed sha"));
    }

    Ok(BuildTag {
        branch: branch.to_string(),
        sha: sha.to_string(),
        time,
    })
}
