use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::{Error, Result};

/// Body of `POST /api/0/organizations/{org}/releases/{version}/deploys/`.
///
/// `version` only scopes the URL and is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployDetails {
    #[serde(skip)]
    pub version: String,
    pub environment: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub url: Option<String>,
    #[serde(rename = "dateStarted", default, skip_serializing_if = "Option::is_none")]
    pub date_started: Option<DateTime<Utc>>,
    #[serde(rename = "dateFinished", default, skip_serializing_if = "Option::is_none")]
    pub date_finished: Option<DateTime<Utc>>,
}

impl DeployDetails {
    pub fn new(version: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            environment: environment.into(),
            ..Default::default()
        }
    }

    /// Start defaults to `now`, finish defaults to the start.
    pub fn apply_defaults(&mut self, now: DateTime<Utc>) {
        let started = *self.date_started.get_or_insert(now);
        self.date_finished.get_or_insert(started);
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(Error::Validation("deploy version must not be empty".into()));
        }
        if self.environment.is_empty() {
            return Err(Error::Validation("deploy environment must not be empty".into()));
        }
        if let (Some(started), Some(finished)) = (self.date_started, self.date_finished) {
            if finished < started {
                return Err(Error::Validation(format!(
                    "deploy finished at {finished} before it started at {started}"
                )));
            }
        }
        Ok(())
    }
}
