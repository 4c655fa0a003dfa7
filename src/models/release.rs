use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::{Error, Result};

/// A tracked project that a release belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub slug: String,
}

impl Project {
    /// A project whose slug is the same as its name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slug: name.clone(),
            name,
        }
    }
}

/// A commit range in a repository. With `previous_commit_sha` set the server
/// can compute the changelog between the two commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "commit")]
    pub commit_sha: String,
    pub repository: String,
    #[serde(rename = "previousCommit", default, skip_serializing_if = "is_blank")]
    pub previous_commit_sha: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "id")]
    pub sha: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub author_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body of `POST /api/0/organizations/{org}/releases/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDetails {
    pub version: String,
    #[serde(rename = "ref", default, skip_serializing_if = "is_blank")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub url: Option<String>,
    pub projects: Vec<Project>,
    #[serde(rename = "dateReleased", default, skip_serializing_if = "Option::is_none")]
    pub date_released: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<Commit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<Ref>,
}

impl ReleaseDetails {
    pub fn new(version: impl Into<String>, projects: Vec<Project>) -> Self {
        Self {
            version: version.into(),
            projects,
            ..Default::default()
        }
    }

    /// Stamps the release time with `now` unless the caller already set one.
    pub fn apply_defaults(&mut self, now: DateTime<Utc>) {
        self.date_released.get_or_insert(now);
    }

    /// Removes projects with an empty name and rejects releases that are left
    /// without a version or without any project.
    pub fn validate(&mut self) -> Result<()> {
        if self.version.is_empty() {
            return Err(Error::Validation("release version must not be empty".into()));
        }

        self.projects.retain(|p| !p.name.is_empty());
        for project in &mut self.projects {
            if project.slug.is_empty() {
                project.slug = project.name.clone();
            }
        }

        if self.projects.is_empty() {
            return Err(Error::Validation("must specify at least one project".into()));
        }
        Ok(())
    }
}
