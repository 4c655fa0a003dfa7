use clap::{ArgAction, Parser};
use std::path::PathBuf;
use thiserror::Error;

use drone_sentry::config::PluginConfig;
use drone_sentry::models::strip_empty_strings;
use drone_sentry::{ClientConfig, Commit, DeployDetails, Project, Ref, ReleaseDetails};

/// Bad or missing flags, caught before anything is sent.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

fn usage(msg: &str) -> UsageError {
    UsageError(msg.to_string())
}

#[derive(Debug, Parser)]
#[command(name = "drone-sentry", version)]
#[command(about = "Report releases and deployments from a Drone pipeline to Sentry", long_about = None)]
pub struct Args {
    /// Settings file providing defaults for the sentry and project flags
    #[arg(long, env = "PLUGIN_CONFIG", default_value = "drone-sentry.toml")]
    pub config: PathBuf,

    /// Git repo name
    #[arg(long, env = "DRONE_REPO", default_value = "")]
    pub repo: String,

    /// Git commit sha
    #[arg(long, env = "DRONE_COMMIT_SHA", default_value = "00000000")]
    pub commit_sha: String,

    /// Previous git commit sha
    #[arg(long, env = "DRONE_PREV_COMMIT_SHA")]
    pub prev_commit_sha: Option<String>,

    /// Git commit ref
    #[arg(long, env = "DRONE_COMMIT_REF")]
    pub commit_ref: Option<String>,

    /// Git commit message
    #[arg(long, env = "DRONE_COMMIT_MESSAGE")]
    pub commit_message: Option<String>,

    /// Git commit author
    #[arg(long, env = "DRONE_COMMIT_AUTHOR")]
    pub commit_author: Option<String>,

    /// Git commit author email
    #[arg(long, env = "DRONE_COMMIT_AUTHOR_EMAIL")]
    pub commit_author_email: Option<String>,

    /// Sentry server URL (also read from SENTRY_SERVER)
    #[arg(long, env = "PLUGIN_SERVER")]
    pub server: Option<String>,

    /// Sentry server access token (also read from SENTRY_TOKEN)
    #[arg(long, env = "PLUGIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Sentry organization short-name
    #[arg(long, env = "PLUGIN_ORGANIZATION")]
    pub organization: Option<String>,

    /// Create a new Sentry release (`--release=false` turns it off)
    #[arg(
        long,
        env = "PLUGIN_RELEASE",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub release: bool,

    /// Create a new Sentry deployment (`--deploy=false` turns it off)
    #[arg(
        long,
        env = "PLUGIN_DEPLOY",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub deploy: bool,

    /// Sentry project affected by this release
    #[arg(long, env = "PLUGIN_PROJECT")]
    pub project: Option<String>,

    /// Sentry projects affected by this release
    #[arg(long, env = "PLUGIN_PROJECTS", value_delimiter = ',')]
    pub projects: Vec<String>,

    /// The version of the release, defaults to the commit sha
    /// (also read from PLUGIN_DEPLOY_VERSION and PLUGIN_VERSION)
    #[arg(long, env = "PLUGIN_RELEASE_VERSION")]
    pub release_version: Option<String>,

    /// The url for viewing the release
    #[arg(long, env = "PLUGIN_RELEASE_URL")]
    pub release_url: Option<String>,

    /// The environment that a release was deployed to
    #[arg(long, env = "PLUGIN_DEPLOY_ENVIRONMENT")]
    pub environment: Option<String>,

    /// The name of a deployment
    #[arg(long, env = "PLUGIN_DEPLOY_NAME")]
    pub deploy_name: Option<String>,

    /// The url for viewing a deployment
    #[arg(long, env = "PLUGIN_DEPLOY_URL")]
    pub deploy_url: Option<String>,
}

/// Everything needed to run one invocation.
#[derive(Debug)]
pub struct Plan {
    pub client: ClientConfig,
    pub release: Option<ReleaseDetails>,
    pub deploy: Option<DeployDetails>,
}

/// First value that is set and non-empty.
fn first_set<I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    values.into_iter().flatten().find(|v| !v.is_empty())
}

impl Args {
    /// Merges flags with the settings file and the alternate env var names,
    /// then builds the requests to send. `env` looks up environment variables.
    pub fn resolve(
        self,
        file: PluginConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Plan, UsageError> {
        let token = first_set([self.token, env("SENTRY_TOKEN"), file.sentry.token])
            .ok_or_else(|| usage("must specify sentry.token"))?;
        let organization = first_set([self.organization, file.sentry.organization])
            .ok_or_else(|| usage("must specify sentry.organization"))?;
        let server = first_set([self.server, env("SENTRY_SERVER")]).unwrap_or(file.sentry.server);

        if !self.release && !self.deploy {
            return Err(usage("must specify either release, deploy or both"));
        }
        if self.commit_sha.is_empty() {
            return Err(usage("must specify commit sha"));
        }

        let version = first_set([
            self.release_version,
            env("PLUGIN_DEPLOY_VERSION"),
            env("PLUGIN_VERSION"),
        ])
        .unwrap_or_else(|| self.commit_sha.clone());

        let release = if self.release {
            let git_ref = first_set([self.commit_ref])
                .ok_or_else(|| usage("must specify commit ref"))?;

            let mut names: Vec<String> = Vec::new();
            let requested = self.projects.into_iter().chain(self.project).chain(file.projects);
            for name in strip_empty_strings(requested) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            if names.is_empty() {
                return Err(usage("must specify at least one project"));
            }

            let repository = (!self.repo.is_empty()).then(|| self.repo.clone());
            let commit_given = first_set([
                self.commit_message.clone(),
                self.commit_author.clone(),
                self.commit_author_email.clone(),
            ]);
            let commits = if commit_given.is_some() {
                vec![Commit {
                    sha: self.commit_sha.clone(),
                    repository: repository.clone(),
                    message: self.commit_message,
                    author_name: self.commit_author,
                    author_email: self.commit_author_email,
                    timestamp: None,
                }]
            } else {
                Vec::new()
            };
            let refs = repository
                .map(|repository| Ref {
                    commit_sha: self.commit_sha.clone(),
                    repository,
                    previous_commit_sha: self.prev_commit_sha,
                })
                .into_iter()
                .collect();

            Some(ReleaseDetails {
                git_ref: Some(git_ref),
                url: self.release_url,
                commits,
                refs,
                ..ReleaseDetails::new(version.clone(), names.into_iter().map(Project::named).collect())
            })
        } else {
            None
        };

        let deploy = if self.deploy {
            let environment = first_set([self.environment, file.deploy.environment])
                .ok_or_else(|| usage("must specify deploy environment"))?;
            Some(DeployDetails {
                name: self.deploy_name,
                url: self.deploy_url,
                ..DeployDetails::new(version, environment)
            })
        } else {
            None
        };

        Ok(Plan {
            client: ClientConfig {
                server,
                organization,
                token,
            },
            release,
            deploy,
        })
    }
}
