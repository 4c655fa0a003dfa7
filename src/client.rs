use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use std::fmt;

use crate::error::{Error, Result};
use crate::models::{ApiResponse, DeployDetails, ReleaseDetails};
use crate::transport::Transport;
use crate::url::build_url;

pub const DEFAULT_SERVER: &str = "https://app.getsentry.com";

#[derive(Clone, Default)]
pub struct ClientConfig {
    pub server: String,
    pub organization: String,
    pub token: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("organization", &self.organization)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The two operations the CLI can ask for. Both fill in defaults on the
/// details they are given before sending them.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    async fn submit_release(&self, details: &mut ReleaseDetails) -> Result<ApiResponse>;
    async fn submit_deploy(&self, details: &mut DeployDetails) -> Result<ApiResponse>;
}

#[derive(Clone)]
pub struct Client {
    server: String,
    organization: String,
    transport: Transport,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.server)
            .field("organization", &self.organization)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let transport = Transport::new(config.token);
        Self::with_transport(config.server, config.organization, transport)
    }

    pub fn with_transport(
        server: impl Into<String>,
        organization: impl Into<String>,
        transport: Transport,
    ) -> Self {
        let server = server.into();
        Self {
            server: if server.is_empty() {
                DEFAULT_SERVER.to_string()
            } else {
                server
            },
            organization: organization.into(),
            transport,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn releases_url(&self, rest: &[&str]) -> String {
        let mut segments = vec!["api/0/organizations", self.organization.as_str(), "releases"];
        segments.extend_from_slice(rest);
        build_url(&self.server, &segments)
    }
}

#[async_trait]
impl ReleaseApi for Client {
    async fn submit_release(&self, details: &mut ReleaseDetails) -> Result<ApiResponse> {
        details.apply_defaults(Utc::now());
        details.validate()?;

        tracing::info!(version = %details.version, "creating new release");
        let url = self.releases_url(&[]);
        self.transport
            .send(Method::POST, &url, Some(&*details))
            .await
            .map_err(|e| Error::ReleaseCreation(Box::new(e)))
    }

    async fn submit_deploy(&self, details: &mut DeployDetails) -> Result<ApiResponse> {
        details.apply_defaults(Utc::now());
        details.validate()?;

        tracing::info!(
            version = %details.version,
            environment = %details.environment,
            "creating new deployment"
        );
        let url = self.releases_url(&[details.version.as_str(), "deploys"]);
        self.transport
            .send(Method::POST, &url, Some(&*details))
            .await
            .map_err(|e| Error::DeployCreation(Box::new(e)))
    }
}
