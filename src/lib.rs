pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;
pub mod url;

pub use client::{Client, ClientConfig, DEFAULT_SERVER, ReleaseApi};
pub use error::{Error, ErrorKind, Result};
pub use models::{ApiResponse, Commit, DeployDetails, Project, Ref, ReleaseDetails};
