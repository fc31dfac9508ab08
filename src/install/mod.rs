/// Artifact installation: requests, outcomes and dispatch
mod batch;
mod binary;
mod plugin;

pub use batch::BatchReport;

use std::path::{Path, PathBuf};

use crate::catalog::{Artifact, Kind};
use crate::error::Result;
use crate::platform::{self, Platform};
use crate::release::Resolver;

/// Default destination directory for binary artifacts
pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

/// One artifact installation, fully specified
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub artifact: Artifact,

    /// Requested version; "latest" consults the release index
    pub version: String,

    /// Destination directory for binary artifacts
    pub install_dir: PathBuf,

    /// Leave an already-detected installation untouched
    pub skip_if_present: bool,

    /// Explicit download URL bypassing version resolution and templates
    pub source_url: Option<String>,

    /// Plugin directory override handed to the host CLI
    pub plugin_home: Option<PathBuf>,
}

impl InstallRequest {
    /// Request with the defaults: latest version, standard directory,
    /// skip when already present
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            version: "latest".to_string(),
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            skip_if_present: true,
            source_url: None,
            plugin_home: None,
        }
    }
}

/// How one installation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Downloaded and placed, or delegated to the host CLI
    Installed { version: String },
    /// Already present; nothing was touched
    Skipped { reason: String },
}

/// Executes install requests against the host system
pub struct Installer {
    platform: Platform,
    resolver: Resolver,
    /// Use sudo for destinations this process cannot write
    allow_elevation: bool,
}

impl Installer {
    pub fn new(platform: Platform) -> Result<Self> {
        Ok(Self {
            platform,
            resolver: Resolver::new()?,
            allow_elevation: true,
        })
    }

    /// Install one artifact per its request
    pub async fn install(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        match request.artifact.kind() {
            Kind::Binary => self.install_binary(request).await,
            Kind::Plugin => self.install_plugin(request).await,
        }
    }
}

/// Probe whether an artifact is already present, without side effects
pub async fn is_artifact_installed(artifact: Artifact, plugin_home: Option<&Path>) -> Result<bool> {
    match artifact.kind() {
        Kind::Binary => Ok(platform::is_installed(artifact.name())),
        Kind::Plugin => plugin::is_plugin_installed(artifact, plugin_home).await,
    }
}
