/// Artifact catalog: identities, aliases and download URL templates
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};
use crate::platform::{Arch, Os, Platform};

/// Versioned tarball repository for the cloud CLI
pub const CLOUD_CLI_DOWNLOAD_BASE: &str = "https://download.clis.cloud.ibm.com/ibm-cloud-cli";

/// How an artifact is delivered and detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Standalone executable placed on the search path
    Binary,
    /// Extension installed through the cloud CLI's plugin mechanism
    Plugin,
}

/// Where the newest released version of an artifact is published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseIndex {
    /// GitHub releases/latest API; the tag may carry a project prefix
    /// (jq tags releases as `jq-1.8.1`)
    GitHub {
        repo: &'static str,
        tag_prefix: &'static str,
    },
    /// The Kubernetes plain-text stable-version pointer
    KubernetesStable,
}

/// Everything this tool knows how to install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    CloudCli,
    Kubectl,
    Jq,
    ContainerService,
    ContainerRegistry,
}

impl Artifact {
    pub const ALL: [Artifact; 5] = [
        Artifact::CloudCli,
        Artifact::Kubectl,
        Artifact::Jq,
        Artifact::ContainerService,
        Artifact::ContainerRegistry,
    ];

    pub fn kind(&self) -> Kind {
        match self {
            Artifact::CloudCli | Artifact::Kubectl | Artifact::Jq => Kind::Binary,
            Artifact::ContainerService | Artifact::ContainerRegistry => Kind::Plugin,
        }
    }

    /// Canonical name: the executable for binaries, the plugin name for
    /// plugins. Used in CLI arguments, logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Artifact::CloudCli => "ibmcloud",
            Artifact::Kubectl => "kubectl",
            Artifact::Jq => "jq",
            Artifact::ContainerService => "container-service",
            Artifact::ContainerRegistry => "container-registry",
        }
    }

    /// Short alias also accepted on the command line. Plugin aliases
    /// mirror the host CLI's own.
    pub fn alias(&self) -> Option<&'static str> {
        match self {
            Artifact::CloudCli => Some("cli"),
            Artifact::ContainerService => Some("ks"),
            Artifact::ContainerRegistry => Some("cr"),
            Artifact::Kubectl | Artifact::Jq => None,
        }
    }

    /// Path inside the downloaded tarball that holds the executable,
    /// for artifacts shipped as archives
    pub fn archive_member(&self) -> Option<&'static str> {
        match self {
            Artifact::CloudCli => Some("IBM_Cloud_CLI/ibmcloud"),
            _ => None,
        }
    }

    pub fn release_index(&self) -> Option<ReleaseIndex> {
        match self {
            Artifact::CloudCli => Some(ReleaseIndex::GitHub {
                repo: "IBM-Cloud/ibm-cloud-cli-release",
                tag_prefix: "",
            }),
            Artifact::Kubectl => Some(ReleaseIndex::KubernetesStable),
            Artifact::Jq => Some(ReleaseIndex::GitHub {
                repo: "jqlang/jq",
                tag_prefix: "jq-",
            }),
            Artifact::ContainerService | Artifact::ContainerRegistry => None,
        }
    }

    /// Build the download URL for a resolved version on a platform.
    ///
    /// Plugins have no direct URL; their installation is delegated to
    /// the host CLI.
    pub fn download_url(&self, version: &str, platform: Platform) -> Result<String> {
        match self {
            Artifact::CloudCli => {
                // Upstream names the Intel macOS tarball with no
                // architecture suffix; every other pair carries one.
                let suffix = match (platform.os, platform.arch) {
                    (Os::Linux, Arch::Amd64) => "linux_amd64.tgz",
                    (Os::Linux, Arch::Arm64) => "linux_arm64.tgz",
                    (Os::MacOs, Arch::Amd64) => "macos.tgz",
                    (Os::MacOs, Arch::Arm64) => "macos_arm64.tgz",
                };
                Ok(format!(
                    "{}/{}/binaries/IBMCloud_CLI_{}_{}",
                    CLOUD_CLI_DOWNLOAD_BASE, version, version, suffix
                ))
            }
            Artifact::Kubectl => {
                let os = match platform.os {
                    Os::Linux => "linux",
                    Os::MacOs => "darwin",
                };
                Ok(format!(
                    "https://dl.k8s.io/release/v{}/bin/{}/{}/kubectl",
                    version, os, platform.arch
                ))
            }
            Artifact::Jq => Ok(format!(
                "https://github.com/jqlang/jq/releases/download/jq-{}/jq-{}-{}",
                version, platform.os, platform.arch
            )),
            Artifact::ContainerService | Artifact::ContainerRegistry => {
                Err(Error::InvalidArgument(format!(
                    "{} is a plugin and has no direct download URL",
                    self.name()
                )))
            }
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Artifact {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase();
        for artifact in Artifact::ALL {
            if wanted == artifact.name() || Some(wanted.as_str()) == artifact.alias() {
                return Ok(artifact);
            }
        }
        Err(Error::InvalidArgument(format!(
            "unknown artifact '{}' (expected one of: {})",
            s,
            Artifact::ALL
                .iter()
                .map(|a| a.name())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Validate an explicit source URL override. Accepted URLs bypass both
/// version resolution and template construction, and are used verbatim.
pub fn parse_override_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| Error::InvalidArgument(format!("invalid source URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(Error::InvalidArgument(format!(
            "unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}
