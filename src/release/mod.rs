/// Version resolution against remote release indexes
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use crate::catalog::{Artifact, ReleaseIndex};
use crate::error::{Error, Result};

const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_K8S_STABLE_URL: &str = "https://dl.k8s.io/release/stable.txt";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// GitHub rejects anonymous API requests that carry no User-Agent
const USER_AGENT: &str = "outfitter-installer";

/// Latest-release payload from the GitHub API
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

/// Queries release indexes to turn "latest" into a concrete version
#[derive(Clone)]
pub struct Resolver {
    client: Client,
    github_api_base: String,
    k8s_stable_url: String,
}

impl Resolver {
    /// Create a resolver against the public release indexes
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            k8s_stable_url: DEFAULT_K8S_STABLE_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_bases(github_api_base: String, k8s_stable_url: String) -> Self {
        Self {
            client: build_client().unwrap(),
            github_api_base,
            k8s_stable_url,
        }
    }

    /// Resolve a requested version to a concrete one.
    ///
    /// Explicit versions are normalized without touching the network, so
    /// `v1.8.1` and `1.8.1` resolve identically. Only the literal
    /// "latest" consults the artifact's release index.
    pub async fn resolve_version(&self, artifact: Artifact, requested: &str) -> Result<String> {
        let resolved = if requested.eq_ignore_ascii_case("latest") {
            let index = artifact
                .release_index()
                .ok_or_else(|| resolution_error(artifact, "no release index for this artifact"))?;
            self.query_index(artifact, index).await?
        } else {
            normalize_requested(requested)
        };

        if resolved.is_empty() || resolved == "null" {
            return Err(resolution_error(
                artifact,
                "release index returned no usable version tag",
            ));
        }
        Ok(resolved)
    }

    async fn query_index(&self, artifact: Artifact, index: ReleaseIndex) -> Result<String> {
        match index {
            ReleaseIndex::GitHub { repo, tag_prefix } => {
                let url = format!("{}/repos/{}/releases/latest", self.github_api_base, repo);
                debug!("GET {}", url);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| resolution_error(artifact, &e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(resolution_error(
                        artifact,
                        &format!("release index returned HTTP {}", status.as_u16()),
                    ));
                }

                let release: GitHubRelease = response
                    .json()
                    .await
                    .map_err(|e| resolution_error(artifact, &format!("bad index payload: {}", e)))?;
                Ok(normalize_tag(&release.tag_name, tag_prefix))
            }
            ReleaseIndex::KubernetesStable => {
                debug!("GET {}", self.k8s_stable_url);
                let response = self
                    .client
                    .get(&self.k8s_stable_url)
                    .send()
                    .await
                    .map_err(|e| resolution_error(artifact, &e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(resolution_error(
                        artifact,
                        &format!("stable pointer returned HTTP {}", status.as_u16()),
                    ));
                }

                let body = response
                    .text()
                    .await
                    .map_err(|e| resolution_error(artifact, &e.to_string()))?;
                Ok(normalize_tag(&body, ""))
            }
        }
    }
}

fn resolution_error(artifact: Artifact, reason: &str) -> Error {
    Error::VersionResolutionFailed {
        artifact: artifact.name().to_string(),
        reason: reason.to_string(),
    }
}

/// Normalize a user-supplied version: strip an optional leading 'v'
pub(crate) fn normalize_requested(version: &str) -> String {
    normalize_tag(version, "")
}

/// Strip the index's tag prefix, then an optional leading 'v'
fn normalize_tag(tag: &str, prefix: &str) -> String {
    let tag = tag.trim();
    let tag = tag.strip_prefix(prefix).unwrap_or(tag);
    let tag = tag.strip_prefix('v').unwrap_or(tag);
    tag.to_string()
}

fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(USER_AGENT),
    );

    Client::builder()
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::TransferFailed(format!("failed to create HTTP client: {}", e)))
}
