/// Multi-artifact orchestration with per-item failure isolation
use tracing::{error, info};

use super::{InstallOutcome, InstallRequest, Installer};
use crate::error::{Error, Result};

/// Aggregated verdict of a multi-artifact run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Artifact name and the version that was placed
    pub installed: Vec<(String, String)>,
    /// Artifact name and why it was left alone
    pub skipped: Vec<(String, String)>,
    /// Artifact name and what went wrong
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// Overall verdict: failure iff any item failed
    pub fn overall(&self) -> Result<()> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(Error::BatchFailed {
                failed: self.failed.len(),
                total: self.installed.len() + self.skipped.len() + self.failed.len(),
            })
        }
    }

    pub fn log_summary(&self) {
        for (name, version) in &self.installed {
            info!("installed  {} {}", name, version);
        }
        for (name, reason) in &self.skipped {
            info!("skipped    {} ({})", name, reason);
        }
        for (name, reason) in &self.failed {
            error!("failed     {} ({})", name, reason);
        }
    }
}

impl Installer {
    /// Install a set of artifacts in order, continuing past operational
    /// failures so one broken download cannot block the rest. Usage
    /// errors abort immediately.
    pub async fn install_many(&self, requests: &[InstallRequest]) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for request in requests {
            let name = request.artifact.name().to_string();
            match self.install(request).await {
                Ok(InstallOutcome::Installed { version }) => {
                    report.installed.push((name, version));
                }
                Ok(InstallOutcome::Skipped { reason }) => {
                    report.skipped.push((name, reason));
                }
                Err(e @ Error::InvalidArgument(_)) => return Err(e),
                Err(e) => {
                    error!("Failed to install {}: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Artifact;
    use crate::platform::{Arch, Os, Platform};
    use crate::release::Resolver;

    fn test_installer() -> Installer {
        Installer {
            platform: Platform {
                os: Os::Linux,
                arch: Arch::Amd64,
            },
            resolver: Resolver::new().unwrap(),
            allow_elevation: false,
        }
    }

    fn request_with_url(
        artifact: Artifact,
        url: String,
        install_dir: &std::path::Path,
    ) -> InstallRequest {
        let mut request = InstallRequest::new(artifact);
        request.skip_if_present = false;
        request.source_url = Some(url);
        request.install_dir = install_dir.to_path_buf();
        request
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_rest() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/good/kubectl")
            .with_status(200)
            .with_body("kubectl payload")
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/gone/jq")
            .with_status(404)
            .create_async()
            .await;

        let target = tempfile::tempdir().unwrap();
        let requests = vec![
            request_with_url(
                Artifact::Jq,
                format!("{}/gone/jq", server.url()),
                target.path(),
            ),
            request_with_url(
                Artifact::Kubectl,
                format!("{}/good/kubectl", server.url()),
                target.path(),
            ),
        ];

        let report = test_installer().install_many(&requests).await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "jq");
        assert_eq!(report.installed.len(), 1);
        assert_eq!(report.installed[0].0, "kubectl");
        assert!(target.path().join("kubectl").exists());

        let err = report.overall().unwrap_err();
        assert!(matches!(err, Error::BatchFailed { failed: 1, total: 2 }));
    }

    #[tokio::test]
    async fn test_all_outcomes_recorded_means_success() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/bin/jq")
            .with_status(200)
            .with_body("jq payload")
            .create_async()
            .await;

        let target = tempfile::tempdir().unwrap();
        let requests = vec![request_with_url(
            Artifact::Jq,
            format!("{}/bin/jq", server.url()),
            target.path(),
        )];

        let report = test_installer().install_many(&requests).await.unwrap();
        assert!(report.failed.is_empty());
        assert!(report.overall().is_ok());
    }

    #[tokio::test]
    async fn test_usage_errors_abort_the_batch() {
        let mut bad = InstallRequest::new(Artifact::ContainerRegistry);
        bad.source_url = Some("https://example.com/plugin.bin".to_string());

        let err = test_installer()
            .install_many(&[bad])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
