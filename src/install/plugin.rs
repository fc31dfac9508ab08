/// Plugin installation delegated to the host CLI
use std::path::Path;

use tracing::info;

use super::{InstallOutcome, InstallRequest, Installer};
use crate::catalog::Artifact;
use crate::error::{Error, Result};
use crate::platform;
use crate::release;
use crate::utils::command::CommandBuilder;
use crate::validate;

impl Installer {
    pub(super) async fn install_plugin(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        let name = request.artifact.name();

        if request.source_url.is_some() {
            return Err(Error::InvalidArgument(format!(
                "{} is a plugin and cannot be installed from a URL",
                name
            )));
        }

        validate::require_binaries(&["ibmcloud"])?;

        if request.skip_if_present
            && is_plugin_installed(request.artifact, request.plugin_home.as_deref()).await?
        {
            info!("Plugin {} is already installed, skipping", name);
            return Ok(InstallOutcome::Skipped {
                reason: format!("plugin {} already installed", name),
            });
        }

        // "latest" is the host CLI's default; only explicit versions are
        // passed through
        let version = if request.version.eq_ignore_ascii_case("latest") {
            None
        } else {
            Some(release::normalize_requested(&request.version))
        };

        info!("Installing plugin {}...", name);
        let mut cmd = CommandBuilder::new("ibmcloud").args(["plugin", "install", name, "-f"]);
        if let Some(version) = &version {
            cmd = cmd.args(["-v", version]);
        }
        if let Some(home) = &request.plugin_home {
            cmd = cmd.plugin_home(home);
        }
        cmd.context(format!("Failed to install plugin {}", name))
            .run_silent()
            .await
            .map_err(|e| Error::CommandFailed(format!("plugin install {}: {}", name, e)))?;

        info!("Installed plugin {}", name);
        Ok(InstallOutcome::Installed {
            version: version.unwrap_or_else(|| "latest".to_string()),
        })
    }
}

/// Check the host CLI's plugin listing for an artifact. A missing host
/// CLI means no plugins are installed.
pub(super) async fn is_plugin_installed(
    artifact: Artifact,
    plugin_home: Option<&Path>,
) -> Result<bool> {
    if !platform::is_installed("ibmcloud") {
        return Ok(false);
    }

    let mut cmd = CommandBuilder::new("ibmcloud").args(["plugin", "list"]);
    if let Some(home) = plugin_home {
        cmd = cmd.plugin_home(home);
    }
    let listing = cmd
        .context("Failed to list plugins")
        .run()
        .await
        .map_err(|e| Error::CommandFailed(format!("plugin list: {}", e)))?;

    Ok(plugin_listed(&listing, artifact))
}

/// Match an artifact against the host CLI's tabular plugin listing.
///
/// Rows start with the plugin name; a row may join several names with
/// slashes (`container-service/kubernetes-service`). Headers and banner
/// lines never collide with catalog names, so no special casing.
fn plugin_listed(listing: &str, artifact: Artifact) -> bool {
    let name = artifact.name();
    let alias = artifact.alias();

    for line in listing.lines() {
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        for candidate in first.split('/') {
            if candidate.eq_ignore_ascii_case(name)
                || alias.is_some_and(|a| candidate.eq_ignore_ascii_case(a))
            {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os, Platform};
    use crate::release::Resolver;
    use serial_test::serial;

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

    const LISTING: &str = "\
Listing installed plug-ins...

Plugin Name                            Version   Status   Private endpoints supported
container-registry                     1.3.7              true
container-service/kubernetes-service   1.0.536            false
cloud-object-storage                   1.8.0              false
";

    #[test]
    fn test_listing_matches_name_and_joined_aliases() {
        assert!(plugin_listed(LISTING, Artifact::ContainerRegistry));
        assert!(plugin_listed(LISTING, Artifact::ContainerService));
    }

    #[test]
    fn test_listing_ignores_headers_and_absent_plugins() {
        let empty = "Listing installed plug-ins...\n\nPlugin Name   Version\n";
        assert!(!plugin_listed(empty, Artifact::ContainerRegistry));
        assert!(!plugin_listed(empty, Artifact::ContainerService));
    }

    #[test]
    fn test_listing_matches_alias_column() {
        let listing = "ks   1.0.536   false\n";
        assert!(plugin_listed(listing, Artifact::ContainerService));
        assert!(!plugin_listed(listing, Artifact::ContainerRegistry));
    }

    #[tokio::test]
    #[serial]
    async fn test_plugin_install_requires_host_cli() {
        // A PATH with only an empty dir has no ibmcloud on it
        let empty_bin = tempfile::tempdir().unwrap();
        let old_path = std::env::var("PATH").unwrap();
        std::env::set_var("PATH", empty_bin.path());

        let mut request = InstallRequest::new(Artifact::ContainerService);
        request.skip_if_present = false;

        let result = test_installer().install(&request).await;
        std::env::set_var("PATH", &old_path);

        let err = result.unwrap_err();
        assert!(matches!(err, Error::MissingDependency(_)));
        assert!(err.to_string().contains("ibmcloud"));
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_host_cli_means_no_plugins() {
        let empty_bin = tempfile::tempdir().unwrap();
        let old_path = std::env::var("PATH").unwrap();
        std::env::set_var("PATH", empty_bin.path());

        let result = is_plugin_installed(Artifact::ContainerRegistry, None).await;
        std::env::set_var("PATH", &old_path);

        assert!(!result.unwrap());
    }

    #[tokio::test]
    async fn test_plugins_reject_source_urls() {
        let mut request = InstallRequest::new(Artifact::ContainerRegistry);
        request.source_url = Some("https://example.com/plugin.bin".to_string());

        let err = test_installer().install(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
