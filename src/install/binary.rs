/// Download-and-place installation for PATH binaries
use std::path::Path;

use tracing::{debug, info};

use super::{InstallOutcome, InstallRequest, Installer};
use crate::error::{Error, Result};
use crate::platform;
use crate::transfer;
use crate::utils::command::CommandBuilder;
use crate::validate;

impl Installer {
    pub(super) async fn install_binary(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        let name = request.artifact.name();

        if request.skip_if_present && platform::is_installed(name) {
            info!("{} is already installed, skipping", name);
            return Ok(InstallOutcome::Skipped {
                reason: format!("{} already on PATH", name),
            });
        }

        let (version, url) = match &request.source_url {
            Some(url) => (request.version.clone(), url.clone()),
            None => {
                let version = self
                    .resolver
                    .resolve_version(request.artifact, &request.version)
                    .await?;
                let url = request.artifact.download_url(&version, self.platform)?;
                (version, url)
            }
        };

        let dest = request.install_dir.join(name);
        let escalate = self.decide_elevation(&request.install_dir).await?;

        // Idempotent overwrite: clear any previous copy first
        remove_file_at(&dest, escalate).await?;

        // Staging lives in a scoped temp dir, so every failure path
        // cleans up after itself
        let staging = tempfile::tempdir()?;
        let fetched = staging.path().join(remote_file_name(&url));
        info!("Downloading {} from {}", name, url);
        transfer::fetch(&url, &fetched).await?;

        let binary = match request.artifact.archive_member() {
            Some(member) => {
                debug!("Extracting {} from {}", member, fetched.display());
                let extracted = staging.path().join(name);
                transfer::extract_member(&fetched, member, &extracted)?;
                extracted
            }
            None => fetched,
        };

        place_file(&binary, &dest, escalate).await?;
        info!("Installed {} {} to {}", name, version, dest.display());

        Ok(InstallOutcome::Installed { version })
    }

    /// Decide whether filesystem operations on the destination need
    /// sudo. Requires the sudo binary when they do.
    async fn decide_elevation(&self, install_dir: &Path) -> Result<bool> {
        if !self.allow_elevation || dir_writable(install_dir).await {
            return Ok(false);
        }
        validate::require_binaries(&["sudo"])?;
        debug!(
            "{} is not writable by this process, using sudo",
            install_dir.display()
        );
        Ok(true)
    }
}

async fn dir_writable(dir: &Path) -> bool {
    let probe = dir.join(format!(".outfitter-write-{}", std::process::id()));
    match tokio::fs::File::create(&probe).await {
        Ok(_) => {
            let _ = tokio::fs::remove_file(&probe).await;
            true
        }
        Err(_) => false,
    }
}

async fn remove_file_at(dest: &Path, escalate: bool) -> Result<()> {
    if escalate {
        return CommandBuilder::new("sudo")
            .args(["rm", "-f"])
            .arg(dest)
            .run_silent()
            .await
            .map_err(|e| Error::CommandFailed(format!("sudo rm {}: {}", dest.display(), e)));
    }

    match tokio::fs::remove_file(dest).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Move the staged binary to its destination and mark it executable
async fn place_file(src: &Path, dest: &Path, escalate: bool) -> Result<()> {
    if escalate {
        CommandBuilder::new("sudo")
            .arg("mv")
            .arg(src)
            .arg(dest)
            .run_silent()
            .await
            .map_err(|e| Error::CommandFailed(format!("sudo mv to {}: {}", dest.display(), e)))?;
        return CommandBuilder::new("sudo")
            .args(["chmod", "755"])
            .arg(dest)
            .run_silent()
            .await
            .map_err(|e| Error::CommandFailed(format!("sudo chmod {}: {}", dest.display(), e)));
    }

    // Copy rather than rename: the staging dir may sit on another
    // filesystem
    tokio::fs::copy(src, dest).await?;
    set_executable(dest).await
}

async fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

fn remote_file_name(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
}
