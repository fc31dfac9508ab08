/// Outfitter - IBM Cloud tooling installer
///
/// Installs the IBM Cloud CLI with its container plugins, kubectl and jq
/// for the current platform, and requests IAM bearer tokens.
mod catalog;
mod config;
mod error;
mod iam;
mod install;
mod platform;
mod release;
mod transfer;
mod utils;
mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Artifact;
use crate::config::TokenConfig;
use crate::error::{Error, Result};
use crate::iam::IamClient;
use crate::install::{BatchReport, InstallOutcome, InstallRequest, Installer};
use crate::platform::Platform;

#[derive(Parser)]
#[command(name = "outfitter")]
#[command(about = "Install IBM Cloud tooling and request IAM bearer tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install one or more artifacts
    Install {
        /// Artifact names or aliases; `status` lists the catalog
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        artifacts: Vec<String>,

        /// Install every artifact in the catalog
        #[arg(long)]
        all: bool,

        /// Version to install (single artifact only)
        #[arg(long, default_value = "latest")]
        version: String,

        /// Explicit download URL (single binary artifact only)
        #[arg(long)]
        url: Option<String>,

        /// Destination directory for binaries
        #[arg(long, default_value = install::DEFAULT_INSTALL_DIR)]
        install_dir: PathBuf,

        /// Leave already-detected artifacts untouched
        #[arg(
            long,
            default_value = "true",
            value_parser = validate::parse_boolean,
            action = clap::ArgAction::Set
        )]
        skip_if_present: bool,

        /// Plugin directory override for the host CLI
        #[arg(long)]
        plugin_home: Option<PathBuf>,
    },

    /// Request an IAM bearer token and print it to stdout
    Token {
        /// IBM Cloud API key (falls back to IBMCLOUD_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// IAM endpoint to request the token from
        #[arg(long)]
        iam_endpoint: Option<String>,
    },

    /// Show which artifacts are already installed
    Status {
        /// Plugin directory override for the host CLI
        #[arg(long)]
        plugin_home: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout stays reserved for payloads
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("outfitter={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Install {
            artifacts,
            all,
            version,
            url,
            install_dir,
            skip_if_present,
            plugin_home,
        } => {
            install_artifacts(
                artifacts,
                all,
                version,
                url,
                install_dir,
                skip_if_present,
                plugin_home,
            )
            .await
        }
        Commands::Token {
            api_key,
            iam_endpoint,
        } => print_token(api_key, iam_endpoint).await,
        Commands::Status { plugin_home } => show_status(plugin_home).await,
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Install the requested artifacts
async fn install_artifacts(
    names: Vec<String>,
    all: bool,
    version: String,
    url: Option<String>,
    install_dir: PathBuf,
    skip_if_present: bool,
    plugin_home: Option<PathBuf>,
) -> Result<()> {
    let artifacts: Vec<Artifact> = if all {
        Artifact::ALL.to_vec()
    } else {
        names
            .iter()
            .map(|name| name.parse())
            .collect::<Result<_>>()?
    };

    if artifacts.len() > 1 {
        if version != "latest" {
            return Err(Error::InvalidArgument(
                "--version applies to a single artifact".to_string(),
            ));
        }
        if url.is_some() {
            return Err(Error::InvalidArgument(
                "--url applies to a single artifact".to_string(),
            ));
        }
    }

    let source_url = url
        .map(|raw| catalog::parse_override_url(&raw))
        .transpose()?;
    let plugin_home = config::resolve_plugin_home(plugin_home);

    let platform = Platform::detect().await?;
    info!("Platform: {}", platform);

    let installer = Installer::new(platform)?;
    let requests: Vec<InstallRequest> = artifacts
        .into_iter()
        .map(|artifact| {
            let mut request = InstallRequest::new(artifact);
            request.version = version.clone();
            request.install_dir = install_dir.clone();
            request.skip_if_present = skip_if_present;
            request.source_url = source_url.clone();
            request.plugin_home = plugin_home.clone();
            request
        })
        .collect();

    // A single artifact surfaces its own error; a batch aggregates
    if let [request] = requests.as_slice() {
        match installer.install(request).await? {
            InstallOutcome::Installed { version } => {
                info!("✓ Installed {} {}", request.artifact, version);
            }
            InstallOutcome::Skipped { reason } => {
                info!("Skipped {} ({})", request.artifact, reason);
            }
        }
        return Ok(());
    }

    let report: BatchReport = installer.install_many(&requests).await?;
    report.log_summary();
    report.overall()
}

/// Request an IAM bearer token and print it
async fn print_token(api_key: Option<String>, iam_endpoint: Option<String>) -> Result<()> {
    let config = TokenConfig::resolve(api_key, iam_endpoint)?;
    let client = IamClient::new(config.iam_endpoint)?;
    let token = client.request_bearer_token(&config.api_key).await?;

    // The token is the only payload ever written to stdout
    println!("{}", token);
    Ok(())
}

/// Report detection status for every artifact in the catalog
async fn show_status(plugin_home: Option<PathBuf>) -> Result<()> {
    let plugin_home = config::resolve_plugin_home(plugin_home);

    for artifact in Artifact::ALL {
        let installed = install::is_artifact_installed(artifact, plugin_home.as_deref()).await?;
        if installed {
            info!("{:<20} installed", artifact.name());
        } else {
            info!("{:<20} missing", artifact.name());
        }
    }

    Ok(())
}
