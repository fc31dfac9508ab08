/// Host platform detection for artifact selection
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::command::CommandBuilder;

/// Operating system families with published artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    MacOs,
}

/// CPU architectures with published artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

/// Detected host platform, threaded read-only through install calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Detect the running OS family and CPU architecture.
    ///
    /// An x86_64 build running under Rosetta reports `x86_64` through
    /// `std::env::consts`, but the CPU brand string still names the Apple
    /// part, so macOS detection consults `sysctl` to pick `arm64` there.
    pub async fn detect() -> Result<Self> {
        let os = match std::env::consts::OS {
            "linux" => Os::Linux,
            "macos" => Os::MacOs,
            other => {
                return Err(Error::UnsupportedPlatform(format!(
                    "no artifacts published for OS '{}'",
                    other
                )))
            }
        };

        let mut arch = match std::env::consts::ARCH {
            "x86_64" => Arch::Amd64,
            "aarch64" => Arch::Arm64,
            other => {
                return Err(Error::UnsupportedPlatform(format!(
                    "no artifacts published for architecture '{}'",
                    other
                )))
            }
        };

        if os == Os::MacOs && arch == Arch::Amd64 {
            if let Some(brand) = cpu_brand_string().await {
                if is_apple_silicon(&brand) {
                    arch = Arch::Arm64;
                }
            }
        }

        Ok(Self { os, arch })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Linux => write!(f, "linux"),
            Os::MacOs => write!(f, "macos"),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Amd64 => write!(f, "amd64"),
            Arch::Arm64 => write!(f, "arm64"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Check whether an executable resolves on the search path
pub fn is_installed(name: &str) -> bool {
    which::which(name).is_ok()
}

async fn cpu_brand_string() -> Option<String> {
    let output = CommandBuilder::new("sysctl")
        .args(["-n", "machdep.cpu.brand_string"])
        .output()
        .await
        .ok()?;
    if output.success {
        Some(output.stdout.trim().to_string())
    } else {
        None
    }
}

fn is_apple_silicon(brand: &str) -> bool {
    brand.contains("Apple")
}
