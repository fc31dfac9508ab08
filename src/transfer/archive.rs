/// Single-member extraction from gzipped tarballs
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{Error, Result};

/// Extract one named member from a tar.gz archive to a destination path,
/// preserving its recorded permissions.
///
/// Entry names are compared after dropping any leading `./`, so archives
/// built with `tar -C dir .` still match. A missing member is an error
/// and leaves nothing at `dest`.
pub fn extract_member(archive_path: &Path, member: &str, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    let wanted = Path::new(member);

    for entry in archive.entries().map_err(|e| {
        Error::TransferFailed(format!(
            "unreadable archive {}: {}",
            archive_path.display(),
            e
        ))
    })? {
        let mut entry = entry.map_err(|e| {
            Error::TransferFailed(format!(
                "unreadable archive {}: {}",
                archive_path.display(),
                e
            ))
        })?;

        let entry_path = entry
            .path()
            .map_err(|e| Error::TransferFailed(format!("bad entry path in archive: {}", e)))?
            .into_owned();

        // Reject traversal tricks before comparing names
        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::TransferFailed(format!(
                "refusing to extract suspicious path {}",
                entry_path.display()
            )));
        }

        if strip_current_dir(&entry_path) == wanted {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            entry.unpack(dest).map_err(|e| {
                Error::TransferFailed(format!("failed to extract {}: {}", member, e))
            })?;
            return Ok(());
        }
    }

    Err(Error::TransferFailed(format!(
        "archive {} does not contain {}",
        archive_path.display(),
        member
    )))
}

fn strip_current_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::Builder;

    fn build_tarball(archive_path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(archive_path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *contents).unwrap();
        }

        builder.finish().unwrap();
    }

    #[test]
    fn test_extracts_named_member_among_others() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("cli.tgz");
        build_tarball(
            &archive,
            &[
                ("IBM_Cloud_CLI/README.txt", b"docs".as_slice()),
                ("IBM_Cloud_CLI/ibmcloud", b"cli payload".as_slice()),
            ],
        );

        let dest = dir.path().join("out/ibmcloud");
        extract_member(&archive, "IBM_Cloud_CLI/ibmcloud", &dest).unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "cli payload");
    }

    #[test]
    fn test_matches_entries_with_dot_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("cli.tgz");
        build_tarball(
            &archive,
            &[("./IBM_Cloud_CLI/ibmcloud", b"cli payload".as_slice())],
        );

        let dest = dir.path().join("ibmcloud");
        extract_member(&archive, "IBM_Cloud_CLI/ibmcloud", &dest).unwrap();

        assert!(dest.exists());
    }

    #[test]
    fn test_missing_member_fails_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("cli.tgz");
        build_tarball(&archive, &[("IBM_Cloud_CLI/README.txt", b"docs".as_slice())]);

        let dest = dir.path().join("ibmcloud");
        let err = extract_member(&archive, "IBM_Cloud_CLI/ibmcloud", &dest).unwrap_err();

        assert!(matches!(err, Error::TransferFailed(_)));
        assert!(!dest.exists());
    }
}
