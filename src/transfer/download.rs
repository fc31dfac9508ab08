/// Streaming HTTP download with bounded retry
use std::path::Path;

use futures::StreamExt;
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Maximum number of download attempts
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between retries in milliseconds
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Request timeout in seconds; CLI tarballs run to tens of megabytes
const REQUEST_TIMEOUT_SECS: u64 = 300;

enum AttemptError {
    /// Worth another attempt (transport failures, server errors)
    Transient(Error),
    /// Deterministic, fail immediately (client errors, local I/O)
    Fatal(Error),
}

/// Download a URL to a local path, streaming chunks to disk.
///
/// Transport and server-side failures are retried with exponential
/// backoff and jitter. A failed attempt removes its partial file, so on
/// error nothing is left at `dest`.
pub async fn fetch(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::TransferFailed(format!("failed to create HTTP client: {}", e)))?;

    let mut last_error = None;

    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            let delay = retry_delay(attempt - 1);
            warn!(
                "Retrying download (attempt {}/{}) after {}ms",
                attempt, MAX_ATTEMPTS, delay
            );
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        match stream_to_file(&client, url, dest).await {
            Ok(()) => return Ok(()),
            Err(AttemptError::Fatal(e)) => {
                let _ = tokio::fs::remove_file(dest).await;
                return Err(e);
            }
            Err(AttemptError::Transient(e)) => {
                let _ = tokio::fs::remove_file(dest).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::TransferFailed(format!("download failed after {} attempts", MAX_ATTEMPTS))
    }))
}

async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> std::result::Result<(), AttemptError> {
    debug!("GET {}", url);

    let response = client.get(url).send().await.map_err(|e| {
        AttemptError::Transient(Error::TransferFailed(format!(
            "failed to connect to {}: {}",
            url, e
        )))
    })?;

    let status = response.status();
    if !status.is_success() {
        let error = Error::TransferFailed(format!("HTTP {} from {}", status.as_u16(), url));
        // 4xx responses are deterministic; retrying cannot help
        return if status.is_client_error() {
            Err(AttemptError::Fatal(error))
        } else {
            Err(AttemptError::Transient(error))
        };
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| AttemptError::Fatal(Error::Io(e)))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            AttemptError::Transient(Error::TransferFailed(format!(
                "failed to read from {}: {}",
                url, e
            )))
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AttemptError::Fatal(Error::Io(e)))?;
        downloaded += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| AttemptError::Fatal(Error::Io(e)))?;

    debug!("Downloaded {} bytes from {}", downloaded, url);
    Ok(())
}

/// Exponential backoff with +/- 25% jitter (1s, 2s between attempts)
fn retry_delay(completed_attempts: u32) -> u64 {
    let base = BASE_RETRY_DELAY_MS * 2u64.pow(completed_attempts - 1);
    let jitter_range = base / 4;
    let jitter = rand::thread_rng().gen_range(0..=jitter_range * 2);
    base - jitter_range + jitter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_grows_with_jitter() {
        for _ in 0..20 {
            assert!((750..=1250).contains(&retry_delay(1)));
            assert!((1500..=2500).contains(&retry_delay(2)));
        }
    }

    #[tokio::test]
    async fn test_fetch_streams_body_to_disk() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/artifacts/jq-linux-amd64")
            .with_status(200)
            .with_body("#!/fake-binary-payload")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("jq");
        fetch(&format!("{}/artifacts/jq-linux-amd64", server.url()), &dest)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(contents, "#!/fake-binary-payload");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_client_error_fails_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("no such artifact")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing");
        let err = fetch(&format!("{}/missing", server.url()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TransferFailed(_)));
        assert!(err.to_string().contains("404"));
        assert!(!dest.exists());
        mock.assert_async().await;
    }
}
