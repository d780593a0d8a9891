//! Streaming HTTP downloads.

use crate::error::{DepsError, DepsResult};
use crate::progress::DownloadProgress;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Download `url` into `dest`, reporting progress after every chunk.
///
/// `stall_timeout` bounds the wait for the response headers and for each
/// chunk. On any failure `dest` is
/// removed, including when it existed before the call. Returns the number of
/// bytes written.
pub async fn download_file<F>(
    client: &Client,
    url: &str,
    dest: &Path,
    stall_timeout: Duration,
    mut on_progress: F,
) -> DepsResult<u64>
where
    F: FnMut(DownloadProgress),
{
    let result = fetch_into(client, url, dest, stall_timeout, &mut on_progress).await;

    if let Err(ref e) = result {
        warn!("Download of {} failed: {}", url, e);
        if let Err(rm) = tokio::fs::remove_file(dest).await {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove partial download {:?}: {}", dest, rm);
            }
        }
    }

    result
}

async fn fetch_into<F>(
    client: &Client,
    url: &str,
    dest: &Path,
    stall_timeout: Duration,
    on_progress: &mut F,
) -> DepsResult<u64>
where
    F: FnMut(DownloadProgress),
{
    let stalled = || DepsError::Timeout {
        seconds: stall_timeout.as_secs(),
    };

    debug!("GET {}", url);
    let response = tokio::time::timeout(stall_timeout, client.get(url).send())
        .await
        .map_err(|_| stalled())??;

    let status = response.status();
    if !status.is_success() {
        return Err(DepsError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total = response.content_length();
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut progress = DownloadProgress {
        downloaded: 0,
        total,
    };

    on_progress(progress);

    loop {
        let next = tokio::time::timeout(stall_timeout, stream.next())
            .await
            .map_err(|_| stalled())?;

        let chunk = match next {
            Some(chunk) => chunk?,
            None => break,
        };

        file.write_all(&chunk).await?;
        progress.downloaded += chunk.len() as u64;
        on_progress(progress);
    }

    file.flush().await?;

    if let Some(expected) = total {
        if progress.downloaded != expected {
            return Err(DepsError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, received {}", expected, progress.downloaded),
            )));
        }
    }

    debug!("Downloaded {} bytes to {:?}", progress.downloaded, dest);
    Ok(progress.downloaded)
}

#[cfg(test)]
pub(crate) mod test_server {
    //! Minimal HTTP/1.1 server for download tests.

    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    /// How long silent and stalled replies hold the connection open.
    const HOLD: Duration = Duration::from_secs(3);

    pub enum Reply {
        /// Status code and full body.
        Full(u16, Vec<u8>),
        /// Advertise `advertised` bytes but send only `body`, then close.
        Truncated { advertised: usize, body: Vec<u8> },
        /// Read the request and never answer.
        Silent,
        /// Advertise `advertised` bytes, send `body`, then stop sending.
        Stalled { advertised: usize, body: Vec<u8> },
    }

    /// Serve one reply per connection and return the base URL.
    pub fn serve(replies: Vec<Reply>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for reply in replies {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let (status, length, body, hold) = match reply {
                    Reply::Full(status, body) => (status, body.len(), body, false),
                    Reply::Truncated { advertised, body } => (200, advertised, body, false),
                    Reply::Stalled { advertised, body } => (200, advertised, body, true),
                    Reply::Silent => {
                        thread::sleep(HOLD);
                        continue;
                    }
                };
                let head = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status, length
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
                if hold {
                    thread::sleep(HOLD);
                }
            }
        });

        format!("http://{}", addr)
    }

    /// A URL nothing is listening on.
    pub fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/archive.zip", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::{refused_url, serve, Reply};
    use super::*;

    const STALL: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_download_reports_progress() {
        let body = vec![7u8; 64 * 1024];
        let url = serve(vec![Reply::Full(200, body.clone())]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.zip");

        let mut last = None;
        let written = download_file(&Client::new(), &url, &dest, STALL, |p| last = Some(p))
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        let last = last.unwrap();
        assert_eq!(last.total, Some(body.len() as u64));
        assert_eq!(last.percent(), Some(100));
    }

    #[tokio::test]
    async fn test_http_error_removes_destination() {
        let url = serve(vec![Reply::Full(500, b"boom".to_vec())]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.zip");
        std::fs::write(&dest, b"placeholder").unwrap();

        let err = download_file(&Client::new(), &url, &dest, STALL, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, DepsError::HttpStatus { status: 500, .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_truncated_body_removes_destination() {
        let url = serve(vec![Reply::Truncated {
            advertised: 4096,
            body: vec![1u8; 100],
        }]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.zip");

        let result = download_file(&Client::new(), &url, &dest, STALL, |_| {}).await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let url = serve(vec![Reply::Silent]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.zip");
        std::fs::write(&dest, b"placeholder").unwrap();

        let started = std::time::Instant::now();
        let result =
            download_file(&Client::new(), &url, &dest, Duration::from_millis(300), |_| {}).await;

        assert!(matches!(result, Err(DepsError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let url = serve(vec![Reply::Stalled {
            advertised: 4096,
            body: vec![1u8; 100],
        }]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.zip");

        let started = std::time::Instant::now();
        let result =
            download_file(&Client::new(), &url, &dest, Duration::from_millis(300), |_| {}).await;

        assert!(matches!(result, Err(DepsError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_connection_refused_removes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.zip");
        std::fs::write(&dest, b"placeholder").unwrap();

        let result = download_file(&Client::new(), &refused_url(), &dest, STALL, |_| {}).await;

        assert!(matches!(result, Err(DepsError::Http(_))));
        assert!(!dest.exists());
    }
}
