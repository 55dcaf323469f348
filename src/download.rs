//! Downloads a single archive file to disk.

use std::{
    fs::{self, File},
    io::{Read, Write},
    path::Path,
    time::Duration,
};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::{
    credentials::Credentials,
    error::{Era5Error, Result},
};

/// Anything smaller than this is probably an error page rather than NetCDF.
const MIN_EXPECTED_SIZE: u64 = 1000;
const TIMEOUT: Duration = Duration::from_secs(300);

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| Era5Error::Download {
            url: String::new(),
            reason: e.to_string(),
        })
}

/// Downloads `url` to `file_path` with HTTP basic auth, showing progress on `progress_bar`.
/// A partial or invalid file is removed before the error is returned.
pub async fn download_with_progress(
    client: &reqwest::Client,
    url: &str,
    credentials: &Credentials,
    file_path: &Path,
    progress_bar: &ProgressBar,
) -> Result<u64> {
    let result = fetch(client, url, credentials, file_path, progress_bar).await;

    if result.is_err() && file_path.exists() {
        debug!("Removing incomplete {}", file_path.display());
        fs::remove_file(file_path)?;
    }

    result
}

async fn fetch(
    client: &reqwest::Client,
    url: &str,
    credentials: &Credentials,
    file_path: &Path,
    progress_bar: &ProgressBar,
) -> Result<u64> {
    let failed = |reason: String| Era5Error::Download {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .basic_auth(&credentials.email, Some(&credentials.key))
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(failed(format!("server returned {}", response.status())));
    }

    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        progress_bar.set_length(total_size);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
    }

    let mut file = File::create(file_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| failed(format!("error reading chunk: {}", e)))?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress_bar.set_position(downloaded);
    }
    file.flush()?;

    if downloaded < MIN_EXPECTED_SIZE {
        warn!("File size suspiciously small ({} bytes): {}", downloaded, url);
        if looks_like_error_page(file_path)? {
            return Err(failed("response appears to be an error page".to_string()));
        }
    }

    Ok(downloaded)
}

fn looks_like_error_page(file_path: &Path) -> Result<bool> {
    let mut head = Vec::with_capacity(100);
    File::open(file_path)?.take(100).read_to_end(&mut head)?;
    let head = String::from_utf8_lossy(&head).to_lowercase();

    Ok(head.contains("<html") || head.contains("error"))
}

// -- Tests -------------------------------------------------------------------
