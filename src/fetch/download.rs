//! Archive download and extraction
//!
//! Streams a `.warc.gz` archive to the source directory, extracts it into
//! the extracted directory, and cleans the compressed download up after the
//! archive has been processed. Network and IO failures here are fatal to the
//! run; the pipeline carries no retry logic of its own.

use crate::{CrawlstatsError, Result};
use flate2::read::GzDecoder;
use reqwest::Client;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A downloaded and extracted archive
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    /// The compressed download in the source directory
    pub source_path: PathBuf,

    /// The decompressed archive in the extracted directory
    pub extracted_path: PathBuf,

    /// File name shared by both, and used in the ledger
    pub file_name: String,
}

/// Builds the HTTP client used for archive and manifest fetches
///
/// No overall request timeout is set: archive segments run to hundreds of
/// megabytes and stream at whatever pace the mirror allows. Connecting is
/// still bounded.
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("crawlstats/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
}

/// Downloads an archive by URL and extracts it
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - Full URL of the `.warc.gz` archive
/// * `source_dir` - Directory receiving the compressed download
/// * `extracted_dir` - Directory receiving the decompressed archive
///
/// # Returns
///
/// * `Ok(DownloadedArchive)` - Both files written, file name derived
/// * `Err(CrawlstatsError)` - Network, status, or IO failure
pub async fn download_archive(
    client: &Client,
    url: &str,
    source_dir: &Path,
    extracted_dir: &Path,
) -> Result<DownloadedArchive> {
    let file_name = file_name_from_url(url)?;
    let source_path = source_dir.join(&file_name);
    let extracted_path = extracted_dir.join(&file_name);

    tracing::info!("Downloading '{}'", url);

    let http_err = |source| CrawlstatsError::Http {
        url: url.to_string(),
        source,
    };

    let mut response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_err)?;

    let mut out = BufWriter::new(File::create(&source_path)?);
    while let Some(chunk) = response.chunk().await.map_err(http_err)? {
        out.write_all(&chunk)?;
    }
    out.flush()?;

    extract_gzip(&source_path, &extracted_path)?;
    tracing::info!("Extracted '{}'", extracted_path.display());

    Ok(DownloadedArchive {
        source_path,
        extracted_path,
        file_name,
    })
}

/// Decompresses a gzip file to the given destination
pub(crate) fn extract_gzip(source: &Path, destination: &Path) -> Result<()> {
    let input = BufReader::new(File::open(source)?);
    let mut decoder = GzDecoder::new(input);
    let mut out = BufWriter::new(File::create(destination)?);
    std::io::copy(&mut decoder, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Removes the compressed source file once an archive has been counted
pub fn remove_source(archive: &DownloadedArchive) -> Result<()> {
    if archive.source_path.is_file() {
        std::fs::remove_file(&archive.source_path)?;
    }
    Ok(())
}

/// Derives the archive file name from the last URL path segment
///
/// The name keys the ledger's idempotency check, so the runner derives it
/// before any download happens.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let name = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if name.is_empty() || name.contains('?') {
        return Err(CrawlstatsError::BadArchiveUrl(url.to_string()));
    }
    Ok(name.to_string())
}
