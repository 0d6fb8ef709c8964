//! Archive key listing
//!
//! A lazy, finite, forward-only sequence of archive keys read from a paths
//! manifest: a newline-delimited key list, optionally gzip-compressed, the
//! way crawl datasets publish their `*.paths.gz` indexes. The runner consumes
//! keys in listing order, bounded by its files-per-run limit.

use crate::{CrawlstatsError, Result};
use flate2::read::GzDecoder;
use reqwest::Client;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines};
use std::path::Path;

/// Lazy iterator over archive keys in listing order
///
/// Blank lines are skipped; surrounding whitespace is trimmed. The sequence
/// is not restartable; construct a new listing to iterate again.
pub struct ArchiveList {
    lines: Lines<Box<dyn BufRead + Send>>,
}

impl ArchiveList {
    /// Wraps an already-open manifest reader
    pub fn from_reader(reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Opens a manifest file on disk
    ///
    /// Names ending in `.gz` are decompressed on the fly.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead + Send> = if is_gzip_name(&path.to_string_lossy()) {
            Box::new(BufReader::new(GzDecoder::new(BufReader::new(file))))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_reader(reader))
    }

    /// Fetches a manifest by URL
    ///
    /// Manifests are small key lists; the body is buffered in memory before
    /// iteration starts.
    pub async fn fetch(client: &Client, url: &str) -> Result<Self> {
        let http_err = |source| CrawlstatsError::Http {
            url: url.to_string(),
            source,
        };

        let body = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?
            .bytes()
            .await
            .map_err(http_err)?;

        let reader: Box<dyn BufRead + Send> = if is_gzip_name(url) {
            Box::new(BufReader::new(GzDecoder::new(Cursor::new(body.to_vec()))))
        } else {
            Box::new(Cursor::new(body.to_vec()))
        };
        Ok(Self::from_reader(reader))
    }
}

impl Iterator for ArchiveList {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    let key = line.trim();
                    if key.is_empty() {
                        continue;
                    }
                    return Some(Ok(key.to_string()));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Whether a manifest name or URL denotes gzip content
fn is_gzip_name(name: &str) -> bool {
    name.trim_end_matches('/').ends_with(".gz")
}
