//! Streaming WARC record reader
//!
//! Reads records one at a time from any `BufRead`: version line, `Name: value`
//! headers, then exactly `Content-Length` bytes of block. Only
//! `WARC-Type: response` records are surfaced; everything else is consumed
//! and skipped. Records whose embedded HTTP block or capture date cannot be
//! parsed are skipped with a log line, and iteration continues; a damaged
//! record must not abort the archive.

use crate::warc::ResponseRecord;
use chrono::{DateTime, Utc};
use std::io::BufRead;
use thiserror::Error;

/// Errors surfaced while decoding a WARC stream
///
/// Header and length errors mean stream alignment is lost: the reader fuses
/// after yielding one, since later byte offsets can no longer be trusted.
#[derive(Debug, Error)]
pub enum WarcError {
    #[error("IO error while reading archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record header: {0}")]
    MalformedHeader(String),

    #[error("Record is missing Content-Length")]
    MissingContentLength,

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Truncated record block: expected {expected} bytes")]
    TruncatedBlock { expected: usize },
}

/// A record as read off the wire, before response filtering
struct RawRecord {
    record_type: String,
    date: Option<String>,
    target_uri: String,
    block: Vec<u8>,
}

/// Streaming reader over a decompressed WARC byte stream
///
/// Lazy, finite, forward-only: each call to `next` reads exactly one record
/// off the underlying stream.
///
/// # Example
///
/// ```no_run
/// use crawlstats::warc::WarcReader;
/// use std::fs::File;
/// use std::io::BufReader;
///
/// let file = File::open("archive.warc").unwrap();
/// for record in WarcReader::new(BufReader::new(file)) {
///     let record = record.unwrap();
///     println!("{} {}", record.http_code, record.target_uri);
/// }
/// ```
pub struct WarcReader<R: BufRead> {
    reader: R,
    done: bool,
}

impl<R: BufRead> WarcReader<R> {
    /// Creates a reader over a decompressed WARC stream
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    /// Reads the next raw record, or `None` at end of stream
    fn next_raw(&mut self) -> Result<Option<RawRecord>, WarcError> {
        // Skip inter-record blank lines until the next version line.
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("WARC/") {
                break;
            }
            return Err(WarcError::MalformedHeader(format!(
                "expected WARC version line, got '{}'",
                preview(trimmed)
            )));
        }

        let mut record_type = String::new();
        let mut date = None;
        let mut target_uri = String::new();
        let mut content_length: Option<String> = None;

        // Named headers up to the blank separator line.
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(WarcError::MalformedHeader(
                    "unexpected end of stream inside record headers".to_string(),
                ));
            }
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                break;
            }

            let (name, value) = trimmed.split_once(':').ok_or_else(|| {
                WarcError::MalformedHeader(format!("header without ':': '{}'", preview(trimmed)))
            })?;
            let value = value.trim();

            if name.eq_ignore_ascii_case("WARC-Type") {
                record_type = value.to_string();
            } else if name.eq_ignore_ascii_case("WARC-Date") {
                date = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("WARC-Target-URI") {
                target_uri = value.to_string();
            } else if name.eq_ignore_ascii_case("Content-Length") {
                content_length = Some(value.to_string());
            }
        }

        let length: usize = match content_length {
            Some(raw) => raw
                .parse()
                .map_err(|_| WarcError::InvalidContentLength(raw))?,
            None => return Err(WarcError::MissingContentLength),
        };

        let mut block = vec![0u8; length];
        self.reader.read_exact(&mut block).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                WarcError::TruncatedBlock { expected: length }
            } else {
                WarcError::Io(e)
            }
        })?;

        Ok(Some(RawRecord {
            record_type,
            date,
            target_uri,
            block,
        }))
    }
}

impl<R: BufRead> Iterator for WarcReader<R> {
    type Item = Result<ResponseRecord, WarcError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.next_raw() {
                Ok(Some(raw)) => {
                    if !raw.record_type.eq_ignore_ascii_case("response") {
                        continue;
                    }
                    match parse_response(raw) {
                        Ok(record) => return Some(Ok(record)),
                        Err(reason) => {
                            tracing::debug!("Skipping response record: {}", reason);
                            continue;
                        }
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Interprets a raw record's block as an HTTP response
///
/// The error string names what could not be parsed; the caller logs it and
/// moves on to the next record.
fn parse_response(raw: RawRecord) -> Result<ResponseRecord, String> {
    let date = raw.date.ok_or("record has no WARC-Date")?;
    let fetched_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&date)
        .map_err(|e| format!("unparseable WARC-Date '{}': {}", date, e))?
        .with_timezone(&Utc);

    let http_code = parse_status_code(&raw.block)?;
    let payload = split_body(&raw.block).to_vec();

    Ok(ResponseRecord {
        fetched_at,
        http_code,
        target_uri: raw.target_uri,
        payload,
    })
}

/// Parses the status code from an HTTP response status line
fn parse_status_code(block: &[u8]) -> Result<u16, String> {
    let line_end = block
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(block.len());
    let status_line = String::from_utf8_lossy(&block[..line_end]);
    let status_line = status_line.trim_end_matches('\r');

    if !status_line.starts_with("HTTP/") {
        return Err(format!("block is not an HTTP response: '{}'", preview(status_line)));
    }

    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| format!("no status code in '{}'", preview(status_line)))
}

/// Returns the body after the HTTP header section
///
/// An empty slice when the headers never terminate: a headers-only capture
/// has no payload to classify.
fn split_body(block: &[u8]) -> &[u8] {
    if let Some(pos) = find(block, b"\r\n\r\n") {
        &block[pos + 4..]
    } else if let Some(pos) = find(block, b"\n\n") {
        &block[pos + 2..]
    } else {
        &[]
    }
}

/// First occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Truncates a line for inclusion in error messages
fn preview(line: &str) -> String {
    const MAX: usize = 64;
    if line.chars().count() <= MAX {
        line.to_string()
    } else {
        let truncated: String = line.chars().take(MAX).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Builds one WARC record with the given type and HTTP block
    fn make_record(warc_type: &str, date: &str, uri: &str, block: &str) -> String {
        format!(
            "WARC/1.0\r\n\
             WARC-Type: {}\r\n\
             WARC-Date: {}\r\n\
             WARC-Record-ID: <urn:uuid:00000000-0000-0000-0000-000000000001>\r\n\
             WARC-Target-URI: {}\r\n\
             Content-Type: application/http;msgtype=response\r\n\
             Content-Length: {}\r\n\
             \r\n\
             {}\r\n\r\n",
            warc_type,
            date,
            uri,
            block.len(),
            block
        )
    }

    fn make_response(date: &str, uri: &str, status: u16, body: &str) -> String {
        let block = format!("HTTP/1.1 {} X\r\nContent-Type: text/plain\r\n\r\n{}", status, body);
        make_record("response", date, uri, &block)
    }

    #[test]
    fn test_reads_response_records() {
        let warc = format!(
            "{}{}",
            make_response("2023-04-02T10:50:54Z", "https://example.com/robots.txt", 200, "Disallow:/x\n"),
            make_response("2023-04-02T10:51:00Z", "https://other.com/robots.txt", 404, "")
        );

        let records: Vec<_> = WarcReader::new(Cursor::new(warc.into_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].http_code, 200);
        assert_eq!(records[0].target_uri, "https://example.com/robots.txt");
        assert_eq!(records[0].payload, b"Disallow:/x\n");
        assert_eq!(records[1].http_code, 404);
        assert!(records[1].payload.is_empty());
    }

    #[test]
    fn test_skips_non_response_records() {
        let warc = format!(
            "{}{}",
            make_record(
                "request",
                "2023-04-02T10:50:54Z",
                "https://example.com/robots.txt",
                "GET /robots.txt HTTP/1.1\r\n\r\n"
            ),
            make_response("2023-04-02T10:50:55Z", "https://example.com/robots.txt", 200, "Allow:/\n")
        );

        let records: Vec<_> = WarcReader::new(Cursor::new(warc.into_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].http_code, 200);
    }

    #[test]
    fn test_skips_record_with_non_http_block() {
        let warc = format!(
            "{}{}",
            make_record(
                "response",
                "2023-04-02T10:50:54Z",
                "https://example.com/robots.txt",
                "this is not an http response"
            ),
            make_response("2023-04-02T10:50:55Z", "https://example.com/robots.txt", 200, "Allow:/\n")
        );

        let records: Vec<_> = WarcReader::new(Cursor::new(warc.into_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_skips_record_with_bad_date() {
        let warc = format!(
            "{}{}",
            make_response("not-a-date", "https://example.com/robots.txt", 200, "Allow:/\n"),
            make_response("2023-04-02T10:50:55Z", "https://example.com/robots.txt", 200, "Allow:/\n")
        );

        let records: Vec<_> = WarcReader::new(Cursor::new(warc.into_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_stream() {
        let records: Vec<_> = WarcReader::new(Cursor::new(Vec::new())).collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_truncated_block_is_error() {
        let mut warc = make_response(
            "2023-04-02T10:50:54Z",
            "https://example.com/robots.txt",
            200,
            "Disallow:/secret\n",
        );
        warc.truncate(warc.len() - 12);

        let results: Vec<_> = WarcReader::new(Cursor::new(warc.into_bytes())).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(WarcError::TruncatedBlock { .. })
        ));
    }

    #[test]
    fn test_missing_content_length_is_error() {
        let warc = "WARC/1.0\r\nWARC-Type: response\r\n\r\n";
        let results: Vec<_> = WarcReader::new(Cursor::new(warc.as_bytes().to_vec())).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(WarcError::MissingContentLength)));
    }

    #[test]
    fn test_reader_fuses_after_error() {
        let warc = "WARC/1.0\r\nWARC-Type: response\r\n\r\ntrailing garbage";
        let mut reader = WarcReader::new(Cursor::new(warc.as_bytes().to_vec()));
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_binary_payload_survives() {
        let block = "HTTP/1.1 200 OK\r\n\r\n\u{00}\u{ff}\u{fe}robots";
        let warc = make_record(
            "response",
            "2023-04-02T10:50:54Z",
            "https://example.com/robots.txt",
            block,
        );

        let records: Vec<_> = WarcReader::new(Cursor::new(warc.into_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload.len(), block.len() - "HTTP/1.1 200 OK\r\n\r\n".len());
    }
}
