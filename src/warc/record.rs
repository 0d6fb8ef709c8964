use chrono::{DateTime, Utc};
use url::Url;

/// One decoded HTTP response captured in an archive
///
/// Produced by [`crate::warc::WarcReader`]; consumed once by the record
/// aggregator.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    /// Capture timestamp (WARC-Date)
    pub fetched_at: DateTime<Utc>,

    /// Status code parsed from the embedded HTTP response
    pub http_code: u16,

    /// WARC-Target-URI header value, verbatim
    pub target_uri: String,

    /// Raw response body bytes (may be binary noise; decoding is deferred)
    pub payload: Vec<u8>,
}

impl ResponseRecord {
    /// Extracts the lowercased host of the target URI
    ///
    /// Falls back to the raw header value when the target does not parse as
    /// a URL, so a record with an unusual target is still attributable.
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The lowercased host, or the raw target URI
    /// * `None` - The record carried no target at all
    pub fn domain(&self) -> Option<String> {
        if self.target_uri.is_empty() {
            return None;
        }
        match Url::parse(&self.target_uri) {
            Ok(url) => match url.host_str() {
                Some(host) => Some(host.to_lowercase()),
                None => Some(self.target_uri.clone()),
            },
            Err(_) => Some(self.target_uri.clone()),
        }
    }
}
