//! WARC response decoding
//!
//! This module provides a streaming reader over web-archive (WARC) byte
//! streams, filtered to HTTP response records. It is not a general WARC
//! library: it reads exactly what the aggregation pipeline needs, namely
//! capture timestamp, status code, target URI, and the raw response payload.

mod reader;
mod record;

pub use reader::{WarcError, WarcReader};
pub use record::ResponseRecord;
