//! Per-record aggregation
//!
//! Consumes one archive record and produces the per-record table fragment.
//! For 200 responses the payload is decoded and run through a small state
//! machine whose only carried state is the most recently seen User-agent:
//! every recognized line emits one composite row under the current agent, and
//! the rows fold into the fragment by grouping key.

use crate::aggregate::{classify_line, AggregateCounts, AggregateKey, ArchiveTable, Directive};
use crate::warc::ResponseRecord;

/// Reduces one archive record to its table fragment
///
/// Non-200 records produce a single synthetic row with a null user agent and
/// zero counts; their payloads are never decoded. 200 records are decoded
/// line by line, with Allow/Disallow occurrences attributed to the last-seen
/// User-agent value ("most recent context wins"; this is not a full
/// robots.txt block parser).
///
/// # Arguments
///
/// * `record` - The decoded HTTP response record
///
/// # Returns
///
/// The per-record `ArchiveTable` fragment, ready to merge into the archive's
/// cumulative table
pub fn aggregate_record(record: &ResponseRecord) -> ArchiveTable {
    let mut fragment = ArchiveTable::new();
    let domain = record.domain();

    if record.http_code != 200 {
        fragment.merge_row(
            AggregateKey {
                fetched_at: record.fetched_at,
                http_code: record.http_code,
                domain,
                user_agent: None,
            },
            AggregateCounts::ZERO,
        );
        return fragment;
    }

    let text = decode_latin1(&record.payload);
    let mut current_agent: Option<String> = None;

    for line in text.split('\n') {
        let Some(directive) = classify_line(line) else {
            continue;
        };

        let counts = match directive {
            Directive::UserAgent(value) => {
                current_agent = Some(value);
                AggregateCounts::ZERO
            }
            Directive::Allow => AggregateCounts::ONE_ALLOW,
            Directive::Disallow => AggregateCounts::ONE_DISALLOW,
        };

        fragment.merge_row(
            AggregateKey {
                fetched_at: record.fetched_at,
                http_code: record.http_code,
                domain: domain.clone(),
                user_agent: current_agent.clone(),
            },
            counts,
        );
    }

    fragment
}

/// Decodes payload bytes as Latin-1
///
/// Every byte value maps to exactly one character, so decoding cannot fail on
/// any byte sequence. Captured bodies routinely contain non-UTF-8 noise and
/// the pipeline must not abort on them.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 4, 2, 10, 50, 54).unwrap()
    }

    fn record(status: u16, body: &[u8]) -> ResponseRecord {
        ResponseRecord {
            fetched_at: fetched_at(),
            http_code: status,
            target_uri: "https://example.com/robots.txt".to_string(),
            payload: body.to_vec(),
        }
    }

    fn key(code: u16, agent: Option<&str>) -> AggregateKey {
        AggregateKey {
            fetched_at: fetched_at(),
            http_code: code,
            domain: Some("example.com".to_string()),
            user_agent: agent.map(|a| a.to_string()),
        }
    }

    #[test]
    fn test_non_200_emits_single_zero_row() {
        let fragment = aggregate_record(&record(404, b"ignored body"));

        assert_eq!(fragment.len(), 1);
        assert_eq!(fragment.get(&key(404, None)), Some(&AggregateCounts::ZERO));
    }

    #[test]
    fn test_disallow_counts_occurrences_not_paths() {
        let fragment = aggregate_record(&record(200, b"User-agent: *\nDisallow:/a\nDisallow:/b\n"));

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.get(&key(200, Some(" *"))),
            Some(&AggregateCounts {
                disallow_count: 2,
                allow_count: 0
            })
        );
    }

    #[test]
    fn test_rejected_lines_contribute_nothing() {
        let fragment = aggregate_record(&record(
            200,
            b"User-agent: *\nSitemap:/s.xml\nno colon here\n\nDisallow:/x\n",
        ));

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.get(&key(200, Some(" *"))),
            Some(&AggregateCounts {
                disallow_count: 1,
                allow_count: 0
            })
        );
    }

    #[test]
    fn test_directives_before_any_user_agent_have_null_agent() {
        let fragment = aggregate_record(&record(200, b"Disallow:/x\n"));

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.get(&key(200, None)),
            Some(&AggregateCounts {
                disallow_count: 1,
                allow_count: 0
            })
        );
    }

    #[test]
    fn test_most_recent_agent_wins() {
        let fragment = aggregate_record(&record(
            200,
            b"User-agent: a\nDisallow:/x\nUser-agent: b\nDisallow:/y\nAllow:/z\n",
        ));

        assert_eq!(fragment.len(), 2);
        assert_eq!(
            fragment.get(&key(200, Some(" a"))),
            Some(&AggregateCounts {
                disallow_count: 1,
                allow_count: 0
            })
        );
        assert_eq!(
            fragment.get(&key(200, Some(" b"))),
            Some(&AggregateCounts {
                disallow_count: 1,
                allow_count: 1
            })
        );
    }

    #[test]
    fn test_agent_only_record_emits_zero_count_row() {
        let fragment = aggregate_record(&record(200, b"User-agent: lonely\n"));

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.get(&key(200, Some(" lonely"))),
            Some(&AggregateCounts::ZERO)
        );
    }

    #[test]
    fn test_empty_payload_emits_nothing() {
        let fragment = aggregate_record(&record(200, b""));
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_binary_noise_does_not_abort() {
        let mut body = vec![0x00u8, 0xff, 0xfe, b'\n'];
        body.extend_from_slice(b"Disallow:/x\n");
        body.extend_from_slice(&[0x80, 0x81]);

        let fragment = aggregate_record(&record(200, &body));

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.get(&key(200, None)),
            Some(&AggregateCounts {
                disallow_count: 1,
                allow_count: 0
            })
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let fragment = aggregate_record(&record(200, b"User-agent: *\r\nDisallow:/x\r\n"));

        // The classifier's trim handles the carriage returns.
        assert_eq!(
            fragment.get(&key(200, Some(" *"))),
            Some(&AggregateCounts {
                disallow_count: 1,
                allow_count: 0
            })
        );
    }
}
