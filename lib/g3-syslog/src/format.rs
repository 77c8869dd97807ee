/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::SecondsFormat;

use crate::buffer::BufferRecord;
use crate::types::{Facility, encode_priority};

pub(crate) struct SyslogHeader {
    pub(crate) facility: Facility,
    pub(crate) hostname: Option<String>,
    pub(crate) tag: String,
    pub(crate) pid: u32,
}

/// Format one record as `<priority>timestamp hostname tag[pid]: message`.
///
/// The timestamp is the record's capture time, not the send time, as
/// batching may delay the send by several flush periods. At most one
/// trailing newline is trimmed from the message.
pub(crate) fn format_record(buf: &mut Vec<u8>, header: &SyslogHeader, record: &BufferRecord) {
    let mut int_buf = itoa::Buffer::new();

    let priority = encode_priority(record.severity, header.facility);
    buf.push(b'<');
    buf.extend_from_slice(int_buf.format(priority).as_bytes());
    buf.push(b'>');
    let ts = record.ts.to_rfc3339_opts(SecondsFormat::Secs, true);
    buf.extend_from_slice(ts.as_bytes());
    buf.push(b' ');
    match &header.hostname {
        Some(hostname) => buf.extend_from_slice(hostname.as_bytes()),
        None => buf.push(b'-'),
    }
    buf.push(b' ');
    buf.extend_from_slice(header.tag.as_bytes());
    buf.push(b'[');
    buf.extend_from_slice(int_buf.format(header.pid).as_bytes());
    buf.extend_from_slice(b"]: ");
    let message = record
        .message
        .strip_suffix('\n')
        .unwrap_or(&record.message);
    buf.extend_from_slice(message.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use chrono::TimeZone;

    fn format(header: &SyslogHeader, severity: Severity, message: &str) -> String {
        let record = BufferRecord {
            ts: chrono::Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap(),
            severity,
            message: message.to_string(),
        };
        let mut buf = Vec::new();
        format_record(&mut buf, header, &record);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn full_line() {
        let header = SyslogHeader {
            facility: Facility::Daemon,
            hostname: Some("myhost".to_string()),
            tag: "app".to_string(),
            pid: 42,
        };
        assert_eq!(
            format(&header, Severity::Error, "something broke"),
            "<27>2025-01-15T08:30:00Z myhost app[42]: something broke"
        );
    }

    #[test]
    fn missing_hostname() {
        let header = SyslogHeader {
            facility: Facility::User,
            hostname: None,
            tag: "app".to_string(),
            pid: 1,
        };
        assert_eq!(
            format(&header, Severity::Info, "hi"),
            "<14>2025-01-15T08:30:00Z - app[1]: hi"
        );
    }

    #[test]
    fn trim_one_trailing_newline() {
        let header = SyslogHeader {
            facility: Facility::User,
            hostname: None,
            tag: "app".to_string(),
            pid: 1,
        };
        assert!(format(&header, Severity::Info, "hi\n").ends_with("]: hi"));
        assert!(format(&header, Severity::Info, "hi\n\n").ends_with("]: hi\n"));
    }
}
