mod window_tests;

use crate::parser::AccessLogRecord;
use chrono::{FixedOffset, TimeZone, Utc};

pub(crate) fn record(status: u16, path: &str) -> AccessLogRecord {
    record_with_host(None, status, path)
}

pub(crate) fn record_with_host(host: Option<&str>, status: u16, path: &str) -> AccessLogRecord {
    let offset = FixedOffset::east_opt(0).unwrap();
    let time_local = offset.with_ymd_and_hms(2020, 2, 4, 11, 2, 10).unwrap();

    AccessLogRecord {
        host: host.map(str::to_string),
        remote_addr: "84.22.97.60".to_string(),
        remote_user: None,
        time_local,
        time_utc: Utc.with_ymd_and_hms(2020, 2, 4, 11, 2, 10).unwrap(),
        method: "GET".to_string(),
        path: path.to_string(),
        protocol: "HTTP/1.1".to_string(),
        status,
        body_bytes_sent: 396,
        referer: None,
        user_agent: "Mozilla/5.0 zgrab/0.x".to_string(),
        request_time: None,
        upstream_response_time: None,
        pipelined: None,
    }
}
