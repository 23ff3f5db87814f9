use chrono::{DateTime, FixedOffset, Utc};
use regex::Captures;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not recognize log line format: {line:?}")]
    UnknownFormat { line: String },

    #[error("invalid {field} value {value:?}")]
    InvalidField {
        field: &'static str,
        value: String,
    },

    #[error("unknown timestamp format: {value:?}")]
    InvalidTimestamp { value: String },
}

/// One parsed access log line.
///
/// Built once from the capture groups of the matching grammar and never
/// mutated afterwards. `-` placeholders decode to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLogRecord {
    pub host: Option<String>,
    pub remote_addr: String,
    pub remote_user: Option<String>,
    pub time_local: DateTime<FixedOffset>,
    pub time_utc: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status: u16,
    pub body_bytes_sent: u64,
    pub referer: Option<String>,
    pub user_agent: String,
    pub request_time: Option<f64>,
    pub upstream_response_time: Option<f64>,
    pub pipelined: Option<bool>,
}

impl AccessLogRecord {
    pub(crate) fn from_captures(captures: &Captures<'_>) -> Result<Self, ParseError> {
        let get = |name: &str| captures.name(name).map(|m| m.as_str());

        let time_local = parse_time_local(required(get("time_local"), "time_local")?)?;

        Ok(Self {
            host: get("host").map(str::to_string),
            remote_addr: required(get("remote_addr"), "remote_addr")?.to_string(),
            remote_user: dash_to_none(get("remote_user")),
            time_local,
            time_utc: time_local.with_timezone(&Utc),
            method: required(get("method"), "method")?.to_string(),
            path: required(get("path"), "path")?.to_string(),
            protocol: required(get("protocol"), "protocol")?.to_string(),
            status: parse_int(get("status"), "status")?,
            body_bytes_sent: parse_int(get("body_bytes_sent"), "body_bytes_sent")?,
            referer: dash_to_none(get("referer")),
            user_agent: required(get("user_agent"), "user_agent")?.to_string(),
            request_time: parse_duration(get("request_time"), "request_time")?,
            upstream_response_time: parse_duration(
                get("upstream_response_time"),
                "upstream_response_time",
            )?,
            pipelined: match get("pipe_flag") {
                Some("p") => Some(true),
                Some(".") => Some(false),
                _ => None,
            },
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ParseError> {
    value.ok_or(ParseError::InvalidField {
        field,
        value: String::new(),
    })
}

fn dash_to_none(value: Option<&str>) -> Option<String> {
    match value {
        None | Some("-") => None,
        Some(s) => Some(s.to_string()),
    }
}

fn parse_int<T: std::str::FromStr>(
    value: Option<&str>,
    field: &'static str,
) -> Result<T, ParseError> {
    let s = required(value, field)?;
    s.parse().map_err(|_| ParseError::InvalidField {
        field,
        value: s.to_string(),
    })
}

/// Durations accept `.` or `,` as decimal separator; `-` means absent.
fn parse_duration(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<f64>, ParseError> {
    match value {
        None | Some("-") => Ok(None),
        Some(s) => s
            .replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ParseError::InvalidField {
                field,
                value: s.to_string(),
            }),
    }
}

/// Parses the `$time_local` grammar `DD/Mon/YYYY:HH:MM:SS ±HHMM`,
/// e.g. `04/Feb/2020:13:14:33 +0100`.
fn parse_time_local(value: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_str(value, "%d/%b/%Y:%H:%M:%S %z").map_err(|_| {
        ParseError::InvalidTimestamp {
            value: value.to_string(),
        }
    })
}
