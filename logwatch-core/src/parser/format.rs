use regex::Regex;
use thiserror::Error;

use crate::parser::record::{AccessLogRecord, ParseError};

/// The nginx `log_format` layouts the agent understands, most specific
/// first. Matching tries them in order and the first hit wins, so a layout
/// with more leading fields must come before a more general one.
const LOG_FORMATS: &[&str] = &[
    // host-prefixed format with request/upstream timing and the pipe flag
    r#"$host $remote_addr - $remote_user [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent" $request_time $upstream_response_time $pipe"#,
    // log_format compression from the official nginx documentation
    r#"$remote_addr - $remote_user [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent" "$gzip_ratio""#,
    // the default predefined combined access log format
    r#"$remote_addr - $remote_user [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent""#,
];

/// Maps one `log_format` token to its pattern fragment. Quoted and
/// bracketed variables are single tokens so the surrounding literals stay
/// tied to the capture they delimit.
const TOKEN_PATTERNS: &[(&str, &str)] = &[
    (" ", " "),
    ("-", "-"),
    (
        "$remote_addr",
        r"(?P<remote_addr>[012]?[0-9]?[0-9]\.[012]?[0-9]?[0-9]\.[012]?[0-9]?[0-9]\.[012]?[0-9]?[0-9])",
    ),
    ("$remote_user", r"(?P<remote_user>[^ ]+)"),
    ("[$time_local]", r"\[(?P<time_local>[^\]]+)\]"),
    (
        "\"$request\"",
        r#""(?P<method>[A-Z]+) (?P<path>/[^ "]*) (?P<protocol>HTTP/[0-9.]+)""#,
    ),
    ("$status", r"(?P<status>[0-9]{3})"),
    ("$body_bytes_sent", r"(?P<body_bytes_sent>[0-9]+)"),
    ("\"$http_referer\"", r#""(?P<referer>[^"]+)""#),
    ("\"$http_user_agent\"", r#""(?P<user_agent>[^"]+)""#),
    ("\"$gzip_ratio\"", r#""(?P<gzip_ratio>[0-9]+[,.][0-9]+|-)""#),
    ("$request_time", r"(?P<request_time>[0-9]+[,.][0-9]+|-)"),
    (
        "$upstream_response_time",
        r"(?P<upstream_response_time>[0-9]+[,.][0-9]+|-)",
    ),
    ("$pipe", r"(?P<pipe_flag>[.p])"),
    ("$host", r"(?P<host>[^ ]+)"),
];

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("cannot convert log format fragment to a pattern: {fragment:?}")]
    UnknownToken { fragment: String },

    #[error("failed to compile log format pattern {pattern:?}: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Ordered list of compiled log line grammars.
///
/// Built once at startup; an unknown token or an uncompilable pattern is a
/// configuration error and never surfaces during line parsing.
pub struct LineFormatRegistry {
    formats: Vec<Regex>,
}

impl LineFormatRegistry {
    /// Compiles the built-in nginx format list.
    pub fn builtin() -> Result<Self, FormatError> {
        Self::from_formats(LOG_FORMATS)
    }

    fn from_formats(formats: &[&str]) -> Result<Self, FormatError> {
        let compiled = formats
            .iter()
            .map(|f| compile_format(f))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { formats: compiled })
    }

    /// Parses one access log line; the first matching grammar wins.
    pub fn parse(&self, line: &str) -> Result<AccessLogRecord, ParseError> {
        for regex in &self.formats {
            if let Some(captures) = regex.captures(line) {
                return AccessLogRecord::from_captures(&captures);
            }
        }
        Err(ParseError::UnknownFormat {
            line: line.to_string(),
        })
    }
}

fn compile_format(format: &str) -> Result<Regex, FormatError> {
    let pattern = format_to_pattern(format)?;
    Regex::new(&pattern).map_err(|e| FormatError::Compile {
        pattern,
        source: e,
    })
}

/// Translates a `log_format` string into an anchored regex source by
/// consuming the longest known token at every position.
pub(crate) fn format_to_pattern(format: &str) -> Result<String, FormatError> {
    let mut remaining = format;
    let mut pattern = String::from("^");

    while !remaining.is_empty() {
        let Some((token, fragment)) = longest_token(remaining) else {
            return Err(FormatError::UnknownToken {
                fragment: head(remaining, 24),
            });
        };
        pattern.push_str(fragment);
        remaining = &remaining[token.len()..];
    }

    pattern.push('$');
    Ok(pattern)
}

fn longest_token(remaining: &str) -> Option<(&'static str, &'static str)> {
    TOKEN_PATTERNS
        .iter()
        .filter(|(token, _)| remaining.starts_with(token))
        .max_by_key(|(token, _)| token.len())
        .copied()
}

fn head(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
