//! Textual serialization of sections.
//!
//! ```text
//! Status: 200
//! Content-Type: text/markdown
//! Criticality: critical
//! Location: .context/rules/core.md
//! Writable: false
//! X-Stage: 1
//!
//! <content>
//! ```
//!
//! Multiple sections are joined by a line holding only U+001E (record
//! separator). Header values can never contain it (control characters are
//! rejected at build time). Content lines beginning with U+001E get one more
//! U+001E prepended on output and stripped on input, so any content survives
//! the round trip.

use super::{is_extra_header_name, Criticality, Section, SectionBuilder, SectionError, Status};

/// Delimiter character between sections in a multi-section blob.
pub const RECORD_SEPARATOR: char = '\u{1E}';

const DELIMITER: &str = "\n\u{1E}\n";
const HEADER_SEPARATOR: &str = "\n\n";

const STATUS: &str = "Status";
const CONTENT_TYPE: &str = "Content-Type";
const CRITICALITY: &str = "Criticality";
const LOCATION: &str = "Location";
const WRITABLE: &str = "Writable";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("section {index}: missing blank line between headers and content")]
    MissingSeparator { index: usize },
    #[error("section {index}: malformed header line '{line}'")]
    MalformedHeader { index: usize, line: String },
    #[error("section {index}: unknown header '{name}'")]
    UnknownHeader { index: usize, name: String },
    #[error("section {index}: missing required header '{name}'")]
    MissingHeader { index: usize, name: &'static str },
    #[error("section {index}: duplicate header '{name}'")]
    DuplicateHeader { index: usize, name: String },
    #[error("section {index}: first header must be Status, found '{found}'")]
    StatusNotFirst { index: usize, found: String },
    #[error("section {index}: invalid value '{value}' for header '{name}'")]
    InvalidValue {
        index: usize,
        name: &'static str,
        value: String,
    },
    #[error("section {index}: content line starts with an unescaped record separator")]
    UnescapedSeparator { index: usize },
    #[error("section {index}: {source}")]
    InvalidSection {
        index: usize,
        #[source]
        source: SectionError,
    },
}

/// Serialize one section.
pub fn format(section: &Section) -> String {
    let mut out = String::with_capacity(section.content().len() + 128);

    push_header(&mut out, STATUS, &section.status().to_string());
    push_header(&mut out, CONTENT_TYPE, section.content_type());
    push_header(&mut out, CRITICALITY, section.criticality().as_str());
    push_header(&mut out, LOCATION, section.location().as_str());
    push_header(&mut out, WRITABLE, if section.writable() { "true" } else { "false" });
    for (name, value) in section.extra_headers() {
        push_header(&mut out, name, value);
    }

    // Header lines each end in '\n'; one more gives the blank separator line.
    out.push('\n');
    out.push_str(&escape_content(section.content()));
    out
}

/// Serialize many sections into one blob. An empty slice yields `""`.
pub fn format_multi(sections: &[Section]) -> String {
    sections
        .iter()
        .map(format)
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Parse a blob produced by [`format_multi`] (or [`format`]).
///
/// Any malformed section fails the whole blob.
pub fn extract(blob: &str) -> Result<Vec<Section>, ParseError> {
    if blob.is_empty() {
        return Ok(Vec::new());
    }

    blob.split(DELIMITER)
        .enumerate()
        .map(|(index, raw)| parse_section(index, raw))
        .collect()
}

fn push_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn escape_content(content: &str) -> String {
    if !content.contains(RECORD_SEPARATOR) {
        return content.to_string();
    }

    content
        .split('\n')
        .map(|line| {
            if line.starts_with(RECORD_SEPARATOR) {
                format!("{RECORD_SEPARATOR}{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_content(index: usize, content: &str) -> Result<String, ParseError> {
    if !content.contains(RECORD_SEPARATOR) {
        return Ok(content.to_string());
    }

    let mut lines = Vec::new();
    for line in content.split('\n') {
        match line.strip_prefix(RECORD_SEPARATOR) {
            Some(rest) if rest.starts_with(RECORD_SEPARATOR) => lines.push(rest),
            Some(_) => return Err(ParseError::UnescapedSeparator { index }),
            None => lines.push(line),
        }
    }
    Ok(lines.join("\n"))
}

fn parse_section(index: usize, raw: &str) -> Result<Section, ParseError> {
    let (head, body) = raw
        .split_once(HEADER_SEPARATOR)
        .ok_or(ParseError::MissingSeparator { index })?;

    let mut status: Option<u16> = None;
    let mut content_type: Option<&str> = None;
    let mut criticality: Option<Criticality> = None;
    let mut location: Option<&str> = None;
    let mut writable: Option<bool> = None;
    let mut extra: Vec<(&str, &str)> = Vec::new();

    for (line_no, line) in head.split('\n').enumerate() {
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| ParseError::MalformedHeader {
                index,
                line: line.to_string(),
            })?;

        if line_no == 0 && name != STATUS {
            return Err(ParseError::StatusNotFirst {
                index,
                found: name.to_string(),
            });
        }

        let duplicate = || ParseError::DuplicateHeader {
            index,
            name: name.to_string(),
        };

        match name {
            STATUS => {
                let code = value.parse::<u16>().map_err(|_| ParseError::InvalidValue {
                    index,
                    name: STATUS,
                    value: value.to_string(),
                })?;
                if status.replace(code).is_some() {
                    return Err(duplicate());
                }
            }
            CONTENT_TYPE => {
                if content_type.replace(value).is_some() {
                    return Err(duplicate());
                }
            }
            CRITICALITY => {
                let parsed = Criticality::parse(value).ok_or_else(|| ParseError::InvalidValue {
                    index,
                    name: CRITICALITY,
                    value: value.to_string(),
                })?;
                if criticality.replace(parsed).is_some() {
                    return Err(duplicate());
                }
            }
            LOCATION => {
                if location.replace(value).is_some() {
                    return Err(duplicate());
                }
            }
            WRITABLE => {
                let parsed = match value {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(ParseError::InvalidValue {
                            index,
                            name: WRITABLE,
                            value: value.to_string(),
                        })
                    }
                };
                if writable.replace(parsed).is_some() {
                    return Err(duplicate());
                }
            }
            other if is_extra_header_name(other) => {
                if extra.iter().any(|(key, _)| *key == other) {
                    return Err(duplicate());
                }
                extra.push((other, value));
            }
            other => {
                return Err(ParseError::UnknownHeader {
                    index,
                    name: other.to_string(),
                })
            }
        }
    }

    let missing = |name| ParseError::MissingHeader { index, name };

    let status = status.ok_or_else(|| missing(STATUS))?;
    let status = Status::new(status).map_err(|source| ParseError::InvalidSection { index, source })?;

    let mut builder = SectionBuilder::new(location.ok_or_else(|| missing(LOCATION))?)
        .status(status)
        .content_type(content_type.ok_or_else(|| missing(CONTENT_TYPE))?)
        .criticality(criticality.ok_or_else(|| missing(CRITICALITY))?)
        .writable(writable.ok_or_else(|| missing(WRITABLE))?)
        .content(unescape_content(index, body)?);

    for (name, value) in extra {
        builder = builder.header(name, value);
    }

    builder
        .build()
        .map_err(|source| ParseError::InvalidSection { index, source })
}
