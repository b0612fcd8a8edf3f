//! Section envelope: one self-describing unit of resource content.
//!
//! A [`Section`] pairs raw content with the metadata a client needs to decide
//! how to treat it: its importance ([`Criticality`]), where it lives in the
//! project ([`Location`]), whether the client may edit it, and a status code.
//! Sections are validated once, at build time, and are immutable afterwards.

pub mod format;

use std::fmt;
use std::num::NonZeroU16;
use std::path::{Path, PathBuf};

pub use format::{extract, format, format_multi, ParseError, RECORD_SEPARATOR};

/// Importance tag for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criticality {
    /// Must be delivered in full wherever it appears.
    Critical,
    /// May be dropped by a caller working under a size budget.
    Informational,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Informational => "informational",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "critical" => Some(Self::Critical),
            "informational" => Some(Self::Informational),
            _ => None,
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section status code. Never zero.
///
/// Bands:
/// - `2xx` normal content, with [`Status::DIAGNOSTIC`] reserved for
///   compliance-issue-bearing bodies
/// - `4xx` project setup is needed before content can be served
/// - `5xx` a provider or stage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(NonZeroU16);

impl Status {
    pub const OK: Status = Status::from_const(200);
    pub const DIAGNOSTIC: Status = Status::from_const(207);
    pub const SETUP_REQUIRED: Status = Status::from_const(428);
    pub const PROVIDER_ERROR: Status = Status::from_const(500);
    pub const TIMEOUT: Status = Status::from_const(504);

    const fn from_const(code: u16) -> Self {
        match NonZeroU16::new(code) {
            Some(n) => Status(n),
            None => panic!("status code must be non-zero"),
        }
    }

    pub fn new(code: u16) -> Result<Self, SectionError> {
        NonZeroU16::new(code)
            .map(Status)
            .ok_or(SectionError::ZeroStatus)
    }

    pub fn code(&self) -> u16 {
        self.0.get()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code())
    }

    pub fn is_diagnostic(&self) -> bool {
        *self == Self::DIAGNOSTIC
    }

    pub fn is_error(&self) -> bool {
        (500..600).contains(&self.code())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Symbolic, project-relative location of a section's content.
///
/// Absolute paths are rejected so a section never bakes in the machine it
/// was produced on; call [`Location::resolve`] with an explicit root when
/// the on-disk path is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new(value: impl Into<String>) -> Result<Self, SectionError> {
        let value = value.into();

        if value.is_empty() {
            return Err(SectionError::InvalidLocation {
                location: value,
                reason: "empty",
            });
        }
        if value.starts_with('/') || value.starts_with('\\') || has_drive_prefix(&value) {
            return Err(SectionError::InvalidLocation {
                location: value,
                reason: "absolute paths are not allowed",
            });
        }
        if value.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(SectionError::InvalidLocation {
                location: value,
                reason: "parent segments are not allowed",
            });
        }
        if value.chars().any(char::is_control) {
            return Err(SectionError::InvalidLocation {
                location: value,
                reason: "control characters are not allowed",
            });
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join this location onto `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_drive_prefix(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SectionError {
    #[error("status code must be non-zero")]
    ZeroStatus,
    #[error("content type must not be empty")]
    EmptyContentType,
    #[error("invalid location '{location}': {reason}")]
    InvalidLocation {
        location: String,
        reason: &'static str,
    },
    #[error("invalid header name '{0}': extra headers must match X-[A-Za-z0-9-]+")]
    InvalidHeaderName(String),
    #[error("header '{name}' has a value containing control characters")]
    InvalidHeaderValue { name: String },
}

/// One unit of returned content plus its metadata envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    content: String,
    content_type: String,
    criticality: Criticality,
    location: Location,
    writable: bool,
    status: Status,
    extra_headers: Vec<(String, String)>,
}

impl Section {
    pub fn builder(location: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(location)
    }

    /// Shorthand for a read-only markdown section with status `OK`.
    pub fn markdown(
        location: impl Into<String>,
        criticality: Criticality,
        content: impl Into<String>,
    ) -> Result<Self, SectionError> {
        Self::builder(location)
            .criticality(criticality)
            .content(content)
            .build()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.extra_headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether a size-constrained caller may leave this section out.
    pub fn may_omit(&self) -> bool {
        self.criticality == Criticality::Informational
    }
}

/// Validating builder for [`Section`].
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    content: String,
    content_type: String,
    criticality: Criticality,
    location: String,
    writable: bool,
    status: u16,
    extra_headers: Vec<(String, String)>,
}

impl SectionBuilder {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            content_type: "text/markdown".into(),
            criticality: Criticality::Informational,
            location: location.into(),
            writable: false,
            status: Status::OK.code(),
            extra_headers: Vec::new(),
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status.code();
        self
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    /// Append an extra header, replacing the value in place if the name
    /// was already added.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.extra_headers.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.extra_headers.push((name, value)),
        }
        self
    }

    pub fn build(self) -> Result<Section, SectionError> {
        let status = Status::new(self.status)?;

        if self.content_type.is_empty() {
            return Err(SectionError::EmptyContentType);
        }
        check_value("Content-Type", &self.content_type)?;

        let location = Location::new(self.location)?;

        for (name, value) in &self.extra_headers {
            if !is_extra_header_name(name) {
                return Err(SectionError::InvalidHeaderName(name.clone()));
            }
            check_value(name, value)?;
        }

        Ok(Section {
            content: self.content,
            content_type: self.content_type,
            criticality: self.criticality,
            location,
            writable: self.writable,
            status,
            extra_headers: self.extra_headers,
        })
    }
}

fn check_value(name: &str, value: &str) -> Result<(), SectionError> {
    if value.chars().any(char::is_control) {
        return Err(SectionError::InvalidHeaderValue {
            name: name.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn is_extra_header_name(name: &str) -> bool {
    match name.strip_prefix("X-") {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
        None => false,
    }
}
