//! Error adapter for converting StrataError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Compile Errors
//!
//! The diagram engine reports compile failures as `path:line:column: message`
//! lines. When every line of a [`StrataError::Compile`] message has that shape
//! and names a file from the compiled file set, each line is rendered as its
//! own diagnostic with a source snippet.

use std::{fmt, sync::OnceLock};

use miette::{Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, SourceSpan};
use regex::Regex;

use strata::{StrataError, engine::EngineError, files::VirtualFileSet};

/// A compile message located in one of the compiled files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation<'a> {
    path: &'a str,
    line: usize,
    column: usize,
    message: &'a str,
}

impl<'a> SourceLocation<'a> {
    /// Parses a `path:line:column: message` line.
    pub fn parse(line: &'a str) -> Option<Self> {
        static LOCATION_RE: OnceLock<Regex> = OnceLock::new();
        let re = LOCATION_RE.get_or_init(|| {
            Regex::new(r"^(?P<path>[^:\n]+):(?P<line>\d+):(?P<column>\d+):\s*(?P<message>.*)$")
                .expect("valid regex")
        });

        let caps = re.captures(line.trim())?;
        Some(Self {
            path: caps.name("path")?.as_str(),
            line: caps.name("line")?.as_str().parse().ok()?,
            column: caps.name("column")?.as_str().parse().ok()?,
            message: caps.name("message")?.as_str(),
        })
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn message(&self) -> &'a str {
        self.message
    }

    /// Byte span from the location to the end of its line in `src`.
    ///
    /// Lines and columns are 1-based; out-of-range values are clamped.
    pub fn span_in(&self, src: &str) -> SourceSpan {
        let mut offset = 0;
        let mut rest = src;
        for current in src.split_inclusive('\n').take(self.line.saturating_sub(1)) {
            offset += current.len();
            rest = &src[offset..];
        }

        let line = rest.split('\n').next().unwrap_or_default();
        let column = line
            .char_indices()
            .nth(self.column.saturating_sub(1))
            .map_or(line.len(), |(index, _)| index);
        let len = line.trim_end().len().saturating_sub(column);

        SourceSpan::new((offset + column).into(), len)
    }
}

/// Adapter for a single located compile message.
pub struct DiagnosticAdapter<'a> {
    /// The parsed location and message
    location: SourceLocation<'a>,
    /// Source code of the file the message points into
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(location: SourceLocation<'a>, src: &'a str) -> Self {
        Self { location, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("location", &self.location)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("strata::compile"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.location.span_in(self.src);
        let label = LabeledSpan::new_primary_with_span(
            Some(format!(
                "{}:{}:{}",
                self.location.path, self.location.line, self.location.column
            )),
            span,
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`StrataError`] values without source locations.
pub struct ErrorAdapter<'a>(pub &'a StrataError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StrataError::Io(_) => "strata::io",
            StrataError::Read { .. } => "strata::read",
            StrataError::Config(_) => "strata::config",
            StrataError::Compile { .. } => "strata::compile",
            StrataError::Render { .. } => "strata::render",
            StrataError::Serialize(_) => "strata::serialize",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            StrataError::Compile {
                err: EngineError::Spawn { command, .. },
                ..
            }
            | StrataError::Render {
                err: EngineError::Spawn { command, .. },
                ..
            } => Some(Box::new(format!(
                "install `{command}` or set `[engine] command` in the configuration file"
            ))),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A compile message with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Locates every line of an engine message in the compiled files.
///
/// Returns `None` unless all non-empty lines can be located.
fn locate_all<'a>(message: &'a str, files: &'a VirtualFileSet) -> Option<Vec<Reportable<'a>>> {
    let reportables = message
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let location = SourceLocation::parse(line)?;
            let src = files.get(location.path())?;
            Some(Reportable::Diagnostic(DiagnosticAdapter::new(location, src)))
        })
        .collect::<Option<Vec<_>>>()?;

    (!reportables.is_empty()).then_some(reportables)
}

/// Convert a [`StrataError`] into a list of reportable errors.
///
/// Compile failures whose message can be located in the source yield one
/// [`Reportable`] per message line. Every other error yields a single
/// [`Reportable`].
pub fn to_reportables(err: &StrataError) -> Vec<Reportable<'_>> {
    if let StrataError::Compile {
        err: EngineError::Failed(message),
        files,
    } = err
    {
        if let Some(reportables) = locate_all(message, files) {
            return reportables;
        }
    }
    vec![Reportable::Error(ErrorAdapter(err))]
}

/// Renders every reportable of `err` with `handler`, one report per entry.
pub fn render_reports(err: &StrataError, handler: &GraphicalReportHandler) -> String {
    let mut out = String::new();
    for reportable in to_reportables(err) {
        handler
            .render_report(&mut out, &reportable)
            .expect("Writing to String buffer is infallible");
    }
    out
}
