//! Error types for document parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Json {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("node {id} has unknown type `{kind}`")]
    UnknownNodeKind { id: String, kind: String },

    #[error("unknown paint type `{kind}`")]
    UnknownPaintKind { kind: String },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

impl ParseError {
    /// Locate the error in `source`, if it can be pinned to a range
    pub fn span(&self, source: &str) -> Option<Span> {
        match self {
            ParseError::Json { line, column, .. } => {
                let start = line_column_offset(source, *line, *column)?;
                let end = (start + 1).min(source.len());
                Some(start..end)
            }
            ParseError::UnknownNodeKind { kind, .. } | ParseError::UnknownPaintKind { kind } => {
                let needle = format!("\"{}\"", kind);
                source
                    .find(&needle)
                    .map(|start| start..start + needle.len())
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span(source).unwrap_or(0..0);
        let label = match self {
            ParseError::Json { .. } => "malformed input here".to_string(),
            ParseError::UnknownNodeKind { kind, .. } => format!("`{}` is not a node type", kind),
            ParseError::UnknownPaintKind { kind } => format!("`{}` is not a paint type", kind),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| self.to_string()),
            Err(_) => self.to_string(),
        }
    }

    /// Print the formatted diagnostic to stderr
    pub fn report(&self, source: &str, filename: &str) {
        eprintln!("{}", self.format(source, filename));
    }
}

/// Byte offset of a 1-based line and column, as reported by serde_json
fn line_column_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let offset = line_start + column.saturating_sub(1);
    (offset <= source.len()).then_some(offset)
}
