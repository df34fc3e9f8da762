use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::{HexCoord, RuleKind};

/// Precondition violations raised by constructors and mutators.
///
/// A failed operation never commits anything, so every variant is recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("Grid dimensions must be positive, got rows={rows}, cols={cols}")]
    InvalidDimensions { rows: i32, cols: i32 },
    #[error("Coordinates {0} are outside the grid")]
    OutOfBounds(HexCoord),
    #[error("{0} rule needs at least one cell")]
    EmptyRule(RuleKind),
    #[error("{kind} rule expects {expected} mines but can hold at most {capacity}")]
    ExpectedOutOfRange {
        kind: RuleKind,
        expected: i32,
        capacity: usize,
    },
    #[error("Edge rule needs exactly one selected cell, got {0}")]
    EdgeSelection(usize),
    #[error("Current tool does not build rules")]
    NotARuleTool,
    #[error("Unknown tool {0:?}")]
    UnknownTool(String),
    #[error("Hex radius must be a positive finite number")]
    InvalidRadius,
}

pub type Result<T> = core::result::Result<T, LevelError>;

/// The cause of a rejected level file, without the position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unexpected end of file, expected {0}")]
    UnexpectedEof(&'static str),
    #[error("Expected {expected}, found {found:?}")]
    ExpectedKeyword {
        expected: &'static str,
        found: String,
    },
    #[error("Malformed {keyword} line {line:?}")]
    MalformedHeader { keyword: &'static str, line: String },
    #[error("Invalid number {token:?}: {source}")]
    BadInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Invalid coordinates {0:?}, expected q,r")]
    BadCoordinate(String),
    #[error("{keyword} count must not be negative, got {count}")]
    NegativeCount { keyword: &'static str, count: i32 },
    #[error("Unknown rule type {0:?}")]
    UnknownRule(String),
    #[error("Malformed {kind} rule {line:?}")]
    MalformedRule { kind: RuleKind, line: String },
    #[error("{kind} rule declares {declared} cells but lists {actual}")]
    CountMismatch {
        kind: RuleKind,
        declared: i32,
        actual: usize,
    },
    #[error("Unexpected content after the last rule: {0:?}")]
    TrailingContent(String),
    #[error(transparent)]
    Invalid(#[from] LevelError),
}

impl FormatError {
    /// Whether the line failed because a number did not parse, as opposed to a
    /// grammar or validation problem.
    pub const fn is_number_error(&self) -> bool {
        matches!(self, Self::BadInteger { .. })
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Could not access level file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Format error on line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },
}

impl CodecError {
    /// 1-based line of a format failure.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }

    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            Self::Format { source, .. } => Some(source),
            Self::Io { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
