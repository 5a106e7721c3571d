//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages, and the [`Error`] type that pairs an error kind with the source regions it came
//! from.

extern crate self as numex_error;

use ariadne::{Color, Report, Source};
use std::{any::Any, fmt::{self, Debug, Display}, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur while parsing, compiling, wrapping, or calling
/// an expression.
///
/// Implement this with `#[derive(ErrorKind)]` from the `numex-attrs` crate.
pub trait ErrorKind: Debug + Send + Sync + 'static {
    /// The one-line message describing the error.
    fn message(&self) -> String;

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;

    /// Returns `self` as [`Any`], used to downcast to the concrete error kind.
    fn as_any(&self) -> &dyn Any;
}

/// An error associated with regions of source text that can be highlighted.
///
/// The spans index into the text the error was raised against: the input string for parse
/// errors, and the FullForm rendering of the compiled expression for everything else.
#[derive(Debug)]
pub struct Error {
    /// The regions of the source text that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// The one-line message of the error kind.
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Renders the full report against the given source text. The output carries ANSI color codes.
    pub fn render(&self, src_id: &str, source: &str) -> String {
        let mut buf = Vec::new();
        let _ = self.build_report(src_id)
            .write((src_id, Source::from(source)), &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Returns the error kind if it is of type `K`.
    pub fn downcast_ref<K: ErrorKind>(&self) -> Option<&K> {
        self.kind.as_any().downcast_ref::<K>()
    }

    /// Returns true if the error kind is of type `K`.
    pub fn is<K: ErrorKind>(&self) -> bool {
        self.downcast_ref::<K>().is_some()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.message())
    }
}

impl std::error::Error for Error {}
