use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Classifies why a document could not be tokenized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The underlying reader failed
    Io,

    /// Generic syntax error
    Syntax,

    /// The document is not valid UTF-8
    InvalidEncoding,

    /// A closing tag does not match the element that is open
    TagMismatch,

    /// Malformed or duplicate attribute
    InvalidAttribute,

    /// Unknown entity or invalid character reference
    InvalidReference,

    /// The input ended in the middle of a tag, comment or similar construct
    UnclosedToken,

    /// The input ended while elements were still open
    UnclosedElement,

    /// The input does not contain a document element
    NoElements,

    /// Elements or text after the document element
    JunkAfterDocumentElement,
}

impl ErrorCode {
    /// Returns a short, fixed description of the error class
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::Io => "I/O error",
            ErrorCode::Syntax => "syntax error",
            ErrorCode::InvalidEncoding => "invalid encoding",
            ErrorCode::TagMismatch => "mismatched tag",
            ErrorCode::InvalidAttribute => "invalid attribute",
            ErrorCode::InvalidReference => "undefined entity or invalid character reference",
            ErrorCode::UnclosedToken => "unclosed token",
            ErrorCode::UnclosedElement => "unclosed element",
            ErrorCode::NoElements => "no element found",
            ErrorCode::JunkAfterDocumentElement => "junk after document element",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<&quick_xml::Error> for ErrorCode {
    fn from(err: &quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(_) => ErrorCode::Io,
            quick_xml::Error::NonDecodable(_) => ErrorCode::InvalidEncoding,
            quick_xml::Error::UnexpectedEof(_) => ErrorCode::UnclosedToken,
            quick_xml::Error::EndEventMismatch { .. } => ErrorCode::TagMismatch,
            quick_xml::Error::InvalidAttr(_) => ErrorCode::InvalidAttribute,
            quick_xml::Error::EscapeError(_) => ErrorCode::InvalidReference,
            _ => ErrorCode::Syntax,
        }
    }
}

/// A document could not be tokenized. Parsing stops at the first error of
/// this kind; there is no recovery.
#[derive(Error, Debug)]
#[error("{code} on line {line}: {message}")]
pub struct TokenizationError {
    message: String,
    code: ErrorCode,
    line: u64,
    #[source]
    source: Option<quick_xml::Error>,
}

impl TokenizationError {
    /// Creates an error that has been detected without the help of the
    /// tokenizer
    pub fn new(code: ErrorCode, message: impl Into<String>, line: u64) -> Self {
        Self {
            message: message.into(),
            code,
            line,
            source: None,
        }
    }

    /// Wraps an error reported by the tokenizer
    pub fn from_xml(err: quick_xml::Error, line: u64) -> Self {
        Self {
            message: err.to_string(),
            code: ErrorCode::from(&err),
            line,
            source: Some(err),
        }
    }

    /// Returns a human-readable description of the problem
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the class of the problem
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the 1-based line on which the problem was detected
    pub fn line(&self) -> u64 {
        self.line
    }
}
