use std::str::Utf8Error;

use thiserror::Error;
use util::ArcStr;

/// Result of the public, message-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of the grammar-level operations.
pub type ParseResult<T> = std::result::Result<T, GrammarFault>;

/// A URI, parameter or header value that does not match its grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GrammarFault {
    /// Message in error
    message: String,
}

impl GrammarFault {
    /// Creates a new fault with the given message.
    pub fn new<T>(s: T) -> Self
    where
        T: AsRef<str>,
    {
        Self {
            message: s.as_ref().to_string(),
        }
    }

    /// Returns the fault message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for GrammarFault {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GrammarFault {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<util::Error> for GrammarFault {
    fn from(err: util::Error) -> Self {
        GrammarFault {
            message: format!("Failed to parse at line:{} column:{} kind:{}", err.line, err.col, err.kind),
        }
    }
}

impl From<Utf8Error> for GrammarFault {
    fn from(value: Utf8Error) -> Self {
        GrammarFault {
            message: format!("{value}"),
        }
    }
}

/// One header whose value failed its grammar.
///
/// Never fatal: the message keeps being framed and the fault is carried on
/// the completed message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid '{name}' header: {fault}")]
pub struct HeaderFault {
    /// The header name as it appeared on the wire.
    pub name: ArcStr,
    /// The unfolded header value.
    pub value: ArcStr,
    /// Why the value was rejected.
    #[source]
    pub fault: GrammarFault,
}

/// A fault that makes the current message unusable.
///
/// The assembler discards the message and resumes at the next start-line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingFault {
    #[error("Invalid start-line: {0}")]
    StartLine(GrammarFault),

    #[error("Invalid Content-Length: {0}")]
    ContentLength(GrammarFault),

    #[error("Header section not terminated by an empty line")]
    UnterminatedHeaders,

    #[error("Body truncated: expected {expected} bytes, got {received}")]
    TruncatedBody { expected: usize, received: usize },

    #[error("Line longer than {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Content-Length {length} exceeds the limit of {limit} bytes")]
    BodyTooLarge { length: usize, limit: usize },
}

/// A framing fault returned by [`FrameAssembler::feed`].
///
/// `consumed` bytes of the input were used up, faulty bytes included, and
/// must not be fed again.
///
/// [`FrameAssembler::feed`]: crate::assembler::FrameAssembler::feed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fault} ({consumed} bytes consumed)")]
pub struct FeedError {
    /// Bytes of the input consumed before the fault was returned.
    pub consumed: usize,
    /// The fault.
    #[source]
    pub fault: FramingFault,
}

impl From<FeedError> for Error {
    fn from(err: FeedError) -> Self {
        Error::Framing(err.fault)
    }
}

/// Any fault produced while decoding SIP messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Framing(#[from] FramingFault),

    #[error(transparent)]
    Header(#[from] HeaderFault),

    #[error(transparent)]
    Grammar(#[from] GrammarFault),

    #[error("No message found in input")]
    Incomplete,
}

impl From<util::Error> for Error {
    fn from(err: util::Error) -> Self {
        Self::Grammar(err.into())
    }
}
