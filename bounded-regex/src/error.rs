use std::fmt::{self, Display, Formatter};

/// The reason a match call ended with a fatal error.
///
/// A plain no-match is not an error; the matching methods report it as
/// `Ok(None)` or `Ok(false)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed pattern: bad escape, unmatched bracket or paren, bad range
    /// order, stray quantifier.
    Syntax,
    /// Malformed `{}` expression, or `min > max`.
    Quantifier,
    /// More capturing groups matched than there are capture slots.
    TooManyCaptures,
    /// Groups nested beyond the fixed recursion limit.
    TooDeep,
    /// More live alternative branches than there are branch slots.
    TooManyAlternatives,
    /// More quantifier choice points than there are backtrack slots.
    TooManyBacktracks,
    /// The per-anchor iteration watchdog tripped.
    TooManyIterations,
}

/// A fatal matching error together with the pattern byte offset where it
/// was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Error {
        Error { kind, offset }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the pattern where the error was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Quantifier => "malformed quantifier",
            ErrorKind::TooManyCaptures => "too many capturing groups",
            ErrorKind::TooDeep => "groups nested too deeply",
            ErrorKind::TooManyAlternatives => "too many alternative branches",
            ErrorKind::TooManyBacktracks => "too many backtrack points",
            ErrorKind::TooManyIterations => "iteration limit exceeded",
        };
        f.write_str(message)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at pattern offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for Error {}
