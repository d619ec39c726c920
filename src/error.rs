use std::fmt;

/// A position in the input or output stream.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Mark {
    /// The position index, in bytes.
    pub index: u64,
    /// The zero-based line.
    pub line: u64,
    /// The zero-based column.
    pub column: u64,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Failure while pulling and decoding input bytes.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("{problem} at byte {offset}")]
    Problem {
        problem: &'static str,
        offset: usize,
        value: i32,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure while tokenizing the decoded input.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("{}: {} {} ({})", problem_mark, problem, context, context_mark)]
    Problem {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// A token sequence that violates the YAML grammar.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("unexpected end of token stream")]
    UnexpectedEof,
    #[error("{}: {}", mark, problem)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}: {} {} ({})", mark, problem, context, context_mark)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

/// Failure while folding events into a document.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("{}: {}", mark, problem)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}: {} {} ({})", mark, problem, context, context_mark)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Failure while handing encoded bytes to the output sink.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An event sequence that cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    #[error("{0}")]
    Problem(&'static str),
    #[error(transparent)]
    Writer(#[from] WriterError),
}
