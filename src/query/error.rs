use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Forwarded from an error token; holds the lexer's message.
    #[error("{0}")]
    Lexical(String),
    #[error("expected {expected}, but got: {found}")]
    Unexpected { expected: &'static str, found: String },
    #[error("invalid bridge request: {found}")]
    InvalidBridgeRequest { found: String },
    #[error("{columns} columns but {values} values")]
    ValueCount { columns: usize, values: usize },
}

impl ParseError {
    pub fn unexpected(expected: &'static str, found: impl ToString) -> Self {
        ParseError::Unexpected {
            expected,
            found: found.to_string(),
        }
    }
}
