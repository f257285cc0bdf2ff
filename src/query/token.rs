use serde::Serialize;
use std::borrow::Cow;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Error, // 오류, 값은 메시지
    Eof,   // 마지막 토큰
    // 관리 명령어
    Help,   // help
    Status, // status
    Stop,   // stop
    Start,  // start
    // 키워드
    Create,      // create
    Table,       // table
    Insert,      // insert -> into
    Into,        // into -> table
    Values,      // values -> (
    Update,      // update -> table
    Set,         // set -> column
    Delete,      // delete -> from
    From,        // from -> table
    Select,      // select -> *
    Subscribe,   // subscribe -> *
    Unsubscribe, // unsubscribe -> from
    Where,       // where -> column
    // mysql 브릿지
    Mysql,      // mysql
    Connect,    // connect -> address
    Disconnect, // disconnect
    // 구분자
    Star,       // *
    Equal,      // =
    LParen,     // (
    RParen,     // )
    Comma,      // ,
    AnsiQuote,  // '
    WhiteSpace, // \n \r \t space
    // 리터럴
    Ident,  // starts with a letter, then letters or digits
    Value,  // run of chars up to whitespace ' , ( )
    String, // '...' with '' for a quote
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Error => "error",
            TokenKind::Eof => "EOF",
            TokenKind::Help => "help",
            TokenKind::Status => "status",
            TokenKind::Stop => "stop",
            TokenKind::Start => "start",
            TokenKind::Create => "create",
            TokenKind::Table => "table",
            TokenKind::Insert => "insert",
            TokenKind::Into => "into",
            TokenKind::Values => "values",
            TokenKind::Update => "update",
            TokenKind::Set => "set",
            TokenKind::Delete => "delete",
            TokenKind::From => "from",
            TokenKind::Select => "select",
            TokenKind::Subscribe => "subscribe",
            TokenKind::Unsubscribe => "unsubscribe",
            TokenKind::Where => "where",
            TokenKind::Mysql => "mysql",
            TokenKind::Connect => "connect",
            TokenKind::Disconnect => "disconnect",
            TokenKind::Star => "*",
            TokenKind::Equal => "=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::AnsiQuote => "'",
            TokenKind::WhiteSpace => "white space",
            TokenKind::Ident => "identifier",
            TokenKind::Value => "value",
            TokenKind::String => "string",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lexical unit. For everything but [`TokenKind::Error`] the value borrows
/// the exact slice of the scanned input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub value: Cow<'a, str>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, value: &'a str) -> Self {
        Self {
            kind,
            value: Cow::Borrowed(value),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            kind: TokenKind::Error,
            value: Cow::Owned(message),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            return f.write_str("EOF");
        }
        f.write_str(&self.value)
    }
}

/// Receives tokens pushed by [`crate::query::lexer::scan`].
pub trait TokenConsumer<'a> {
    fn consume(&mut self, token: Token<'a>);
}

impl<'a> TokenConsumer<'a> for Vec<Token<'a>> {
    fn consume(&mut self, token: Token<'a>) {
        self.push(token);
    }
}
