mod bridge;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod request;
pub mod token;

pub use error::{ParseError, Result};
pub use lexer::{Lexer, scan};
pub use parser::{Parser, parse};
pub use request::{ColumnValue, MysqlRequest, Request, RequestKind};
pub use token::{Token, TokenConsumer, TokenKind};
