use crate::query::error::{ParseError, Result};
use crate::query::lexer::Lexer;
use crate::query::request::{ColumnValue, Request};
use crate::query::token::{Token, TokenKind};
use std::iter::Peekable;
use tracing::debug;

/// Lexes and parses one command.
pub fn parse(input: &str) -> Result<Request> {
    let result = Parser::new(Lexer::new(input)).parse();
    match &result {
        Ok(request) => debug!(kind = %request.kind(), "parsed request"),
        Err(err) => debug!(input, %err, "parse failed"),
    }
    result
}

/// Pulls tokens one at a time and builds a [`Request`]. Every production ends
/// with [`Parser::expect_end`], so trailing input is always rejected.
pub struct Parser<I: Iterator> {
    tokens: Peekable<I>,
}

impl<'a, I: Iterator<Item = Token<'a>>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Parser {
            tokens: tokens.peekable(),
        }
    }

    pub fn parse(mut self) -> Result<Request> {
        let token = self.produce()?;
        match token.kind {
            TokenKind::Help => self.expect_end(Request::Help),
            TokenKind::Status => self.expect_end(Request::Status),
            TokenKind::Stop => self.expect_end(Request::Stop),
            TokenKind::Start => self.expect_end(Request::Start),
            TokenKind::Select => self.parse_select(),
            TokenKind::Subscribe => self.parse_subscribe(),
            TokenKind::Unsubscribe => self.parse_unsubscribe(),
            TokenKind::Insert => self.parse_insert(),
            TokenKind::Update => self.parse_update(),
            TokenKind::Delete => self.parse_delete(),
            TokenKind::Mysql => self.parse_mysql(),
            _ => Err(ParseError::unexpected("command", token)),
        }
    }

    /// Next token; an error token becomes [`ParseError::Lexical`] and an
    /// exhausted source reads as EOF.
    pub(crate) fn produce(&mut self) -> Result<Token<'a>> {
        let token = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, ""));
        if token.kind == TokenKind::Error {
            return Err(ParseError::Lexical(token.value.into_owned()));
        }
        Ok(token)
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.tokens.peek().map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &'static str) -> Result<Token<'a>> {
        let token = self.produce()?;
        if token.kind != kind {
            return Err(ParseError::unexpected(what, token));
        }
        Ok(token)
    }

    pub(crate) fn expect_end(&mut self, request: Request) -> Result<Request> {
        self.expect(TokenKind::Eof, "end of input")?;
        Ok(request)
    }

    fn parse_table(&mut self) -> Result<String> {
        Ok(self.expect(TokenKind::Ident, "table name")?.value.into_owned())
    }

    fn parse_column(&mut self) -> Result<String> {
        Ok(self.expect(TokenKind::Ident, "column name")?.value.into_owned())
    }

    fn parse_value(&mut self) -> Result<String> {
        let token = self.produce()?;
        match token.kind {
            TokenKind::Value => Ok(token.value.into_owned()),
            TokenKind::String => Ok(unquote(&token.value)),
            _ => Err(ParseError::unexpected("value", token)),
        }
    }

    fn parse_column_value(&mut self) -> Result<ColumnValue> {
        let column = self.parse_column()?;
        self.expect(TokenKind::Equal, "=")?;
        let value = self.parse_value()?;
        Ok(ColumnValue { column, value })
    }

    fn parse_filter(&mut self) -> Result<Option<ColumnValue>> {
        if self.peek_kind() != TokenKind::Where {
            return Ok(None);
        }
        self.produce()?;
        self.parse_column_value().map(Some)
    }

    /// `item {, item} )`, the opening parenthesis already consumed.
    fn parse_list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut items = vec![item(self)?];
        loop {
            let token = self.produce()?;
            match token.kind {
                TokenKind::Comma => items.push(item(self)?),
                TokenKind::RParen => return Ok(items),
                _ => return Err(ParseError::unexpected(", or )", token)),
            }
        }
    }

    // * from <table> [where <column> = <value>]
    fn parse_star_from(&mut self) -> Result<(String, Option<ColumnValue>)> {
        self.expect(TokenKind::Star, "*")?;
        self.expect(TokenKind::From, "from")?;
        let table = self.parse_table()?;
        let filter = self.parse_filter()?;
        Ok((table, filter))
    }

    fn parse_select(&mut self) -> Result<Request> {
        let (table, filter) = self.parse_star_from()?;
        self.expect_end(Request::Select { table, filter })
    }

    fn parse_subscribe(&mut self) -> Result<Request> {
        let (table, filter) = self.parse_star_from()?;
        self.expect_end(Request::Subscribe { table, filter })
    }

    fn parse_unsubscribe(&mut self) -> Result<Request> {
        self.expect(TokenKind::From, "from")?;
        let table = self.parse_table()?;
        self.expect_end(Request::Unsubscribe { table })
    }

    fn parse_insert(&mut self) -> Result<Request> {
        self.expect(TokenKind::Into, "into")?;
        let table = self.parse_table()?;
        self.expect(TokenKind::LParen, "(")?;
        let columns = self.parse_list(Self::parse_column)?;
        self.expect(TokenKind::Values, "values")?;
        self.expect(TokenKind::LParen, "(")?;
        let values = self.parse_list(Self::parse_value)?;
        if columns.len() != values.len() {
            return Err(ParseError::ValueCount {
                columns: columns.len(),
                values: values.len(),
            });
        }
        let values = columns
            .into_iter()
            .zip(values)
            .map(|(column, value)| ColumnValue { column, value })
            .collect();
        self.expect_end(Request::Insert { table, values })
    }

    fn parse_update(&mut self) -> Result<Request> {
        let table = self.parse_table()?;
        self.expect(TokenKind::Set, "set")?;
        let mut values = vec![self.parse_column_value()?];
        while self.peek_kind() == TokenKind::Comma {
            self.produce()?;
            values.push(self.parse_column_value()?);
        }
        let filter = self.parse_filter()?;
        self.expect_end(Request::Update {
            table,
            values,
            filter,
        })
    }

    fn parse_delete(&mut self) -> Result<Request> {
        self.expect(TokenKind::From, "from")?;
        let table = self.parse_table()?;
        let filter = self.parse_filter()?;
        self.expect_end(Request::Delete { table, filter })
    }
}

/// Strips the surrounding quotes of a string token and folds `''` into `'`.
fn unquote(raw: &str) -> String {
    raw.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw)
        .replace("''", "'")
}

#[cfg(test)]
mod test {
    use super::*;

    fn table(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn test_admin_commands() {
        assert_eq!(parse("help"), Ok(Request::Help));
        assert_eq!(parse("status"), Ok(Request::Status));
        assert_eq!(parse(" stop "), Ok(Request::Stop));
        assert_eq!(parse("start"), Ok(Request::Start));
    }

    #[test]
    fn test_select() {
        assert_eq!(
            parse("select * from t1"),
            Ok(Request::Select {
                table: table("t1"),
                filter: None
            })
        );
        assert_eq!(
            parse("select * from stocks where ticker = IBM"),
            Ok(Request::Select {
                table: table("stocks"),
                filter: Some(ColumnValue::new("ticker", "IBM")),
            })
        );
    }

    #[test]
    fn test_subscribe() {
        assert_eq!(
            parse("subscribe * from stocks where market = 'NYSE'"),
            Ok(Request::Subscribe {
                table: table("stocks"),
                filter: Some(ColumnValue::new("market", "NYSE")),
            })
        );
    }

    #[test]
    fn test_unsubscribe() {
        assert_eq!(
            parse("unsubscribe from stocks"),
            Ok(Request::Unsubscribe {
                table: table("stocks")
            })
        );
        assert_eq!(
            parse("unsubscribe from stocks where a = 1"),
            Err(ParseError::unexpected("end of input", "where"))
        );
    }

    #[test]
    fn test_insert() {
        assert_eq!(
            parse("insert into t (a, b) values (1, 'x''y')"),
            Ok(Request::Insert {
                table: table("t"),
                values: vec![ColumnValue::new("a", "1"), ColumnValue::new("b", "x'y")],
            })
        );
    }

    #[test]
    fn test_insert_value_count() {
        assert_eq!(
            parse("insert into t (a, b) values (1)"),
            Err(ParseError::ValueCount {
                columns: 2,
                values: 1
            })
        );
    }

    #[test]
    fn test_update() {
        assert_eq!(
            parse("update t set a = 1, b = 2 where c = 3"),
            Ok(Request::Update {
                table: table("t"),
                values: vec![ColumnValue::new("a", "1"), ColumnValue::new("b", "2")],
                filter: Some(ColumnValue::new("c", "3")),
            })
        );
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            parse("delete from t"),
            Ok(Request::Delete {
                table: table("t"),
                filter: None
            })
        );
    }

    #[test]
    fn test_truncated_is_grammar_error() {
        assert_eq!(
            parse("select *"),
            Err(ParseError::unexpected("from", "EOF"))
        );
        assert_eq!(
            parse("update t set a ="),
            Err(ParseError::unexpected("value", "EOF"))
        );
    }

    #[test]
    fn test_lexical_error_forwarded() {
        assert_eq!(
            parse("selectx"),
            Err(ParseError::Lexical("Unexpected token: selectx".to_string()))
        );
        assert_eq!(
            parse("help me"),
            Err(ParseError::Lexical("Unexpected token: me".to_string()))
        );
    }

    #[test]
    fn test_parser_over_token_vec() {
        let tokens = vec![
            Token::new(TokenKind::Delete, "delete"),
            Token::new(TokenKind::From, "from"),
            Token::new(TokenKind::Ident, "t"),
        ];
        // 토큰이 모자라면 EOF로 취급
        assert_eq!(
            Parser::new(tokens.into_iter()).parse(),
            Ok(Request::Delete {
                table: table("t"),
                filter: None
            })
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'a''b'"), "a'b");
        assert_eq!(unquote("''"), "");
    }
}
