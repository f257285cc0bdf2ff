//! `mysql ...` commands. The base parser hands over right after the `mysql`
//! token; each production here reuses the same tokens and end-of-input check.

use crate::query::error::{ParseError, Result};
use crate::query::parser::Parser;
use crate::query::request::{MysqlRequest, Request};
use crate::query::token::{Token, TokenKind};

impl<'a, I: Iterator<Item = Token<'a>>> Parser<I> {
    pub(crate) fn parse_mysql(&mut self) -> Result<Request> {
        let token = self.produce()?;
        let request = match token.kind {
            TokenKind::Connect => self.parse_mysql_connect()?,
            TokenKind::Disconnect => MysqlRequest::Disconnect,
            TokenKind::Subscribe => MysqlRequest::Subscribe,
            TokenKind::Unsubscribe => MysqlRequest::Unsubscribe,
            _ => {
                return Err(ParseError::InvalidBridgeRequest {
                    found: token.to_string(),
                });
            }
        };
        self.expect_end(Request::Mysql { request })
    }

    // mysql connect <address>
    fn parse_mysql_connect(&mut self) -> Result<MysqlRequest> {
        let address = self.expect(TokenKind::Value, "connection address")?;
        Ok(MysqlRequest::Connect {
            address: address.value.into_owned(),
        })
    }
}
