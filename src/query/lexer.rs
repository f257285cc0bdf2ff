use crate::query::token::{Token, TokenConsumer, TokenKind};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Returned by [`Lexer::next_char`] once the input is exhausted.
const EOF: char = '\0';

/// A lexer state: consumes input, may emit tokens, and hands back the state
/// to run next. `None` stops the scan.
#[derive(Clone, Copy)]
struct State(fn(&mut Lexer<'_>) -> Option<State>);

fn state(f: fn(&mut Lexer<'_>) -> Option<State>) -> Option<State> {
    Some(State(f))
}

/// Scans one command string. Tokens are produced lazily through [`Iterator`];
/// the last item is always a single [`TokenKind::Eof`], directly preceded by
/// one [`TokenKind::Error`] token when the scan failed.
pub struct Lexer<'a> {
    input: &'a str,
    start: usize,
    pos: usize,
    width: usize,
    state: Option<State>,
    tokens: VecDeque<Token<'a>>,
    finished: bool,
}

/// Scans `input` and pushes every token into `consumer`.
pub fn scan<'a, C: TokenConsumer<'a>>(input: &'a str, consumer: &mut C) {
    for token in Lexer::new(input) {
        consumer.consume(token);
    }
}

fn is_white_space(ch: char) -> bool {
    ch.is_whitespace() || ch == EOF
}

fn is_value_end(ch: char) -> bool {
    is_white_space(ch) || matches!(ch, '\'' | ',' | '(' | ')')
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            start: 0,
            pos: 0,
            width: 0,
            state: state(lex_command),
            tokens: VecDeque::new(),
            finished: false,
        }
    }

    pub fn tokenize(input: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        scan(input, &mut tokens);
        tokens
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn next_char(&mut self) -> char {
        let Some(ch) = self.input[self.pos..].chars().next() else {
            self.width = 0;
            return EOF;
        };
        self.width = ch.len_utf8();
        self.pos += self.width;
        ch
    }

    /// Steps back over the last [`Lexer::next_char`]. Only one level deep.
    fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    fn peek_char(&mut self) -> char {
        let ch = self.next_char();
        self.backup();
        ch
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    /// Takes the pending lexeme `[start, pos)`.
    fn current(&mut self) -> &'a str {
        let input = self.input;
        let lexeme = &input[self.start..self.pos];
        self.start = self.pos;
        lexeme
    }

    fn emit(&mut self, kind: TokenKind) {
        debug_assert!(self.start <= self.pos && self.pos <= self.input.len());
        let value = self.current();
        trace!(%kind, value, "emit");
        self.tokens.push_back(Token::new(kind, value));
    }

    fn error_token(&mut self, message: String) -> Option<State> {
        debug!(input = self.input, %message, "lexical error");
        self.ignore();
        self.tokens.push_back(Token::error(message));
        None
    }

    fn skip_white_spaces(&mut self) {
        while self.next_char().is_whitespace() {}
        self.backup();
        self.ignore();
    }

    fn scan_till_white_space(&mut self) {
        while !is_white_space(self.next_char()) {}
        self.backup();
    }

    /// Matches the rest of `keyword`, given that the dispatch already consumed
    /// its first `skip` characters. On a mismatch the remainder of the word is
    /// consumed so the whole of it ends up in the pending lexeme.
    fn match_keyword(&mut self, keyword: &str, skip: usize) -> bool {
        let split = keyword
            .char_indices()
            .nth(skip)
            .map_or(keyword.len(), |(i, _)| i);
        let (prefix, rest) = keyword.split_at(split);
        let consumed = &self.input[self.start..self.pos];
        let mut matched = consumed == prefix;
        let mut last = consumed.chars().next_back().unwrap_or(EOF);
        if matched {
            for expected in rest.chars() {
                last = self.next_char();
                if last != expected {
                    matched = false;
                    break;
                }
            }
        }
        // 공백에서 어긋났다면 단어는 이미 끝남
        if !matched && is_white_space(last) {
            self.backup();
            return false;
        }
        if !is_white_space(self.peek_char()) {
            matched = false;
            self.scan_till_white_space();
        }
        matched
    }

    fn lex_match(
        &mut self,
        kind: TokenKind,
        keyword: &str,
        skip: usize,
        next: Option<State>,
    ) -> Option<State> {
        if self.match_keyword(keyword, skip) {
            self.emit(kind);
            return next;
        }
        let lexeme = self.current();
        self.error_token(format!("Unexpected token: {lexeme}"))
    }

    fn invalid_command(&mut self, what: &str) -> Option<State> {
        let lexeme = self.current();
        self.error_token(format!("{what}: {lexeme}"))
    }

    fn lex_keyword(
        &mut self,
        kind: TokenKind,
        keyword: &str,
        next: Option<State>,
    ) -> Option<State> {
        self.skip_white_spaces();
        if self.at_end() {
            return None;
        }
        self.lex_match(kind, keyword, 0, next)
    }

    fn lex_identifier(&mut self, next: Option<State>) -> Option<State> {
        self.skip_white_spaces();
        if self.at_end() {
            return None;
        }
        if !self.next_char().is_alphabetic() {
            let lexeme = self.current();
            return self.error_token(format!("identifier must begin with a letter: {lexeme}"));
        }
        while self.next_char().is_alphanumeric() {}
        self.backup();
        self.emit(TokenKind::Ident);
        next
    }

    fn lex_symbol(&mut self, symbol: char, kind: TokenKind, next: Option<State>) -> Option<State> {
        self.skip_white_spaces();
        if self.at_end() {
            return None;
        }
        if self.next_char() != symbol {
            let lexeme = self.current();
            return self.error_token(format!("expected {symbol} but got: {lexeme}"));
        }
        self.emit(kind);
        next
    }

    fn lex_value(&mut self, next: Option<State>) -> Option<State> {
        self.skip_white_spaces();
        if self.at_end() {
            return None;
        }
        if self.peek_char() == '\'' {
            return self.lex_string(next);
        }
        while !is_value_end(self.next_char()) {}
        self.backup();
        if self.start == self.pos {
            self.next_char();
            let lexeme = self.current();
            return self.error_token(format!("expected value but got: {lexeme}"));
        }
        self.emit(TokenKind::Value);
        next
    }

    fn lex_string(&mut self, next: Option<State>) -> Option<State> {
        // 여는 따옴표
        self.next_char();
        loop {
            match self.next_char() {
                '\'' if self.peek_char() == '\'' => {
                    self.next_char();
                }
                '\'' => break,
                EOF if self.at_end() => {
                    let lexeme = self.current();
                    return self.error_token(format!("unterminated string: {lexeme}"));
                }
                _ => {}
            }
        }
        self.emit(TokenKind::String);
        next
    }

    /// After a list item: `,` continues with `item`, `)` closes with `close`.
    fn lex_list_next(&mut self, item: Option<State>, close: Option<State>) -> Option<State> {
        self.skip_white_spaces();
        if self.at_end() {
            return None;
        }
        match self.next_char() {
            ',' => {
                self.emit(TokenKind::Comma);
                item
            }
            ')' => {
                self.emit(TokenKind::RParen);
                close
            }
            _ => {
                self.scan_till_white_space();
                let lexeme = self.current();
                self.error_token(format!("expected , or ) but got: {lexeme}"))
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.tokens.is_empty() && !self.finished {
            if let Some(State(lex)) = self.state {
                self.state = lex(self);
            } else {
                self.finished = true;
                self.ignore();
                self.emit(TokenKind::Eof);
            }
        }
        self.tokens.pop_front()
    }
}

// 초기 상태
fn lex_command(l: &mut Lexer<'_>) -> Option<State> {
    l.skip_white_spaces();
    match l.next_char() {
        // update unsubscribe
        'u' => {
            if l.next_char() == 'p' {
                return l.lex_match(TokenKind::Update, "update", 2, state(lex_update_table));
            }
            l.lex_match(TokenKind::Unsubscribe, "unsubscribe", 2, state(lex_from))
        }
        // select subscribe status stop start
        's' => lex_command_s(l),
        'i' => l.lex_match(TokenKind::Insert, "insert", 1, state(lex_insert_into)),
        'd' => l.lex_match(TokenKind::Delete, "delete", 1, state(lex_from)),
        'h' => l.lex_match(TokenKind::Help, "help", 1, state(lex_end)),
        'm' => l.lex_match(TokenKind::Mysql, "mysql", 1, state(lex_mysql_command)),
        _ => l.invalid_command("Invalid command"),
    }
}

fn lex_command_s(l: &mut Lexer<'_>) -> Option<State> {
    match l.next_char() {
        'e' => l.lex_match(TokenKind::Select, "select", 2, state(lex_select_star)),
        'u' => l.lex_match(TokenKind::Subscribe, "subscribe", 2, state(lex_select_star)),
        't' => lex_command_st(l),
        _ => l.invalid_command("Invalid command"),
    }
}

fn lex_command_st(l: &mut Lexer<'_>) -> Option<State> {
    match l.next_char() {
        'a' => {
            if l.next_char() == 'r' {
                return l.lex_match(TokenKind::Start, "start", 4, state(lex_end));
            }
            l.lex_match(TokenKind::Status, "status", 4, state(lex_end))
        }
        _ => l.lex_match(TokenKind::Stop, "stop", 3, state(lex_end)),
    }
}

/// Only white space may follow a complete command.
fn lex_end(l: &mut Lexer<'_>) -> Option<State> {
    l.skip_white_spaces();
    if l.at_end() {
        return None;
    }
    l.scan_till_white_space();
    let lexeme = l.current();
    l.error_token(format!("Unexpected token: {lexeme}"))
}

// SELECT, SUBSCRIBE
fn lex_select_star(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_symbol('*', TokenKind::Star, state(lex_from))
}

// ... from <table> [where <column> = <value>]
fn lex_from(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_keyword(TokenKind::From, "from", state(lex_from_table))
}

fn lex_from_table(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_identifier(state(lex_where))
}

fn lex_where(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_keyword(TokenKind::Where, "where", state(lex_where_column))
}

fn lex_where_column(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_identifier(state(lex_where_equal))
}

fn lex_where_equal(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_symbol('=', TokenKind::Equal, state(lex_where_value))
}

fn lex_where_value(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_value(state(lex_end))
}

// UPDATE
fn lex_update_table(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_identifier(state(lex_update_set))
}

fn lex_update_set(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_keyword(TokenKind::Set, "set", state(lex_update_column))
}

fn lex_update_column(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_identifier(state(lex_update_equal))
}

fn lex_update_equal(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_symbol('=', TokenKind::Equal, state(lex_update_value))
}

fn lex_update_value(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_value(state(lex_update_next))
}

fn lex_update_next(l: &mut Lexer<'_>) -> Option<State> {
    l.skip_white_spaces();
    if l.peek_char() == ',' {
        l.next_char();
        l.emit(TokenKind::Comma);
        return state(lex_update_column);
    }
    lex_where(l)
}

// INSERT
fn lex_insert_into(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_keyword(TokenKind::Into, "into", state(lex_insert_table))
}

fn lex_insert_table(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_identifier(state(lex_insert_columns))
}

fn lex_insert_columns(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_symbol('(', TokenKind::LParen, state(lex_insert_column))
}

fn lex_insert_column(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_identifier(state(lex_insert_column_next))
}

fn lex_insert_column_next(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_list_next(state(lex_insert_column), state(lex_insert_values))
}

fn lex_insert_values(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_keyword(TokenKind::Values, "values", state(lex_insert_values_open))
}

fn lex_insert_values_open(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_symbol('(', TokenKind::LParen, state(lex_insert_value))
}

fn lex_insert_value(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_value(state(lex_insert_value_next))
}

fn lex_insert_value_next(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_list_next(state(lex_insert_value), state(lex_end))
}

// MYSQL
fn lex_mysql_command(l: &mut Lexer<'_>) -> Option<State> {
    l.skip_white_spaces();
    if l.at_end() {
        return None;
    }
    match l.next_char() {
        'c' => l.lex_match(TokenKind::Connect, "connect", 1, state(lex_mysql_address)),
        'd' => l.lex_match(TokenKind::Disconnect, "disconnect", 1, state(lex_end)),
        's' => l.lex_match(TokenKind::Subscribe, "subscribe", 1, state(lex_end)),
        'u' => l.lex_match(TokenKind::Unsubscribe, "unsubscribe", 1, state(lex_end)),
        _ => {
            l.scan_till_white_space();
            l.invalid_command("Invalid mysql command")
        }
    }
}

fn lex_mysql_address(l: &mut Lexer<'_>) -> Option<State> {
    l.lex_value(state(lex_end))
}
