use crate::query::{self, Lexer, ParseError, Request, Token};
use serde_json::json;
use std::fmt::Write;

/// Output switches shared by the REPL and the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub tokens: bool,
    pub json: bool,
}

/// What one command turned into.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub tokens: Vec<Token<'static>>,
    pub result: Result<Request, ParseError>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn render(&self, options: Options) -> serde_json::Result<String> {
        if options.json {
            let mut value = match &self.result {
                Ok(request) => json!({ "request": request }),
                Err(err) => json!({ "error": err.to_string() }),
            };
            if options.tokens {
                value["tokens"] = serde_json::to_value(&self.tokens)?;
            }
            return serde_json::to_string_pretty(&value);
        }

        let mut out = String::new();
        if options.tokens {
            for token in &self.tokens {
                // ! String에 쓰기는 실패하지 않음
                let _ = writeln!(out, "{:>12}  {}", token.kind, token.value);
            }
        }
        match &self.result {
            Ok(request) => {
                let _ = write!(out, "{}: {request:?}", request.kind());
            }
            Err(err) => {
                let _ = write!(out, "error: {err}");
            }
        }
        Ok(out)
    }
}

pub struct Console {
    options: Options,
}

impl Console {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn run(&self, src: &str) -> Outcome {
        let tokens = Lexer::new(src).map(Token::into_owned).collect();
        Outcome {
            tokens,
            result: query::parse(src),
        }
    }
}
