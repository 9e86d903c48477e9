use crate::token::{Token, TokenKind, PHRASES};
use custom_error::custom_error;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub LexError{message: String, line: usize, column: usize} = "{message} at line {line}, column {column}"
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit()
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = vec![];
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::debug!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    fn ch(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn read_char(&mut self) {
        if let Some(c) = self.ch() {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn error(&self, message: String, line: usize, column: usize) -> LexError {
        LexError {
            message,
            line,
            column,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let (line, column) = (self.line, self.column);
        let c = match self.ch() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, line, column)),
        };

        if let Some(kind) = self.read_phrase() {
            return Ok(Token::new(kind, line, column));
        }

        let kind = if is_letter(c) {
            TokenKind::from(self.read_identifier().as_str())
        } else if c.is_ascii_digit() {
            TokenKind::Number(self.read_number())
        } else if c == '"' {
            TokenKind::String(self.read_string(line, column)?)
        } else {
            let kind = match c {
                '=' => TokenKind::Assign,
                ':' => TokenKind::Colon,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Period,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                other => {
                    return Err(self.error(
                        format!("unexpected character '{}'", other),
                        line,
                        column,
                    ))
                }
            };
            self.read_char();
            kind
        };

        Ok(Token::new(kind, line, column))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.ch() {
            if c == ' ' || c == '\t' || c == '\r' || c == '\n' {
                self.read_char();
            } else if c == '/' && self.peek_char() == Some('/') {
                while !matches!(self.ch(), Some('\n') | None) {
                    self.read_char();
                }
            } else {
                break;
            }
        }
    }

    fn read_phrase(&mut self) -> Option<TokenKind> {
        let (text, kind) = PHRASES
            .iter()
            .find(|(text, _)| self.matches_phrase(text))?;
        for _ in 0..text.chars().count() {
            self.read_char();
        }
        Some(kind.clone())
    }

    /// Case-insensitive match at the cursor that is not followed by a letter.
    fn matches_phrase(&self, phrase: &str) -> bool {
        let mut offset = self.position;
        for expected in phrase.chars() {
            match self.input.get(offset) {
                Some(c) if c.eq_ignore_ascii_case(&expected) => offset += 1,
                _ => return false,
            }
        }
        !matches!(self.input.get(offset), Some(c) if c.is_ascii_alphabetic())
    }

    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();
        while let Some(c) = self.ch().filter(|c| is_identifier_char(*c)) {
            identifier.push(c);
            self.read_char();
        }
        identifier
    }

    fn read_number(&mut self) -> f64 {
        let mut literal = String::new();
        let mut seen_point = false;
        while let Some(c) = self.ch() {
            if c.is_ascii_digit() {
                literal.push(c);
            } else if c == '.'
                && !seen_point
                && self.peek_char().map_or(false, |next| next.is_ascii_digit())
            {
                seen_point = true;
                literal.push(c);
            } else {
                break;
            }
            self.read_char();
        }
        // digits with at most one interior point always parse
        literal.parse().unwrap_or(f64::NAN)
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        // opening quote
        self.read_char();

        let mut value = String::new();
        loop {
            match self.ch() {
                None => {
                    return Err(self.error("unterminated string".to_owned(), line, column))
                }
                Some('"') => {
                    self.read_char();
                    return Ok(value);
                }
                Some('\\') => {
                    self.read_char();
                    match self.ch() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(other) => value.push(other),
                        None => {
                            return Err(self.error(
                                "unterminated string".to_owned(),
                                line,
                                column,
                            ))
                        }
                    }
                    self.read_char();
                }
                Some(c) => {
                    value.push(c);
                    self.read_char();
                }
            }
        }
    }
}
