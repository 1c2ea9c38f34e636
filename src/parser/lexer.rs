//! Scanner for Tod source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! The stream always ends with a single [`TokenKind::Eof`] token.
//!
//! Characters that do not start any known token become [`TokenKind::Illegal`]
//! tokens instead of lexer errors; the parser rejects them with a proper
//! unexpected-token diagnostic. Only literal decoding problems are fatal here.

use super::token::{Token, TokenKind, TokenValue};
use crate::diagnostic::ErrorKind;
use crate::source::{FileId, Span};
use thiserror::Error;

/// Fatal lexical error
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct LexError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

/// Tokenize a whole compilation unit
pub fn tokenize(source: &str, file: FileId, hash_comments: bool) -> Result<Vec<Token>, LexError> {
    Lexer::new(source, file).with_hash_comments(hash_comments).tokenize()
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    index: usize,
    offset: usize,
    line: usize,
    column: usize,
}

pub struct Lexer {
    input: Vec<char>,
    file: FileId,
    position: usize,
    offset: usize,
    line: usize,
    column: usize,
    hash_comments: bool,
}

impl Lexer {
    /// Create a lexer with `#` line comments enabled.
    pub fn new(input: &str, file: FileId) -> Self {
        Self {
            input: input.chars().collect(),
            file,
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            hash_comments: true,
        }
    }

    /// Select whether `#` starts a line comment
    pub fn with_hash_comments(mut self, enabled: bool) -> Self {
        self.hash_comments = enabled;
        self
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                let here = self.mark();
                tokens.push(Token::eof(self.span_from(here)));
                break;
            }

            let token = self.next_token()?;
            let space_after = self.peek().map_or(true, is_whitespace);
            tokens.push(token.spaced(space_after));
        }

        log::trace!("scanned {} tokens", tokens.len());
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.mark();

        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string_literal(start, quote),
            Some(ch) if ch.is_ascii_digit() => self.number_literal(start),
            Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(self.identifier_or_keyword(start)),
            _ => Ok(self.operator(start)),
        }
    }

    /// Parse string literal, delimited by the quote that opened it
    fn string_literal(&mut self, start: Mark, quote: char) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            let Some(ch) = self.advance() else {
                return Err(LexError {
                    kind: ErrorKind::UnterminatedString,
                    message: "unterminated string literal".to_string(),
                    span: self.span_from(start),
                });
            };

            if ch == quote {
                break;
            }

            if ch != '\\' {
                value.push(ch);
                continue;
            }

            let escape_start = self.mark();
            let escaped = self.advance().ok_or_else(|| LexError {
                kind: ErrorKind::UnterminatedString,
                message: "unterminated string literal".to_string(),
                span: self.span_from(start),
            })?;

            let unescaped = match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                '\\' => '\\',
                '"' => '"',
                '\'' => '\'',
                _ => {
                    return Err(LexError {
                        kind: ErrorKind::InvalidEscape,
                        message: format!("unknown escape sequence \\{}", escaped),
                        span: self.span_from(escape_start),
                    });
                }
            };
            value.push(unescaped);
        }

        Ok(Token::new(TokenKind::String, self.text_from(start), self.span_from(start))
            .with_value(TokenValue::Str(value)))
    }

    /// Parse numeric literal: decimal int, float, `0x` hex or `0b` binary
    fn number_literal(&mut self, start: Mark) -> Result<Token, LexError> {
        let radix = match (self.peek(), self.peek_ahead(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.advance();
            self.advance();

            // Take every alphanumeric so a stray digit like `0b12` is reported
            // instead of silently starting a new token.
            let mut digits = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    if ch != '_' {
                        digits.push(ch);
                    }
                    self.advance();
                } else {
                    break;
                }
            }

            let literal = self.text_from(start);
            let value = i64::from_str_radix(&digits, radix)
                .map_err(|_| self.conversion_error(start, &literal, "int"))?;

            return Ok(Token::new(TokenKind::Int, literal, self.span_from(start))
                .with_value(TokenValue::Int(value)));
        }

        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' || ch == '_' {
                if ch != '_' {
                    digits.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        let literal = self.text_from(start);

        if digits.contains('.') {
            let value = digits
                .parse::<f64>()
                .map_err(|_| self.conversion_error(start, &literal, "float"))?;
            Ok(Token::new(TokenKind::Float, literal, self.span_from(start))
                .with_value(TokenValue::Float(value)))
        } else {
            let value = digits
                .parse::<i64>()
                .map_err(|_| self.conversion_error(start, &literal, "int"))?;
            Ok(Token::new(TokenKind::Int, literal, self.span_from(start))
                .with_value(TokenValue::Int(value)))
        }
    }

    fn conversion_error(&self, start: Mark, literal: &str, target: &str) -> LexError {
        LexError {
            kind: ErrorKind::RealValueConversion,
            message: format!(
                "value \"{}\" could not be converted to real value [{}]",
                literal, target
            ),
            span: self.span_from(start),
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, start: Mark) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                self.advance();
            } else {
                break;
            }
        }

        let word = self.text_from(start);
        let span = self.span_from(start);

        match TokenKind::keyword(&word) {
            Some(TokenKind::True) => Token::new(TokenKind::True, word, span).with_value(TokenValue::Bool(true)),
            Some(TokenKind::False) => {
                Token::new(TokenKind::False, word, span).with_value(TokenValue::Bool(false))
            }
            Some(kind) => Token::new(kind, word, span),
            None => Token::new(TokenKind::Ident, word, span),
        }
    }

    /// Longest-match operator or punctuation; anything else is illegal
    fn operator(&mut self, start: Mark) -> Token {
        for len in (1..=3).rev() {
            if self.position + len > self.input.len() {
                continue;
            }

            let candidate: String = self.input[self.position..self.position + len].iter().collect();
            if let Some(kind) = TokenKind::operator(&candidate) {
                for _ in 0..len {
                    self.advance();
                }
                return Token::new(kind, candidate, self.span_from(start));
            }
        }

        self.advance();
        Token::new(TokenKind::Illegal, self.text_from(start), self.span_from(start))
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(ch) if is_whitespace(ch) => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment()?,
                Some('#') if self.hash_comments => self.skip_line_comment(),
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.mark();
        self.advance(); // '/'
        self.advance(); // '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            kind: ErrorKind::UnterminatedComment,
            message: "unterminated block comment".to_string(),
            span: self.span_from(start),
        })
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        self.offset += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn mark(&self) -> Mark {
        Mark {
            index: self.position,
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn text_from(&self, start: Mark) -> String {
        self.input[start.index..self.position].iter().collect()
    }

    fn span_from(&self, start: Mark) -> Span {
        Span::new(
            self.file,
            start.offset,
            self.offset,
            start.line,
            start.column,
            self.line,
            self.column,
        )
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\x0b')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, FileId(0), true)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("fn add(a int) int { return a; }", FileId(0), true).unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Fn);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].literal, "add");
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[3].kind, TokenKind::Ident);
        assert_eq!(tokens[4].kind, TokenKind::Ident);
        assert_eq!(tokens[5].kind, TokenKind::RParen);
        assert_eq!(tokens[7].kind, TokenKind::LBrace);
        assert_eq!(tokens[8].kind, TokenKind::Return);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("<<= <=> << <= < :: := &^= &&"),
            vec![
                TokenKind::ShlAssign,
                TokenKind::Spaceship,
                TokenKind::Shl,
                TokenKind::Leq,
                TokenKind::Lt,
                TokenKind::PathSep,
                TokenKind::Define,
                TokenKind::AndNotAssign,
                TokenKind::LAnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_increment_is_two_adjacent_tokens() {
        let tokens = tokenize("i++ ;", FileId(0), true).unwrap();

        assert_eq!(tokens[1].kind, TokenKind::Add);
        assert!(!tokens[1].space_after);
        assert_eq!(tokens[2].kind, TokenKind::Add);
        assert!(tokens[2].space_after);
    }

    #[test]
    fn test_number_values() {
        let tokens = tokenize("42 1_000 0x1F 0b101 2.5", FileId(0), true).unwrap();

        assert_eq!(tokens[0].value, Some(TokenValue::Int(42)));
        assert_eq!(tokens[1].value, Some(TokenValue::Int(1000)));
        assert_eq!(tokens[1].literal, "1_000");
        assert_eq!(tokens[2].value, Some(TokenValue::Int(31)));
        assert_eq!(tokens[3].value, Some(TokenValue::Int(5)));
        assert_eq!(tokens[4].kind, TokenKind::Float);
        assert_eq!(tokens[4].value, Some(TokenValue::Float(2.5)));
    }

    #[test]
    fn test_malformed_numbers() {
        for source in ["0x", "0b102", "1.2.3", "99999999999999999999"] {
            let err = tokenize(source, FileId(0), true).unwrap_err();
            assert_eq!(err.kind, ErrorKind::RealValueConversion, "source: {}", source);
            assert!(err.message.contains(source), "message: {}", err.message);
        }
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize(r#""hello\nworld" 'single'"#, FileId(0), true).unwrap();

        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, Some(TokenValue::Str("hello\nworld".to_string())));
        assert_eq!(tokens[0].literal, r#""hello\nworld""#);
        assert_eq!(tokens[1].value, Some(TokenValue::Str("single".to_string())));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("var s = \"oops", FileId(0), true).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
        assert_eq!(err.span.start_column, 9);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("var x // comment\n/* block\ncomment */ # hash\nx"),
            vec![TokenKind::Var, TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_hash_comments_can_be_disabled() {
        let tokens = tokenize("# x", FileId(0), false).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[0].literal, "#");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("var x\n  = 10", FileId(0), true).unwrap();

        let ten = &tokens[3];
        assert_eq!(ten.span.start, 10);
        assert_eq!(ten.span.end, 12);
        assert_eq!(ten.span.start_line, 2);
        assert_eq!(ten.span.start_column, 5);
        assert_eq!(ten.span.end_column, 7);

        for token in &tokens {
            assert!(token.span.start <= token.span.end);
        }
    }

    #[test]
    fn test_booleans_and_keywords() {
        let tokens = tokenize("true false this make", FileId(0), true).unwrap();
        assert_eq!(tokens[0].value, Some(TokenValue::Bool(true)));
        assert_eq!(tokens[1].value, Some(TokenValue::Bool(false)));
        assert_eq!(tokens[2].kind, TokenKind::This);
        assert_eq!(tokens[3].kind, TokenKind::Make);
    }
}
