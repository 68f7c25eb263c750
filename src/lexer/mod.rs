//! Byte stream -> token stream.
//!
//! Follows the teacher's lexer shape (a cursor over the raw bytes plus a one-token lookahead
//! buffer) but dispatches through an ordered list of sub-lexers the way spec.md §4.1 describes,
//! rather than matching on the first character inline: whitespace/comments, newlines, operators,
//! strings, numbers, punctuation, keywords-or-identifiers, then EOF.

pub mod token;

pub use token::{Token, TokenKind, KEYWORDS};

use crate::error::{CompileError, CompileResult};

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    lookahead: Option<Token>,
    /// Once EOF has been produced, every subsequent call returns the same cached token instead
    /// of re-scanning past the end of the buffer.
    eof_token: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            lookahead: None,
            eof_token: None,
        }
    }

    pub fn peek(&mut self) -> CompileResult<Token> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan_next()?);
        }
        Ok(self.lookahead.clone().unwrap())
    }

    pub fn next(&mut self) -> CompileResult<Token> {
        if let Some(tok) = self.lookahead.take() {
            return Ok(tok);
        }
        self.scan_next()
    }

    fn scan_next(&mut self) -> CompileResult<Token> {
        if let Some(eof) = &self.eof_token {
            return Ok(eof.clone());
        }

        self.skip_whitespace_and_comments()?;

        if let Some(tok) = self.try_newline() {
            return Ok(tok);
        }
        if let Some(tok) = self.try_operator() {
            return Ok(tok);
        }
        if let Some(tok) = self.try_string()? {
            return Ok(tok);
        }
        if let Some(tok) = self.try_number()? {
            return Ok(tok);
        }
        if let Some(tok) = self.try_punctuation() {
            return Ok(tok);
        }
        if let Some(tok) = self.try_keyword_or_identifier() {
            return Ok(tok);
        }

        if self.pos >= self.src.len() {
            let tok = Token::new(TokenKind::Eof, self.pos, "");
            self.eof_token = Some(tok.clone());
            return Ok(tok);
        }

        Err(CompileError::new(
            format!("unexpected character '{}'", self.cur() as char),
            self.pos,
        ))
    }

    fn cur(&self) -> u8 {
        self.src[self.pos]
    }

    fn at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_whitespace_and_comments(&mut self) -> CompileResult<()> {
        loop {
            if self.eof() {
                return Ok(());
            }
            match self.cur() {
                b' ' | b'\t' | b'\r' => {
                    self.pos += 1;
                }
                b'\\' if self.at(1) == Some(b'\n') => {
                    self.pos += 2;
                }
                b'/' if self.at(1) == Some(b'/') => {
                    self.pos += 2;
                    while !self.eof() && self.cur() != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.eof() {
                            return Err(CompileError::new("unterminated block comment", start));
                        }
                        if self.cur() == b'*' && self.at(1) == Some(b'/') {
                            self.pos += 2;
                            break;
                        }
                        if !self.cur().is_ascii_graphic() && self.cur() != b' ' && self.cur() != b'\n'
                            && self.cur() != b'\t'
                        {
                            return Err(CompileError::new(
                                "invalid character in block comment",
                                self.pos,
                            ));
                        }
                        self.pos += 1;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn try_newline(&mut self) -> Option<Token> {
        if self.eof() || self.cur() != b'\n' {
            return None;
        }
        let start = self.pos;
        while !self.eof() && self.cur() == b'\n' {
            self.pos += 1;
        }
        Some(Token::new(TokenKind::NewLine, start, "\n"))
    }

    fn try_operator(&mut self) -> Option<Token> {
        const TWO_CHAR: &[&str] = &["&&", "||", "==", "!=", "<=", ">="];
        const ONE_CHAR: &[u8] = b"+-*/<>%!";

        if self.eof() {
            return None;
        }
        let start = self.pos;
        if self.pos + 1 < self.src.len() {
            let two = &self.src[self.pos..self.pos + 2];
            if let Ok(s) = std::str::from_utf8(two) {
                if TWO_CHAR.contains(&s) {
                    self.pos += 2;
                    return Some(Token::new(TokenKind::Op, start, s));
                }
            }
        }
        if ONE_CHAR.contains(&self.cur()) {
            let c = self.cur() as char;
            self.pos += 1;
            return Some(Token::new(TokenKind::Op, start, c.to_string()));
        }
        None
    }

    fn try_string(&mut self) -> CompileResult<Option<Token>> {
        if self.eof() || self.cur() != b'"' {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            if self.eof() {
                return Err(CompileError::new("unterminated string literal", start));
            }
            let c = self.cur();
            if c == b'"' {
                self.pos += 1;
                break;
            }
            if !c.is_ascii_graphic() && c != b' ' {
                return Err(CompileError::new(
                    "invalid character in string literal",
                    self.pos,
                ));
            }
            value.push(c as char);
            self.pos += 1;
        }
        Ok(Some(Token::new(TokenKind::String, start, value)))
    }

    fn try_number(&mut self) -> CompileResult<Option<Token>> {
        if self.eof() || !self.cur().is_ascii_digit() {
            return Ok(None);
        }
        let start = self.pos;
        while !self.eof() && self.cur().is_ascii_digit() {
            self.pos += 1;
        }
        let mut is_float = false;
        if !self.eof() && self.cur() == b'.' {
            is_float = true;
            self.pos += 1;
            while !self.eof() && self.cur().is_ascii_digit() {
                self.pos += 1;
            }
        }
        let lexeme = std::str::from_utf8(&self.src[start..self.pos]).unwrap().to_string();
        let kind = if is_float { TokenKind::FloatVal } else { TokenKind::IntVal };
        Ok(Some(Token::new(kind, start, lexeme)))
    }

    fn try_punctuation(&mut self) -> Option<Token> {
        if self.eof() {
            return None;
        }
        let kind = match self.cur() {
            b':' => TokenKind::Colon,
            b'.' => TokenKind::Dot,
            b'{' => TokenKind::LCurly,
            b'}' => TokenKind::RCurly,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b'[' => TokenKind::LSquare,
            b']' => TokenKind::RSquare,
            b'=' => TokenKind::Equals,
            _ => return None,
        };
        let start = self.pos;
        let c = self.cur() as char;
        self.pos += 1;
        Some(Token::new(kind, start, c.to_string()))
    }

    fn try_keyword_or_identifier(&mut self) -> Option<Token> {
        if self.eof() || !(self.cur().is_ascii_alphabetic() || self.cur() == b'_') {
            return None;
        }
        let start = self.pos;
        while !self.eof() && (self.cur().is_ascii_alphanumeric() || self.cur() == b'_') {
            self.pos += 1;
        }
        let lexeme = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        let kind = KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == lexeme)
            .map(|(_, kind)| *kind)
            .unwrap_or(TokenKind::Variable);
        Some(Token::new(kind, start, lexeme))
    }
}

/// Lex an entire source string into a token vector (used by the `-l` stop-point and tests).
pub fn lex_all(src: &str) -> CompileResult<Vec<Token>> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next()?;
        let is_eof = tok.is(TokenKind::Eof);
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex_all(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_show_expr() {
        let toks = lex_all("show 3+4\n").unwrap();
        let rendered: Vec<String> = toks.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "SHOW 'show'",
                "INTVAL '3'",
                "OP '+'",
                "INTVAL '4'",
                "NEWLINE",
                "END_OF_FILE"
            ]
        );
    }

    #[test]
    fn lexes_float_with_no_trailing_digits() {
        let toks = lex_all("3.").unwrap();
        assert_eq!(toks[0].kind, TokenKind::FloatVal);
        assert_eq!(toks[0].lexeme, "3.");
    }

    #[test]
    fn collapses_newline_runs() {
        assert_eq!(kinds("\n\n\n"), vec![TokenKind::NewLine, TokenKind::Eof]);
    }

    #[test]
    fn line_comment_does_not_emit_newline() {
        assert_eq!(kinds("// hi\n"), vec![TokenKind::NewLine, TokenKind::Eof]);
    }

    #[test]
    fn block_comment_spans_lines_without_newline_tokens() {
        assert_eq!(kinds("/* a\nb */x"), vec![TokenKind::Variable, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert!(lex_all("\"abc").is_err());
    }

    #[test]
    fn chained_comparison_operators_lex_individually() {
        assert_eq!(
            kinds("a<b<c"),
            vec![
                TokenKind::Variable,
                TokenKind::Op,
                TokenKind::Variable,
                TokenKind::Op,
                TokenKind::Variable,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn eof_is_stable_after_repeated_peeks() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.peek().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.peek().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Eof);
    }
}
