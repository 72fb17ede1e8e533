use std::fmt;

use tracing::debug;

use crate::{diagnostics::LexError, position::SourceSpan};

/// Sentinel keyword that opens and closes every program.
pub const ENTRY_KEYWORD: &str = "ZetriScript";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    ZetriScript,
    Line,
    AllocSpace,
    Goto,
    DrawPixel,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::ZetriScript => ENTRY_KEYWORD,
            Keyword::Line => "LINE",
            Keyword::AllocSpace => "allocSpace",
            Keyword::Goto => "goto",
            Keyword::DrawPixel => "drawPixel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Int,
    Float,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Semicolon,
    Assign,
    Bang,
    Comma,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Keyword(keyword) => return write!(f, "keyword `{}`", keyword.as_str()),
            TokenKind::Identifier => "identifier",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Assign => "`=`",
            TokenKind::Bang => "`!`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

impl Token {
    /// Human description used in syntax errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Keyword(_) => format!("keyword `{}`", self.lexeme),
            TokenKind::Identifier => format!("identifier `{}`", self.lexeme),
            TokenKind::Int | TokenKind::Float => format!("number `{}`", self.lexeme),
            _ => format!("`{}`", self.lexeme),
        }
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = match self.peeked.take() {
            Some(pair) => Some(pair),
            None => self.chars.next(),
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
        }
        next
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn skip_whitespace(&mut self) {
        while let Some((_, ' ' | '\t' | '\n')) = self.peek() {
            self.bump();
        }
    }

    fn identifier_or_keyword(&mut self, start: usize) -> Token {
        while let Some((_, ch)) = self.peek() {
            if !ch.is_alphabetic() {
                break;
            }
            self.bump();
        }
        let lexeme = &self.source[start..self.current];
        let kind = keyword_for(lexeme).unwrap_or(TokenKind::Identifier);
        self.token(start, kind)
    }

    fn number_literal(&mut self, start: usize) -> Token {
        let mut seen_dot = false;
        while let Some((_, ch)) = self.peek() {
            match ch {
                '0'..='9' => {
                    self.bump();
                }
                '.' if !seen_dot => {
                    seen_dot = true;
                    self.bump();
                }
                _ => break,
            }
        }
        let kind = if seen_dot {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.token(start, kind)
    }

    fn token(&self, start: usize, kind: TokenKind) -> Token {
        let end = self.current;
        Token {
            kind,
            lexeme: self.source[start..end].to_string(),
            span: SourceSpan { start, end },
        }
    }

    /// Scans the whole source, stopping at the first illegal character.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some((start, ch)) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    span: SourceSpan::new(self.current, self.current),
                });
                break;
            };

            let token = match ch {
                c if c.is_alphabetic() => self.identifier_or_keyword(start),
                '0'..='9' => self.number_literal(start),
                '[' => self.token(start, TokenKind::LBracket),
                ']' => self.token(start, TokenKind::RBracket),
                '{' => self.token(start, TokenKind::LBrace),
                '}' => self.token(start, TokenKind::RBrace),
                '(' => self.token(start, TokenKind::LParen),
                ')' => self.token(start, TokenKind::RParen),
                ':' => self.token(start, TokenKind::Colon),
                ';' => self.token(start, TokenKind::Semicolon),
                '=' => self.token(start, TokenKind::Assign),
                '!' => self.token(start, TokenKind::Bang),
                ',' => self.token(start, TokenKind::Comma),
                '.' => self.token(start, TokenKind::Dot),
                '+' => self.token(start, TokenKind::Plus),
                '-' => self.token(start, TokenKind::Minus),
                '*' => self.token(start, TokenKind::Star),
                '/' => self.token(start, TokenKind::Slash),
                other => {
                    return Err(LexError::IllegalCharacter {
                        character: other,
                        span: SourceSpan::new(start, self.current),
                    });
                }
            };
            tokens.push(token);
        }
        debug!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }
}

fn keyword_for(ident: &str) -> Option<TokenKind> {
    use self::Keyword as Kw;
    let keyword = match ident {
        ENTRY_KEYWORD => Kw::ZetriScript,
        "LINE" => Kw::Line,
        "allocSpace" => Kw::AllocSpace,
        "goto" => Kw::Goto,
        "drawPixel" => Kw::DrawPixel,
        _ => return None,
    };
    Some(TokenKind::Keyword(keyword))
}
