use itertools::{Itertools, MultiPeek};
use std::collections::HashMap;
use std::fmt::Formatter;
use std::str::{Chars, FromStr};
use strum_macros::EnumDiscriminants;

pub struct Scanner<'a> {
    source: MultiPeek<Chars<'a>>,
    current_token_buffer: Vec<char>,
    current_line: u64,
    keywords: HashMap<String, TokenType>,
    comment_depth: u32,
}

impl<'a> std::iter::Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan_token()
    }
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let keywords = HashMap::from_iter([
            ("and".into(), TokenType::And),
            ("class".into(), TokenType::Class),
            ("else".into(), TokenType::Else),
            ("false".into(), TokenType::False),
            ("for".into(), TokenType::For),
            ("fun".into(), TokenType::Fun),
            ("if".into(), TokenType::If),
            ("nil".into(), TokenType::Nil),
            ("or".into(), TokenType::Or),
            ("print".into(), TokenType::Print),
            ("return".into(), TokenType::Return),
            ("super".into(), TokenType::Super),
            ("this".into(), TokenType::This),
            ("true".into(), TokenType::True),
            ("var".into(), TokenType::Var),
            ("while".into(), TokenType::While),
            ("break".into(), TokenType::Break),
            ("continue".into(), TokenType::Continue),
            ("trait".into(), TokenType::Trait),
            ("use".into(), TokenType::Use),
        ]);
        Self {
            source: source.chars().multipeek(),
            current_token_buffer: Vec::new(),
            current_line: 1,
            keywords,
            comment_depth: 0,
        }
    }

    fn scan_token(&mut self) -> Option<Token> {
        let c = self.advance()?;
        let token = match c {
            '(' => self.finalize_current_token(TokenType::LeftParen),
            ')' => self.finalize_current_token(TokenType::RightParen),
            '{' => self.finalize_current_token(TokenType::LeftBrace),
            '}' => self.finalize_current_token(TokenType::RightBrace),
            ',' => self.finalize_current_token(TokenType::Comma),
            '.' => self.finalize_current_token(TokenType::Dot),
            '-' => self.finalize_current_token(TokenType::Minus),
            '+' => self.finalize_current_token(TokenType::Plus),
            ';' => self.finalize_current_token(TokenType::Semicolon),
            '*' => self.finalize_current_token(TokenType::Star),
            '?' => self.finalize_current_token(TokenType::Question),
            ':' => self.finalize_current_token(TokenType::Colon),
            '!' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::BangEqual)
                } else {
                    self.finalize_current_token(TokenType::Bang)
                }
            }
            '=' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::EqualEqual)
                } else {
                    self.finalize_current_token(TokenType::Equal)
                }
            }
            '<' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::LessEqual)
                } else {
                    self.finalize_current_token(TokenType::Less)
                }
            }
            '>' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::GreaterEqual)
                } else {
                    self.finalize_current_token(TokenType::Greater)
                }
            }
            '/' => {
                if self.advance_on_match('/') {
                    // Eat the entire line comment.
                    self.advance_until('\n');
                    self.current_token_buffer.clear();
                    self.scan_token()?
                } else if self.advance_on_match('*') {
                    self.comment_depth = 1;
                    loop {
                        match self.advance() {
                            None => {
                                return Some(
                                    self.finalize_error_token(Some("Unterminated block comment")),
                                );
                            }
                            Some('/') if self.peek() == Some(&'*') => {
                                self.advance();
                                self.comment_depth += 1;
                            }
                            Some('*') if self.peek() == Some(&'/') => {
                                self.advance();
                                self.comment_depth -= 1;
                                if self.comment_depth == 0 {
                                    break;
                                }
                            }
                            Some(_) => {}
                        }
                    }
                    self.current_token_buffer.clear();
                    self.scan_token()?
                } else {
                    self.finalize_current_token(TokenType::Slash)
                }
            }
            '"' => {
                self.advance_until('"');
                if self.is_at_end() {
                    return Some(self.finalize_error_token(Some("Unterminated string")));
                }
                // Eat the closing `"`.
                self.advance();
                let lexeme = self.finalize_buffer_into_lexeme();
                let literal = lexeme.trim_matches('"').to_string();
                Token {
                    ty: TokenType::String(literal),
                    lexeme,
                    line: self.current_line,
                }
            }
            d if d.is_ascii_digit() => {
                self.advance_while_true(|c| c.is_ascii_digit());
                // Two-step lookahead: the `.` itself, then the character past it.
                // We only want to consume the `.` when it is followed by a digit -
                // a bare trailing `.` belongs to whatever comes next (e.g. a call).
                if self.peek() == Some(&'.') {
                    match self.peek() {
                        Some(c) if c.is_ascii_digit() => {
                            self.advance();
                            self.advance_while_true(|c| c.is_ascii_digit());
                        }
                        _ => self.source.reset_peek(),
                    }
                } else {
                    self.source.reset_peek();
                }
                let lexeme = self.finalize_buffer_into_lexeme();
                match f64::from_str(&lexeme) {
                    Ok(f) => Token {
                        ty: TokenType::Number(f),
                        lexeme,
                        line: self.current_line,
                    },
                    Err(_) => self.finalize_error_token(Some("Failed to parse number")),
                }
            }
            c => {
                if Self::is_alpha(&c) {
                    self.advance_while_true(|c| Self::is_alpha(c) || c.is_ascii_digit());
                    let lexeme = self.finalize_buffer_into_lexeme();
                    match self.keywords.get(&lexeme) {
                        None => Token {
                            ty: TokenType::Identifier,
                            lexeme,
                            line: self.current_line,
                        },
                        Some(ty) => Token {
                            ty: ty.clone(),
                            lexeme,
                            line: self.current_line,
                        },
                    }
                } else if Self::is_trivia(&c) {
                    self.advance_while_true(Self::is_trivia);
                    self.current_token_buffer.clear();
                    self.scan_token()?
                } else {
                    self.finalize_error_token(Some("Unexpected character"))
                }
            }
        };
        Some(token)
    }

    fn is_alpha(c: &char) -> bool {
        c.is_ascii_alphanumeric() || c == &'_'
    }

    fn finalize_error_token(&mut self, error_msg: Option<&'static str>) -> Token {
        self.finalize_current_token(TokenType::SyntaxError { error_msg })
    }

    fn finalize_current_token(&mut self, ty: TokenType) -> Token {
        let lexeme = self.finalize_buffer_into_lexeme();
        Token {
            ty,
            lexeme,
            line: self.current_line,
        }
    }

    fn finalize_buffer_into_lexeme(&mut self) -> String {
        String::from_iter(self.current_token_buffer.drain(..))
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.source.next()?;
        if char == '\n' {
            self.current_line += 1;
        }
        self.current_token_buffer.push(char);
        Some(char)
    }

    // "Trivia" characters do not alter the functional interpretation of the
    // scanned code: whitespace, tabs and new lines.
    fn is_trivia(c: &char) -> bool {
        matches!(c, ' ' | '\r' | '\t' | '\n')
    }

    fn advance_on_match(&mut self, c: char) -> bool {
        if self.peek() == Some(&c) {
            self.advance();
            true
        } else {
            self.source.reset_peek();
            false
        }
    }

    fn advance_until(&mut self, c: char) {
        self.advance_while_true(|ch| ch != &c)
    }

    fn advance_while_true<F>(&mut self, f: F)
    where
        F: Fn(&char) -> bool,
    {
        loop {
            let next = self.peek();
            if let Some(next) = next {
                if f(next) {
                    self.advance();
                    continue;
                }
            }
            break;
        }
        self.source.reset_peek();
    }

    fn peek(&mut self) -> Option<&char> {
        self.source.peek()
    }

    fn is_at_end(&mut self) -> bool {
        let b = self.peek().is_none();
        self.source.reset_peek();
        b
    }
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(TokenDiscriminant))]
#[strum_discriminants(derive(Hash))]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Question,
    Colon,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String(String),
    Number(f64),

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Break,
    Continue,
    Trait,
    Use,

    // Tokens that do not affect the functional meaning of the scanned code.
    Trivia,

    // Emitted when the scanner cannot make progress; carries an optional
    // human-readable explanation of what it expected instead.
    SyntaxError { error_msg: Option<&'static str> },

    Eof,
}

impl TokenType {
    pub fn string(self) -> Option<String> {
        match self {
            TokenType::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn number(self) -> Option<f64> {
        match self {
            TokenType::Number(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    ty: TokenType,
    lexeme: String,
    line: u64,
}

impl Token {
    pub fn eof(line: u64) -> Self {
        Self {
            ty: TokenType::Eof,
            lexeme: String::new(),
            line,
        }
    }

    pub fn discriminant(&self) -> TokenDiscriminant {
        TokenDiscriminant::from(&self.ty)
    }

    pub fn ty(&self) -> TokenType {
        self.ty.clone()
    }

    pub fn lexeme(&self) -> String {
        self.lexeme.clone()
    }

    pub fn line(&self) -> u64 {
        self.line
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {:?} {}", self.line, self.ty, self.lexeme)
    }
}

#[cfg(test)]
mod tests {
    use crate::scanner::{Scanner, Token, TokenType};

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source).collect()
    }

    #[test]
    fn an_empty_source_translates_into_an_empty_iterator() {
        let tokens = scan("");
        assert!(tokens.is_empty());
    }

    #[test]
    fn line_comments_are_skipped() {
        let tokens = scan("1 // this is a comment\n+ 2");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].ty(), TokenType::Number(1.0));
        assert_eq!(tokens[1].ty(), TokenType::Plus);
        assert_eq!(tokens[2].ty(), TokenType::Number(2.0));
    }

    #[test]
    fn nested_block_comments_are_skipped() {
        let tokens = scan("1 /* outer /* inner */ still outer */ + 2");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let tokens = scan("/* never closed");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].ty(), TokenType::SyntaxError { .. }));
    }

    #[test]
    fn numbers_with_fractional_parts_are_scanned() {
        let tokens = scan("12.65");
        assert_eq!(tokens[0].ty(), TokenType::Number(12.65));
    }

    #[test]
    fn a_trailing_dot_with_no_digits_is_not_consumed() {
        let tokens = scan("12.method()");
        assert_eq!(tokens[0].ty(), TokenType::Number(12.0));
        assert_eq!(tokens[1].discriminant(), super::TokenDiscriminant::Dot);
    }

    #[test]
    fn keywords_are_recognised() {
        let tokens = scan("break continue trait use");
        assert_eq!(tokens[0].ty(), TokenType::Break);
        assert_eq!(tokens[1].ty(), TokenType::Continue);
        assert_eq!(tokens[2].ty(), TokenType::Trait);
        assert_eq!(tokens[3].ty(), TokenType::Use);
    }

    #[test]
    fn newlines_increment_the_line_counter() {
        let tokens = scan("1\n2\n3");
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[2].line(), 3);
    }
}
