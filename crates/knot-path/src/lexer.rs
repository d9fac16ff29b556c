use serde::Serialize;
use thiserror::Error;

/// Largest magnitude that converts to `f64` without rounding (2^53)
pub const MAX_MAGNITUDE: u64 = 1 << 53;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "value")]
pub enum TokenKind {
    Magnitude(u64),
    Move(Move),
}

/// Move letters: two turns in the horizontal plane and two elevation changes
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Move {
    Right,
    Left,
    Up,
    Down,
}

impl Move {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'R' => Some(Move::Right),
            'L' => Some(Move::Left),
            'U' => Some(Move::Up),
            'D' => Some(Move::Down),
            _ => None,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Move::Right => 'R',
            Move::Left => 'L',
            Move::Up => 'U',
            Move::Down => 'D',
        }
    }

    /// Whether this move closes the current segment
    pub const fn is_turn(self) -> bool {
        matches!(self, Move::Right | Move::Left)
    }
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedChar {
        line: usize,
        column: usize,
        ch: char,
    },

    #[error("invalid magnitude '{raw}' at line {line}, column {column}")]
    InvalidMagnitude {
        line: usize,
        column: usize,
        raw: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error(
        "magnitude {value} at line {line}, column {column} exceeds {max}",
        max = MAX_MAGNITUDE
    )]
    MagnitudeOutOfRange {
        line: usize,
        column: usize,
        value: u64,
    },
}

pub fn lex(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

/// Tokenizer over a move string.
///
/// Each line is trimmed before it is read, so whitespace is only allowed at
/// the start or end of a line. Lines are joined without a separator: a digit
/// run split across a line break is still one magnitude. Whitespace inside a
/// line is an [`LexError::UnexpectedChar`].
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    // Nothing but whitespace seen on the current line so far.
    line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            line_start: true,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_start = true;
        } else {
            self.column += 1;
            if !ch.is_whitespace() {
                self.line_start = false;
            }
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn pos(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Whether the whitespace under the cursor is trimmed away with its line
    fn at_line_boundary(&self) -> bool {
        self.line_start
            || self
                .chars
                .clone()
                .take_while(|&c| c != '\n')
                .all(char::is_whitespace)
    }

    fn magnitude(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let mut raw = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                raw.push(ch);
            } else if !(ch.is_whitespace() && self.at_line_boundary()) {
                break;
            }
            self.bump();
        }

        match raw.parse::<u64>() {
            Ok(value) if value > MAX_MAGNITUDE => Err(LexError::MagnitudeOutOfRange {
                line,
                column,
                value,
            }),
            Ok(value) => Ok(Token {
                kind: TokenKind::Magnitude(value),
                line,
                column,
            }),
            Err(source) => Err(LexError::InvalidMagnitude {
                line,
                column,
                raw,
                source,
            }),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.peek() {
            let (line, column) = self.pos();

            if ch.is_whitespace() && self.at_line_boundary() {
                self.bump();
                continue;
            }

            if ch.is_ascii_digit() {
                return Some(self.magnitude(line, column));
            }

            if let Some(mv) = Move::from_char(ch) {
                self.bump();
                return Some(Ok(Token {
                    kind: TokenKind::Move(mv),
                    line,
                    column,
                }));
            }

            self.bump();
            return Some(Err(LexError::UnexpectedChar { line, column, ch }));
        }

        None
    }
}
