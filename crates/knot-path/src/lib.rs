//! Move-string tokenizer and direction state machine.

mod heading;
mod lexer;
mod parser;

pub use heading::{Axis, Compass, Heading, Vertical};
pub use lexer::{LexError, Lexer, MAX_MAGNITUDE, Move, Token, TokenKind, lex};
pub use parser::{ParseError, PathBuilder, parse, parse_tokens};
