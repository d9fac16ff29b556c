use crate::{
    heading::Heading,
    lexer::{LexError, Move, Token, TokenKind, lex},
};
use knot_core::{Path, PathError, Point3, Segment};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("empty move string")]
    Empty,

    #[error(
        "move string must start with a magnitude, found '{letter}' at line {line}, column {column}"
    )]
    LeadingMove {
        line: usize,
        column: usize,
        letter: char,
    },

    #[error(
        "move string must end with a magnitude, found '{letter}' at line {line}, column {column}"
    )]
    TrailingMove {
        line: usize,
        column: usize,
        letter: char,
    },

    #[error("missing magnitude before '{letter}' at line {line}, column {column}")]
    MissingMagnitude {
        line: usize,
        column: usize,
        letter: char,
    },

    #[error("consecutive magnitudes at line {line}, column {column}")]
    ConsecutiveMagnitudes { line: usize, column: usize },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Parse a move string into a path with anchors set and control points at zero.
pub fn parse(input: &str) -> Result<Path, ParseError> {
    parse_tokens(lex(input))
}

/// Parse a path from a token iterator.
pub fn parse_tokens<I>(tokens: I) -> Result<Path, ParseError>
where
    I: IntoIterator<Item = Result<Token, LexError>>,
{
    let mut builder = PathBuilder::new();
    for token in tokens.into_iter() {
        builder.push(token?)?;
    }
    builder.finish()
}

/// Parsing context for one move string.
///
/// Holds the open segment's anchors, the pending magnitude and the heading
/// register. Each turn closes the open segment and starts the next one at
/// its end point; elevation changes only switch the heading.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    start: Point3,
    end: Point3,
    pending: Option<u64>,
    heading: Heading,
    segments: Vec<Segment>,
    seen_token: bool,
    last_move: Option<(Move, usize, usize)>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// End point of the segment still being built
    pub fn position(&self) -> Point3 {
        self.end
    }

    /// Segments closed so far
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn push(&mut self, token: Token) -> Result<(), ParseError> {
        let Token { kind, line, column } = token;
        let first = !self.seen_token;
        self.seen_token = true;

        match kind {
            TokenKind::Magnitude(value) => {
                if self.pending.is_some() {
                    return Err(ParseError::ConsecutiveMagnitudes { line, column });
                }
                self.pending = Some(value);
            }
            TokenKind::Move(mv) => {
                let Some(magnitude) = self.pending.take() else {
                    let letter = mv.letter();
                    return Err(if first {
                        ParseError::LeadingMove {
                            line,
                            column,
                            letter,
                        }
                    } else {
                        ParseError::MissingMagnitude {
                            line,
                            column,
                            letter,
                        }
                    });
                };
                self.advance(magnitude);
                self.heading = self.heading.apply(mv);
                if mv.is_turn() {
                    self.close_segment();
                }
                self.last_move = Some((mv, line, column));
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Path, ParseError> {
        if !self.seen_token {
            return Err(ParseError::Empty);
        }
        match self.pending.take() {
            Some(magnitude) => self.advance(magnitude),
            None => {
                // A token was seen and nothing is pending, so the last one was a move.
                let (mv, line, column) = self.last_move.ok_or(ParseError::Empty)?;
                return Err(ParseError::TrailingMove {
                    line,
                    column,
                    letter: mv.letter(),
                });
            }
        }
        self.close_segment();
        Ok(Path::new(self.segments)?)
    }

    fn advance(&mut self, magnitude: u64) {
        self.end += self.heading.step(magnitude as f64);
    }

    fn close_segment(&mut self) {
        self.segments.push(Segment::from_anchors(self.start, self.end));
        self.start = self.end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn anchors_follow_literal_moves() {
        let path = parse("2R1U1R2R1D1").unwrap();
        assert_eq!(
            path.anchors(),
            vec![
                p(0.0, 0.0, 0.0),
                p(2.0, 0.0, 0.0),
                p(2.0, -1.0, 1.0),
                p(0.0, -1.0, 1.0),
                p(0.0, 0.0, 0.0),
            ]
        );
        assert!(path.is_closed(1e-9));
    }

    #[test]
    fn segment_count_is_turns_plus_one() {
        assert_eq!(parse("5").unwrap().len(), 1);
        assert_eq!(parse("1U1D1").unwrap().len(), 1);
        assert_eq!(parse("1R1U1L1D1").unwrap().len(), 3);
        assert_eq!(parse("1R1R1R1").unwrap().len(), 4);
    }

    #[test]
    fn elevation_does_not_open_a_segment() {
        let path = parse("1R1U1L1D1").unwrap();
        assert_eq!(
            path.anchors(),
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, -1.0, 1.0),
                p(2.0, -1.0, 0.0),
            ]
        );
    }

    #[test]
    fn control_points_start_at_zero() {
        let path = parse("3R2").unwrap();
        for seg in path.segments() {
            assert_eq!(seg.p1, Point3::ZERO);
            assert_eq!(seg.p2, Point3::ZERO);
        }
    }

    #[test]
    fn joints_are_shared() {
        let path = parse("3R5U2L4R1D2").unwrap();
        let segs = path.segments();
        for pair in segs.windows(2) {
            assert_eq!(pair[0].p3, pair[1].p0);
        }
        assert_eq!(path.end(), p(7.0, -6.0, 0.0));
    }

    #[test]
    fn rejects_leading_move() {
        let err = parse("R1").unwrap_err();
        assert!(matches!(
            err,
            ParseError::LeadingMove {
                line: 1,
                column: 1,
                letter: 'R'
            }
        ));
    }

    #[test]
    fn rejects_trailing_move() {
        let err = parse("1R1U1L1D").unwrap_err();
        assert!(matches!(
            err,
            ParseError::TrailingMove {
                line: 1,
                column: 8,
                letter: 'D'
            }
        ));
    }

    #[test]
    fn rejects_missing_magnitude() {
        let err = parse("1RL1").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingMagnitude {
                column: 3,
                letter: 'L',
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse("").unwrap_err(), ParseError::Empty));
        assert!(matches!(parse(" \n\t").unwrap_err(), ParseError::Empty));
    }

    #[test]
    fn rejects_foreign_characters() {
        let err = parse("1R2x1").unwrap_err();
        assert!(matches!(err, ParseError::Lex(LexError::UnexpectedChar { ch: 'x', .. })));
        assert_eq!(err.to_string(), "unexpected character 'x' at line 1, column 4");
    }

    #[test]
    fn rejects_whitespace_inside_a_line() {
        for input in ["1 2R3", "1\t R 1", "1R 1R1R1"] {
            let err = parse(input).unwrap_err();
            assert!(
                matches!(err, ParseError::Lex(LexError::UnexpectedChar { .. })),
                "{input:?}: {err}"
            );
        }

        // Trimmed line ends still join into one magnitude.
        let path = parse("  1R\n2 \n3R1  ").unwrap();
        assert_eq!(path.anchors()[2], p(1.0, -23.0, 0.0));
    }

    #[test]
    fn rejects_consecutive_magnitudes_from_tokens() {
        let tokens = [
            Token {
                kind: TokenKind::Magnitude(1),
                line: 1,
                column: 1,
            },
            Token {
                kind: TokenKind::Magnitude(2),
                line: 1,
                column: 2,
            },
        ];
        let err = parse_tokens(tokens.into_iter().map(Ok)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ConsecutiveMagnitudes { line: 1, column: 2 }
        ));
    }

    #[test]
    fn builder_exposes_progress() {
        let mut builder = PathBuilder::new();
        for token in lex("4R3U") {
            builder.push(token.unwrap()).unwrap();
        }
        assert_eq!(builder.segments().len(), 1);
        assert_eq!(builder.position(), p(4.0, -3.0, 0.0));
        assert_eq!(builder.heading().vertical(), Some(crate::Vertical::Up));
    }

    #[test]
    fn balanced_moves_close_the_loop() {
        // Net displacement is zero on every axis.
        for input in ["1R1R1R1", "4R2U3R4R2D3", "2L1L2L1", "2U1R2D1R2U1R2D1"] {
            let path = parse(input).unwrap();
            assert!(path.is_closed(1e-9), "{input} did not close");
        }
    }
}
