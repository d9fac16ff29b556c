//! Line templates for text output.
//!
//! A template is literal text with brace placeholders. Each placeholder
//! selects one of four arguments: `{0}` is the control-point index and
//! `{1}`, `{2}`, `{3}` are its x, y and z coordinates. `{}` takes the next
//! argument in order and `{{` and `}}` produce literal braces.
//!
//! A placeholder may carry a format spec after a colon:
//! `[[fill]align][sign][0][width][.precision][type]`. Align is one of `<`,
//! `>`, `^` or `=` (pad after the sign), sign is `+`, `-` or a space, and
//! type is `f`/`F` (fixed), `e`/`E` (exponent), `g`/`G` (general) or `d`
//! (index only). Precision defaults to 6 and needs a float type.
//!
//! Without a type, numbers are written in their shortest round-trip form
//! (`1.0`, `-0.25`, `1e-05`, `8.881784197001252e-16`): positional for
//! decimal exponents from -4 to 15, scientific outside that range.

use knot_core::Point3;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TEMPLATE: &str = "{0} {1} {2} {3}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed '{{' at offset {offset}")]
    Unclosed { offset: usize },

    #[error("unmatched '}}' at offset {offset}")]
    UnmatchedClose { offset: usize },

    #[error("invalid field '{field}' at offset {offset}")]
    InvalidField { offset: usize, field: String },

    #[error("field {index} at offset {offset} is out of range (expected 0..=3)")]
    FieldOutOfRange { offset: usize, index: usize },

    #[error("cannot mix automatic '{{}}' and numbered fields (offset {offset})")]
    MixedNumbering { offset: usize },

    #[error("unsupported format spec '{spec}' at offset {offset}")]
    UnsupportedSpec { offset: usize, spec: String },
}

/// Template argument a placeholder refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Index,
    X,
    Y,
    Z,
}

impl Arg {
    fn from_position(index: usize) -> Option<Self> {
        match index {
            0 => Some(Arg::Index),
            1 => Some(Arg::X),
            2 => Some(Arg::Y),
            3 => Some(Arg::Z),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    Shortest,
    Fixed(usize),
    Exponent(usize),
    General(usize),
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Negative,
    Always,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spec {
    notation: Notation,
    uppercase: bool,
    sign: Sign,
    fill: char,
    align: Align,
    width: usize,
}

impl Spec {
    const PLAIN: Spec = Spec {
        notation: Notation::Shortest,
        uppercase: false,
        sign: Sign::Negative,
        fill: ' ',
        align: Align::Right,
        width: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field { arg: Arg, spec: Spec },
}

#[derive(Clone, Copy)]
enum Value {
    Index(usize),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Unknown,
    Auto(usize),
    Manual,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut numbering = Numbering::Unknown;
        let mut chars = source.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnmatchedClose { offset }),
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed { offset });
                    }

                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(parse_field(&body, offset, &mut numbering)?);
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    /// Render one line for control point `index`
    pub fn render(&self, index: usize, point: Point3) -> String {
        let mut out = String::new();
        self.render_into(&mut out, index, point);
        out
    }

    pub fn render_into(&self, out: &mut String, index: usize, point: Point3) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Field { arg, spec } => {
                    let value = match arg {
                        Arg::Index => Value::Index(index),
                        Arg::X => Value::Float(point.x),
                        Arg::Y => Value::Float(point.y),
                        Arg::Z => Value::Float(point.z),
                    };
                    write_field(out, value, spec);
                }
            }
        }
    }

    /// Arguments referenced by the template, in order of appearance
    pub fn args(&self) -> impl Iterator<Item = Arg> + '_ {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Field { arg, .. } => Some(*arg),
            Piece::Literal(_) => None,
        })
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            pieces: vec![
                Piece::Field {
                    arg: Arg::Index,
                    spec: Spec::PLAIN,
                },
                Piece::Literal(" ".to_string()),
                Piece::Field {
                    arg: Arg::X,
                    spec: Spec::PLAIN,
                },
                Piece::Literal(" ".to_string()),
                Piece::Field {
                    arg: Arg::Y,
                    spec: Spec::PLAIN,
                },
                Piece::Literal(" ".to_string()),
                Piece::Field {
                    arg: Arg::Z,
                    spec: Spec::PLAIN,
                },
            ],
        }
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_field(
    body: &str,
    offset: usize,
    numbering: &mut Numbering,
) -> Result<Piece, TemplateError> {
    let (field, spec) = match body.split_once(':') {
        Some((field, spec)) => (field, Some(spec)),
        None => (body, None),
    };

    let index = if field.is_empty() {
        let next = match *numbering {
            Numbering::Manual => return Err(TemplateError::MixedNumbering { offset }),
            Numbering::Unknown => 0,
            Numbering::Auto(next) => next,
        };
        *numbering = Numbering::Auto(next + 1);
        next
    } else {
        if matches!(*numbering, Numbering::Auto(_)) {
            return Err(TemplateError::MixedNumbering { offset });
        }
        *numbering = Numbering::Manual;
        if !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TemplateError::InvalidField {
                offset,
                field: field.to_string(),
            });
        }
        field.parse::<usize>().map_err(|_| TemplateError::InvalidField {
            offset,
            field: field.to_string(),
        })?
    };

    let arg =
        Arg::from_position(index).ok_or(TemplateError::FieldOutOfRange { offset, index })?;
    let spec = match spec {
        None | Some("") => Spec::PLAIN,
        Some(spec) => parse_spec(spec, arg).ok_or_else(|| TemplateError::UnsupportedSpec {
            offset,
            spec: spec.to_string(),
        })?,
    };
    Ok(Piece::Field { arg, spec })
}

fn parse_spec(spec: &str, arg: Arg) -> Option<Spec> {
    let chars: Vec<char> = spec.chars().collect();
    let align_at = |i: usize| chars.get(i).copied().and_then(parse_align);
    let mut parsed = Spec::PLAIN;
    let mut i = 0;

    let (explicit_fill, explicit_align) = match (chars.first(), align_at(1), align_at(0)) {
        (Some(&fill), Some(align), _) => {
            parsed.fill = fill;
            parsed.align = align;
            i = 2;
            (true, true)
        }
        (_, None, Some(align)) => {
            parsed.align = align;
            i = 1;
            (false, true)
        }
        _ => (false, false),
    };

    if let Some(sign) = chars.get(i).copied().and_then(parse_sign) {
        parsed.sign = sign;
        i += 1;
    }

    if chars.get(i) == Some(&'0') {
        i += 1;
        if !explicit_fill {
            parsed.fill = '0';
        }
        if !explicit_align {
            parsed.align = Align::AfterSign;
        }
    }

    let (width, next) = take_number(&chars, i)?;
    parsed.width = width.unwrap_or(0);
    i = next;

    let mut precision = None;
    if chars.get(i) == Some(&'.') {
        let (digits, next) = take_number(&chars, i + 1)?;
        precision = Some(digits?);
        i = next;
    }

    let kind = chars.get(i).copied();
    if kind.is_some() {
        i += 1;
    }
    if i != chars.len() {
        return None;
    }

    let digits = precision.unwrap_or(6);
    parsed.notation = match kind {
        None if precision.is_none() => Notation::Shortest,
        Some('f' | 'F') => Notation::Fixed(digits),
        Some('e' | 'E') => Notation::Exponent(digits),
        Some('g' | 'G') => Notation::General(digits),
        Some('d') if precision.is_none() && arg == Arg::Index => Notation::Integer,
        _ => return None,
    };
    parsed.uppercase = matches!(kind, Some('F' | 'E' | 'G'));
    Some(parsed)
}

fn parse_align(ch: char) -> Option<Align> {
    match ch {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

fn parse_sign(ch: char) -> Option<Sign> {
    match ch {
        '-' => Some(Sign::Negative),
        '+' => Some(Sign::Always),
        ' ' => Some(Sign::Space),
        _ => None,
    }
}

// Digit run starting at `start`: `None` when there is none, and the outer
// `None` when it overflows.
fn take_number(chars: &[char], start: usize) -> Option<(Option<usize>, usize)> {
    let end = chars[start.min(chars.len())..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |n| start + n);
    if end <= start {
        return Some((None, start));
    }
    let text: String = chars[start..end].iter().collect();
    Some((Some(text.parse().ok()?), end))
}

fn write_field(out: &mut String, value: Value, spec: &Spec) {
    let (negative, body) = match value {
        Value::Index(index) if matches!(spec.notation, Notation::Shortest | Notation::Integer) => {
            (false, index.to_string())
        }
        Value::Index(index) => float_body(index as f64, spec),
        Value::Float(value) => float_body(value, spec),
    };
    let sign = match (negative, spec.sign) {
        (true, _) => "-",
        (false, Sign::Always) => "+",
        (false, Sign::Space) => " ",
        (false, Sign::Negative) => "",
    };

    let pad = spec.width.saturating_sub(sign.len() + body.chars().count());
    let (before, after) = match spec.align {
        Align::Left => (0, pad),
        Align::Right | Align::AfterSign => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };
    if spec.align == Align::AfterSign {
        out.push_str(sign);
        out.extend(std::iter::repeat_n(spec.fill, before));
    } else {
        out.extend(std::iter::repeat_n(spec.fill, before));
        out.push_str(sign);
    }
    out.push_str(&body);
    out.extend(std::iter::repeat_n(spec.fill, after));
}

// Sign flag and the unsigned text of `value`.
fn float_body(value: f64, spec: &Spec) -> (bool, String) {
    if value.is_nan() {
        return (false, cased("nan".to_string(), spec.uppercase));
    }
    let magnitude = value.abs();
    let body = if magnitude.is_infinite() {
        "inf".to_string()
    } else {
        match spec.notation {
            Notation::Shortest | Notation::Integer => shortest(magnitude),
            Notation::Fixed(precision) => format!("{magnitude:.precision$}"),
            Notation::Exponent(precision) => {
                with_signed_exponent(&format!("{magnitude:.precision$e}"))
            }
            Notation::General(precision) => general(magnitude, precision),
        }
    };
    (value.is_sign_negative(), cased(body, spec.uppercase))
}

fn cased(text: String, uppercase: bool) -> String {
    if uppercase {
        text.to_ascii_uppercase()
    } else {
        text
    }
}

// ryu stays positional down to 1e-5; round-trip repr goes scientific below 1e-4.
fn shortest(magnitude: f64) -> String {
    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(magnitude);
    match text.strip_prefix("0.0000") {
        Some(digits) => {
            let (lead, rest) = digits.split_at(1);
            if rest.is_empty() {
                format!("{lead}e-05")
            } else {
                format!("{lead}.{rest}e-05")
            }
        }
        None => with_signed_exponent(text),
    }
}

// Scientific when the rounded exponent is below -4 or at least the
// precision, positional otherwise; trailing zeros are dropped either way.
fn general(magnitude: f64, precision: usize) -> String {
    let precision = precision.max(1);
    let scientific = format!("{magnitude:.digits$e}", digits = precision - 1);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exp: i64 = exponent.parse().unwrap_or(0);

    if exp < -4 || exp >= precision as i64 {
        with_signed_exponent(&format!("{}e{exponent}", trim_zeros(mantissa)))
    } else {
        let decimals = (precision as i64 - 1 - exp) as usize;
        trim_zeros(&format!("{magnitude:.decimals$}")).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

// Writes `1.5e-7` as `1.5e-07` and `2e16` as `2e+16`.
fn with_signed_exponent(text: &str) -> String {
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text.to_string();
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
