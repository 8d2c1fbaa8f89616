use std::fmt::Write as _;

use crate::error::{PathErrorKind, PathParseError};
use crate::scan::{self, Cursor};
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcSize {
    Large,
    Short,
}

/// Sweep flag `1` is counterclockwise and `0` is clockwise, measured with angles
/// increasing from +x toward +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    Clockwise,
    Counterclockwise,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticalArc {
    pub rx: f64,
    pub ry: f64,
    pub tilt_degrees: f64,
    pub size: ArcSize,
    pub sweep: SweepDirection,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathToken {
    MoveTo {
        position: Position,
        to: Point,
    },
    LineTo {
        position: Position,
        to: Point,
    },
    HorizontalLineTo {
        position: Position,
        x: f64,
    },
    VerticalLineTo {
        position: Position,
        y: f64,
    },
    CubicTo {
        position: Position,
        c1: Point,
        c2: Point,
        to: Point,
    },
    SmoothCubicTo {
        position: Position,
        c2: Point,
        to: Point,
    },
    QuadraticTo {
        position: Position,
        c: Point,
        to: Point,
    },
    SmoothQuadraticTo {
        position: Position,
        to: Point,
    },
    ArcTo {
        position: Position,
        arc: EllipticalArc,
    },
    Close,
    /// Failure reason; only produced by [`PathParser::tokens_lossy`].
    Bad(String),
}

impl PathToken {
    pub fn position(&self) -> Option<Position> {
        match self {
            PathToken::MoveTo { position, .. }
            | PathToken::LineTo { position, .. }
            | PathToken::HorizontalLineTo { position, .. }
            | PathToken::VerticalLineTo { position, .. }
            | PathToken::CubicTo { position, .. }
            | PathToken::SmoothCubicTo { position, .. }
            | PathToken::QuadraticTo { position, .. }
            | PathToken::SmoothQuadraticTo { position, .. }
            | PathToken::ArcTo { position, .. } => Some(*position),
            PathToken::Close | PathToken::Bad(_) => None,
        }
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, PathToken::Bad(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    SmoothCubic,
    Quadratic,
    SmoothQuadratic,
    Arc,
}

impl Operand {
    fn from_letter(ch: char) -> Option<(Self, Position)> {
        let position = if ch.is_ascii_uppercase() {
            Position::Absolute
        } else {
            Position::Relative
        };
        let operand = match ch.to_ascii_lowercase() {
            'm' => Operand::Move,
            'l' => Operand::Line,
            'h' => Operand::Horizontal,
            'v' => Operand::Vertical,
            'c' => Operand::Cubic,
            's' => Operand::SmoothCubic,
            'q' => Operand::Quadratic,
            't' => Operand::SmoothQuadratic,
            'a' => Operand::Arc,
            _ => return None,
        };
        Some((operand, position))
    }

    fn arity(self) -> usize {
        match self {
            Operand::Horizontal | Operand::Vertical => 1,
            Operand::Move | Operand::Line | Operand::SmoothQuadratic => 2,
            Operand::SmoothCubic | Operand::Quadratic => 4,
            Operand::Cubic => 6,
            Operand::Arc => 7,
        }
    }

    fn letter(self, position: Position) -> char {
        let ch = match self {
            Operand::Move => 'm',
            Operand::Line => 'l',
            Operand::Horizontal => 'h',
            Operand::Vertical => 'v',
            Operand::Cubic => 'c',
            Operand::SmoothCubic => 's',
            Operand::Quadratic => 'q',
            Operand::SmoothQuadratic => 't',
            Operand::Arc => 'a',
        };
        match position {
            Position::Absolute => ch.to_ascii_uppercase(),
            Position::Relative => ch,
        }
    }

    // A bare parameter run repeats the previous operand, except that a move implies a line.
    fn implied(self) -> Self {
        match self {
            Operand::Move => Operand::Line,
            other => other,
        }
    }
}

fn is_close(ch: char) -> bool {
    ch == 'z' || ch == 'Z'
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == ','
}

fn starts_number(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.')
}

// Parameters for one token, accumulated scalar by scalar.
struct TokenBuilder {
    operand: Operand,
    position: Position,
    params: Vec<f64>,
    current: String,
    param_start: usize,
    seen_digit: bool,
    seen_period: bool,
    seen_exponent: bool,
}

impl TokenBuilder {
    fn new(operand: Operand, position: Position, offset: usize) -> Self {
        Self {
            operand,
            position,
            params: Vec::with_capacity(operand.arity()),
            current: String::new(),
            param_start: offset,
            seen_digit: false,
            seen_period: false,
            seen_exponent: false,
        }
    }

    fn is_full(&self) -> bool {
        self.current.is_empty() && self.params.len() == self.operand.arity()
    }

    fn in_flag_slot(&self) -> bool {
        self.operand == Operand::Arc && self.current.is_empty() && matches!(self.params.len(), 3 | 4)
    }

    fn begin(&mut self, ch: char, offset: usize) {
        self.current.clear();
        self.current.push(ch);
        self.param_start = offset;
        self.seen_digit = ch.is_ascii_digit();
        self.seen_period = ch == '.';
        self.seen_exponent = false;
    }

    fn bad_parameter(&self) -> PathParseError {
        PathParseError::new(
            PathErrorKind::BadParameter {
                index: self.params.len(),
                text: self.current.clone(),
            },
            self.param_start,
        )
    }

    fn finish_param(&mut self) -> Result<(), PathParseError> {
        if self.current.is_empty() {
            return Ok(());
        }
        // Flags are read one scalar at a time; a run that reaches a flag slot is never a flag.
        if self.operand == Operand::Arc && matches!(self.params.len(), 3 | 4) {
            return Err(self.bad_parameter());
        }
        let dangling_exponent = self
            .current
            .trim_end_matches(['+', '-'])
            .ends_with(['e', 'E']);
        if !self.seen_digit || dangling_exponent {
            return Err(self.bad_parameter());
        }
        let value = self
            .current
            .parse::<f64>()
            .map_err(|_| self.bad_parameter())?;
        self.params.push(value);
        self.current.clear();
        Ok(())
    }

    fn too_few(&self, offset: usize) -> PathParseError {
        PathParseError::new(
            PathErrorKind::TooFewParameters {
                operand: self.operand.letter(self.position),
                expected: self.operand.arity(),
                found: self.params.len(),
            },
            offset,
        )
    }

    // Feed one scalar. Returns `false` when the scalar belongs to whatever follows this token.
    fn feed(&mut self, ch: char, offset: usize) -> Result<bool, PathParseError> {
        if self.in_flag_slot() {
            return match ch {
                '0' | '1' => {
                    self.params.push(if ch == '1' { 1.0 } else { 0.0 });
                    Ok(true)
                }
                _ if is_separator(ch) => Ok(true),
                _ if starts_number(ch) => Err(PathParseError::new(
                    PathErrorKind::BadParameter {
                        index: self.params.len(),
                        text: ch.to_string(),
                    },
                    offset,
                )),
                _ if is_close(ch) || Operand::from_letter(ch).is_some() => {
                    Err(self.too_few(offset))
                }
                _ => Err(PathParseError::new(
                    PathErrorKind::UnexpectedCharacter(ch),
                    offset,
                )),
            };
        }

        match ch {
            _ if ch.is_ascii_digit() => {
                if self.current.is_empty() {
                    self.begin(ch, offset);
                } else {
                    self.current.push(ch);
                    self.seen_digit = true;
                }
            }
            '.' => {
                if self.seen_period || self.seen_exponent {
                    self.finish_param()?;
                    if self.is_full() {
                        return Ok(false);
                    }
                    self.begin(ch, offset);
                } else if self.current.is_empty() {
                    self.begin(ch, offset);
                } else {
                    self.current.push(ch);
                    self.seen_period = true;
                }
            }
            'e' | 'E' => {
                if self.current.is_empty() || self.seen_exponent {
                    self.current.push(ch);
                    return Err(self.bad_parameter());
                }
                self.current.push(ch);
                self.seen_exponent = true;
            }
            '+' | '-' => {
                if self.current.ends_with(['e', 'E']) {
                    self.current.push(ch);
                } else if self.current.is_empty() {
                    self.begin(ch, offset);
                } else if self.seen_digit {
                    self.finish_param()?;
                    if self.is_full() {
                        return Ok(false);
                    }
                    self.begin(ch, offset);
                } else {
                    self.current.push(ch);
                    return Err(self.bad_parameter());
                }
            }
            _ if is_separator(ch) => {
                self.finish_param()?;
            }
            _ if is_close(ch) || Operand::from_letter(ch).is_some() => {
                self.finish_param()?;
                if self.is_full() {
                    return Ok(false);
                }
                return Err(self.too_few(offset));
            }
            _ => {
                return Err(PathParseError::new(
                    PathErrorKind::UnexpectedCharacter(ch),
                    offset,
                ));
            }
        }
        Ok(true)
    }

    fn build(&self) -> PathToken {
        let p = &self.params;
        let position = self.position;
        let at = |i: usize| Point::new(p[i], p[i + 1]);
        match self.operand {
            Operand::Move => PathToken::MoveTo { position, to: at(0) },
            Operand::Line => PathToken::LineTo { position, to: at(0) },
            Operand::Horizontal => PathToken::HorizontalLineTo { position, x: p[0] },
            Operand::Vertical => PathToken::VerticalLineTo { position, y: p[0] },
            Operand::Cubic => PathToken::CubicTo {
                position,
                c1: at(0),
                c2: at(2),
                to: at(4),
            },
            Operand::SmoothCubic => PathToken::SmoothCubicTo {
                position,
                c2: at(0),
                to: at(2),
            },
            Operand::Quadratic => PathToken::QuadraticTo {
                position,
                c: at(0),
                to: at(2),
            },
            Operand::SmoothQuadratic => PathToken::SmoothQuadraticTo { position, to: at(0) },
            Operand::Arc => PathToken::ArcTo {
                position,
                arc: EllipticalArc {
                    rx: p[0],
                    ry: p[1],
                    tilt_degrees: p[2],
                    size: if p[3] == 1.0 {
                        ArcSize::Large
                    } else {
                        ArcSize::Short
                    },
                    sweep: if p[4] == 1.0 {
                        SweepDirection::Counterclockwise
                    } else {
                        SweepDirection::Clockwise
                    },
                    to: at(5),
                },
            },
        }
    }
}

enum State {
    LookingForFirstOperand,
    LookingForOperand,
    BuildingToken(TokenBuilder),
}

/// Tokenizer for SVG path data.
#[derive(Debug, Clone, Copy)]
pub struct PathParser<'a> {
    source: &'a str,
}

impl<'a> PathParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> Result<Vec<PathToken>, PathParseError> {
        let (tokens, failure) = self.run();
        match failure {
            Some(err) => Err(err),
            None => Ok(tokens),
        }
    }

    /// Tokens read before the first failure, followed by a `Bad` token describing it.
    pub fn tokens_lossy(&self) -> Vec<PathToken> {
        let (mut tokens, failure) = self.run();
        if let Some(err) = failure {
            tokens.push(PathToken::Bad(err.describe(self.source)));
        }
        tokens
    }

    fn run(&self) -> (Vec<PathToken>, Option<PathParseError>) {
        let buf = scan::scalars(self.source);
        let mut tokens = Vec::new();
        let failure = Self::tokenize(&buf, &mut tokens).err();
        (tokens, failure)
    }

    fn tokenize(buf: &[char], tokens: &mut Vec<PathToken>) -> Result<(), PathParseError> {
        let mut cursor = Cursor::new(buf)?;
        let mut state = State::LookingForFirstOperand;
        // Operand a bare parameter run continues; `None` at the start and after a close.
        let mut previous: Option<(Operand, Position)> = None;

        while let Some(ch) = cursor.peek() {
            let offset = cursor.position();
            match &mut state {
                State::LookingForFirstOperand => {
                    if ch.is_whitespace() {
                        cursor.advance()?;
                        continue;
                    }
                    match Operand::from_letter(ch) {
                        Some((Operand::Move, position)) => {
                            state = State::BuildingToken(TokenBuilder::new(
                                Operand::Move,
                                position,
                                offset,
                            ));
                            cursor.advance()?;
                        }
                        Some(_) => {
                            return Err(PathParseError::new(
                                PathErrorKind::MissingMoveAtStart,
                                offset,
                            ));
                        }
                        None if is_close(ch) => {
                            return Err(PathParseError::new(
                                PathErrorKind::MissingMoveAtStart,
                                offset,
                            ));
                        }
                        None => {
                            return Err(PathParseError::new(
                                PathErrorKind::UnexpectedCharacter(ch),
                                offset,
                            ));
                        }
                    }
                }
                State::LookingForOperand => {
                    if is_separator(ch) {
                        cursor.advance()?;
                    } else if is_close(ch) {
                        tokens.push(PathToken::Close);
                        previous = None;
                        cursor.advance()?;
                    } else if let Some((operand, position)) = Operand::from_letter(ch) {
                        state =
                            State::BuildingToken(TokenBuilder::new(operand, position, offset));
                        cursor.advance()?;
                    } else if starts_number(ch) {
                        let Some((operand, position)) = previous else {
                            return Err(PathParseError::new(
                                PathErrorKind::MissingMoveAtStart,
                                offset,
                            ));
                        };
                        // Reprocess this scalar as the first parameter of the implied token.
                        state = State::BuildingToken(TokenBuilder::new(
                            operand.implied(),
                            position,
                            offset,
                        ));
                    } else {
                        return Err(PathParseError::new(
                            PathErrorKind::UnexpectedCharacter(ch),
                            offset,
                        ));
                    }
                }
                State::BuildingToken(builder) => {
                    if builder.feed(ch, offset)? {
                        cursor.advance()?;
                    }
                    if builder.is_full() {
                        tokens.push(builder.build());
                        previous = Some((builder.operand, builder.position));
                        state = State::LookingForOperand;
                    }
                }
            }
        }

        match state {
            State::LookingForFirstOperand => Err(PathParseError::new(
                PathErrorKind::NoOperands,
                buf.len(),
            )),
            State::LookingForOperand => Ok(()),
            State::BuildingToken(mut builder) => {
                builder.finish_param()?;
                if !builder.is_full() {
                    return Err(builder.too_few(buf.len()));
                }
                tokens.push(builder.build());
                Ok(())
            }
        }
    }
}

pub fn parse_svg_path(source: &str) -> Result<Vec<PathToken>, PathParseError> {
    PathParser::new(source).tokens()
}

/// Rewrite every token in absolute coordinates; horizontal and vertical lines become lines.
pub fn to_absolute(tokens: &[PathToken]) -> Vec<PathToken> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut current = Point::ORIGIN;
    let mut subpath_start = Point::ORIGIN;
    let absolute = Position::Absolute;

    for token in tokens {
        let base = match token.position() {
            Some(Position::Relative) => current,
            _ => Point::ORIGIN,
        };
        let abs = |p: Point| p.offset(base.x, base.y);
        let rewritten = match token {
            PathToken::MoveTo { to, .. } => {
                let to = abs(*to);
                subpath_start = to;
                PathToken::MoveTo { position: absolute, to }
            }
            PathToken::LineTo { to, .. } => PathToken::LineTo {
                position: absolute,
                to: abs(*to),
            },
            PathToken::HorizontalLineTo { x, .. } => PathToken::LineTo {
                position: absolute,
                to: Point::new(base.x + x, current.y),
            },
            PathToken::VerticalLineTo { y, .. } => PathToken::LineTo {
                position: absolute,
                to: Point::new(current.x, base.y + y),
            },
            PathToken::CubicTo { c1, c2, to, .. } => PathToken::CubicTo {
                position: absolute,
                c1: abs(*c1),
                c2: abs(*c2),
                to: abs(*to),
            },
            PathToken::SmoothCubicTo { c2, to, .. } => PathToken::SmoothCubicTo {
                position: absolute,
                c2: abs(*c2),
                to: abs(*to),
            },
            PathToken::QuadraticTo { c, to, .. } => PathToken::QuadraticTo {
                position: absolute,
                c: abs(*c),
                to: abs(*to),
            },
            PathToken::SmoothQuadraticTo { to, .. } => PathToken::SmoothQuadraticTo {
                position: absolute,
                to: abs(*to),
            },
            PathToken::ArcTo { arc, .. } => PathToken::ArcTo {
                position: absolute,
                arc: EllipticalArc {
                    to: abs(arc.to),
                    ..*arc
                },
            },
            PathToken::Close => PathToken::Close,
            PathToken::Bad(reason) => PathToken::Bad(reason.clone()),
        };

        match &rewritten {
            PathToken::MoveTo { to, .. }
            | PathToken::LineTo { to, .. }
            | PathToken::CubicTo { to, .. }
            | PathToken::SmoothCubicTo { to, .. }
            | PathToken::QuadraticTo { to, .. }
            | PathToken::SmoothQuadraticTo { to, .. } => current = *to,
            PathToken::ArcTo { arc, .. } => current = arc.to,
            PathToken::Close => current = subpath_start,
            _ => {}
        }
        out.push(rewritten);
    }
    out
}

/// Serialize tokens back to path data. `Bad` tokens are dropped.
pub fn tokens_to_string(tokens: &[PathToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        let letter = |operand: Operand| match token.position() {
            Some(position) => operand.letter(position),
            None => operand.letter(Position::Absolute),
        };
        let before = out.len();
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = match token {
            PathToken::MoveTo { to, .. } => {
                write!(out, "{}{} {}", letter(Operand::Move), to.x, to.y)
            }
            PathToken::LineTo { to, .. } => {
                write!(out, "{}{} {}", letter(Operand::Line), to.x, to.y)
            }
            PathToken::HorizontalLineTo { x, .. } => {
                write!(out, "{}{}", letter(Operand::Horizontal), x)
            }
            PathToken::VerticalLineTo { y, .. } => {
                write!(out, "{}{}", letter(Operand::Vertical), y)
            }
            PathToken::CubicTo { c1, c2, to, .. } => write!(
                out,
                "{}{} {} {} {} {} {}",
                letter(Operand::Cubic),
                c1.x,
                c1.y,
                c2.x,
                c2.y,
                to.x,
                to.y
            ),
            PathToken::SmoothCubicTo { c2, to, .. } => write!(
                out,
                "{}{} {} {} {}",
                letter(Operand::SmoothCubic),
                c2.x,
                c2.y,
                to.x,
                to.y
            ),
            PathToken::QuadraticTo { c, to, .. } => write!(
                out,
                "{}{} {} {} {}",
                letter(Operand::Quadratic),
                c.x,
                c.y,
                to.x,
                to.y
            ),
            PathToken::SmoothQuadraticTo { to, .. } => {
                write!(out, "{}{} {}", letter(Operand::SmoothQuadratic), to.x, to.y)
            }
            PathToken::ArcTo { arc, .. } => write!(
                out,
                "{}{} {} {} {} {} {} {}",
                letter(Operand::Arc),
                arc.rx,
                arc.ry,
                arc.tilt_degrees,
                u8::from(arc.size == ArcSize::Large),
                u8::from(arc.sweep == SweepDirection::Counterclockwise),
                arc.to.x,
                arc.to.y
            ),
            PathToken::Close => write!(out, "Z"),
            PathToken::Bad(_) => {
                out.truncate(before);
                Ok(())
            }
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[PathToken]) -> Vec<&'static str> {
        tokens
            .iter()
            .map(|t| match t {
                PathToken::MoveTo { .. } => "M",
                PathToken::LineTo { .. } => "L",
                PathToken::HorizontalLineTo { .. } => "H",
                PathToken::VerticalLineTo { .. } => "V",
                PathToken::CubicTo { .. } => "C",
                PathToken::SmoothCubicTo { .. } => "S",
                PathToken::QuadraticTo { .. } => "Q",
                PathToken::SmoothQuadraticTo { .. } => "T",
                PathToken::ArcTo { .. } => "A",
                PathToken::Close => "Z",
                PathToken::Bad(_) => "!",
            })
            .collect()
    }

    fn err_kind(source: &str) -> PathErrorKind {
        parse_svg_path(source).expect_err(source).kind
    }

    #[test]
    fn move_implies_following_lines() {
        let tokens = parse_svg_path("M0 0 10 10 20 20z").expect("parse");
        assert_eq!(kinds(&tokens), vec!["M", "L", "L", "Z"]);
        assert_eq!(
            tokens[2],
            PathToken::LineTo {
                position: Position::Absolute,
                to: Point::new(20.0, 20.0)
            }
        );
    }

    #[test]
    fn relative_move_implies_relative_line() {
        let tokens = parse_svg_path("m1 1 2 2").expect("parse");
        assert_eq!(tokens[1].position(), Some(Position::Relative));
    }

    #[test]
    fn second_period_starts_a_new_parameter() {
        let tokens = parse_svg_path("M0,0L.1.2.1.2ZM0,0 L1.2 3 .4 5.6 z").expect("parse");
        assert_eq!(kinds(&tokens), vec!["M", "L", "L", "Z", "M", "L", "L", "Z"]);
        assert_eq!(
            tokens[1],
            PathToken::LineTo {
                position: Position::Absolute,
                to: Point::new(0.1, 0.2)
            }
        );
        assert_eq!(
            tokens[6],
            PathToken::LineTo {
                position: Position::Absolute,
                to: Point::new(0.4, 5.6)
            }
        );
    }

    #[test]
    fn signs_split_parameters_and_exponents_absorb_them() {
        let tokens = parse_svg_path("M1-2L3e-1-4E+1").expect("parse");
        assert_eq!(
            tokens[0],
            PathToken::MoveTo {
                position: Position::Absolute,
                to: Point::new(1.0, -2.0)
            }
        );
        assert_eq!(
            tokens[1],
            PathToken::LineTo {
                position: Position::Absolute,
                to: Point::new(0.3, -40.0)
            }
        );
    }

    #[test]
    fn comments_may_appear_between_parameters() {
        let tokens = parse_svg_path("M 1 /* x */ 2 /*y*/L3 4").expect("parse");
        assert_eq!(kinds(&tokens), vec!["M", "L"]);
        let err = parse_svg_path("M 1 2 /* open").expect_err("unterminated");
        assert_eq!(err.kind, PathErrorKind::UnterminatedComment);
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn arc_flags_must_be_zero_or_one() {
        let kind = err_kind("M 170 207a 40 40 45 1 2 220 209 Z");
        assert!(
            matches!(kind, PathErrorKind::BadParameter { index: 4, .. }),
            "{kind:?}"
        );
    }

    #[test]
    fn arc_flags_cannot_continue_a_split_parameter() {
        assert_eq!(
            err_kind("M0 0 A5 5 30-1 0 10 10"),
            PathErrorKind::BadParameter {
                index: 3,
                text: "-1".to_string()
            }
        );
        assert_eq!(
            err_kind("M0 0 A5 5 1.5.5 0 10 10"),
            PathErrorKind::BadParameter {
                index: 3,
                text: ".5".to_string()
            }
        );
        let err = parse_svg_path("M0 0 A5 5 30 1-1 10 10").expect_err("signed sweep");
        assert_eq!(
            err.kind,
            PathErrorKind::BadParameter {
                index: 4,
                text: "-".to_string()
            }
        );
        assert_eq!(err.offset, 14);
    }

    #[test]
    fn compact_arc_flags_parse() {
        let tokens = parse_svg_path("M10 10 A5 5 0 01 20 20").expect("parse");
        let PathToken::ArcTo { arc, .. } = &tokens[1] else {
            panic!("expected arc, got {:?}", tokens[1]);
        };
        assert_eq!(arc.size, ArcSize::Short);
        assert_eq!(arc.sweep, SweepDirection::Counterclockwise);
        assert_eq!(arc.to, Point::new(20.0, 20.0));
    }

    #[test]
    fn path_must_start_with_move() {
        assert_eq!(
            err_kind("C139 183 40 199 41 109"),
            PathErrorKind::MissingMoveAtStart
        );
        assert_eq!(err_kind("  z"), PathErrorKind::MissingMoveAtStart);
        assert_eq!(err_kind("#"), PathErrorKind::UnexpectedCharacter('#'));
    }

    #[test]
    fn bare_numbers_after_close_are_rejected() {
        assert_eq!(err_kind("M0 0 L1 1 Z 2 2"), PathErrorKind::MissingMoveAtStart);
    }

    #[test]
    fn empty_input_has_no_operands() {
        assert_eq!(err_kind(""), PathErrorKind::NoOperands);
        assert_eq!(err_kind("  \n "), PathErrorKind::NoOperands);
    }

    #[test]
    fn truncated_tokens_report_arity() {
        assert_eq!(
            err_kind("M0 0 C1 2 3"),
            PathErrorKind::TooFewParameters {
                operand: 'C',
                expected: 6,
                found: 3
            }
        );
        assert_eq!(
            err_kind("M0 0 L1 Z"),
            PathErrorKind::TooFewParameters {
                operand: 'L',
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn malformed_numbers_are_bad_parameters() {
        assert!(matches!(
            err_kind("M0 0 L1e 2"),
            PathErrorKind::BadParameter { index: 0, .. }
        ));
        assert!(matches!(
            err_kind("M0 0 L1e2e3 2"),
            PathErrorKind::BadParameter { .. }
        ));
        assert!(matches!(
            err_kind("M0 0 L- 2"),
            PathErrorKind::BadParameter { .. }
        ));
        assert_eq!(err_kind("M0 0 L1 #"), PathErrorKind::UnexpectedCharacter('#'));
    }

    #[test]
    fn lossy_tokens_end_with_the_failure() {
        let tokens = PathParser::new("M0 0 L1 1 C2").tokens_lossy();
        assert_eq!(kinds(&tokens), vec!["M", "L", "!"]);
        let PathToken::Bad(reason) = &tokens[2] else {
            panic!("expected bad token");
        };
        assert!(reason.contains("line 1"), "{reason}");
        assert!(PathParser::new("M0 0").tokens_lossy().iter().all(|t| !t.is_bad()));
    }

    #[test]
    fn absolute_rewrite_tracks_current_point() {
        let tokens = parse_svg_path("m10 10 h5 v5 l-5 0 z m1 1 l1 1").expect("parse");
        let abs = to_absolute(&tokens);
        let expect = |x: f64, y: f64| PathToken::LineTo {
            position: Position::Absolute,
            to: Point::new(x, y),
        };
        assert_eq!(abs[1], expect(15.0, 10.0));
        assert_eq!(abs[2], expect(15.0, 15.0));
        assert_eq!(abs[3], expect(10.0, 15.0));
        assert_eq!(
            abs[5],
            PathToken::MoveTo {
                position: Position::Absolute,
                to: Point::new(11.0, 11.0)
            }
        );
        assert_eq!(abs[6], expect(12.0, 12.0));
    }

    #[test]
    fn serialized_tokens_parse_back_identically() {
        let source = "M0 0 l10 -5 C1 2 3 4 5 6 s1 1 2 2 Q0 1 2 3 t4 4 a5 6 30 1 0 7 8 H3 v-2 Z";
        let tokens = parse_svg_path(source).expect("parse");
        let text = tokens_to_string(&tokens);
        assert_eq!(parse_svg_path(&text).expect("reparse"), tokens);

        let abs = to_absolute(&tokens);
        let abs_text = tokens_to_string(&abs);
        assert!(!abs_text.chars().any(|c| c.is_ascii_lowercase()), "{abs_text}");
        assert_eq!(parse_svg_path(&abs_text).expect("reparse"), abs);
    }
}
