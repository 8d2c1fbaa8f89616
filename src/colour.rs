use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::colour_names::WEB_COLOURS;
use crate::error::ColourParseError;
use crate::scan;

/// Supplies raw ICC profile bytes by profile name. The bytes are never interpreted here.
pub type ProfileResolver<'a> = dyn Fn(&str) -> Option<Vec<u8>> + 'a;

#[derive(Debug, Clone, PartialEq)]
pub enum ColourModel {
    Clear,
    Rgb {
        r: f64,
        g: f64,
        b: f64,
    },
    DeviceRgb {
        r: f64,
        g: f64,
        b: f64,
    },
    DeviceGray {
        g: f64,
    },
    DeviceCmyk {
        c: f64,
        m: f64,
        y: f64,
        k: f64,
    },
    Icc {
        profile: String,
        components: Vec<f64>,
    },
    Placeholder {
        name: String,
    },
    Transparent {
        base: Box<Colour>,
        alpha: f64,
    },
}

/// A parsed colour. Equality compares the colour model only, never the retained source.
#[derive(Debug, Clone)]
pub struct Colour {
    model: ColourModel,
    source: Option<String>,
}

impl PartialEq for Colour {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model
    }
}

impl Colour {
    pub fn new(model: ColourModel) -> Self {
        Self {
            model,
            source: None,
        }
    }

    pub fn clear() -> Self {
        Self::new(ColourModel::Clear)
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(ColourModel::Rgb { r, g, b })
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self::new(ColourModel::Transparent {
            base: Box::new(self),
            alpha,
        })
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn model(&self) -> &ColourModel {
        &self.model
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn alpha(&self) -> f64 {
        match &self.model {
            ColourModel::Clear => 0.0,
            ColourModel::Transparent { base, alpha } => base.alpha() * alpha,
            _ => 1.0,
        }
    }

    /// The retained source text, or a canonical serialization when there is none.
    pub fn as_string(&self) -> String {
        match &self.source {
            Some(source) => source.clone(),
            None => self.canonical(),
        }
    }

    fn canonical(&self) -> String {
        match &self.model {
            ColourModel::Clear => "transparent".to_string(),
            ColourModel::Rgb { r, g, b } => {
                format!("#{:02x}{:02x}{:02x}", to_byte(*r), to_byte(*g), to_byte(*b))
            }
            ColourModel::DeviceRgb { r, g, b } => format!("device-rgb({r}, {g}, {b})"),
            ColourModel::DeviceGray { g } => format!("device-gray({g})"),
            ColourModel::DeviceCmyk { c, m, y, k } => format!("device-cmyk({c}, {m}, {y}, {k})"),
            ColourModel::Icc {
                profile,
                components,
            } => {
                let mut out = format!("icc-color({profile}");
                for component in components {
                    out.push_str(&format!(", {component}"));
                }
                out.push(')');
                out
            }
            ColourModel::Placeholder { name } => {
                if name.starts_with("--") {
                    format!("var({name})")
                } else {
                    name.clone()
                }
            }
            ColourModel::Transparent { base, alpha } => match base.model() {
                ColourModel::Rgb { r, g, b } => format!(
                    "rgba({}, {}, {}, {alpha})",
                    to_byte(*r),
                    to_byte(*g),
                    to_byte(*b)
                ),
                _ => format!("{} / {alpha}", base.as_string()),
            },
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One colour grammar.
///
/// `text` arrives trimmed and lowercased. Return `Ok(None)` when the text belongs to a
/// different grammar; once the prefix matches, the parser commits to success or error.
pub trait ColourParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(
        &self,
        text: &str,
        resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError>;
}

/// Ordered list of colour grammars tried first to last.
#[derive(Clone)]
pub struct ColourParsers {
    parsers: Vec<Arc<dyn ColourParser>>,
}

impl fmt::Debug for ColourParsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.parsers.iter().map(|p| p.name()))
            .finish()
    }
}

impl Default for ColourParsers {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColourParsers {
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::empty()
            .with(HexColourParser)
            .with(RgbColourParser)
            .with(DeviceColourParser)
            .with(IccColourParser)
            .with(PlaceholderColourParser)
            .with(WebColourParser)
    }

    pub fn with(mut self, parser: impl ColourParser + 'static) -> Self {
        self.parsers.push(Arc::new(parser));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    pub fn parse_string(
        &self,
        source: &str,
        resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        let trimmed = source.trim();
        let text = trimmed.to_lowercase();
        for parser in &self.parsers {
            if let Some(colour) = parser.parse(&text, resolver)? {
                return Ok(Some(colour.with_source(trimmed)));
            }
        }
        Ok(None)
    }
}

pub(crate) fn standard_parsers() -> &'static ColourParsers {
    static STANDARD: OnceLock<ColourParsers> = OnceLock::new();
    STANDARD.get_or_init(ColourParsers::standard)
}

/// Parse `source` with the standard parser list.
///
/// `Ok(None)` means no parser recognised the text at all.
pub fn parse_color(
    source: &str,
    profile_resolver: Option<&ProfileResolver<'_>>,
) -> Result<Option<Colour>, ColourParseError> {
    standard_parsers().parse_string(source, profile_resolver)
}

fn web_colour_table() -> &'static HashMap<&'static str, (u8, u8, u8)> {
    static TABLE: OnceLock<HashMap<&'static str, (u8, u8, u8)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        WEB_COLOURS
            .iter()
            .map(|(name, r, g, b)| (*name, (*r, *g, *b)))
            .collect()
    })
}

// Arguments of `prefix(...)`, each trimmed and paired with its offset in `text`.
// Exactly one parenthesis pair is allowed and nothing but whitespace may follow it.
fn function_args(text: &str, prefix: &str) -> Result<Vec<(String, usize)>, ColourParseError> {
    let buf = scan::scalars(text);
    let mut i = prefix.chars().count();
    while i < buf.len() && buf[i].is_whitespace() {
        i += 1;
    }
    match buf.get(i) {
        Some('(') => {}
        Some(_) => return Err(ColourParseError::unexpected(text, i)),
        None => return Err(ColourParseError::incomplete(text, i)),
    }
    let open = i;
    let Some(close) = buf[open + 1..]
        .iter()
        .position(|c| *c == ')')
        .map(|p| open + 1 + p)
    else {
        return Err(ColourParseError::incomplete(text, buf.len()));
    };
    if let Some(p) = buf[open + 1..close].iter().position(|c| *c == '(') {
        return Err(ColourParseError::unexpected(text, open + 1 + p));
    }
    if let Some(p) = buf[close + 1..].iter().position(|c| !c.is_whitespace()) {
        return Err(ColourParseError::unexpected(text, close + 1 + p));
    }

    let mut args = Vec::new();
    let mut start = open + 1;
    for j in open + 1..=close {
        if j == close || buf[j] == ',' {
            let raw: String = buf[start..j].iter().collect();
            args.push((raw.trim().to_string(), start));
            start = j + 1;
        }
    }
    Ok(args)
}

fn parse_float(text: &str, raw: &str, offset: usize) -> Result<f64, ColourParseError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ColourParseError::unexpected(text, offset))
}

// Anything outside `[0-9.%]` is dropped before the number is read.
fn forgiving(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '%')
        .collect()
}

/// `rgb(r, g, b)` and `rgba(r, g, b, a)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbColourParser;

impl RgbColourParser {
    fn channel(text: &str, raw: &str, offset: usize) -> Result<f64, ColourParseError> {
        let cleaned = forgiving(raw);
        if let Some(percent) = cleaned.strip_suffix('%') {
            let value = parse_float(text, percent, offset)?;
            if !(0.0..=100.0).contains(&value) {
                return Err(ColourParseError::bad_range(text, offset));
            }
            return Ok(value / 100.0);
        }
        let value = parse_float(text, &cleaned, offset)?;
        if !(0.0..=255.0).contains(&value) {
            return Err(ColourParseError::bad_range(text, offset));
        }
        Ok(value / 255.0)
    }

    fn alpha(text: &str, raw: &str, offset: usize) -> Result<f64, ColourParseError> {
        let cleaned = forgiving(raw);
        if cleaned.contains('%') {
            return Err(ColourParseError::unexpected(text, offset));
        }
        let value = parse_float(text, &cleaned, offset)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ColourParseError::bad_range(text, offset));
        }
        Ok(value)
    }
}

impl ColourParser for RgbColourParser {
    fn name(&self) -> &'static str {
        "rgb"
    }

    fn parse(
        &self,
        text: &str,
        _resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        let (prefix, arity) = if text.starts_with("rgba") {
            ("rgba", 4)
        } else if text.starts_with("rgb") {
            ("rgb", 3)
        } else {
            return Ok(None);
        };
        let args = function_args(text, prefix)?;
        if args.len() != arity {
            return Err(ColourParseError::incomplete(text, text.chars().count()));
        }
        let r = Self::channel(text, &args[0].0, args[0].1)?;
        let g = Self::channel(text, &args[1].0, args[1].1)?;
        let b = Self::channel(text, &args[2].0, args[2].1)?;
        let colour = Colour::rgb(r, g, b);
        if arity == 4 {
            let alpha = Self::alpha(text, &args[3].0, args[3].1)?;
            return Ok(Some(colour.with_alpha(alpha)));
        }
        Ok(Some(colour))
    }
}

/// `#rgb` and `#rrggbb`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexColourParser;

impl ColourParser for HexColourParser {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn parse(
        &self,
        text: &str,
        _resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        if !text.starts_with('#') {
            return Ok(None);
        }
        let buf = scan::scalars(text);
        match buf.len() {
            4 | 7 => {}
            len if len < 4 || len == 5 || len == 6 => {
                return Err(ColourParseError::incomplete(text, len));
            }
            _ => return Err(ColourParseError::unknown(text, 0)),
        }

        let mut digits = Vec::with_capacity(6);
        for (i, ch) in buf.iter().enumerate().skip(1) {
            let Some(d) = ch.to_digit(16) else {
                return Err(ColourParseError::unexpected(text, i));
            };
            digits.push(d as u8);
        }
        let (r, g, b) = if digits.len() == 3 {
            (digits[0] * 17, digits[1] * 17, digits[2] * 17)
        } else {
            (
                digits[0] * 16 + digits[1],
                digits[2] * 16 + digits[3],
                digits[4] * 16 + digits[5],
            )
        };
        Ok(Some(Colour::from_rgb8(r, g, b)))
    }
}

/// CSS named colours plus `transparent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebColourParser;

impl ColourParser for WebColourParser {
    fn name(&self) -> &'static str {
        "web"
    }

    fn parse(
        &self,
        text: &str,
        _resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        if text == "transparent" {
            return Ok(Some(Colour::clear()));
        }
        Ok(web_colour_table()
            .get(text)
            .map(|(r, g, b)| Colour::from_rgb8(*r, *g, *b)))
    }
}

/// `icc-color(profile, c1, c2, ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IccColourParser;

impl ColourParser for IccColourParser {
    fn name(&self) -> &'static str {
        "icc"
    }

    fn parse(
        &self,
        text: &str,
        resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        const PREFIX: &str = "icc-color";
        if !text.starts_with(PREFIX) {
            return Ok(None);
        }
        let args = function_args(text, PREFIX)?;
        let Some(((profile, profile_offset), components)) = args.split_first() else {
            return Err(ColourParseError::incomplete(text, PREFIX.len()));
        };
        if profile.is_empty() || components.is_empty() {
            return Err(ColourParseError::incomplete(text, *profile_offset));
        }
        let components = components
            .iter()
            .map(|(raw, offset)| parse_float(text, raw, *offset))
            .collect::<Result<Vec<f64>, _>>()?;

        if let Some(resolve) = resolver {
            if resolve(profile).is_none() {
                return Err(ColourParseError::unknown(profile, *profile_offset));
            }
        }

        Ok(Some(Colour::new(ColourModel::Icc {
            profile: profile.clone(),
            components,
        })))
    }
}

/// `device-rgb(r, g, b)`, `device-gray(g)` and `device-cmyk(c, m, y, k)`.
///
/// Components are stored as written once stray characters are trimmed; no
/// range normalization is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceColourParser;

impl ColourParser for DeviceColourParser {
    fn name(&self) -> &'static str {
        "device"
    }

    fn parse(
        &self,
        text: &str,
        _resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        const PREFIX: &str = "device-";
        if !text.starts_with(PREFIX) {
            return Ok(None);
        }
        let (space, arity) = if text.starts_with("device-rgb") {
            ("device-rgb", 3)
        } else if text.starts_with("device-gray") {
            ("device-gray", 1)
        } else if text.starts_with("device-cmyk") {
            ("device-cmyk", 4)
        } else {
            return Err(ColourParseError::unknown(text, PREFIX.len()));
        };
        let args = function_args(text, space)?;
        if args.len() != arity {
            return Err(ColourParseError::incomplete(text, text.chars().count()));
        }
        let values = args
            .iter()
            .map(|(raw, offset)| parse_float(text, &forgiving(raw), *offset))
            .collect::<Result<Vec<f64>, _>>()?;
        let model = match values.as_slice() {
            [r, g, b] => ColourModel::DeviceRgb {
                r: *r,
                g: *g,
                b: *b,
            },
            [g] => ColourModel::DeviceGray { g: *g },
            [c, m, y, k] => ColourModel::DeviceCmyk {
                c: *c,
                m: *m,
                y: *y,
                k: *k,
            },
            _ => return Err(ColourParseError::incomplete(text, text.chars().count())),
        };
        Ok(Some(Colour::new(model)))
    }
}

/// `currentcolor` and `var(--name)`, left for the caller to substitute.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderColourParser;

impl ColourParser for PlaceholderColourParser {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn parse(
        &self,
        text: &str,
        _resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        if text == "currentcolor" {
            return Ok(Some(Colour::new(ColourModel::Placeholder {
                name: text.to_string(),
            })));
        }
        if !text.starts_with("var") {
            return Ok(None);
        }
        let args = function_args(text, "var")?;
        match args.as_slice() {
            [(name, offset)] => {
                if name.len() <= 2 || !name.starts_with("--") {
                    return Err(ColourParseError::unexpected(text, *offset));
                }
                Ok(Some(Colour::new(ColourModel::Placeholder { name: name.clone() })))
            }
            _ => Err(ColourParseError::unexpected(text, 3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColourErrorKind;

    fn parse(source: &str) -> Result<Option<Colour>, ColourParseError> {
        standard_parsers().parse_string(source, None)
    }

    fn colour(source: &str) -> Colour {
        parse(source)
            .expect("parse colour")
            .expect("recognised colour")
    }

    #[test]
    fn equivalent_whites_compare_equal() {
        let white = colour("white");
        for source in ["rgb(255,255,255)", "rgb(100%,100%,100%)", "#FFFFFF", "#FFF"] {
            assert_eq!(colour(source), white, "{source}");
        }
    }

    #[test]
    fn equality_ignores_source_text() {
        let a = colour("#ff0000");
        let b = colour("RED");
        assert_eq!(a, b);
        assert_eq!(a.as_string(), "#ff0000");
        assert_eq!(b.as_string(), "RED");
    }

    #[test]
    fn rgba_keeps_alpha_and_mixes_units() {
        let c = colour("rgba(244, 98%, 1, 0.5)");
        let ColourModel::Transparent { base, alpha } = c.model() else {
            panic!("expected transparent colour, got {c:?}");
        };
        assert_eq!(*alpha, 0.5);
        let ColourModel::Rgb { r, g, b } = base.model() else {
            panic!("expected rgb base");
        };
        assert!((r - 244.0 / 255.0).abs() < 1e-12);
        assert!((g - 0.98).abs() < 1e-12);
        assert!((b - 1.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn rgb_rejects_out_of_range_channels() {
        let err = parse("rgb(256, -11, 0)").expect_err("out of range");
        assert!(matches!(err.kind, ColourErrorKind::BadRange(_)));
        let err = parse("rgb(101%, 0, 0)").expect_err("out of range");
        assert!(matches!(err.kind, ColourErrorKind::BadRange(_)));
    }

    #[test]
    fn rgba_rejects_percentage_alpha_and_large_alpha() {
        let err = parse("rgba(0, 0, 0, 50%)").expect_err("percentage alpha");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
        let err = parse("rgba(0, 0, 0, 1.5)").expect_err("alpha above one");
        assert!(matches!(err.kind, ColourErrorKind::BadRange(_)));
    }

    #[test]
    fn rgb_structure_errors() {
        let err = parse("rgb x(1, 2, 3)").expect_err("garbage before paren");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
        let err = parse("rgb(1, 2)").expect_err("arity");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
        let err = parse("rgb(1, 2, 3) x").expect_err("trailing garbage");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
        let err = parse("rgb(1, 2, 3").expect_err("unclosed");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
    }

    #[test]
    fn rgb_component_trimming_is_forgiving() {
        assert_eq!(colour("rgb(1a2, 0, 0)"), colour("rgb(12, 0, 0)"));
    }

    #[test]
    fn whitespace_around_values_and_parens_is_tolerated() {
        assert_eq!(colour("  rgb ( 0 , 0 , 255 )  "), colour("blue"));
    }

    #[test]
    fn hex_length_rules() {
        let err = parse("#ff").expect_err("short");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
        let err = parse("#ffff").expect_err("five");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
        let err = parse("#fffff").expect_err("six");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
        let err = parse("#ffffffff").expect_err("nine");
        assert!(matches!(err.kind, ColourErrorKind::Unknown(_)));
        let err = parse("#ggg").expect_err("bad digit");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
        assert_eq!(colour("#1a2b3c"), Colour::from_rgb8(0x1a, 0x2b, 0x3c));
        assert_eq!(colour("#abc"), Colour::from_rgb8(0xaa, 0xbb, 0xcc));
    }

    #[test]
    fn unknown_names_are_not_colours() {
        assert_eq!(parse("notacolour").expect("no error"), None);
        assert_eq!(colour("transparent"), Colour::clear());
        assert_eq!(colour("RebeccaPurple"), Colour::from_rgb8(0x66, 0x33, 0x99));
    }

    #[test]
    fn device_spaces_keep_raw_components() {
        assert_eq!(
            *colour("device-rgb(0.1, 0.2, 0.3)").model(),
            ColourModel::DeviceRgb {
                r: 0.1,
                g: 0.2,
                b: 0.3
            }
        );
        assert_eq!(
            *colour("device-gray(128)").model(),
            ColourModel::DeviceGray { g: 128.0 }
        );
        assert_eq!(
            *colour("device-gray(0.5pt)").model(),
            ColourModel::DeviceGray { g: 0.5 }
        );
        assert_eq!(
            *colour("device-cmyk(0, 0.5, 1, 0)").model(),
            ColourModel::DeviceCmyk {
                c: 0.0,
                m: 0.5,
                y: 1.0,
                k: 0.0
            }
        );
    }

    #[test]
    fn device_errors() {
        let err = parse("device-rgb(1, 2)").expect_err("arity");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
        let err = parse("device-gray(x)").expect_err("not numeric");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
        let err = parse("device-lab(1, 2, 3)").expect_err("unknown space");
        assert!(matches!(err.kind, ColourErrorKind::Unknown(_)));
        let err = parse("device-cmyk(1, 2, 3, 4").expect_err("unclosed");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
    }

    #[test]
    fn icc_colour_requires_profile_and_components() {
        let c = colour("icc-color(acmecmyk, 0.11, 0.48, 0.83, 0.00)");
        assert_eq!(
            *c.model(),
            ColourModel::Icc {
                profile: "acmecmyk".to_string(),
                components: vec![0.11, 0.48, 0.83, 0.0],
            }
        );
        let err = parse("icc-color(acmecmyk)").expect_err("no components");
        assert!(matches!(err.kind, ColourErrorKind::Incomplete(_)));
        let err = parse("icc-color(p, 1, (2))").expect_err("nested paren");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
        let err = parse("icc-color(p, one)").expect_err("non numeric");
        assert!(matches!(err.kind, ColourErrorKind::UnexpectedCharacter(_)));
    }

    #[test]
    fn icc_profile_resolver_is_consulted() {
        let resolver = |name: &str| (name == "known").then(|| vec![1u8, 2, 3]);
        let parsers = ColourParsers::standard();
        let ok = parsers
            .parse_string("icc-color(known, 1)", Some(&resolver))
            .expect("known profile");
        assert!(ok.is_some());
        let err = parsers
            .parse_string("icc-color(missing, 1)", Some(&resolver))
            .expect_err("unknown profile");
        assert!(matches!(err.kind, ColourErrorKind::Unknown(_)));
    }

    #[test]
    fn placeholders() {
        assert_eq!(
            *colour("currentColor").model(),
            ColourModel::Placeholder {
                name: "currentcolor".to_string()
            }
        );
        let c = colour("var(--brand)");
        assert_eq!(
            *c.model(),
            ColourModel::Placeholder {
                name: "--brand".to_string()
            }
        );
        assert_eq!(Colour::new(c.model().clone()).as_string(), "var(--brand)");
        assert!(parse("var(brand)").is_err());
    }

    #[test]
    fn matched_prefix_never_falls_through() {
        // "rgb" commits even though no later grammar would accept the text either.
        assert!(parse("rgbblue").is_err());
    }

    #[test]
    fn canonical_serialization() {
        assert_eq!(Colour::from_rgb8(255, 0, 16).as_string(), "#ff0010");
        assert_eq!(
            Colour::from_rgb8(255, 0, 0).with_alpha(0.25).as_string(),
            "rgba(255, 0, 0, 0.25)"
        );
        assert_eq!(Colour::clear().as_string(), "transparent");
        let gray = Colour::new(ColourModel::DeviceGray { g: 0.5 }).with_alpha(0.5);
        assert_eq!(gray.as_string(), "device-gray(0.5) / 0.5");
        assert!((gray.alpha() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn custom_parser_lists_run_in_order() {
        let parsers = ColourParsers::empty().with(WebColourParser);
        assert_eq!(parsers.names(), vec!["web"]);
        assert_eq!(parsers.parse_string("#fff", None).expect("no error"), None);
    }
}
