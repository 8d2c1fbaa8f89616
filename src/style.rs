use crate::colour::{Colour, ColourParsers, standard_parsers};
use crate::error::{ColourParseError, StylePropertyError, StylePropertyErrorKind};
use crate::scan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleUnit {
    Pixels,
    Points,
    Picas,
    Millimetres,
    Centimetres,
    Inches,
    Em,
    Ex,
    Rem,
    Percent,
}

impl StyleUnit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "px" => StyleUnit::Pixels,
            "pt" => StyleUnit::Points,
            "pc" => StyleUnit::Picas,
            "mm" => StyleUnit::Millimetres,
            "cm" => StyleUnit::Centimetres,
            "in" => StyleUnit::Inches,
            "em" => StyleUnit::Em,
            "ex" => StyleUnit::Ex,
            "rem" => StyleUnit::Rem,
            "%" => StyleUnit::Percent,
            _ => return None,
        };
        Some(unit)
    }

    pub fn suffix(self) -> &'static str {
        match self {
            StyleUnit::Pixels => "px",
            StyleUnit::Points => "pt",
            StyleUnit::Picas => "pc",
            StyleUnit::Millimetres => "mm",
            StyleUnit::Centimetres => "cm",
            StyleUnit::Inches => "in",
            StyleUnit::Em => "em",
            StyleUnit::Ex => "ex",
            StyleUnit::Rem => "rem",
            StyleUnit::Percent => "%",
        }
    }

    /// Converts absolute units to points (1px = 0.75pt). Relative units return `None`.
    pub fn to_points(self, value: f64) -> Option<f64> {
        let factor = match self {
            StyleUnit::Pixels => 0.75,
            StyleUnit::Points => 1.0,
            StyleUnit::Picas => 12.0,
            StyleUnit::Millimetres => 72.0 / 25.4,
            StyleUnit::Centimetres => 72.0 / 2.54,
            StyleUnit::Inches => 72.0,
            StyleUnit::Em | StyleUnit::Ex | StyleUnit::Rem | StyleUnit::Percent => return None,
        };
        Some(value * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSize {
    XxSmall,
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
    XxLarge,
    Smaller,
    Larger,
    Length(f64, StyleUnit),
}

impl FontSize {
    fn from_keyword(word: &str) -> Option<Self> {
        let size = match word {
            "xx-small" => FontSize::XxSmall,
            "x-small" => FontSize::XSmall,
            "small" => FontSize::Small,
            "medium" => FontSize::Medium,
            "large" => FontSize::Large,
            "x-large" => FontSize::XLarge,
            "xx-large" => FontSize::XxLarge,
            "smaller" => FontSize::Smaller,
            "larger" => FontSize::Larger,
            _ => return None,
        };
        Some(size)
    }

    /// Size in points, resolving keywords against the 12pt medium size and relative
    /// units against `parent_points`.
    pub fn to_points(self, parent_points: f64) -> f64 {
        const MEDIUM: f64 = 12.0;
        match self {
            FontSize::XxSmall => MEDIUM * 3.0 / 5.0,
            FontSize::XSmall => MEDIUM * 3.0 / 4.0,
            FontSize::Small => MEDIUM * 8.0 / 9.0,
            FontSize::Medium => MEDIUM,
            FontSize::Large => MEDIUM * 6.0 / 5.0,
            FontSize::XLarge => MEDIUM * 3.0 / 2.0,
            FontSize::XxLarge => MEDIUM * 2.0,
            FontSize::Smaller => parent_points / 1.2,
            FontSize::Larger => parent_points * 1.2,
            FontSize::Length(value, unit) => match unit {
                StyleUnit::Em | StyleUnit::Rem => value * parent_points,
                StyleUnit::Ex => value * parent_points / 2.0,
                StyleUnit::Percent => value * parent_points / 100.0,
                absolute => absolute.to_points(value).unwrap_or(parent_points),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
    Bolder,
    Lighter,
    Numeric(u16),
}

impl FontWeight {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "normal" => Some(FontWeight::Normal),
            "bold" => Some(FontWeight::Bold),
            "bolder" => Some(FontWeight::Bolder),
            "lighter" => Some(FontWeight::Lighter),
            _ => word
                .parse::<u16>()
                .ok()
                .filter(|w| (1..=1000).contains(w))
                .map(FontWeight::Numeric),
        }
    }

    pub fn resolve(self, parent: u16) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
            FontWeight::Numeric(w) => w,
            FontWeight::Bolder => match parent {
                0..=349 => 400,
                350..=549 => 700,
                _ => 900,
            },
            FontWeight::Lighter => match parent {
                0..=549 => 100,
                550..=749 => 400,
                _ => 700,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            "oblique" => Some(FontStyle::Oblique),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontVariant {
    Normal,
    SmallCaps,
}

impl FontVariant {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "normal" => Some(FontVariant::Normal),
            "small-caps" => Some(FontVariant::SmallCaps),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStretch {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

impl FontStretch {
    fn from_keyword(word: &str) -> Option<Self> {
        let stretch = match word {
            "ultra-condensed" => FontStretch::UltraCondensed,
            "extra-condensed" => FontStretch::ExtraCondensed,
            "condensed" => FontStretch::Condensed,
            "semi-condensed" => FontStretch::SemiCondensed,
            "normal" => FontStretch::Normal,
            "semi-expanded" => FontStretch::SemiExpanded,
            "expanded" => FontStretch::Expanded,
            "extra-expanded" => FontStretch::ExtraExpanded,
            "ultra-expanded" => FontStretch::UltraExpanded,
            _ => return None,
        };
        Some(stretch)
    }

    pub fn percentage(self) -> f64 {
        match self {
            FontStretch::UltraCondensed => 50.0,
            FontStretch::ExtraCondensed => 62.5,
            FontStretch::Condensed => 75.0,
            FontStretch::SemiCondensed => 87.5,
            FontStretch::Normal => 100.0,
            FontStretch::SemiExpanded => 112.5,
            FontStretch::Expanded => 125.0,
            FontStretch::ExtraExpanded => 150.0,
            FontStretch::UltraExpanded => 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    Serif,
    SansSerif,
    Cursive,
    Fantasy,
    Monospace,
    System,
}

impl GenericFamily {
    fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "serif" => Some(GenericFamily::Serif),
            "sans-serif" => Some(GenericFamily::SansSerif),
            "cursive" => Some(GenericFamily::Cursive),
            "fantasy" => Some(GenericFamily::Fantasy),
            "monospace" => Some(GenericFamily::Monospace),
            "system" | "system-ui" => Some(GenericFamily::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Generic(GenericFamily),
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    Normal,
    Number(f64),
    Length(f64, StyleUnit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    None,
    Hidden,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyle {
    fn from_keyword(word: &str) -> Option<Self> {
        let style = match word {
            "none" => BorderStyle::None,
            "hidden" => BorderStyle::Hidden,
            "dotted" => BorderStyle::Dotted,
            "dashed" => BorderStyle::Dashed,
            "solid" => BorderStyle::Solid,
            "double" => BorderStyle::Double,
            "groove" => BorderStyle::Groove,
            "ridge" => BorderStyle::Ridge,
            "inset" => BorderStyle::Inset,
            "outset" => BorderStyle::Outset,
            _ => return None,
        };
        Some(style)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Border {
    pub width: Option<(f64, StyleUnit)>,
    pub style: Option<BorderStyle>,
    pub colour: Option<Colour>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleProperty {
    String(String),
    UnitNumber(f64, StyleUnit),
    Number(f64),
    Colour(Colour),
    Boolean(bool),
    FontSize(FontSize),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    FontVariant(FontVariant),
    FontStretch(FontStretch),
    FontFamilies(Vec<FontFamily>),
    LineHeight(LineHeight),
    Border(Border),
    Array(Vec<StyleProperty>),
}

impl StyleProperty {
    pub fn as_colour(&self) -> Option<&Colour> {
        match self {
            StyleProperty::Colour(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleProperty::Number(v) | StyleProperty::UnitNumber(v, _) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleProperty::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One declaration: equality compares key, value and importance.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicStyle {
    pub key: String,
    pub value: StyleProperty,
    pub important: bool,
}

impl GraphicStyle {
    pub fn new(key: impl Into<String>, value: StyleProperty) -> Self {
        Self {
            key: key.into(),
            value,
            important: false,
        }
    }

    pub fn important(mut self, important: bool) -> Self {
        self.important = important;
        self
    }
}

const COLOUR_KEYS: &[&str] = &[
    "color",
    "fill",
    "stroke",
    "background-color",
    "border-color",
    "stop-color",
    "flood-color",
    "lighting-color",
];

const DIMENSION_KEYS: &[&str] = &[
    "stroke-width",
    "stroke-dashoffset",
    "border-width",
    "border-radius",
    "width",
    "height",
    "x",
    "y",
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "top",
    "left",
    "right",
    "bottom",
    "letter-spacing",
    "word-spacing",
    "text-indent",
];

const NUMBER_KEYS: &[&str] = &[
    "opacity",
    "fill-opacity",
    "stroke-opacity",
    "stop-opacity",
    "flood-opacity",
    "stroke-miterlimit",
];

const BORDER_KEYS: &[&str] = &[
    "border",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
];

// Keywords every property accepts verbatim.
const CASCADE_KEYWORDS: &[&str] = &["inherit", "initial", "unset"];

/// Interpret one declaration with the standard colour parsers.
pub fn interpret_property(key: &str, raw_value: &str) -> Result<Vec<GraphicStyle>, StylePropertyError> {
    interpret_property_with(key, raw_value, standard_parsers())
}

/// Interpret one declaration. Shorthands expand to several longhand styles.
pub fn interpret_property_with(
    key: &str,
    raw_value: &str,
    parsers: &ColourParsers,
) -> Result<Vec<GraphicStyle>, StylePropertyError> {
    let key = key.trim().to_ascii_lowercase();
    let lead = raw_value.chars().take_while(|c| c.is_whitespace()).count();
    let value = raw_value.trim();
    if value.is_empty() {
        return Err(StylePropertyError::new(StylePropertyErrorKind::Empty, 0));
    }
    let lowered = value.to_ascii_lowercase();
    if CASCADE_KEYWORDS.contains(&lowered.as_str()) {
        return Ok(vec![GraphicStyle::new(key, StyleProperty::String(lowered))]);
    }

    let single = |value: StyleProperty| -> Result<Vec<GraphicStyle>, StylePropertyError> {
        Ok(vec![GraphicStyle::new(key.clone(), value)])
    };
    let k = key.as_str();
    if COLOUR_KEYS.contains(&k) {
        if matches!(k, "fill" | "stroke") && lowered == "none" {
            return single(StyleProperty::Colour(Colour::clear()));
        }
        return single(StyleProperty::Colour(parse_colour_value(value, lead, parsers)?));
    }
    if DIMENSION_KEYS.contains(&k) {
        return single(parse_dimension(value, lead)?);
    }
    if NUMBER_KEYS.contains(&k) {
        return single(StyleProperty::Number(parse_number(value, lead)?));
    }
    if BORDER_KEYS.contains(&k) {
        return single(StyleProperty::Border(parse_border(value, lead, parsers)?));
    }
    match k {
        "font" => parse_font_shorthand(value, lead),
        "font-size" => single(StyleProperty::FontSize(parse_font_size(&lowered, lead)?)),
        "font-weight" => single(StyleProperty::FontWeight(keyword(
            &lowered,
            lead,
            FontWeight::from_keyword,
        )?)),
        "font-style" => single(StyleProperty::FontStyle(keyword(
            &lowered,
            lead,
            FontStyle::from_keyword,
        )?)),
        "font-variant" => single(StyleProperty::FontVariant(keyword(
            &lowered,
            lead,
            FontVariant::from_keyword,
        )?)),
        "font-stretch" => single(StyleProperty::FontStretch(keyword(
            &lowered,
            lead,
            FontStretch::from_keyword,
        )?)),
        "font-family" => single(StyleProperty::FontFamilies(parse_font_families(value, lead)?)),
        "line-height" => single(StyleProperty::LineHeight(parse_line_height(&lowered, lead)?)),
        "margin" | "padding" => single(parse_box_edges(value, lead)?),
        "stroke-dasharray" => single(parse_dash_array(value, lead)?),
        "visibility" => single(StyleProperty::Boolean(match lowered.as_str() {
            "visible" => true,
            "hidden" | "collapse" => false,
            _ => {
                return Err(StylePropertyError::new(
                    StylePropertyErrorKind::UnknownKeyword(value.to_string()),
                    lead,
                ));
            }
        })),
        _ => single(StyleProperty::String(value.to_string())),
    }
}

fn keyword<T>(
    word: &str,
    offset: usize,
    lookup: impl Fn(&str) -> Option<T>,
) -> Result<T, StylePropertyError> {
    lookup(word).ok_or_else(|| {
        StylePropertyError::new(
            StylePropertyErrorKind::UnknownKeyword(word.to_string()),
            offset,
        )
    })
}

fn parse_colour_value(
    text: &str,
    offset: usize,
    parsers: &ColourParsers,
) -> Result<Colour, StylePropertyError> {
    let bad = |err: ColourParseError| {
        StylePropertyError::new(StylePropertyErrorKind::BadColour(err), offset)
    };
    match parsers.parse_string(text, None) {
        Ok(Some(colour)) => Ok(colour),
        Ok(None) => Err(bad(ColourParseError::unknown(&text.to_lowercase(), 0))),
        Err(err) => Err(bad(err)),
    }
}

fn unexpected(text: &str, offset: usize) -> StylePropertyError {
    StylePropertyError::new(
        StylePropertyErrorKind::UnexpectedCharacter(text.to_string()),
        offset,
    )
}

// A single signed number, with an optional known unit suffix.
fn parse_dimension(word: &str, offset: usize) -> Result<StyleProperty, StylePropertyError> {
    if let Some(p) = word.chars().position(char::is_whitespace) {
        return Err(unexpected(word, offset + p));
    }
    let (sign, body) = match word.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, word.strip_prefix('+').unwrap_or(word)),
    };
    let (value, unit) = scan::number_and_unit_str(body);
    let Some(value) = value else {
        return Err(unexpected(word, offset));
    };
    match unit {
        None => Ok(StyleProperty::Number(sign * value)),
        Some(suffix) => {
            let unit_offset = offset + word.chars().count() - suffix.chars().count();
            StyleUnit::from_suffix(&suffix)
                .map(|unit| StyleProperty::UnitNumber(sign * value, unit))
                .ok_or_else(|| unexpected(&suffix, unit_offset))
        }
    }
}

fn parse_number(text: &str, offset: usize) -> Result<f64, StylePropertyError> {
    if let Some(percent) = text.strip_suffix('%') {
        return percent
            .trim()
            .parse::<f64>()
            .map(|v| v / 100.0)
            .map_err(|_| unexpected(text, offset));
    }
    text.parse::<f64>().map_err(|_| unexpected(text, offset))
}

fn parse_font_size(word: &str, offset: usize) -> Result<FontSize, StylePropertyError> {
    if let Some(size) = FontSize::from_keyword(word) {
        return Ok(size);
    }
    if !word.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(StylePropertyError::new(
            StylePropertyErrorKind::UnknownKeyword(word.to_string()),
            offset,
        ));
    }
    match parse_dimension(word, offset)? {
        StyleProperty::Number(v) => Ok(FontSize::Length(v, StyleUnit::Pixels)),
        StyleProperty::UnitNumber(v, unit) => Ok(FontSize::Length(v, unit)),
        _ => Err(unexpected(word, offset)),
    }
}

fn parse_line_height(word: &str, offset: usize) -> Result<LineHeight, StylePropertyError> {
    if word == "normal" {
        return Ok(LineHeight::Normal);
    }
    match parse_dimension(word, offset)? {
        StyleProperty::Number(v) => Ok(LineHeight::Number(v)),
        StyleProperty::UnitNumber(v, unit) => Ok(LineHeight::Length(v, unit)),
        _ => Err(unexpected(word, offset)),
    }
}

/// Split on whitespace outside quotes and parentheses. Words keep their quotes and
/// carry their scalar offset within `text` plus `base`.
fn split_words(text: &str, base: usize) -> Result<Vec<(String, usize)>, StylePropertyError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    let mut quote: Option<(char, usize)> = None;
    let mut depth = 0usize;

    for (i, ch) in text.chars().enumerate() {
        if let Some((q, _)) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                if current.is_empty() {
                    start = i;
                }
                quote = Some((ch, i));
                current.push(ch);
            }
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            _ if ch.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    words.push((std::mem::take(&mut current), base + start));
                }
            }
            _ => {
                if current.is_empty() {
                    start = i;
                }
                current.push(ch);
            }
        }
    }
    if let Some((_, at)) = quote {
        return Err(StylePropertyError::new(
            StylePropertyErrorKind::NonMatchingQuote,
            base + at,
        ));
    }
    if !current.is_empty() {
        words.push((current, base + start));
    }
    Ok(words)
}

/// Comma separated family list. Quoted names are always `Named`; unquoted words
/// between commas join with single spaces and map to a generic family when the
/// whole run is a generic keyword.
pub fn parse_font_families(text: &str, base: usize) -> Result<Vec<FontFamily>, StylePropertyError> {
    let buf = scan::scalars(text);
    let mut families = Vec::new();
    let mut words: Vec<String> = Vec::new();

    let flush = |words: &mut Vec<String>, families: &mut Vec<FontFamily>| {
        if words.is_empty() {
            return;
        }
        let name = words.join(" ");
        words.clear();
        families.push(match GenericFamily::from_keyword(&name) {
            Some(generic) => FontFamily::Generic(generic),
            None => FontFamily::Named(name),
        });
    };

    let mut i = 0usize;
    while i < buf.len() {
        let ch = buf[i];
        if ch.is_whitespace() {
            i += 1;
        } else if ch == ',' {
            flush(&mut words, &mut families);
            i += 1;
        } else if ch == '"' || ch == '\'' {
            flush(&mut words, &mut families);
            let Some(close) = buf[i + 1..].iter().position(|c| *c == ch) else {
                return Err(StylePropertyError::new(
                    StylePropertyErrorKind::NonMatchingQuote,
                    base + i,
                ));
            };
            let name: String = buf[i + 1..i + 1 + close].iter().collect();
            families.push(FontFamily::Named(name));
            i += close + 2;
        } else {
            let start = i;
            while i < buf.len() && !buf[i].is_whitespace() && !matches!(buf[i], ',' | '"' | '\'') {
                i += 1;
            }
            words.push(buf[start..i].iter().collect());
        }
    }
    flush(&mut words, &mut families);

    if families.is_empty() {
        return Err(StylePropertyError::new(StylePropertyErrorKind::Empty, base));
    }
    Ok(families)
}

// style, variant, weight and stretch keywords in any order, then size, optional
// `/line-height`, and the family list.
fn parse_font_shorthand(text: &str, base: usize) -> Result<Vec<GraphicStyle>, StylePropertyError> {
    let words = split_words(text, 0)?;
    let mut style = FontStyle::Normal;
    let mut variant = FontVariant::Normal;
    let mut weight = FontWeight::Normal;
    let mut stretch = FontStretch::Normal;

    let mut index = 0usize;
    while let Some((word, _)) = words.get(index) {
        let word = word.to_ascii_lowercase();
        if word == "normal" {
            index += 1;
            continue;
        }
        if let Some(s) = FontStyle::from_keyword(&word) {
            style = s;
        } else if let Some(v) = FontVariant::from_keyword(&word) {
            variant = v;
        } else if let Some(w) = FontWeight::from_keyword(&word) {
            weight = w;
        } else if let Some(s) = FontStretch::from_keyword(&word) {
            stretch = s;
        } else {
            break;
        }
        index += 1;
    }

    let Some((size_word, size_offset)) = words.get(index) else {
        return Err(StylePropertyError::new(
            StylePropertyErrorKind::MissingFontSize,
            base + text.chars().count(),
        ));
    };
    let size_offset = *size_offset;
    index += 1;

    let size_word = size_word.to_ascii_lowercase();
    let (size_text, mut line_height_text) = match size_word.split_once('/') {
        Some((size, rest)) => {
            let rest_offset = size_offset + size.chars().count() + 1;
            (size.to_string(), Some((rest.to_string(), rest_offset)))
        }
        None => (size_word.clone(), None),
    };
    let size = parse_font_size(&size_text, base + size_offset)?;

    if line_height_text.as_ref().is_some_and(|(t, _)| t.is_empty()) {
        line_height_text = None;
        if let Some((next, offset)) = words.get(index) {
            line_height_text = Some((next.to_ascii_lowercase(), *offset));
            index += 1;
        }
    } else if line_height_text.is_none() {
        if let Some((next, offset)) = words.get(index) {
            if let Some(rest) = next.strip_prefix('/') {
                index += 1;
                if rest.is_empty() {
                    if let Some((after, after_offset)) = words.get(index) {
                        line_height_text = Some((after.to_ascii_lowercase(), *after_offset));
                        index += 1;
                    }
                } else {
                    line_height_text = Some((rest.to_ascii_lowercase(), offset + 1));
                }
            }
        }
    }
    let line_height = match line_height_text {
        Some((text, offset)) => parse_line_height(&text, base + offset)?,
        None => LineHeight::Normal,
    };

    let Some((_, family_offset)) = words.get(index) else {
        return Err(StylePropertyError::new(
            StylePropertyErrorKind::MissingFontFamily,
            base + text.chars().count(),
        ));
    };
    let family_text: String = text.chars().skip(*family_offset).collect();
    let families = parse_font_families(&family_text, base + family_offset)?;

    Ok(vec![
        GraphicStyle::new("font-style", StyleProperty::FontStyle(style)),
        GraphicStyle::new("font-variant", StyleProperty::FontVariant(variant)),
        GraphicStyle::new("font-weight", StyleProperty::FontWeight(weight)),
        GraphicStyle::new("font-stretch", StyleProperty::FontStretch(stretch)),
        GraphicStyle::new("font-size", StyleProperty::FontSize(size)),
        GraphicStyle::new("line-height", StyleProperty::LineHeight(line_height)),
        GraphicStyle::new("font-family", StyleProperty::FontFamilies(families)),
    ])
}

fn parse_border(
    text: &str,
    base: usize,
    parsers: &ColourParsers,
) -> Result<Border, StylePropertyError> {
    let mut border = Border::default();
    for (word, offset) in split_words(text, base)? {
        let lowered = word.to_ascii_lowercase();
        if let Some(style) = BorderStyle::from_keyword(&lowered) {
            border.style = Some(style);
            continue;
        }
        let keyword_width = match lowered.as_str() {
            "thin" => Some(1.0),
            "medium" => Some(3.0),
            "thick" => Some(5.0),
            _ => None,
        };
        if let Some(px) = keyword_width {
            border.width = Some((px, StyleUnit::Pixels));
            continue;
        }
        if lowered.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            border.width = Some(match parse_dimension(&lowered, offset)? {
                StyleProperty::UnitNumber(v, unit) => (v, unit),
                StyleProperty::Number(v) => (v, StyleUnit::Pixels),
                _ => return Err(unexpected(&word, offset)),
            });
            continue;
        }
        border.colour = Some(parse_colour_value(&word, offset, parsers)?);
    }
    Ok(border)
}

fn parse_box_edges(text: &str, base: usize) -> Result<StyleProperty, StylePropertyError> {
    let words = split_words(text, base)?;
    if let Some((word, offset)) = words.get(4) {
        return Err(unexpected(word, *offset));
    }
    let edges = words
        .iter()
        .map(|(word, offset)| {
            if word.eq_ignore_ascii_case("auto") {
                Ok(StyleProperty::String("auto".to_string()))
            } else {
                parse_dimension(word, *offset)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StyleProperty::Array(edges))
}

fn parse_dash_array(text: &str, base: usize) -> Result<StyleProperty, StylePropertyError> {
    if text.eq_ignore_ascii_case("none") {
        return Ok(StyleProperty::Array(Vec::new()));
    }
    let mut dashes = Vec::new();
    let mut start = 0usize;
    let chars = scan::scalars(text);
    for i in 0..=chars.len() {
        if i == chars.len() || chars[i] == ',' || chars[i].is_whitespace() {
            if i > start {
                let word: String = chars[start..i].iter().collect();
                dashes.push(parse_dimension(&word, base + start)?);
            }
            start = i + 1;
        }
    }
    Ok(StyleProperty::Array(dashes))
}
