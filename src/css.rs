use crate::colour::{ColourParsers, standard_parsers};
use crate::error::{CssErrorKind, CssParseError};
use crate::scan::{self, Cursor};
use crate::style::{GraphicStyle, interpret_property_with};

/// `(ids, classes + attributes + pseudo-classes, tags + pseudo-elements)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl std::ops::Add for Specificity {
    type Output = Specificity;

    fn add(self, other: Specificity) -> Specificity {
        Specificity(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub op: AttrOp,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    /// Matches child positions `a*n + b` for some `n >= 0` (1-based).
    NthChild { a: i32, b: i32 },
    Not(Box<SimpleSelector>),
    /// Parsed and counted for specificity, never matched.
    Other(String),
}

// Pseudo-elements that may still be written with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
    pub pseudo_classes: Vec<PseudoClass>,
    pub pseudo_elements: Vec<String>,
}

impl SimpleSelector {
    pub fn specificity(&self) -> Specificity {
        let count = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
        let mut total = Specificity(
            u16::from(self.id.is_some()),
            count(self.classes.len() + self.attrs.len()),
            count(self.pseudo_elements.len()),
        );
        if self.tag.as_deref().is_some_and(|tag| tag != "*") {
            total = total + Specificity(0, 0, 1);
        }
        for pseudo in &self.pseudo_classes {
            total = total
                + match pseudo {
                    PseudoClass::Not(inner) => inner.specificity(),
                    _ => Specificity(0, 1, 0),
                };
        }
        total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStep {
    Selector(SimpleSelector),
    Child,
    AdjacentSibling,
    Sibling,
    Descendant,
}

/// Simple selectors joined by combinators; always starts and ends with a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    pub steps: Vec<SelectorStep>,
}

impl SelectorChain {
    pub fn specificity(&self) -> Specificity {
        self.steps
            .iter()
            .filter_map(|step| match step {
                SelectorStep::Selector(simple) => Some(simple.specificity()),
                _ => None,
            })
            .fold(Specificity::default(), |acc, s| acc + s)
    }

    pub fn subject(&self) -> Option<&SimpleSelector> {
        match self.steps.last() {
            Some(SelectorStep::Selector(simple)) => Some(simple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleBlock {
    pub selectors: Vec<SelectorChain>,
    pub styles: Vec<GraphicStyle>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedStylesheet {
    pub blocks: Vec<StyleBlock>,
    /// Declarations dropped in lenient mode, each a `BadProperty` error.
    pub skipped: Vec<CssParseError>,
}

type Scalars = [(char, usize)];

fn unexpected(ch: char, offset: usize) -> CssParseError {
    CssParseError::new(CssErrorKind::UnexpectedCharacter(ch), offset)
}

fn is_ident(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

fn read_ident(chars: &Scalars, mut i: usize) -> (String, usize) {
    let mut name = String::new();
    while let Some(&(ch, _)) = chars.get(i) {
        if !is_ident(ch) {
            break;
        }
        name.push(ch);
        i += 1;
    }
    (name, i)
}

// Index of the scalar closing the bracket opened at `open`, honouring quotes and nesting.
fn matching_close(chars: &Scalars, open: usize) -> Option<usize> {
    let (opener, _) = chars[open];
    let closer = if opener == '[' { ']' } else { ')' };
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, &(ch, _)) in chars.iter().enumerate().skip(open) {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            _ if ch == opener => depth += 1,
            _ if ch == closer => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn trim(chars: &Scalars) -> &Scalars {
    let start = chars
        .iter()
        .position(|(c, _)| !c.is_whitespace())
        .unwrap_or(chars.len());
    let end = chars
        .iter()
        .rposition(|(c, _)| !c.is_whitespace())
        .map(|p| p + 1)
        .unwrap_or(start);
    &chars[start..end.max(start)]
}

fn text(chars: &Scalars) -> String {
    chars.iter().map(|(c, _)| *c).collect()
}

fn parse_nth(arg: &str) -> Option<(i32, i32)> {
    let arg: String = arg
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match arg.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }
    let Some((a, b)) = arg.split_once('n') else {
        return arg.parse::<i32>().ok().map(|b| (0, b));
    };
    let a = match a {
        "" | "+" => 1,
        "-" => -1,
        other => other.parse::<i32>().ok()?,
    };
    let b = if b.is_empty() {
        0
    } else {
        b.strip_prefix('+').unwrap_or(b).parse::<i32>().ok()?
    };
    Some((a, b))
}

fn parse_attr(chars: &Scalars, open_offset: usize) -> Result<AttrSelector, CssParseError> {
    let body = trim(chars);
    let (name, mut i) = read_ident(body, 0);
    if name.is_empty() {
        return Err(match body.first() {
            Some(&(ch, off)) => unexpected(ch, off),
            None => unexpected('[', open_offset),
        });
    }
    while body.get(i).is_some_and(|(c, _)| c.is_whitespace()) {
        i += 1;
    }
    let Some(&(first, first_off)) = body.get(i) else {
        return Ok(AttrSelector {
            name,
            op: AttrOp::Exists,
            value: None,
        });
    };
    let op = match first {
        '=' => AttrOp::Equals,
        '~' => AttrOp::Includes,
        '|' => AttrOp::DashMatch,
        '^' => AttrOp::Prefix,
        '$' => AttrOp::Suffix,
        '*' => AttrOp::Substring,
        other => return Err(unexpected(other, first_off)),
    };
    i += 1;
    if op != AttrOp::Equals {
        match body.get(i) {
            Some(('=', _)) => i += 1,
            Some(&(ch, off)) => return Err(unexpected(ch, off)),
            None => return Err(unexpected(first, first_off)),
        }
    }
    let rest = trim(&body[i..]);
    let value = match rest.first() {
        Some(&(q, off)) if q == '"' || q == '\'' => {
            if rest.len() < 2 || rest[rest.len() - 1].0 != q {
                return Err(CssParseError::new(CssErrorKind::NonMatchingQuote, off));
            }
            text(&rest[1..rest.len() - 1])
        }
        Some(_) => {
            if let Some(&(ch, off)) = rest.iter().find(|(c, _)| !is_ident(*c)) {
                return Err(unexpected(ch, off));
            }
            text(rest)
        }
        None => return Err(unexpected(first, first_off)),
    };
    Ok(AttrSelector {
        name,
        op,
        value: Some(value),
    })
}

fn parse_simple_selector(chars: &Scalars) -> Result<SimpleSelector, CssParseError> {
    let mut selector = SimpleSelector::default();
    let mut i = 0usize;
    if let Some(&('*', _)) = chars.first() {
        selector.tag = Some("*".to_string());
        i = 1;
    } else {
        let (name, next) = read_ident(chars, 0);
        if !name.is_empty() {
            selector.tag = Some(name.to_ascii_lowercase());
            i = next;
        }
    }

    while let Some(&(ch, offset)) = chars.get(i) {
        match ch {
            '#' | '.' => {
                let (name, next) = read_ident(chars, i + 1);
                if name.is_empty() {
                    return Err(unexpected(ch, offset));
                }
                if ch == '#' {
                    selector.id = Some(name);
                } else {
                    selector.classes.push(name);
                }
                i = next;
            }
            '[' => {
                let close = matching_close(chars, i).ok_or_else(|| unexpected(ch, offset))?;
                selector.attrs.push(parse_attr(&chars[i + 1..close], offset)?);
                i = close + 1;
            }
            ':' => {
                let element = matches!(chars.get(i + 1), Some((':', _)));
                let start = if element { i + 2 } else { i + 1 };
                let (name, next) = read_ident(chars, start);
                if name.is_empty() {
                    return Err(unexpected(ch, offset));
                }
                let name = name.to_ascii_lowercase();
                i = next;
                let mut args = None;
                if let Some(&('(', paren)) = chars.get(i) {
                    let close = matching_close(chars, i).ok_or_else(|| unexpected('(', paren))?;
                    args = Some((&chars[i + 1..close], paren));
                    i = close + 1;
                }
                if element || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
                    selector.pseudo_elements.push(name);
                } else {
                    selector
                        .pseudo_classes
                        .push(parse_pseudo_class(&name, args, offset)?);
                }
            }
            _ => return Err(unexpected(ch, offset)),
        }
    }
    Ok(selector)
}

fn parse_pseudo_class(
    name: &str,
    args: Option<(&Scalars, usize)>,
    offset: usize,
) -> Result<PseudoClass, CssParseError> {
    let pseudo = match (name, args) {
        ("root", None) => PseudoClass::Root,
        ("first-child", None) => PseudoClass::FirstChild,
        ("last-child", None) => PseudoClass::LastChild,
        ("nth-child", Some((arg, paren))) => {
            let (a, b) = parse_nth(&text(arg)).ok_or_else(|| unexpected('(', paren))?;
            PseudoClass::NthChild { a, b }
        }
        ("not", Some((arg, paren))) => {
            let inner = trim(arg);
            if inner.is_empty() {
                return Err(unexpected('(', paren));
            }
            PseudoClass::Not(Box::new(parse_simple_selector(inner)?))
        }
        ("nth-child" | "not", None) => return Err(unexpected(':', offset)),
        (other, _) => PseudoClass::Other(other.to_string()),
    };
    Ok(pseudo)
}

type PendingCombinator = Option<(SelectorStep, char, usize)>;

fn flush_simple(
    current: &mut Vec<(char, usize)>,
    steps: &mut Vec<SelectorStep>,
    pending: &mut PendingCombinator,
) -> Result<(), CssParseError> {
    if current.is_empty() {
        return Ok(());
    }
    let simple = parse_simple_selector(current)?;
    if !steps.is_empty() {
        let combinator = pending
            .take()
            .map(|(step, _, _)| step)
            .unwrap_or(SelectorStep::Descendant);
        steps.push(combinator);
    }
    steps.push(SelectorStep::Selector(simple));
    current.clear();
    Ok(())
}

fn parse_selector_chain(chars: &Scalars) -> Result<SelectorChain, CssParseError> {
    let mut steps: Vec<SelectorStep> = Vec::new();
    let mut current: Vec<(char, usize)> = Vec::new();
    let mut pending: PendingCombinator = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for &(ch, offset) in chars {
        if let Some(q) = quote {
            current.push((ch, offset));
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push((ch, offset));
            }
            '[' | '(' => {
                depth += 1;
                current.push((ch, offset));
            }
            ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push((ch, offset));
            }
            _ if depth > 0 => current.push((ch, offset)),
            _ if ch.is_whitespace() => flush_simple(&mut current, &mut steps, &mut pending)?,
            '>' | '+' | '~' => {
                flush_simple(&mut current, &mut steps, &mut pending)?;
                if steps.is_empty() || pending.is_some() {
                    return Err(unexpected(ch, offset));
                }
                let step = match ch {
                    '>' => SelectorStep::Child,
                    '+' => SelectorStep::AdjacentSibling,
                    _ => SelectorStep::Sibling,
                };
                pending = Some((step, ch, offset));
            }
            _ => current.push((ch, offset)),
        }
    }
    flush_simple(&mut current, &mut steps, &mut pending)?;
    if let Some((_, ch, offset)) = pending {
        return Err(unexpected(ch, offset));
    }
    Ok(SelectorChain { steps })
}

fn parse_selector_group(
    chars: &Scalars,
    block_offset: usize,
) -> Result<Vec<SelectorChain>, CssParseError> {
    let mut segments: Vec<(&Scalars, usize)> = Vec::new();
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, &(ch, offset)) in chars.iter().enumerate() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push((&chars[start..i], offset));
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push((&chars[start..], block_offset));

    if segments.iter().all(|(segment, _)| trim(segment).is_empty()) {
        return Err(CssParseError::new(CssErrorKind::NoSelectors, block_offset));
    }
    let mut chains = Vec::with_capacity(segments.len());
    for (segment, comma_offset) in segments {
        let segment = trim(segment);
        if segment.is_empty() {
            return Err(CssParseError::new(CssErrorKind::ExtraCommas, comma_offset));
        }
        chains.push(parse_selector_chain(segment)?);
    }
    Ok(chains)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclarationState {
    AwaitingKey,
    InKey,
    AwaitingColon,
    AwaitingValue,
    InValue,
}

/// Parser for stylesheets and inline declaration lists.
#[derive(Debug, Clone)]
pub struct StylesheetParser<'p> {
    parsers: &'p ColourParsers,
    lenient: bool,
}

impl Default for StylesheetParser<'static> {
    fn default() -> Self {
        Self::new(standard_parsers())
    }
}

impl<'p> StylesheetParser<'p> {
    pub fn new(parsers: &'p ColourParsers) -> Self {
        Self {
            parsers,
            lenient: false,
        }
    }

    /// Skip declarations whose value fails to interpret instead of failing the parse.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn parse(&self, source: &str) -> Result<ParsedStylesheet, CssParseError> {
        let buf = scan::scalars(source);
        let mut cursor = Cursor::new(&buf)?;
        let mut sheet = ParsedStylesheet::default();

        loop {
            cursor.skip_whitespace()?;
            if cursor.is_at_end() {
                break;
            }
            let selector_chars = Self::read_selector_text(&mut cursor)?;
            let brace = cursor.position();
            cursor.advance()?;
            let selectors = parse_selector_group(&selector_chars, brace)?;
            let styles = self.read_declarations(&mut cursor, Some('}'), &mut sheet.skipped)?;
            sheet.blocks.push(StyleBlock { selectors, styles });
        }
        Ok(sheet)
    }

    /// Declarations of a `style` attribute: no selectors and no braces.
    pub fn parse_inline(&self, source: &str) -> Result<ParsedStylesheet, CssParseError> {
        let buf = scan::scalars(source);
        let mut cursor = Cursor::new(&buf)?;
        let mut sheet = ParsedStylesheet::default();
        let styles = self.read_declarations(&mut cursor, None, &mut sheet.skipped)?;
        if !styles.is_empty() {
            sheet.blocks.push(StyleBlock {
                selectors: Vec::new(),
                styles,
            });
        }
        Ok(sheet)
    }

    // Scalars up to the `{` opening the block; the cursor is left on the brace.
    fn read_selector_text(cursor: &mut Cursor<'_>) -> Result<Vec<(char, usize)>, CssParseError> {
        let mut chars = Vec::new();
        let mut depth = 0usize;
        let mut quote: Option<(char, usize)> = None;
        while let Some(ch) = cursor.peek() {
            let offset = cursor.position();
            if let Some((q, _)) = quote {
                chars.push((ch, offset));
                cursor.advance_raw();
                if ch == q {
                    quote = None;
                    cursor.skip_comments()?;
                }
                continue;
            }
            match ch {
                '{' if depth == 0 => return Ok(chars),
                '}' | ';' | '{' => return Err(unexpected(ch, offset)),
                '"' | '\'' => quote = Some((ch, offset)),
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            chars.push((ch, offset));
            if quote.is_some() {
                cursor.advance_raw();
            } else {
                cursor.advance()?;
            }
        }
        match quote {
            Some((_, at)) => Err(CssParseError::new(CssErrorKind::NonMatchingQuote, at)),
            None => Err(CssParseError::new(
                CssErrorKind::UnexpectedEnd,
                cursor.buffer().len(),
            )),
        }
    }

    // Reads declarations up to and including `terminator`, or to the end of input
    // when there is none.
    fn read_declarations(
        &self,
        cursor: &mut Cursor<'_>,
        terminator: Option<char>,
        skipped: &mut Vec<CssParseError>,
    ) -> Result<Vec<GraphicStyle>, CssParseError> {
        let mut styles = Vec::new();
        let mut state = DeclarationState::AwaitingKey;
        let mut key = String::new();
        let mut value = String::new();
        // Buffer offset of each scalar in `value`, so failures point past stripped comments.
        let mut value_offsets: Vec<usize> = Vec::new();
        let mut value_offset = 0usize;
        let mut important = false;
        let mut depth = 0usize;

        loop {
            let offset = cursor.position();
            let Some(ch) = cursor.peek() else {
                if terminator.is_none() {
                    match state {
                        DeclarationState::AwaitingKey => return Ok(styles),
                        DeclarationState::AwaitingValue | DeclarationState::InValue => {
                            self.finish(
                                &key,
                                &value,
                                value_locator(&value_offsets, value_offset),
                                important,
                                &mut styles,
                                skipped,
                            )?;
                            return Ok(styles);
                        }
                        _ => {}
                    }
                }
                return Err(CssParseError::new(CssErrorKind::UnexpectedEnd, offset));
            };
            let closes = terminator == Some(ch);

            match state {
                DeclarationState::AwaitingKey => {
                    if closes {
                        cursor.advance()?;
                        return Ok(styles);
                    }
                    match ch {
                        _ if ch.is_whitespace() => {}
                        ';' => {
                            return Err(CssParseError::new(
                                CssErrorKind::UnexpectedSemiColon,
                                offset,
                            ));
                        }
                        ':' => {
                            return Err(CssParseError::new(CssErrorKind::UnexpectedColon, offset));
                        }
                        _ if is_ident(ch) => {
                            key.clear();
                            key.push(ch);
                            state = DeclarationState::InKey;
                        }
                        _ => return Err(unexpected(ch, offset)),
                    }
                }
                DeclarationState::InKey | DeclarationState::AwaitingColon => {
                    if ch == ':' {
                        value.clear();
                        value_offsets.clear();
                        value_offset = offset + 1;
                        important = false;
                        depth = 0;
                        state = DeclarationState::AwaitingValue;
                    } else if ch == ';' {
                        return Err(CssParseError::new(CssErrorKind::UnexpectedSemiColon, offset));
                    } else if ch.is_whitespace() {
                        state = DeclarationState::AwaitingColon;
                    } else if state == DeclarationState::InKey && is_ident(ch) {
                        key.push(ch);
                    } else {
                        return Err(unexpected(ch, offset));
                    }
                }
                DeclarationState::AwaitingValue | DeclarationState::InValue => {
                    if important && !ch.is_whitespace() && !(closes || ch == ';') {
                        return Err(unexpected(ch, offset));
                    }
                    match ch {
                        '"' | '\'' => {
                            Self::read_quoted(cursor, &mut value, &mut value_offsets)?;
                            state = DeclarationState::InValue;
                            continue;
                        }
                        '(' => depth += 1,
                        ')' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    if depth == 0 && (closes || ch == ';') {
                        self.finish(
                            &key,
                            &value,
                            value_locator(&value_offsets, value_offset),
                            important,
                            &mut styles,
                            skipped,
                        )?;
                        cursor.advance()?;
                        if closes {
                            return Ok(styles);
                        }
                        state = DeclarationState::AwaitingKey;
                        continue;
                    }
                    if depth == 0 && ch == ':' {
                        return Err(CssParseError::new(CssErrorKind::UnexpectedColon, offset));
                    }
                    if depth == 0 && ch == '!' {
                        Self::read_important(cursor)?;
                        important = true;
                        continue;
                    }
                    if state == DeclarationState::AwaitingValue && ch.is_whitespace() {
                        value_offset = offset + 1;
                    } else {
                        value.push(ch);
                        value_offsets.push(offset);
                        state = DeclarationState::InValue;
                    }
                }
            }
            cursor.advance()?;
        }
    }

    // Quoted run copied verbatim into `value`; comment markers inside are literal.
    fn read_quoted(
        cursor: &mut Cursor<'_>,
        value: &mut String,
        offsets: &mut Vec<usize>,
    ) -> Result<(), CssParseError> {
        let open = cursor.position();
        let Some(quote) = cursor.peek() else {
            return Err(CssParseError::new(CssErrorKind::UnexpectedEnd, open));
        };
        value.push(quote);
        offsets.push(open);
        cursor.advance_raw();
        while let Some(ch) = cursor.peek() {
            value.push(ch);
            offsets.push(cursor.position());
            cursor.advance_raw();
            if ch == quote {
                cursor.skip_comments()?;
                return Ok(());
            }
        }
        Err(CssParseError::new(CssErrorKind::NonMatchingQuote, open))
    }

    fn read_important(cursor: &mut Cursor<'_>) -> Result<(), CssParseError> {
        const WORD: &str = "important";
        let bang = cursor.position();
        for (n, expected) in WORD.chars().enumerate() {
            if cursor.peek_raw(n + 1) != Some(expected) {
                return Err(CssParseError::new(CssErrorKind::IncompleteImportant, bang));
            }
        }
        for _ in 0..=WORD.len() {
            cursor.advance_raw();
        }
        cursor.skip_comments()?;
        Ok(())
    }

    fn finish(
        &self,
        key: &str,
        value: &str,
        locate: impl Fn(usize) -> usize,
        important: bool,
        styles: &mut Vec<GraphicStyle>,
        skipped: &mut Vec<CssParseError>,
    ) -> Result<(), CssParseError> {
        match interpret_property_with(key, value, self.parsers) {
            Ok(expanded) => {
                styles.extend(expanded.into_iter().map(|s| s.important(important)));
                Ok(())
            }
            Err(source) => {
                let err = CssParseError::new(
                    CssErrorKind::BadProperty {
                        key: key.to_string(),
                        source: source.clone(),
                    },
                    locate(source.offset),
                );
                if !self.lenient {
                    return Err(err);
                }
                log::warn!("skipping declaration '{key}': {source}");
                skipped.push(err);
                Ok(())
            }
        }
    }
}

// Maps a scalar index within a declaration value back to its buffer offset.
fn value_locator(offsets: &[usize], start: usize) -> impl Fn(usize) -> usize + '_ {
    move |index| match offsets.get(index) {
        Some(offset) => *offset,
        None => offsets.last().map_or(start, |last| last + 1),
    }
}

pub fn parse_stylesheet(source: &str) -> Result<Vec<StyleBlock>, CssParseError> {
    StylesheetParser::default()
        .parse(source)
        .map(|sheet| sheet.blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::error::StylePropertyErrorKind;
    use crate::style::{StyleProperty, StyleUnit};

    fn chain(source: &str) -> SelectorChain {
        let blocks = parse_stylesheet(&format!("{source} {{ }}")).expect("parse");
        blocks[0].selectors[0].clone()
    }

    fn err_kind(source: &str) -> CssErrorKind {
        parse_stylesheet(source).expect_err(source).kind
    }

    fn simple(step: &SelectorStep) -> &SimpleSelector {
        match step {
            SelectorStep::Selector(s) => s,
            other => panic!("expected selector, got {other:?}"),
        }
    }

    #[test]
    fn parses_blocks_with_selector_groups() {
        let blocks = parse_stylesheet(
            "rect, .shape > circle { fill: red; stroke-width: 2px }\n#logo { opacity: 0.5; }",
        )
        .expect("parse");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].selectors.len(), 2);
        assert_eq!(
            blocks[0].styles,
            vec![
                GraphicStyle::new("fill", StyleProperty::Colour(Colour::from_rgb8(255, 0, 0))),
                GraphicStyle::new(
                    "stroke-width",
                    StyleProperty::UnitNumber(2.0, StyleUnit::Pixels)
                ),
            ]
        );
        assert_eq!(blocks[1].styles[0].value, StyleProperty::Number(0.5));
    }

    #[test]
    fn combinators_become_steps() {
        let c = chain("svg g > .a + rect ~ circle");
        let kinds: Vec<&str> = c
            .steps
            .iter()
            .map(|s| match s {
                SelectorStep::Selector(_) => "sel",
                SelectorStep::Child => ">",
                SelectorStep::AdjacentSibling => "+",
                SelectorStep::Sibling => "~",
                SelectorStep::Descendant => " ",
            })
            .collect();
        assert_eq!(kinds, vec!["sel", " ", "sel", ">", "sel", "+", "sel", "~", "sel"]);
        assert_eq!(chain("a>b").steps.len(), 3);
    }

    #[test]
    fn simple_selector_parts() {
        let c = chain("rect#main.big.red[data-x=\"1\"]:first-child::before");
        let s = simple(&c.steps[0]);
        assert_eq!(s.tag.as_deref(), Some("rect"));
        assert_eq!(s.id.as_deref(), Some("main"));
        assert_eq!(s.classes, vec!["big".to_string(), "red".to_string()]);
        assert_eq!(
            s.attrs,
            vec![AttrSelector {
                name: "data-x".to_string(),
                op: AttrOp::Equals,
                value: Some("1".to_string())
            }]
        );
        assert_eq!(s.pseudo_classes, vec![PseudoClass::FirstChild]);
        assert_eq!(s.pseudo_elements, vec!["before".to_string()]);
    }

    #[test]
    fn specificity_counts_each_category() {
        assert_eq!(chain("#a .b c").specificity(), Specificity(1, 1, 1));
        assert_eq!(chain("a:hover::after").specificity(), Specificity(0, 1, 2));
        assert_eq!(chain("a:after").specificity(), Specificity(0, 0, 2));
        assert_eq!(chain("*[x] > :not(#y)").specificity(), Specificity(1, 1, 0));
        assert!(chain("#a").specificity() > chain(".a.b.c.d").specificity());
    }

    #[test]
    fn specificity_saturates() {
        let max = Specificity(u16::MAX, u16::MAX, u16::MAX);
        assert_eq!(max + Specificity(1, 1, 1), max);
        let simple = SimpleSelector {
            classes: vec!["c".to_string(); usize::from(u16::MAX) + 5],
            ..SimpleSelector::default()
        };
        assert_eq!(simple.specificity(), Specificity(0, u16::MAX, 0));
    }

    #[test]
    fn nth_child_formulas() {
        let c = chain("li:nth-child(2n+1):nth-child(even):nth-child(3):nth-child(-n+2)");
        assert_eq!(
            simple(&c.steps[0]).pseudo_classes,
            vec![
                PseudoClass::NthChild { a: 2, b: 1 },
                PseudoClass::NthChild { a: 2, b: 0 },
                PseudoClass::NthChild { a: 0, b: 3 },
                PseudoClass::NthChild { a: -1, b: 2 },
            ]
        );
        assert!(matches!(
            err_kind("li:nth-child(x) {}"),
            CssErrorKind::UnexpectedCharacter('(')
        ));
    }

    #[test]
    fn selector_group_errors() {
        assert_eq!(err_kind("{ fill: red }"), CssErrorKind::NoSelectors);
        assert_eq!(err_kind("a,,b { fill: red }"), CssErrorKind::ExtraCommas);
        assert_eq!(err_kind("a, { fill: red }"), CssErrorKind::ExtraCommas);
        assert_eq!(err_kind("> a { }"), CssErrorKind::UnexpectedCharacter('>'));
        assert_eq!(err_kind("a > > b { }"), CssErrorKind::UnexpectedCharacter('>'));
        assert_eq!(err_kind("a + { }"), CssErrorKind::UnexpectedCharacter('+'));
        assert_eq!(err_kind("a$ { }"), CssErrorKind::UnexpectedCharacter('$'));
        assert_eq!(err_kind("a } "), CssErrorKind::UnexpectedCharacter('}'));
        assert_eq!(err_kind("rect"), CssErrorKind::UnexpectedEnd);
    }

    #[test]
    fn declaration_structure_errors() {
        assert_eq!(err_kind("a { : red }"), CssErrorKind::UnexpectedColon);
        assert_eq!(err_kind("a { ; }"), CssErrorKind::UnexpectedSemiColon);
        assert_eq!(err_kind("a { fill; }"), CssErrorKind::UnexpectedSemiColon);
        assert_eq!(err_kind("a { fill: red: blue }"), CssErrorKind::UnexpectedColon);
        assert_eq!(err_kind("a { fill: red"), CssErrorKind::UnexpectedEnd);
        assert_eq!(err_kind("a { font-family: 'x }"), CssErrorKind::NonMatchingQuote);
        assert_eq!(err_kind("a { fi ll: red }"), CssErrorKind::UnexpectedCharacter('l'));
    }

    #[test]
    fn important_must_be_complete_and_last() {
        let blocks = parse_stylesheet("a { fill: red !important; stroke: blue }").expect("parse");
        assert!(blocks[0].styles[0].important);
        assert!(!blocks[0].styles[1].important);
        assert_eq!(
            err_kind("a { fill: red !imp; }"),
            CssErrorKind::IncompleteImportant
        );
        assert_eq!(
            err_kind("a { fill: red !IMPORTANT; }"),
            CssErrorKind::IncompleteImportant
        );
        assert_eq!(
            err_kind("a { fill: red !important blue; }"),
            CssErrorKind::UnexpectedCharacter('b')
        );
        let blocks = parse_stylesheet("a { fill: red !important }").expect("parse");
        assert!(blocks[0].styles[0].important);
    }

    #[test]
    fn important_applies_to_every_expanded_longhand() {
        let blocks =
            parse_stylesheet("p { font: bold 10pt serif !important }").expect("parse");
        assert_eq!(blocks[0].styles.len(), 7);
        assert!(blocks[0].styles.iter().all(|s| s.important));
    }

    #[test]
    fn comments_are_skipped_everywhere_but_quotes() {
        let blocks = parse_stylesheet(
            "/* head */ a /* sel */ { /* k */ font-family: '/* kept */' ; fill: /* v */ red }",
        )
        .expect("parse");
        assert_eq!(blocks[0].styles.len(), 2);
        assert_eq!(
            blocks[0].styles[0].value,
            StyleProperty::FontFamilies(vec![crate::style::FontFamily::Named(
                "/* kept */".to_string()
            )])
        );
        assert_eq!(err_kind("a { fill: red } /* open"), CssErrorKind::UnterminatedComment);
    }

    #[test]
    fn bad_values_fail_the_whole_parse_by_default() {
        let err = parse_stylesheet("a { fill: red }\nb { stroke-width: 3furlongs; fill: blue }")
            .expect_err("bad value");
        let CssErrorKind::BadProperty { key, source } = &err.kind else {
            panic!("expected bad property, got {err:?}");
        };
        assert_eq!(key, "stroke-width");
        assert!(matches!(
            source.kind,
            StylePropertyErrorKind::UnexpectedCharacter(_)
        ));
        assert!(err.describe("a { fill: red }\nb { stroke-width: 3furlongs; fill: blue }")
            .contains("line 2"));
    }

    #[test]
    fn bad_value_offsets_skip_comments() {
        let source = "b { stroke-width: 3/* c */furlongs; }";
        let err = parse_stylesheet(source).expect_err("bad unit");
        assert!(matches!(err.kind, CssErrorKind::BadProperty { .. }));
        assert_eq!(source.chars().nth(err.offset), Some('f'));
        assert_eq!(err.offset, 26);
    }

    #[test]
    fn lenient_mode_skips_bad_declarations() {
        let parsers = ColourParsers::standard();
        let sheet = StylesheetParser::new(&parsers)
            .lenient(true)
            .parse("a { fill: nocolour; stroke: blue }")
            .expect("lenient parse");
        assert_eq!(sheet.blocks[0].styles.len(), 1);
        assert_eq!(sheet.blocks[0].styles[0].key, "stroke");
        assert_eq!(sheet.skipped.len(), 1);

        let err = StylesheetParser::new(&parsers)
            .lenient(true)
            .parse("a { fill: red; : }")
            .expect_err("structural errors still fail");
        assert_eq!(err.kind, CssErrorKind::UnexpectedColon);
    }

    #[test]
    fn inline_declarations() {
        let parser = StylesheetParser::default();
        let sheet = parser.parse_inline("fill: red; stroke-width: 2").expect("inline");
        assert_eq!(sheet.blocks[0].styles.len(), 2);
        assert!(sheet.blocks[0].selectors.is_empty());
        assert!(parser.parse_inline("  ").expect("empty").blocks.is_empty());
        assert_eq!(
            parser.parse_inline("fill").expect_err("no colon").kind,
            CssErrorKind::UnexpectedEnd
        );
    }
}
