mod cascade;
mod colour;
mod colour_names;
mod css;
mod debug;
mod error;
mod font;
mod geometry;
mod path;
mod scan;
mod style;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::json;

pub use cascade::{Cascade, ElementInfo, ResolvedStyles};
pub use colour::{
    Colour, ColourModel, ColourParser, ColourParsers, DeviceColourParser, HexColourParser,
    IccColourParser, PlaceholderColourParser, ProfileResolver, RgbColourParser, WebColourParser,
    parse_color,
};
pub use css::{
    AttrOp, AttrSelector, ParsedStylesheet, PseudoClass, SelectorChain, SelectorStep,
    SimpleSelector, Specificity, StyleBlock, StylesheetParser, parse_stylesheet,
};
pub use debug::DebugLogger;
pub use error::{
    ColourErrorKind, ColourParseError, CssErrorKind, CssParseError, Error, PathErrorKind,
    PathParseError, ScanError, StylePropertyError, StylePropertyErrorKind,
};
pub use font::{DEFAULT_FONT_CACHE_CAPACITY, FontAttributes, FontCache, FontCacheStats, face_name};
pub use geometry::{
    DrawOp, arc_point, arc_to_draw_op, bounds, compile_path_tokens, end_point, flatten_arcs,
    to_tiny_skia_path,
};
pub use path::{
    ArcSize, EllipticalArc, PathParser, PathToken, Position, SweepDirection, parse_svg_path,
    to_absolute, tokens_to_string,
};
pub use scan::{diagnostic, line_number, number_and_unit_str, strip_comments};
pub use style::{
    Border, BorderStyle, FontFamily, FontSize, FontStretch, FontStyle, FontVariant, FontWeight,
    GenericFamily, GraphicStyle, LineHeight, StyleProperty, StyleUnit, interpret_property,
    interpret_property_with, parse_font_families,
};
pub use types::{Point, Transform};

/// Largest sweep, in radians, of one cubic when arcs are flattened.
pub const DEFAULT_ARC_TOLERANCE: f64 = std::f64::consts::FRAC_PI_2;

const ENV_DEBUG_LOG: &str = "VECTORSTYLE_DEBUG_LOG";
const ENV_LENIENT_CSS: &str = "VECTORSTYLE_LENIENT_CSS";

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
        })
        .unwrap_or(false)
}

/// Configured parsing front end: shared colour parsers, stylesheet policy, font
/// cache and an optional JSONL debug log.
#[derive(Debug)]
pub struct Toolkit {
    colour_parsers: ColourParsers,
    lenient_declarations: bool,
    arc_tolerance: f64,
    font_cache: FontCache,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Debug, Clone)]
pub struct ToolkitBuilder {
    debug_path: Option<PathBuf>,
    lenient_declarations: bool,
    colour_parsers: ColourParsers,
    arc_tolerance: f64,
    font_cache_capacity: usize,
}

impl Default for ToolkitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolkitBuilder {
    pub fn new() -> Self {
        Self {
            debug_path: None,
            lenient_declarations: false,
            colour_parsers: ColourParsers::standard(),
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
            font_cache_capacity: DEFAULT_FONT_CACHE_CAPACITY,
        }
    }

    /// Builder seeded from `VECTORSTYLE_DEBUG_LOG` and `VECTORSTYLE_LENIENT_CSS`.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Ok(path) = std::env::var(ENV_DEBUG_LOG) {
            let path = path.trim();
            if !path.is_empty() {
                builder.debug_path = Some(PathBuf::from(path));
            }
        }
        builder.lenient_declarations = env_flag(ENV_LENIENT_CSS);
        builder
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn lenient_declarations(mut self, enabled: bool) -> Self {
        self.lenient_declarations = enabled;
        self
    }

    pub fn colour_parsers(mut self, parsers: ColourParsers) -> Self {
        self.colour_parsers = parsers;
        self
    }

    pub fn arc_tolerance(mut self, radians: f64) -> Self {
        self.arc_tolerance = radians;
        self
    }

    pub fn font_cache_capacity(mut self, entries: usize) -> Self {
        self.font_cache_capacity = entries;
        self
    }

    pub fn build(self) -> Result<Toolkit, Error> {
        if !self.arc_tolerance.is_finite()
            || self.arc_tolerance <= 0.0
            || self.arc_tolerance > DEFAULT_ARC_TOLERANCE
        {
            return Err(Error::InvalidConfiguration(format!(
                "arc_tolerance must be in (0, pi/2], got {}",
                self.arc_tolerance
            )));
        }
        if self.font_cache_capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "font_cache_capacity must be > 0".to_string(),
            ));
        }
        if self.colour_parsers.names().is_empty() {
            return Err(Error::InvalidConfiguration(
                "colour_parsers must not be empty".to_string(),
            ));
        }
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        log::debug!(
            "toolkit built: lenient_declarations={} arc_tolerance={} colour_parsers={:?}",
            self.lenient_declarations,
            self.arc_tolerance,
            self.colour_parsers.names()
        );
        Ok(Toolkit {
            colour_parsers: self.colour_parsers,
            lenient_declarations: self.lenient_declarations,
            arc_tolerance: self.arc_tolerance,
            font_cache: FontCache::new(self.font_cache_capacity),
            debug,
        })
    }
}

impl Toolkit {
    pub fn builder() -> ToolkitBuilder {
        ToolkitBuilder::new()
    }

    pub fn colour_parsers(&self) -> &ColourParsers {
        &self.colour_parsers
    }

    pub fn lenient_declarations(&self) -> bool {
        self.lenient_declarations
    }

    pub fn arc_tolerance(&self) -> f64 {
        self.arc_tolerance
    }

    pub fn debug_logger(&self) -> Option<&DebugLogger> {
        self.debug.as_deref()
    }

    pub fn parse_path(&self, source: &str) -> Result<Vec<PathToken>, PathParseError> {
        log::trace!("parsing path data ({} bytes)", source.len());
        let parser = PathParser::new(source);
        match parser.tokens() {
            Ok(tokens) => {
                log::debug!("parsed {} path tokens", tokens.len());
                if let Some(debug) = &self.debug {
                    debug.log_event("path.parse", json!({ "tokens": tokens.len() }));
                }
                Ok(tokens)
            }
            Err(err) => {
                if let Some(debug) = &self.debug {
                    let lossy = parser.tokens_lossy();
                    let reason = lossy.iter().find_map(|token| match token {
                        PathToken::Bad(reason) => Some(reason.clone()),
                        _ => None,
                    });
                    debug.log_event(
                        "path.parse_failed",
                        json!({
                            "kind": err.kind.to_string(),
                            "offset": err.offset,
                            "diagnostic": err.describe(source),
                            "prefix": tokens_to_string(&lossy),
                            "reason": reason,
                        }),
                    );
                }
                Err(err)
            }
        }
    }

    /// Parse and compile path data into absolute drawing primitives.
    pub fn compile_path(&self, source: &str) -> Result<Vec<DrawOp>, PathParseError> {
        self.parse_path(source)
            .map(|tokens| compile_path_tokens(&tokens))
    }

    /// `Ok(None)` when the path has no drawable segments.
    pub fn skia_path(&self, source: &str) -> Result<Option<tiny_skia::Path>, PathParseError> {
        let ops = self.compile_path(source)?;
        Ok(to_tiny_skia_path(&ops, self.arc_tolerance))
    }

    pub fn parse_colour(
        &self,
        source: &str,
        profile_resolver: Option<&ProfileResolver<'_>>,
    ) -> Result<Option<Colour>, ColourParseError> {
        let result = self.colour_parsers.parse_string(source, profile_resolver);
        if let (Err(err), Some(debug)) = (&result, &self.debug) {
            debug.log_event(
                "colour.parse_failed",
                json!({
                    "kind": err.kind.to_string(),
                    "offset": err.offset,
                    "diagnostic": err.describe(source),
                }),
            );
        }
        result
    }

    fn stylesheet_parser(&self) -> StylesheetParser<'_> {
        StylesheetParser::new(&self.colour_parsers).lenient(self.lenient_declarations)
    }

    fn record_stylesheet(&self, source: &str, result: &Result<ParsedStylesheet, CssParseError>) {
        let Some(debug) = &self.debug else {
            return;
        };
        match result {
            Ok(sheet) => {
                for skipped in &sheet.skipped {
                    let key = match &skipped.kind {
                        CssErrorKind::BadProperty { key, .. } => Some(key.clone()),
                        _ => None,
                    };
                    debug.log_event(
                        "css.declaration_skipped",
                        json!({
                            "key": key,
                            "offset": skipped.offset,
                            "error": skipped.kind.to_string(),
                            "diagnostic": skipped.describe(source),
                        }),
                    );
                }
                debug.log_event(
                    "css.parse",
                    json!({
                        "blocks": sheet.blocks.len(),
                        "declarations": sheet.blocks.iter().map(|b| b.styles.len()).sum::<usize>(),
                        "skipped": sheet.skipped.len(),
                    }),
                );
            }
            Err(err) => debug.log_event(
                "css.parse_failed",
                json!({
                    "kind": err.kind.to_string(),
                    "offset": err.offset,
                    "diagnostic": err.describe(source),
                }),
            ),
        }
    }

    pub fn parse_stylesheet(&self, source: &str) -> Result<Vec<StyleBlock>, CssParseError> {
        log::trace!("parsing stylesheet ({} bytes)", source.len());
        let result = self.stylesheet_parser().parse(source);
        self.record_stylesheet(source, &result);
        let sheet = result?;
        log::debug!(
            "parsed {} style blocks ({} declarations skipped)",
            sheet.blocks.len(),
            sheet.skipped.len()
        );
        Ok(sheet.blocks)
    }

    /// Declarations of a `style` attribute.
    pub fn parse_inline_style(&self, source: &str) -> Result<Vec<GraphicStyle>, CssParseError> {
        let result = self.stylesheet_parser().parse_inline(source);
        self.record_stylesheet(source, &result);
        Ok(result?
            .blocks
            .into_iter()
            .flat_map(|block| block.styles)
            .collect())
    }

    pub fn cascade(&self, source: &str) -> Result<Cascade, CssParseError> {
        self.parse_stylesheet(source).map(Cascade::new)
    }

    pub fn interpret_property(
        &self,
        key: &str,
        raw_value: &str,
    ) -> Result<Vec<GraphicStyle>, StylePropertyError> {
        interpret_property_with(key, raw_value, &self.colour_parsers)
    }

    /// Face name for resolved font styles, memoized in the toolkit's cache.
    pub fn font_face(&self, attrs: &FontAttributes) -> Arc<str> {
        self.font_cache.face_for(attrs)
    }

    pub fn font_cache_stats(&self) -> FontCacheStats {
        self.font_cache.stats()
    }

    /// Parse many path strings in parallel; results keep input order.
    pub fn parse_paths(&self, sources: &[&str]) -> Vec<Result<Vec<PathToken>, PathParseError>> {
        let results: Vec<_> = sources
            .par_iter()
            .map(|source| self.parse_path(source))
            .collect();
        if let Some(debug) = &self.debug {
            debug.increment("batch.paths", sources.len() as u64);
        }
        results
    }

    pub fn parse_stylesheets(
        &self,
        sources: &[&str],
    ) -> Vec<Result<Vec<StyleBlock>, CssParseError>> {
        let results: Vec<_> = sources
            .par_iter()
            .map(|source| self.parse_stylesheet(source))
            .collect();
        if let Some(debug) = &self.debug {
            debug.increment("batch.stylesheets", sources.len() as u64);
        }
        results
    }

    /// Write the debug summary record and flush the log, if one is configured.
    pub fn emit_debug_summary(&self, context: &str) {
        if let Some(debug) = &self.debug {
            let stats = self.font_cache.stats();
            debug.increment("font_cache.hits", stats.hits);
            debug.increment("font_cache.misses", stats.misses);
            debug.emit_summary(context);
            debug.flush();
        }
    }
}
