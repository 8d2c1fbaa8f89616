use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::style::{
    FontFamily, FontSize, FontStretch, FontStyle, FontVariant, GenericFamily, GraphicStyle, LineHeight,
    StyleProperty,
};

pub const DEFAULT_FONT_CACHE_CAPACITY: usize = 256;

/// Platform-neutral font request resolved from font styles.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAttributes {
    pub families: Vec<FontFamily>,
    pub weight: u16,
    pub style: FontStyle,
    pub small_caps: bool,
    /// Width as a percentage of normal.
    pub stretch: f64,
    pub size_points: f64,
    pub line_height: LineHeight,
}

impl Default for FontAttributes {
    fn default() -> Self {
        Self {
            families: vec![FontFamily::Generic(GenericFamily::Serif)],
            weight: 400,
            style: FontStyle::Normal,
            small_caps: false,
            stretch: FontStretch::Normal.percentage(),
            size_points: 12.0,
            line_height: LineHeight::Normal,
        }
    }
}

impl FontAttributes {
    /// Apply the font longhands in `styles` on top of `parent`.
    ///
    /// Relative sizes and weights resolve against the parent. Other keys, and
    /// cascade keywords such as `inherit`, leave the parent's value in place.
    pub fn from_styles<'a>(
        styles: impl IntoIterator<Item = &'a GraphicStyle>,
        parent: &FontAttributes,
    ) -> FontAttributes {
        let mut attrs = parent.clone();
        for style in styles {
            match &style.value {
                StyleProperty::FontFamilies(families) => attrs.families = families.clone(),
                StyleProperty::FontSize(size) => attrs.size_points = size.to_points(parent.size_points),
                StyleProperty::FontWeight(weight) => attrs.weight = weight.resolve(parent.weight),
                StyleProperty::FontStyle(font_style) => attrs.style = *font_style,
                StyleProperty::FontVariant(variant) => {
                    attrs.small_caps = *variant == FontVariant::SmallCaps
                }
                StyleProperty::FontStretch(stretch) => attrs.stretch = stretch.percentage(),
                StyleProperty::LineHeight(line_height) => attrs.line_height = *line_height,
                _ => {}
            }
        }
        attrs
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }

    pub fn is_italic(&self) -> bool {
        self.style != FontStyle::Normal
    }

    /// Line height in points; `normal` is 1.2 times the size.
    pub fn line_height_points(&self) -> f64 {
        match self.line_height {
            LineHeight::Normal => self.size_points * 1.2,
            LineHeight::Number(factor) => self.size_points * factor,
            LineHeight::Length(value, unit) => {
                FontSize::Length(value, unit).to_points(self.size_points)
            }
        }
    }
}

fn base14_face(generic: GenericFamily, bold: bool, italic: bool) -> &'static str {
    match generic {
        GenericFamily::Serif => match (bold, italic) {
            (true, true) => "Times-BoldItalic",
            (true, false) => "Times-Bold",
            (false, true) => "Times-Italic",
            (false, false) => "Times-Roman",
        },
        GenericFamily::Monospace => match (bold, italic) {
            (true, true) => "Courier-BoldOblique",
            (true, false) => "Courier-Bold",
            (false, true) => "Courier-Oblique",
            (false, false) => "Courier",
        },
        GenericFamily::SansSerif
        | GenericFamily::Cursive
        | GenericFamily::Fantasy
        | GenericFamily::System => match (bold, italic) {
            (true, true) => "Helvetica-BoldOblique",
            (true, false) => "Helvetica-Bold",
            (false, true) => "Helvetica-Oblique",
            (false, false) => "Helvetica",
        },
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_ascii_lowercase()
}

/// Face name for one family at the given weight and slant.
///
/// Generic families map onto the base-14 faces; named families get a
/// `-Bold`, `-Italic` or `-BoldItalic` suffix.
pub fn face_name(family: &FontFamily, bold: bool, italic: bool) -> String {
    match family {
        FontFamily::Generic(generic) => base14_face(*generic, bold, italic).to_string(),
        FontFamily::Named(name) => {
            let base = name.trim();
            match (bold, italic) {
                (true, true) => format!("{base}-BoldItalic"),
                (true, false) => format!("{base}-Bold"),
                (false, true) => format!("{base}-Italic"),
                (false, false) => base.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

#[derive(Debug)]
struct FaceCache {
    map: HashMap<FaceKey, Arc<str>>,
    order: VecDeque<FaceKey>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl FaceCache {
    fn new(max_entries: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, key: &FaceKey) -> Option<Arc<str>> {
        let found = self.map.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    fn insert(&mut self, key: FaceKey, value: Arc<str>) {
        if self.map.contains_key(&key) {
            return;
        }
        self.map.insert(key.clone(), value);
        self.order.push_back(key);
        while self.map.len() > self.max_entries {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            } else {
                break;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Bounded first-in first-out memo of face names, shared across threads.
#[derive(Debug)]
pub struct FontCache {
    faces: Mutex<FaceCache>,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_CACHE_CAPACITY)
    }
}

impl FontCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            faces: Mutex::new(FaceCache::new(max_entries.max(1))),
        }
    }

    /// Face for the first family of `attrs`.
    pub fn face_for(&self, attrs: &FontAttributes) -> Arc<str> {
        let family = attrs
            .families
            .first()
            .cloned()
            .unwrap_or(FontFamily::Generic(GenericFamily::Serif));
        self.face(&family, attrs.is_bold(), attrs.is_italic())
    }

    /// Face name for `family`, memoized by normalized family name.
    ///
    /// Named families that differ only in case or quoting share one entry, so
    /// later lookups return the spelling of whichever request filled it.
    pub fn face(&self, family: &FontFamily, bold: bool, italic: bool) -> Arc<str> {
        let key = FaceKey {
            family: match family {
                FontFamily::Generic(generic) => format!("{generic:?}"),
                FontFamily::Named(name) => normalize_name(name),
            },
            bold,
            italic,
        };
        if let Ok(mut cache) = self.faces.lock() {
            if let Some(face) = cache.get(&key) {
                return face;
            }
        }
        let face: Arc<str> = Arc::from(face_name(family, bold, italic));
        if let Ok(mut cache) = self.faces.lock() {
            cache.insert(key, face.clone());
        }
        face
    }

    pub fn stats(&self) -> FontCacheStats {
        match self.faces.lock() {
            Ok(cache) => FontCacheStats {
                entries: cache.map.len(),
                hits: cache.hits,
                misses: cache.misses,
            },
            Err(_) => FontCacheStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::interpret_property;

    fn styles(pairs: &[(&str, &str)]) -> Vec<GraphicStyle> {
        pairs
            .iter()
            .flat_map(|(k, v)| interpret_property(k, v).expect("property"))
            .collect()
    }

    #[test]
    fn font_shorthand_resolves_to_attributes() {
        let parent = FontAttributes::default();
        let attrs = FontAttributes::from_styles(
            &styles(&[("font", "italic small-caps bold 18px/1.5 'Open Sans', sans-serif")]),
            &parent,
        );
        assert_eq!(attrs.weight, 700);
        assert!(attrs.is_italic());
        assert!(attrs.small_caps);
        assert!((attrs.size_points - 13.5).abs() < 1e-9);
        assert!((attrs.line_height_points() - 20.25).abs() < 1e-9);
        assert_eq!(
            attrs.families,
            vec![
                FontFamily::Named("Open Sans".to_string()),
                FontFamily::Generic(GenericFamily::SansSerif)
            ]
        );
    }

    #[test]
    fn relative_values_follow_the_parent() {
        let parent = FontAttributes {
            weight: 700,
            size_points: 10.0,
            ..FontAttributes::default()
        };
        let attrs = FontAttributes::from_styles(
            &styles(&[("font-weight", "bolder"), ("font-size", "2em"), ("font-stretch", "condensed")]),
            &parent,
        );
        assert_eq!(attrs.weight, 900);
        assert!((attrs.size_points - 20.0).abs() < 1e-9);
        assert!((attrs.stretch - 75.0).abs() < 1e-9);
    }

    #[test]
    fn inherit_keeps_the_parent_value() {
        let parent = FontAttributes {
            size_points: 9.0,
            ..FontAttributes::default()
        };
        let attrs = FontAttributes::from_styles(&styles(&[("font-size", "inherit")]), &parent);
        assert!((attrs.size_points - 9.0).abs() < 1e-9);
    }

    #[test]
    fn faces_map_generics_to_base14() {
        let cache = FontCache::default();
        let serif = FontFamily::Generic(GenericFamily::Serif);
        assert_eq!(&*cache.face(&serif, true, true), "Times-BoldItalic");
        let mono = FontFamily::Generic(GenericFamily::Monospace);
        assert_eq!(&*cache.face(&mono, false, false), "Courier");
        let named = FontFamily::Named("Fira Code".to_string());
        assert_eq!(&*cache.face(&named, true, false), "Fira Code-Bold");
    }

    #[test]
    fn cache_memoizes_and_evicts_oldest() {
        let cache = FontCache::new(2);
        let a = FontFamily::Named("A".to_string());
        let b = FontFamily::Named("B".to_string());
        let c = FontFamily::Named("C".to_string());
        cache.face(&a, false, false);
        let shared = cache.face(&FontFamily::Named("'a'".to_string()), false, false);
        assert_eq!(&*shared, "A");
        let stats = cache.stats();
        assert_eq!((stats.entries, stats.hits, stats.misses), (1, 1, 1));

        cache.face(&b, false, false);
        cache.face(&c, false, false);
        assert_eq!(cache.stats().entries, 2);
        cache.face(&a, false, false);
        assert_eq!(cache.stats().misses, 4);
    }
}
