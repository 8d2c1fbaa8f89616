use std::collections::{BTreeMap, HashMap};

use crate::css::{
    AttrOp, AttrSelector, PseudoClass, SelectorChain, SelectorStep, SimpleSelector, Specificity,
    StyleBlock,
};
use crate::style::{GraphicStyle, StyleProperty};

/// What selectors see of a document element.
///
/// `child_index` is 1-based. `prev_siblings` are ordered first to last, so the
/// adjacent sibling is the last entry.
#[derive(Debug, Clone, Default)]
pub struct ElementInfo {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: HashMap<String, String>,
    pub is_root: bool,
    pub child_index: usize,
    pub child_count: usize,
    pub prev_siblings: Vec<ElementInfo>,
}

impl ElementInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            child_index: 1,
            child_count: 1,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    pub fn at(mut self, child_index: usize, child_count: usize) -> Self {
        self.child_index = child_index;
        self.child_count = child_count;
        self
    }

    pub fn with_prev_sibling(mut self, sibling: ElementInfo) -> Self {
        self.prev_siblings.push(sibling);
        self
    }
}

// Widened to i64 so that extreme `a`/`b` values cannot overflow.
fn nth_matches(a: i32, b: i32, index: usize) -> bool {
    let Ok(idx) = i64::try_from(index) else {
        return false;
    };
    let (a, b) = (i64::from(a), i64::from(b));
    if a == 0 {
        return idx == b;
    }
    if a > 0 {
        idx >= b && (idx - b) % a == 0
    } else {
        idx <= b && (b - idx) % (-a) == 0
    }
}

impl AttrSelector {
    pub fn matches(&self, element: &ElementInfo) -> bool {
        let Some(value) = element.attrs.get(&self.name) else {
            return false;
        };
        let Some(expected) = self.value.as_deref() else {
            return self.op == AttrOp::Exists;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => value == expected,
            AttrOp::Includes => value.split_whitespace().any(|part| part == expected),
            AttrOp::DashMatch => {
                value == expected
                    || value
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttrOp::Prefix => !expected.is_empty() && value.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && value.ends_with(expected),
            AttrOp::Substring => !expected.is_empty() && value.contains(expected),
        }
    }
}

impl PseudoClass {
    pub fn matches(&self, element: &ElementInfo) -> bool {
        match self {
            PseudoClass::Root => element.is_root,
            PseudoClass::FirstChild => element.child_index == 1,
            PseudoClass::LastChild => element.child_index == element.child_count,
            PseudoClass::NthChild { a, b } => nth_matches(*a, *b, element.child_index),
            PseudoClass::Not(inner) => !inner.matches(element),
            PseudoClass::Other(_) => false,
        }
    }
}

impl SimpleSelector {
    pub fn matches(&self, element: &ElementInfo) -> bool {
        // Pseudo-elements address generated content, never the element itself.
        if !self.pseudo_elements.is_empty() {
            return false;
        }
        if let Some(tag) = self.tag.as_deref() {
            if tag != "*" && !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        if let Some(id) = self.id.as_deref() {
            if element.id.as_deref() != Some(id) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| element.classes.iter().any(|c| c == class))
            && self.attrs.iter().all(|attr| attr.matches(element))
            && self.pseudo_classes.iter().all(|p| p.matches(element))
    }
}

impl SelectorChain {
    /// `ancestors` runs from the root down to the element's parent.
    pub fn matches(&self, element: &ElementInfo, ancestors: &[ElementInfo]) -> bool {
        let Some(SelectorStep::Selector(subject)) = self.steps.last() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }

        let mut current: &ElementInfo = element;
        let mut current_index = ancestors.len();
        let mut i = self.steps.len() - 1;
        while i >= 2 {
            let combinator = &self.steps[i - 1];
            let SelectorStep::Selector(part) = &self.steps[i - 2] else {
                return false;
            };
            i -= 2;
            match combinator {
                SelectorStep::Child => {
                    if current_index == 0 {
                        return false;
                    }
                    current_index -= 1;
                    current = &ancestors[current_index];
                    if !part.matches(current) {
                        return false;
                    }
                }
                SelectorStep::Descendant => {
                    let mut found = false;
                    while current_index > 0 {
                        current_index -= 1;
                        let ancestor = &ancestors[current_index];
                        if part.matches(ancestor) {
                            current = ancestor;
                            found = true;
                            break;
                        }
                    }
                    if !found {
                        return false;
                    }
                }
                SelectorStep::AdjacentSibling => {
                    let Some(prev) = current.prev_siblings.last() else {
                        return false;
                    };
                    current = prev;
                    if !part.matches(current) {
                        return false;
                    }
                }
                SelectorStep::Sibling => {
                    let Some(prev) = current.prev_siblings.iter().rev().find(|p| part.matches(p)) else {
                        return false;
                    };
                    current = prev;
                }
                SelectorStep::Selector(_) => return false,
            }
        }
        true
    }
}

// Ordering key of one candidate declaration: importance, inline origin,
// selector specificity, then source order.
type Rank = (bool, bool, Specificity, usize);

#[derive(Debug, Clone)]
struct RuleEntry {
    selectors: Vec<SelectorChain>,
    styles: Vec<GraphicStyle>,
    order: usize,
}

impl RuleEntry {
    // Highest specificity among the chains of the group that match.
    fn matched_specificity(
        &self,
        element: &ElementInfo,
        ancestors: &[ElementInfo],
    ) -> Option<Specificity> {
        self.selectors
            .iter()
            .filter(|chain| chain.matches(element, ancestors))
            .map(SelectorChain::specificity)
            .max()
    }
}

/// Resolved declarations keyed by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyles {
    styles: BTreeMap<String, GraphicStyle>,
}

impl ResolvedStyles {
    pub fn get(&self, key: &str) -> Option<&GraphicStyle> {
        self.styles.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&StyleProperty> {
        self.styles.get(key).map(|style| &style.value)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphicStyle> {
        self.styles.values()
    }
}

/// Ordered rule set resolving one declaration per property for an element.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    rules: Vec<RuleEntry>,
}

impl Cascade {
    pub fn new(blocks: impl IntoIterator<Item = StyleBlock>) -> Self {
        let mut cascade = Self::default();
        cascade.extend(blocks);
        cascade
    }

    /// Later blocks win ties against earlier ones.
    pub fn extend(&mut self, blocks: impl IntoIterator<Item = StyleBlock>) {
        for block in blocks {
            let order = self.rules.len();
            self.rules.push(RuleEntry {
                selectors: block.selectors,
                styles: block.styles,
                order,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn resolve(&self, element: &ElementInfo, ancestors: &[ElementInfo]) -> ResolvedStyles {
        self.resolve_with_inline(element, ancestors, &[])
    }

    /// Inline declarations outrank every selector at the same importance.
    pub fn resolve_with_inline(
        &self,
        element: &ElementInfo,
        ancestors: &[ElementInfo],
        inline: &[GraphicStyle],
    ) -> ResolvedStyles {
        let mut candidates: Vec<(Rank, usize, &GraphicStyle)> = Vec::new();
        for rule in &self.rules {
            let Some(specificity) = rule.matched_specificity(element, ancestors) else {
                continue;
            };
            for (position, style) in rule.styles.iter().enumerate() {
                candidates.push(((style.important, false, specificity, rule.order), position, style));
            }
        }
        for (position, style) in inline.iter().enumerate() {
            candidates.push((
                (style.important, true, Specificity::default(), self.rules.len()),
                position,
                style,
            ));
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut resolved = ResolvedStyles::default();
        for (_, _, style) in candidates {
            resolved.styles.insert(style.key.clone(), style.clone());
        }
        log::trace!(
            "resolved {} properties for <{}>",
            resolved.len(),
            element.tag
        );
        resolved
    }
}
