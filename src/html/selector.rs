//! CSS selectors matched against a [`Fragment`].
//!
//! Supported syntax:
//!
//! | Kind          | Forms                                                        |
//! |---------------|--------------------------------------------------------------|
//! | simple        | `div`, `*`, `#id`, `.class`                                  |
//! | attribute     | `[a]`, `[a=v]`, `[a~=v]`, `[a\|=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a=v i]` |
//! | combinators   | descendant (space), `>`, `+`, `~`                            |
//! | pseudo-class  | `:first-child`, `:last-child`, `:only-child`, `:first-of-type`, `:last-of-type`, `:only-of-type`, `:empty`, `:nth-child()`, `:nth-last-child()`, `:nth-of-type()`, `:nth-last-of-type()`, `:not()` |
//! | lists         | `a, b`                                                       |
//!
//! Tag and attribute names match case-insensitively; id and class values do not.

use cssparser::{ParseError, Parser, ParserInput, Token};

use super::TransformError;
use super::dom::{Fragment, NodeId};

/// Comma-separated selector group; matches if any member does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Selector>);

/// Compound selectors joined by combinators (`table .card > p`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    parts: Vec<Compound>,
    /// `combinators[i]` joins `parts[i]` and `parts[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// Simple selectors that must all hold for one element (`div.card[data-x]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    universal: bool,
    tag: Option<String>,
    attrs: Vec<AttrSelector>,
    pseudos: Vec<PseudoClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    ignore_case: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    OnlyChild,
    OnlyOfType,
    Empty,
    Not(SelectorList),
}

/// `an+b` position pattern, positions counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Nth {
    a: i32,
    b: i32,
}

impl Nth {
    const FIRST: Self = Self { a: 0, b: 1 };

    fn matches(self, position: usize) -> bool {
        let position = i64::try_from(position).unwrap_or(i64::MAX);
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return position == b;
        }
        let diff = position - b;
        diff % a == 0 && diff / a >= 0
    }
}

// ============================================================================
// Parsing
// ============================================================================

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, TransformError> {
        let mut input = ParserInput::new(selector);
        let mut parser = Parser::new(&mut input);
        parse_list(&mut parser).map_err(|_| TransformError::InvalidSelector(selector.to_string()))
    }
}

type ParseResult<'i, T> = Result<T, ParseError<'i, ()>>;

fn invalid<'i>(p: &Parser<'i, '_>) -> ParseError<'i, ()> {
    p.new_custom_error(())
}

/// Selector state while tokens arrive.
#[derive(Default)]
struct Builder {
    parts: Vec<Compound>,
    combinators: Vec<Combinator>,
    current: Compound,
    /// Combinator seen after `current`, applied once the next compound starts.
    pending: Option<Combinator>,
}

impl Builder {
    fn whitespace(&mut self) {
        if !self.current.is_empty() && self.pending.is_none() {
            self.pending = Some(Combinator::Descendant);
        }
    }

    fn combinator(&mut self, combinator: Combinator) -> Result<(), ()> {
        if self.current.is_empty() || self.has_explicit_combinator() {
            return Err(());
        }
        self.pending = Some(combinator);
        Ok(())
    }

    fn push(&mut self, simple: Simple) {
        if let Some(combinator) = self.pending.take() {
            self.parts.push(std::mem::take(&mut self.current));
            self.combinators.push(combinator);
        }
        self.current.add(simple);
    }

    fn has_explicit_combinator(&self) -> bool {
        self.pending
            .is_some_and(|combinator| combinator != Combinator::Descendant)
    }

    fn finish(mut self) -> Result<Selector, ()> {
        if self.current.is_empty() || self.has_explicit_combinator() {
            return Err(());
        }
        self.parts.push(self.current);
        Ok(Selector {
            parts: self.parts,
            combinators: self.combinators,
        })
    }
}

enum Simple {
    Universal,
    Tag(String),
    Attr(AttrSelector),
    Pseudo(PseudoClass),
}

impl Compound {
    fn is_empty(&self) -> bool {
        !self.universal && self.tag.is_none() && self.attrs.is_empty() && self.pseudos.is_empty()
    }

    fn add(&mut self, simple: Simple) {
        match simple {
            Simple::Universal => self.universal = true,
            Simple::Tag(tag) => self.tag = Some(tag),
            Simple::Attr(attr) => self.attrs.push(attr),
            Simple::Pseudo(pseudo) => self.pseudos.push(pseudo),
        }
    }
}

fn parse_list<'i>(p: &mut Parser<'i, '_>) -> ParseResult<'i, SelectorList> {
    let mut selectors = Vec::new();
    let mut builder = Builder::default();

    loop {
        let token = match p.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let step = match token {
            Token::WhiteSpace(_) => {
                builder.whitespace();
                Ok(())
            }
            Token::Delim('>') => builder.combinator(Combinator::Child),
            Token::Delim('+') => builder.combinator(Combinator::AdjacentSibling),
            Token::Delim('~') => builder.combinator(Combinator::GeneralSibling),
            Token::Comma => std::mem::take(&mut builder)
                .finish()
                .map(|selector| selectors.push(selector)),
            other => {
                let simple = parse_simple(other, p)?;
                builder.push(simple);
                Ok(())
            }
        };
        step.map_err(|()| invalid(p))?;
    }

    let last = builder.finish().map_err(|()| invalid(p))?;
    selectors.push(last);
    Ok(SelectorList(selectors))
}

fn parse_simple<'i>(token: Token<'i>, p: &mut Parser<'i, '_>) -> ParseResult<'i, Simple> {
    match token {
        Token::Ident(name) => Ok(Simple::Tag(name.to_ascii_lowercase())),
        Token::Delim('*') => Ok(Simple::Universal),
        Token::Delim('.') => {
            let class = p.expect_ident()?.to_string();
            Ok(Simple::Attr(AttrSelector::new("class", AttrOp::Includes(class))))
        }
        Token::IDHash(id) => Ok(Simple::Attr(AttrSelector::new(
            "id",
            AttrOp::Equals(id.to_string()),
        ))),
        Token::SquareBracketBlock => p.parse_nested_block(|p| parse_attr(p)).map(Simple::Attr),
        Token::Colon => parse_pseudo(p).map(Simple::Pseudo),
        _ => Err(invalid(p)),
    }
}

fn parse_attr<'i>(p: &mut Parser<'i, '_>) -> ParseResult<'i, AttrSelector> {
    let name = p.expect_ident()?.to_ascii_lowercase();
    let Some(token) = p.next().ok().cloned() else {
        return Ok(AttrSelector::new(&name, AttrOp::Exists));
    };

    let op: fn(String) -> AttrOp = match token {
        Token::Delim('=') => AttrOp::Equals,
        Token::IncludeMatch => AttrOp::Includes,
        Token::DashMatch => AttrOp::DashMatch,
        Token::PrefixMatch => AttrOp::Prefix,
        Token::SuffixMatch => AttrOp::Suffix,
        Token::SubstringMatch => AttrOp::Substring,
        _ => return Err(invalid(p)),
    };
    let value = p.expect_ident_or_string()?.to_string();

    let ignore_case = match p.next().ok().cloned() {
        None => false,
        Some(Token::Ident(flag)) if flag.eq_ignore_ascii_case("i") => true,
        Some(Token::Ident(flag)) if flag.eq_ignore_ascii_case("s") => false,
        Some(_) => return Err(invalid(p)),
    };
    p.expect_exhausted()?;

    Ok(AttrSelector {
        name,
        op: op(value),
        ignore_case,
    })
}

fn parse_pseudo<'i>(p: &mut Parser<'i, '_>) -> ParseResult<'i, PseudoClass> {
    let token = p.next_including_whitespace()?.clone();
    match token {
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "first-child" => Ok(PseudoClass::NthChild(Nth::FIRST)),
            "last-child" => Ok(PseudoClass::NthLastChild(Nth::FIRST)),
            "only-child" => Ok(PseudoClass::OnlyChild),
            "first-of-type" => Ok(PseudoClass::NthOfType(Nth::FIRST)),
            "last-of-type" => Ok(PseudoClass::NthLastOfType(Nth::FIRST)),
            "only-of-type" => Ok(PseudoClass::OnlyOfType),
            "empty" => Ok(PseudoClass::Empty),
            _ => Err(invalid(p)),
        },
        Token::Function(name) => match name.to_ascii_lowercase().as_str() {
            "nth-child" => p.parse_nested_block(|p| parse_nth(p)).map(PseudoClass::NthChild),
            "nth-last-child" => p
                .parse_nested_block(|p| parse_nth(p))
                .map(PseudoClass::NthLastChild),
            "nth-of-type" => p.parse_nested_block(|p| parse_nth(p)).map(PseudoClass::NthOfType),
            "nth-last-of-type" => p
                .parse_nested_block(|p| parse_nth(p))
                .map(PseudoClass::NthLastOfType),
            "not" => p.parse_nested_block(|p| parse_list(p)).map(PseudoClass::Not),
            _ => Err(invalid(p)),
        },
        _ => Err(invalid(p)),
    }
}

fn parse_nth<'i>(p: &mut Parser<'i, '_>) -> ParseResult<'i, Nth> {
    p.skip_whitespace();
    let (a, b) = cssparser::parse_nth(p)?;
    p.expect_exhausted()?;
    Ok(Nth { a, b })
}

impl AttrSelector {
    fn new(name: &str, op: AttrOp) -> Self {
        Self {
            name: name.to_string(),
            op,
            ignore_case: false,
        }
    }
}

// ============================================================================
// Matching
// ============================================================================

impl SelectorList {
    /// Whether the element `id` matches any selector of the list.
    pub fn matches(&self, fragment: &Fragment, id: NodeId) -> bool {
        fragment.tag_name(id).is_some() && self.0.iter().any(|s| s.matches(fragment, id))
    }
}

impl Selector {
    fn matches(&self, fragment: &Fragment, id: NodeId) -> bool {
        self.matches_from(fragment, self.parts.len() - 1, id)
    }

    /// Match `parts[..=index]` with `parts[index]` on `id`, walking right to left.
    fn matches_from(&self, fragment: &Fragment, index: usize, id: NodeId) -> bool {
        if !self.parts[index].matches(fragment, id) {
            return false;
        }
        let Some(prev) = index.checked_sub(1) else {
            return true;
        };

        match self.combinators[prev] {
            Combinator::Descendant => fragment
                .ancestors(id)
                .any(|ancestor| self.matches_from(fragment, prev, ancestor)),
            Combinator::Child => fragment
                .parent(id)
                .is_some_and(|parent| self.matches_from(fragment, prev, parent)),
            Combinator::AdjacentSibling => preceding_siblings(fragment, id)
                .last()
                .is_some_and(|&sibling| self.matches_from(fragment, prev, sibling)),
            Combinator::GeneralSibling => preceding_siblings(fragment, id)
                .into_iter()
                .any(|sibling| self.matches_from(fragment, prev, sibling)),
        }
    }
}

impl Compound {
    fn matches(&self, fragment: &Fragment, id: NodeId) -> bool {
        let Some(tag) = fragment.tag_name(id) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| !t.eq_ignore_ascii_case(tag)) {
            return false;
        }
        self.attrs.iter().all(|attr| attr.matches(fragment, id))
            && self.pseudos.iter().all(|pseudo| pseudo.matches(fragment, id))
    }
}

impl AttrSelector {
    fn matches(&self, fragment: &Fragment, id: NodeId) -> bool {
        let Some(value) = fragment.attribute(id, &self.name) else {
            return false;
        };
        let (value, expected) = match &self.op {
            AttrOp::Exists => return true,
            AttrOp::Equals(s)
            | AttrOp::Includes(s)
            | AttrOp::DashMatch(s)
            | AttrOp::Prefix(s)
            | AttrOp::Suffix(s)
            | AttrOp::Substring(s) => {
                if self.ignore_case {
                    (value.to_ascii_lowercase(), s.to_ascii_lowercase())
                } else {
                    (value.to_string(), s.clone())
                }
            }
        };

        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(_) => value == expected,
            AttrOp::Includes(_) => value.split_ascii_whitespace().any(|w| w == expected),
            AttrOp::DashMatch(_) => {
                value == expected
                    || value
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttrOp::Prefix(_) => !expected.is_empty() && value.starts_with(&expected),
            AttrOp::Suffix(_) => !expected.is_empty() && value.ends_with(&expected),
            AttrOp::Substring(_) => !expected.is_empty() && value.contains(&expected),
        }
    }
}

impl PseudoClass {
    fn matches(&self, fragment: &Fragment, id: NodeId) -> bool {
        match self {
            Self::NthChild(nth) => nth.matches(position(fragment, id, false).0),
            Self::NthLastChild(nth) => nth.matches(position(fragment, id, false).1),
            Self::NthOfType(nth) => nth.matches(position(fragment, id, true).0),
            Self::NthLastOfType(nth) => nth.matches(position(fragment, id, true).1),
            Self::OnlyChild => position(fragment, id, false) == (1, 1),
            Self::OnlyOfType => position(fragment, id, true) == (1, 1),
            Self::Empty => fragment.is_empty_element(id),
            Self::Not(list) => !list.matches(fragment, id),
        }
    }
}

/// 1-based position of `id` among its element siblings, from the start and
/// from the end; `of_type` counts only siblings with the same tag.
fn position(fragment: &Fragment, id: NodeId, of_type: bool) -> (usize, usize) {
    let tag = fragment.tag_name(id);
    let siblings: Vec<NodeId> = fragment
        .element_siblings(id)
        .into_iter()
        .filter(|&s| !of_type || fragment.tag_name(s) == tag)
        .collect();
    match siblings.iter().position(|&s| s == id) {
        Some(index) => (index + 1, siblings.len() - index),
        None => (0, 0),
    }
}

fn preceding_siblings(fragment: &Fragment, id: NodeId) -> Vec<NodeId> {
    fragment
        .element_siblings(id)
        .into_iter()
        .take_while(|&s| s != id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<table class="w"><tr><td><div class="card" data-x="1"><p>A</p><p>B</p></div></td></tr></table>"#;

    fn first<'a>(fragment: &'a Fragment, selector: &str) -> Option<&'a str> {
        let id = fragment.select_first(selector).unwrap()?;
        fragment.tag_name(id)
    }

    fn first_text(fragment: &Fragment, selector: &str) -> String {
        let id = fragment.select_first(selector).unwrap().unwrap();
        fragment.text(id)
    }

    #[test]
    fn test_descendant_and_child_combinators() {
        let fragment = Fragment::parse(TABLE).unwrap();
        assert_eq!(first(&fragment, "td div"), Some("div"));
        assert_eq!(first(&fragment, "td > div"), Some("div"));
        assert_eq!(first(&fragment, "table .card"), Some("div"));
        assert_eq!(first(&fragment, "table  >  tr td"), Some("td"));
        assert_eq!(first(&fragment, "table > div"), None);
        assert_eq!(first(&fragment, ".card td"), None);
    }

    #[test]
    fn test_descendant_backtracks_over_ancestors() {
        let html = r#"<div class="a"><section><div class="b"><p>x</p></div></section></div>"#;
        let fragment = Fragment::parse(html).unwrap();
        assert_eq!(first(&fragment, ".a > section p"), Some("p"));
        assert_eq!(first(&fragment, ".a > div p"), None);
    }

    #[test]
    fn test_sibling_combinators() {
        let html = "<ul><li>1</li><li class=\"k\">2</li><li>3</li><li>4</li></ul>";
        let fragment = Fragment::parse(html).unwrap();
        assert_eq!(first_text(&fragment, ".k + li"), "3");
        assert_eq!(first_text(&fragment, "li ~ .k"), "2");
        assert!(fragment.select_first(".k ~ .k").unwrap().is_none());
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let fragment = Fragment::parse(TABLE).unwrap();
        assert_eq!(first(&fragment, "div:first-child"), Some("div"));
        assert_eq!(first_text(&fragment, "p:nth-of-type(1)"), "A");
        assert_eq!(first_text(&fragment, "p:last-child"), "B");
        assert_eq!(first_text(&fragment, ".card > :nth-child(2)"), "B");
        assert_eq!(first_text(&fragment, "p:not(:first-child)"), "B");
        assert_eq!(first(&fragment, "td:only-child"), Some("td"));
    }

    #[test]
    fn test_nth_child_formulas() {
        let html = "<ol><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ol>";
        let fragment = Fragment::parse(html).unwrap();
        assert_eq!(first_text(&fragment, "li:nth-child(even)"), "2");
        assert_eq!(first_text(&fragment, "li:nth-child(2n+3)"), "3");
        assert_eq!(first_text(&fragment, "li:nth-last-child(1)"), "5");
        assert_eq!(first_text(&fragment, "li:nth-child(-n+2):not(:first-child)"), "2");
    }

    #[test]
    fn test_attribute_selectors() {
        let html = r#"<a href="https://x.org/a.pdf" lang="en-US" rel="nofollow noopener">l</a>"#;
        let fragment = Fragment::parse(html).unwrap();
        for selector in [
            "[href]",
            "a[href^=https]",
            r#"a[href$=".pdf"]"#,
            "a[href*='x.org']",
            "[lang|=en]",
            "[rel~=noopener]",
            "[LANG=EN-us i]",
        ] {
            assert_eq!(first(&fragment, selector), Some("a"), "{selector}");
        }
        assert_eq!(first(&fragment, "[lang=en]"), None);
        assert_eq!(first(&fragment, "[rel~=no]"), None);
    }

    #[test]
    fn test_selector_list_uses_document_order() {
        let fragment = Fragment::parse("<b>1</b><i>2</i>").unwrap();
        assert_eq!(first(&fragment, "i, b"), Some("b"));
    }

    #[test]
    fn test_case_insensitive_names() {
        let fragment = Fragment::parse(r#"<DIV ID="a"><P>x</P></DIV>"#).unwrap();
        assert_eq!(first(&fragment, "#a"), Some("div"));
        assert_eq!(first(&fragment, "DIV > p"), Some("p"));
        assert_eq!(first(&fragment, "#A"), None);
    }

    #[test]
    fn test_empty_pseudo_class() {
        let fragment = Fragment::parse("<p><!-- c --></p><p> </p>").unwrap();
        let id = fragment.select_first("p:empty").unwrap().unwrap();
        assert_eq!(Some(id), fragment.select_first("p:first-child").unwrap());
    }

    #[test]
    fn test_invalid_selectors() {
        for selector in ["", "div >", "> div", "a,,b", "p::before", ":hover", "[x=", "div >> p"] {
            assert!(
                matches!(
                    SelectorList::parse(selector),
                    Err(TransformError::InvalidSelector(_))
                ),
                "{selector:?} should be rejected"
            );
        }
    }
}
