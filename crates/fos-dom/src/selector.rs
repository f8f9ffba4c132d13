//! CSS Selector parsing and matching
//!
//! Supports the subset views rely on: type, universal, `#id`, `.class`,
//! attribute selectors (`[attr]`, `=`, `~=`, `|=`, `^=`, `$=`, `*=`),
//! descendant and child combinators, and selector lists.

use crate::{DomError, DomResult, DomTree, ElementData, NodeId};

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(val) = value else {
            return false;
        };
        match &self.matcher {
            None => true,
            Some(AttributeMatcher::Exact(expected)) => val == expected,
            Some(AttributeMatcher::Contains(expected)) => {
                val.split_whitespace().any(|w| w == expected)
            }
            Some(AttributeMatcher::DashMatch(expected)) => {
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            Some(AttributeMatcher::Prefix(expected)) => {
                !expected.is_empty() && val.starts_with(expected.as_str())
            }
            Some(AttributeMatcher::Suffix(expected)) => {
                !expected.is_empty() && val.ends_with(expected.as_str())
            }
            Some(AttributeMatcher::Substring(expected)) => {
                !expected.is_empty() && val.contains(expected.as_str())
            }
        }
    }
}

/// A sequence of simple selectors without combinators (`li.item[data-id]`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompoundSelector {
    /// Tag name; `None` means universal
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

impl CompoundSelector {
    pub fn matches(&self, elem: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !elem.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if elem.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| elem.has_class(c))
            && self
                .attributes
                .iter()
                .all(|a| a.matches(elem.get_attr(&a.name)))
    }
}

/// Combinator between compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Compound selectors joined by combinators, left to right
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_from(tree, node, n - 1),
        }
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        let Some(elem) = tree.get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        if !self.compounds[idx].matches(elem) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| self.matches_from(tree, p, idx - 1)),
            Combinator::Descendant => {
                let mut ancestor = tree.parent(node);
                while let Some(a) = ancestor {
                    if self.matches_from(tree, a, idx - 1) {
                        return true;
                    }
                    ancestor = tree.parent(a);
                }
                false
            }
        }
    }
}

/// Comma separated list of complex selectors
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub alternatives: Vec<ComplexSelector>,
}

impl Selector {
    /// Parse a selector string
    pub fn parse(input: &str) -> DomResult<Self> {
        SelectorParser::new(input).parse_list()
    }

    /// Check whether an element matches any alternative
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.alternatives.iter().any(|s| s.matches(tree, node))
    }
}

struct SelectorParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> DomError {
        DomError::InvalidSelector {
            selector: self.input.to_string(),
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> DomResult<Selector> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.eat(',') {
            alternatives.push(self.parse_complex()?);
        }
        if self.pos < self.chars.len() {
            return Err(self.error("unexpected character"));
        }
        Ok(Selector { alternatives })
    }

    fn parse_complex(&mut self) -> DomResult<ComplexSelector> {
        self.skip_ws();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_ws => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.error("unexpected character")),
            }
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> DomResult<CompoundSelector> {
        let mut compound = CompoundSelector::default();
        let mut any = false;

        if self.eat('*') {
            any = true;
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            any = true;
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
            any = true;
        }

        if !any {
            return Err(self.error("expected selector"));
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> DomResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> DomResult<AttributeSelector> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();
        if self.eat(']') {
            return Ok(AttributeSelector {
                name,
                matcher: None,
            });
        }

        let op = match self.peek() {
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                Some(c)
            }
            _ => return Err(self.error("expected attribute operator")),
        };
        if !self.eat('=') {
            return Err(self.error("expected '='"));
        }
        self.skip_ws();
        let value = self.parse_attribute_value()?;
        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error("unterminated attribute selector"));
        }

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            Some(_) => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
        })
    }

    fn parse_attribute_value(&mut self) -> DomResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                if !self.eat(quote) {
                    return Err(self.error("unterminated string"));
                }
                Ok(value)
            }
            _ => self.parse_ident(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let sel = Selector::parse("li.item.active[data-id='3']").unwrap();
        let compound = &sel.alternatives[0].compounds[0];
        assert_eq!(compound.tag.as_deref(), Some("li"));
        assert_eq!(compound.classes, vec!["item", "active"]);
        assert_eq!(
            compound.attributes[0].matcher,
            Some(AttributeMatcher::Exact("3".to_string()))
        );
    }

    #[test]
    fn test_parse_combinators_and_lists() {
        let sel = Selector::parse("ul > li .name, #main").unwrap();
        assert_eq!(sel.alternatives.len(), 2);
        assert_eq!(
            sel.alternatives[0].combinators,
            vec![Combinator::Child, Combinator::Descendant]
        );
        assert_eq!(sel.alternatives[1].compounds[0].id.as_deref(), Some("main"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[").is_err());
        assert!(Selector::parse("a >").is_err());
        assert!(Selector::parse("[role=\"x]").is_err());
    }

    #[test]
    fn test_attribute_matchers() {
        let sel = |m| AttributeSelector {
            name: "x".to_string(),
            matcher: Some(m),
        };
        assert!(sel(AttributeMatcher::Contains("b".into())).matches(Some("a b c")));
        assert!(sel(AttributeMatcher::DashMatch("en".into())).matches(Some("en-US")));
        assert!(sel(AttributeMatcher::Prefix("ht".into())).matches(Some("http")));
        assert!(!sel(AttributeMatcher::Suffix("".into())).matches(Some("http")));
        assert!(!sel(AttributeMatcher::Exact("a".into())).matches(None));
    }

    #[test]
    fn test_match_descendant_and_child() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        let span = tree.create_element("span");
        tree.set_attribute(span, "class", "name").unwrap();
        tree.append_child(ul, li).unwrap();
        tree.append_child(li, span).unwrap();

        assert!(Selector::parse("ul .name").unwrap().matches(&tree, span));
        assert!(Selector::parse("li > span").unwrap().matches(&tree, span));
        assert!(!Selector::parse("ul > span").unwrap().matches(&tree, span));
        assert!(Selector::parse("*").unwrap().matches(&tree, ul));
    }
}
