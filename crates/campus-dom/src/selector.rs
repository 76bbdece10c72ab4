//! A small CSS selector engine.
//!
//! Supports what page markers need: type selectors, `*`, `#id`, `.class`,
//! `[attr]`, `[attr=value]` (quoted or bare), `:not(<compound>)`, the
//! descendant and child (`>`) combinators, and comma-separated lists.

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::node::NodeId;

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    parts: Vec<Simple>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
    Not(Box<Compound>),
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser::new(source);
        let mut alternatives = vec![parser.complex()?];
        loop {
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.bump();
                    alternatives.push(parser.complex()?);
                }
                Some(c) => return Err(parser.error(format!("unexpected `{c}`"))),
            }
        }
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// The selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does `node` match any alternative of this selector?
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(doc, node))
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_from(doc, node, self.compounds.len() - 1)
    }

    /// Match `compounds[..=idx]` right-to-left with `compounds[idx]` at `node`.
    fn matches_from(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if !self.compounds[idx].matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_from(doc, parent, idx - 1)),
            Combinator::Descendant => {
                let mut current = doc.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_from(doc, ancestor, idx - 1) {
                        return true;
                    }
                    current = doc.parent(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if doc.tag(node) != Some(tag.as_str()) {
                return false;
            }
        }
        self.parts.iter().all(|part| match part {
            Simple::Id(id) => doc.attr(node, "id") == Some(id.as_str()),
            Simple::Class(class) => doc.has_class(node, class),
            Simple::Attr { name, value: None } => doc.has_attr(node, name),
            Simple::Attr {
                name,
                value: Some(expected),
            } => doc.attr(node, name) == Some(expected.as_str()),
            Simple::Not(inner) => !inner.matches(doc, node),
        })
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.parts.is_empty()
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.source.len())
    }

    fn error(&self, message: impl Into<String>) -> DomError {
        DomError::selector(self.source, self.offset(), message)
    }

    /// Skip whitespace, returning whether any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    fn ident(&mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(out)
    }

    fn complex(&mut self) -> Result<Complex> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_ws => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            }
            compounds.push(self.compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if c.is_alphabetic() => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        let mut universal = compound.tag.is_none() && self.pos > 0 && self.chars[self.pos - 1].1 == '*';

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.parts.push(Simple::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    compound.parts.push(Simple::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    compound.parts.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    let name = self.ident()?;
                    if name != "not" {
                        return Err(self.error(format!("unsupported pseudo-class `:{name}`")));
                    }
                    self.expect('(')?;
                    self.skip_ws();
                    let inner = self.compound()?;
                    self.skip_ws();
                    self.expect(')')?;
                    compound.parts.push(Simple::Not(Box::new(inner)));
                }
                _ => break,
            }
            universal = false;
        }

        if compound.is_empty() && !universal {
            return Err(self.error("expected selector"));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Simple> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.bump();
                self.skip_ws();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        let mut out = String::new();
                        loop {
                            match self.bump() {
                                Some(c) if c == quote => break,
                                Some(c) => out.push(c),
                                None => return Err(self.error("unterminated string")),
                            }
                        }
                        out
                    }
                    _ => self.ident()?,
                };
                self.skip_ws();
                Some(value)
            }
            Some(c) => return Err(self.error(format!("unsupported attribute operator `{c}`"))),
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.expect(']')?;
        Ok(Simple::Attr { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ElementSpec;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let form = doc.append_spec(
            root,
            &ElementSpec::new("form")
                .with_id("admission")
                .with_class("needs-validation"),
        );
        let group = doc.append_spec(form, &ElementSpec::new("div").with_class("field-group"));
        let button = doc.append_spec(
            group,
            &ElementSpec::new("button")
                .with_class("btn")
                .with_class("remove-field")
                .with_attr("data-bs-toggle", "tooltip"),
        );
        (doc, form, group, button)
    }

    #[test]
    fn test_simple_selectors() {
        let (doc, form, group, button) = sample();
        assert!(Selector::parse("form").unwrap().matches(&doc, form));
        assert!(Selector::parse("#admission").unwrap().matches(&doc, form));
        assert!(Selector::parse(".field-group").unwrap().matches(&doc, group));
        assert!(Selector::parse("[data-bs-toggle]").unwrap().matches(&doc, button));
        assert!(
            Selector::parse("[data-bs-toggle=\"tooltip\"]")
                .unwrap()
                .matches(&doc, button)
        );
        assert!(
            !Selector::parse("[data-bs-toggle=popover]")
                .unwrap()
                .matches(&doc, button)
        );
        assert!(Selector::parse("*").unwrap().matches(&doc, group));
    }

    #[test]
    fn test_compound_and_not() {
        let (doc, _, group, button) = sample();
        let sel = Selector::parse("button.btn.remove-field").unwrap();
        assert!(sel.matches(&doc, button));
        assert!(!sel.matches(&doc, group));

        let sel = Selector::parse(".btn:not(.add-field)").unwrap();
        assert!(sel.matches(&doc, button));
        let sel = Selector::parse(".btn:not(.remove-field)").unwrap();
        assert!(!sel.matches(&doc, button));
    }

    #[test]
    fn test_combinators() {
        let (doc, _, group, button) = sample();
        assert!(Selector::parse("form button").unwrap().matches(&doc, button));
        assert!(Selector::parse("form > .field-group").unwrap().matches(&doc, group));
        assert!(!Selector::parse("form > button").unwrap().matches(&doc, button));
        assert!(
            Selector::parse("#admission .field-group > .btn")
                .unwrap()
                .matches(&doc, button)
        );
    }

    #[test]
    fn test_selector_list() {
        let (doc, form, _, button) = sample();
        let sel = Selector::parse(".remove-field, #admission").unwrap();
        assert!(sel.matches(&doc, button));
        assert!(sel.matches(&doc, form));
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", ".", "#", "[attr", "[a~=b]", "div:hover", "a,", "div $"] {
            let err = Selector::parse(bad).unwrap_err();
            assert!(matches!(err, DomError::InvalidSelector { .. }), "{bad}");
        }
    }

    #[test]
    fn test_display_round_trip() {
        let sel: Selector = " .alert-dismissible ".parse().unwrap();
        assert_eq!(sel.to_string(), ".alert-dismissible");
    }
}
