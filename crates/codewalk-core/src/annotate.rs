//! Line annotation hooks applied while a highlighter emits markup.
//!
//! A highlighter builds one [`BlockNode`] for the whole snippet and one
//! [`LineNode`] per source line, handing each to a [`LineAnnotator`] before
//! serializing it. Annotators only add classes and attributes; the
//! highlighted content itself is out of their reach.

use std::collections::BTreeSet;

use markdown_weaver_escape::{StrWrite, escape_html};
use smol_str::{SmolStr, format_smolstr};

/// Class added to emphasized lines.
pub const EMPHASIS_CLASS: &str = "highlight";

/// Attribute carrying the 1-based line number.
pub const LINE_ATTRIBUTE: &str = "data-line";

/// Classes and attributes of a rendered element, before serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeProps {
    classes: Vec<SmolStr>,
    attributes: Vec<(SmolStr, String)>,
}

impl NodeProps {
    /// Add a class unless it is already present.
    pub fn add_class(&mut self, class: impl Into<SmolStr>) {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Set an attribute, replacing an earlier value with the same name.
    pub fn set_attribute(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Write ` class="…" name="…"` with escaped values.
    pub fn write_attrs<W: StrWrite>(&self, out: &mut W) -> Result<(), W::Error> {
        if !self.classes.is_empty() {
            out.write_str(" class=\"")?;
            escape_html(&mut *out, &self.classes.join(" "))?;
            out.write_str("\"")?;
        }
        for (name, value) in &self.attributes {
            write!(out, " {name}=\"")?;
            escape_html(&mut *out, value)?;
            out.write_str("\"")?;
        }
        Ok(())
    }
}

/// The element wrapping the whole highlighted snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockNode {
    pub props: NodeProps,
}

/// The element wrapping a single source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineNode {
    pub props: NodeProps,
}

/// Per-block and per-line hooks invoked by a highlighter.
pub trait LineAnnotator {
    /// Called once for the block, with the language tag of the request.
    fn on_block(&self, language: &str, block: &mut BlockNode);

    /// Called for every rendered line. `line` is 1-based.
    fn on_line(&self, line: u32, node: &mut LineNode);
}

/// Tags the block with its language and marks every line with its number,
/// emphasizing the requested ones.
#[derive(Debug, Clone, Default)]
pub struct EmphasisAnnotator<'a> {
    emphasized: Option<&'a BTreeSet<u32>>,
}

impl<'a> EmphasisAnnotator<'a> {
    pub fn new(emphasized: &'a BTreeSet<u32>) -> Self {
        Self {
            emphasized: Some(emphasized),
        }
    }
}

impl LineAnnotator for EmphasisAnnotator<'_> {
    fn on_block(&self, language: &str, block: &mut BlockNode) {
        block.props.add_class(format_smolstr!("language-{language}"));
    }

    fn on_line(&self, line: u32, node: &mut LineNode) {
        node.props.set_attribute(LINE_ATTRIBUTE, line.to_string());
        if self.emphasized.is_some_and(|set| set.contains(&line)) {
            node.props.add_class(EMPHASIS_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_only_on_requested_lines() {
        let lines: BTreeSet<u32> = [2, 4].into_iter().collect();
        let annotator = EmphasisAnnotator::new(&lines);

        for n in 1..=5 {
            let mut node = LineNode::default();
            node.props.add_class("line");
            annotator.on_line(n, &mut node);
            assert_eq!(node.props.attribute(LINE_ATTRIBUTE), Some(n.to_string().as_str()));
            assert_eq!(node.props.has_class(EMPHASIS_CLASS), lines.contains(&n));
        }
    }

    #[test]
    fn test_block_gets_language_class() {
        let annotator = EmphasisAnnotator::default();
        let mut block = BlockNode::default();
        annotator.on_block("javascript", &mut block);
        assert!(block.props.has_class("language-javascript"));
    }

    #[test]
    fn test_attrs_are_escaped() {
        let mut props = NodeProps::default();
        props.add_class("line");
        props.add_class("line");
        props.set_attribute("title", "a \"quoted\" <b>");
        let mut out = String::from("<span");
        props.write_attrs(&mut out).unwrap();
        out.push('>');
        insta::assert_snapshot!(out, @r#"<span class="line" title="a &quot;quoted&quot; &lt;b&gt;">"#);
    }
}
