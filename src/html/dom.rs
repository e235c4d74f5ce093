//! Mutable DOM for one HTML fragment.
//!
//! `tl` does the tokenizing; the result is copied into a small arena with
//! parent links so selectors can be matched, attributes rewritten and the
//! tree serialized in either [`SerializeMode`](super::SerializeMode).
//!
//! Before `tl` sees the markup, a leading `<!DOCTYPE ...>` is split off and
//! the content of raw text elements (`<script>`, `<style>`, ...) is pulled
//! out, so neither is ever parsed as tags.
//!
//! # Example
//!
//! ```ignore
//! let mut fragment = Fragment::parse(r#"<div class="x"><span>A</span></div>"#)?;
//! let target = fragment.select_first("div.x")?.unwrap();
//! fragment.set_attribute(target, "style", "color:red");
//! for child in fragment.children(target) { /* ... */ }
//! let html = fragment.serialize(SerializeMode::Compact);
//! ```

use std::vec;

use super::TransformError;
use super::selector::SelectorList;
use crate::utils::html::{
    is_raw_text_element, is_void_element, parse_attributes, split_open_tag, split_prolog,
    split_raw_text,
};

/// Handle to a node inside one [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One attribute; `value` is `None` for boolean attributes such as `hidden`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub(super) struct Element {
    /// Lowercase tag name.
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub self_closing: bool,
    pub children: Vec<NodeId>,
}

impl Element {
    /// Whether this element is written without an end tag.
    pub fn is_empty_tag(&self) -> bool {
        self.self_closing || is_void_element(&self.name)
    }
}

#[derive(Debug, Clone)]
pub(super) enum NodeData {
    Element(Element),
    /// Text kept exactly as it appeared in the source.
    Text(String),
    /// Full comment markup, `<!-- ... -->` included.
    Comment(String),
    /// Leading doctype, with the whitespace before it.
    Declaration(String),
}

/// Parsed HTML fragment owning its nodes.
#[derive(Debug, Clone)]
pub struct Fragment {
    nodes: Vec<NodeData>,
    parents: Vec<Option<NodeId>>,
    roots: Vec<NodeId>,
}

impl Fragment {
    /// Parse a fragment.
    pub fn parse(html: &str) -> Result<Self, TransformError> {
        let (prolog, body) = split_prolog(html);
        let (markup, raw_text) = split_raw_text(body);

        let dom = tl::parse(&markup, tl::ParserOptions::default())
            .map_err(|e| TransformError::Parse(format!("{e:?}")))?;
        let parser = dom.parser();

        let mut fragment = Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            roots: Vec::new(),
        };
        if !prolog.is_empty() {
            let id = fragment.push(NodeData::Declaration(prolog.to_string()));
            fragment.roots.push(id);
        }

        let mut raw_text = raw_text.into_iter();
        for handle in dom.children() {
            if let Some(id) = fragment.import(*handle, parser, &mut raw_text) {
                fragment.roots.push(id);
            }
        }

        Ok(fragment)
    }

    /// Copy a `tl` node (and its subtree) into the arena.
    ///
    /// Raw text elements take their content from `raw_text`, in document order.
    fn import(
        &mut self,
        handle: tl::NodeHandle,
        parser: &tl::Parser,
        raw_text: &mut vec::IntoIter<String>,
    ) -> Option<NodeId> {
        let data = match handle.get(parser)? {
            tl::Node::Tag(tag) => {
                let name = tag.name().as_utf8_str().to_ascii_lowercase();
                let raw = tag.raw().as_utf8_str();
                let (attrs, self_closing) = match split_open_tag(&raw) {
                    Some(open) => (
                        parse_attributes(open.attrs)
                            .into_iter()
                            .map(|(name, value)| Attribute { name, value })
                            .collect(),
                        open.self_closing,
                    ),
                    None => (Vec::new(), false),
                };

                let mut children = Vec::new();
                if is_raw_text_element(&name) && !self_closing {
                    if let Some(text) = raw_text.next().filter(|text| !text.is_empty()) {
                        children.push(self.push(NodeData::Text(text)));
                    }
                } else {
                    for child in tag.children().top().iter() {
                        if let Some(id) = self.import(*child, parser, raw_text) {
                            children.push(id);
                        }
                    }
                }

                NodeData::Element(Element {
                    name,
                    attrs,
                    self_closing,
                    children,
                })
            }
            tl::Node::Raw(bytes) => NodeData::Text(bytes.as_utf8_str().into_owned()),
            tl::Node::Comment(bytes) => {
                let text = bytes.as_utf8_str();
                if text.starts_with("<!") {
                    NodeData::Comment(text.into_owned())
                } else {
                    NodeData::Comment(format!("<!--{text}-->"))
                }
            }
        };

        let children = match &data {
            NodeData::Element(element) => element.children.clone(),
            _ => Vec::new(),
        };
        let id = self.push(data);
        for child in children {
            self.parents[child.0] = Some(id);
        }
        Some(id)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        self.parents.push(None);
        id
    }

    /// First element matching `selector`, in document order.
    pub fn select_first(&self, selector: &str) -> Result<Option<NodeId>, TransformError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.preorder().find(|&id| list.matches(self, id)))
    }

    /// All nodes in document order.
    fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            if let NodeData::Element(element) = &self.nodes[id.0] {
                stack.extend(element.children.iter().rev().copied());
            }
            Some(id)
        })
    }

    /// Tag name of an element node, lowercase.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Attribute value; boolean attributes read as `""`.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }

    /// All attributes of an element, in source order.
    #[cfg(test)]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map_or(&[], |e| e.attrs.as_slice())
    }

    /// Set an attribute, keeping its position if it already exists.
    ///
    /// No-op for non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let Some(NodeData::Element(element)) = self.nodes.get_mut(id.0) else {
            return;
        };
        let value = Some(value.into());
        match element
            .attrs
            .iter_mut()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
        {
            Some(attr) => attr.value = value,
            None => element.attrs.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Direct element children; text and comments are skipped.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.element(id)
            .map_or_else(Vec::new, |e| self.only_elements(&e.children))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&ancestor| self.parent(ancestor))
    }

    /// Element children of `id`'s parent, `id` included; top-level elements
    /// are siblings of each other.
    pub fn element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => self.only_elements(&self.roots),
        }
    }

    /// No child elements and no text, comments aside.
    pub fn is_empty_element(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| {
            e.children
                .iter()
                .all(|child| matches!(self.nodes[child.0], NodeData::Comment(_)))
        })
    }

    /// Concatenated text of all descendants.
    #[cfg(test)]
    pub fn text(&self, id: NodeId) -> String {
        match &self.nodes[id.0] {
            NodeData::Text(text) => text.clone(),
            NodeData::Element(element) => {
                element.children.iter().map(|&child| self.text(child)).collect()
            }
            _ => String::new(),
        }
    }

    fn only_elements(&self, ids: &[NodeId]) -> Vec<NodeId> {
        ids.iter()
            .copied()
            .filter(|id| matches!(self.nodes[id.0], NodeData::Element(_)))
            .collect()
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(super) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(super) fn roots(&self) -> &[NodeId] {
        &self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_first_by_class() {
        let fragment = Fragment::parse(r#"<div class="x"><span>A</span></div>"#).unwrap();
        let id = fragment.select_first(".x").unwrap().unwrap();
        assert_eq!(fragment.tag_name(id), Some("div"));
        assert_eq!(fragment.attribute(id, "class"), Some("x"));
    }

    #[test]
    fn test_select_first_document_order() {
        let html = r#"<div id="outer" class="t"><p class="t">inner</p></div><p class="t">last</p>"#;
        let fragment = Fragment::parse(html).unwrap();
        let id = fragment.select_first(".t").unwrap().unwrap();
        assert_eq!(fragment.attribute(id, "id"), Some("outer"));

        let id = fragment.select_first("p").unwrap().unwrap();
        assert_eq!(fragment.children(id).len(), 0);
    }

    #[test]
    fn test_select_first_no_match() {
        let fragment = Fragment::parse("<div><span>A</span></div>").unwrap();
        assert_eq!(fragment.select_first("#missing").unwrap(), None);
    }

    #[test]
    fn test_attribute_absent_and_boolean() {
        let fragment = Fragment::parse(r#"<input id="i" disabled>"#).unwrap();
        let id = fragment.select_first("#i").unwrap().unwrap();
        assert_eq!(fragment.attribute(id, "style"), None);
        assert_eq!(fragment.attribute(id, "disabled"), Some(""));
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut fragment =
            Fragment::parse(r#"<div style="a:b" id="x" title="t"></div>"#).unwrap();
        let id = fragment.select_first("#x").unwrap().unwrap();
        fragment.set_attribute(id, "style", "c:d");
        fragment.set_attribute(id, "lang", "en");

        let names: Vec<_> = fragment.attributes(id).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["style", "id", "title", "lang"]);
        assert_eq!(fragment.attribute(id, "style"), Some("c:d"));
    }

    #[test]
    fn test_children_skip_text() {
        let fragment =
            Fragment::parse(r#"<div id="p">text<b>1</b> <!-- c --><i>2</i></div>"#).unwrap();
        let id = fragment.select_first("#p").unwrap().unwrap();
        let names: Vec<_> = fragment
            .children(id)
            .into_iter()
            .filter_map(|c| fragment.tag_name(c))
            .collect();
        assert_eq!(names, ["b", "i"]);
    }

    #[test]
    fn test_parse_lowercases_names() {
        let fragment = Fragment::parse(r#"<DIV ID="a" Class="x"><P>x</P></DIV>"#).unwrap();
        let id = fragment.select_first("#a").unwrap().unwrap();
        assert_eq!(fragment.tag_name(id), Some("div"));
        let names: Vec<_> = fragment.attributes(id).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["id", "class"]);
    }

    #[test]
    fn test_script_content_is_text() {
        let html = r#"<div id="a"><script>if (a < b && c > d) { x = "<span>"; }</script><span>y</span></div>"#;
        let fragment = Fragment::parse(html).unwrap();
        let id = fragment.select_first("#a").unwrap().unwrap();
        let names: Vec<_> = fragment
            .children(id)
            .into_iter()
            .filter_map(|c| fragment.tag_name(c))
            .collect();
        assert_eq!(names, ["script", "span"]);

        let script = fragment.select_first("script").unwrap().unwrap();
        assert!(fragment.children(script).is_empty());
        assert_eq!(fragment.text(script), r#"if (a < b && c > d) { x = "<span>"; }"#);
        assert_eq!(fragment.select_first("script span").unwrap(), None);
    }

    #[test]
    fn test_doctype_is_a_root() {
        let fragment = Fragment::parse("<!DOCTYPE html>\n<html><body></body></html>").unwrap();
        assert!(matches!(
            fragment.node(fragment.roots()[0]),
            NodeData::Declaration(d) if d == "<!DOCTYPE html>"
        ));
        let html = fragment.select_first("html").unwrap().unwrap();
        assert_eq!(fragment.parent(html), None);
        let body = fragment.select_first("body").unwrap().unwrap();
        assert_eq!(fragment.parent(body), Some(html));
        assert_eq!(fragment.ancestors(body).collect::<Vec<_>>(), [html]);
    }

    #[test]
    fn test_element_siblings() {
        let fragment = Fragment::parse("<b>1</b>x<i>2</i><ul><li>a</li><li>b</li></ul>").unwrap();
        let i = fragment.select_first("i").unwrap().unwrap();
        assert_eq!(fragment.element_siblings(i).len(), 3);
        let li = fragment.select_first("li").unwrap().unwrap();
        assert_eq!(fragment.element_siblings(li).len(), 2);
    }
}
