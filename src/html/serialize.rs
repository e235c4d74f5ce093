//! Fragment serialization.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dom::{Element, Fragment, NodeData, NodeId};
use crate::utils::html::{escape_attr, is_preformatted_element};

/// Indentation unit of pretty output, one space per level.
const PRETTY_INDENT: &str = " ";

/// How a fragment is written back to a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializeMode {
    /// Markup as parsed, no whitespace added.
    #[default]
    Compact,
    /// One node per line, indented by depth.
    Pretty,
}

impl FromStr for SerializeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown serialization mode `{other}` (expected compact or pretty)")),
        }
    }
}

impl Fragment {
    /// Write the whole tree back to markup.
    pub fn serialize(&self, mode: SerializeMode) -> String {
        let mut out = String::new();
        match mode {
            SerializeMode::Compact => {
                for &root in self.roots() {
                    self.write_compact(root, &mut out);
                }
            }
            SerializeMode::Pretty => {
                for &root in self.roots() {
                    self.write_pretty(root, 0, &mut out);
                }
                // Trailing newline of the last line
                out.truncate(out.trim_end_matches('\n').len());
            }
        }
        out
    }

    fn write_compact(&self, id: NodeId, out: &mut String) {
        match self.node(id) {
            NodeData::Element(element) => {
                write_open_tag(element, out);
                if element.is_empty_tag() {
                    return;
                }
                for &child in &element.children {
                    self.write_compact(child, out);
                }
                write_close_tag(element, out);
            }
            NodeData::Text(text) | NodeData::Comment(text) | NodeData::Declaration(text) => {
                out.push_str(text)
            }
        }
    }

    fn write_pretty(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = PRETTY_INDENT.repeat(depth);
        match self.node(id) {
            NodeData::Element(element) => {
                out.push_str(&indent);
                write_open_tag(element, out);
                out.push('\n');
                if element.is_empty_tag() {
                    return;
                }

                if is_preformatted_element(&element.name) {
                    // Content is significant byte for byte
                    out.truncate(out.len() - 1);
                    for &child in &element.children {
                        self.write_compact(child, out);
                    }
                    write_close_tag(element, out);
                    out.push('\n');
                    return;
                }

                for &child in &element.children {
                    self.write_pretty(child, depth + 1, out);
                }
                out.push_str(&indent);
                write_close_tag(element, out);
                out.push('\n');
            }
            NodeData::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    out.push_str(&indent);
                    out.push_str(text);
                    out.push('\n');
                }
            }
            NodeData::Comment(comment) => {
                out.push_str(&indent);
                out.push_str(comment);
                out.push('\n');
            }
            NodeData::Declaration(doctype) => {
                out.push_str(doctype.trim());
                out.push('\n');
            }
        }
    }
}

fn write_open_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }
    if element.self_closing {
        out.push('/');
    }
    out.push('>');
}

fn write_close_tag(element: &Element, out: &mut String) {
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
