//! Fragment styling.
//!
//! One call handles one fragment: find the target element, append the
//! generated declaration to its inline style, append `color:inherit;` to each
//! direct child element, and serialize.
//!
//! Styles are concatenated, never merged per property: transforming an
//! already-styled fragment appends the declarations again.

use super::{Fragment, SerializeMode, TransformError};
use crate::style::StyleSpec;

/// Declaration appended to every direct child of the target.
pub const CHILD_DECLARATION: &str = "color:inherit;";

/// Applies one [`StyleSpec`] to fragments.
#[derive(Debug, Clone)]
pub struct Transformer {
    selector: String,
    declaration: String,
    mode: SerializeMode,
}

impl Transformer {
    pub fn new(selector: impl Into<String>, style: &StyleSpec, mode: SerializeMode) -> Self {
        Self {
            selector: selector.into(),
            declaration: style.declaration(),
            mode,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    /// Style one fragment and return the serialized result.
    ///
    /// Fails without touching anything when the selector matches nothing.
    pub fn apply(&self, html: &str) -> Result<String, TransformError> {
        let mut fragment = Fragment::parse(html)?;

        let target = fragment
            .select_first(&self.selector)?
            .ok_or_else(|| TransformError::ElementNotFound(self.selector.clone()))?;

        let style = append_declaration(fragment.attribute(target, "style"), &self.declaration);
        fragment.set_attribute(target, "style", style);

        for child in fragment.children(target) {
            let style = append_declaration(fragment.attribute(child, "style"), CHILD_DECLARATION);
            fragment.set_attribute(child, "style", style);
        }

        Ok(fragment.serialize(self.mode))
    }
}

/// Concatenate `declaration` onto an existing inline style.
///
/// A `;` separator is inserted only when the existing style is non-empty and
/// does not already end with one.
pub fn append_declaration(existing: Option<&str>, declaration: &str) -> String {
    let existing = existing.unwrap_or("").trim_end();
    if existing.is_empty() {
        declaration.to_string()
    } else if existing.ends_with(';') {
        format!("{existing}{declaration}")
    } else {
        format!("{existing};{declaration}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> StyleSpec {
        StyleSpec {
            font_family: "Arial".to_string(),
            font_size_px: 16,
            font_color: "rgb(0,0,0)".to_string(),
            background_image_url: "bg.png".to_string(),
        }
    }

    fn transformer(selector: &str) -> Transformer {
        Transformer::new(selector, &style(), SerializeMode::Compact)
    }

    #[test]
    fn test_append_declaration() {
        assert_eq!(append_declaration(None, "a:b;"), "a:b;");
        assert_eq!(append_declaration(Some(""), "a:b;"), "a:b;");
        assert_eq!(append_declaration(Some("color:red"), "a:b;"), "color:red;a:b;");
        assert_eq!(append_declaration(Some("color:red; "), "a:b;"), "color:red;a:b;");
    }

    #[test]
    fn test_apply_styles_target_and_children() {
        let t = transformer(".x");
        let out = t
            .apply(r#"<div class="x"><span>A</span><span>B</span></div>"#)
            .unwrap();
        let d = style().declaration();
        assert_eq!(
            out,
            format!(
                r#"<div class="x" style="{d}"><span style="color:inherit;">A</span><span style="color:inherit;">B</span></div>"#
            )
        );
    }

    #[test]
    fn test_apply_appends_to_existing_style() {
        let out = transformer("#a")
            .apply(r#"<div id="a" style="color:red"></div>"#)
            .unwrap();
        assert_eq!(
            out,
            format!(r#"<div id="a" style="color:red;{}"></div>"#, style().declaration())
        );
    }

    #[test]
    fn test_apply_only_direct_children() {
        let out = transformer("#a")
            .apply(r#"<div id="a"><p><b>deep</b></p>text</div><p>outside</p>"#)
            .unwrap();
        assert!(out.contains(r#"<p style="color:inherit;"><b>deep</b></p>text"#));
        assert!(out.ends_with("<p>outside</p>"));
    }

    #[test]
    fn test_apply_element_not_found() {
        let err = transformer("#missing").apply("<div><span>A</span></div>").unwrap_err();
        assert!(matches!(err, TransformError::ElementNotFound(ref s) if s == "#missing"));
        assert!(err.to_string().contains("#missing"));
    }

    #[test]
    fn test_apply_is_not_idempotent() {
        let t = transformer("#a");
        let once = t.apply(r#"<div id="a"><i>x</i></div>"#).unwrap();
        let twice = t.apply(&once).unwrap();
        let d = style().declaration();
        assert_eq!(twice.matches(d.as_str()).count(), 2);
        assert!(twice.contains(r#"<i style="color:inherit;color:inherit;">"#));
    }

    #[test]
    fn test_apply_preserves_structure() {
        let html = r#"<table id="t" border="1"><tr><td colspan="2">c</td></tr></table>"#;
        let styled = transformer("#t").apply(html).unwrap();
        let before = Fragment::parse(html).unwrap();
        let after = Fragment::parse(&styled).unwrap();

        let tags = |f: &Fragment, sel: &str| {
            let id = f.select_first(sel).unwrap().unwrap();
            let attrs: Vec<_> = f
                .attributes(id)
                .iter()
                .filter(|a| a.name != "style")
                .cloned()
                .collect();
            (f.tag_name(id).map(str::to_string), attrs, f.children(id).len())
        };
        for sel in ["#t", "tr", "td"] {
            assert_eq!(tags(&before, sel), tags(&after, sel));
        }
    }

    #[test]
    fn test_apply_pretty_output_reparses_to_same_tree() {
        let html = r#"<table id="t"><tr><td class="c">one</td><td>two</td></tr></table><p>after</p>"#;
        let pretty = Transformer::new("#t", &style(), SerializeMode::Pretty)
            .apply(html)
            .unwrap();
        let before = Fragment::parse(html).unwrap();
        let after = Fragment::parse(&pretty).unwrap();

        let shape = |f: &Fragment, sel: &str| {
            let id = f.select_first(sel).unwrap().unwrap();
            let attrs: Vec<_> = f
                .attributes(id)
                .iter()
                .filter(|a| a.name != "style")
                .cloned()
                .collect();
            (f.tag_name(id).map(str::to_string), attrs, f.children(id).len())
        };
        for sel in ["#t", "tr", "td.c", "td:last-child", "table + p"] {
            assert_eq!(shape(&before, sel), shape(&after, sel), "{sel}");
        }
        let tr = after.select_first("tr").unwrap().unwrap();
        assert_eq!(after.attribute(tr, "style"), Some(CHILD_DECLARATION));
        let td = after.select_first("td").unwrap().unwrap();
        assert_eq!(after.attribute(td, "style"), None);
    }

    #[test]
    fn test_apply_combinator_selector() {
        let html = r#"<table><tr><td><div class="card"><p>A</p><p>B</p></div></td></tr></table>"#;
        let out = transformer("td > div").apply(html).unwrap();
        let d = style().declaration();
        assert_eq!(
            out,
            format!(
                r#"<table><tr><td><div class="card" style="{d}"><p style="color:inherit;">A</p><p style="color:inherit;">B</p></div></td></tr></table>"#
            )
        );

        let out = transformer(".card p:nth-of-type(2)").apply(html).unwrap();
        assert!(out.contains(&format!(r#"<p style="{d}">B</p>"#)));
    }

    #[test]
    fn test_apply_keeps_script_content() {
        let html = r#"<div id="a"><script>if (a < b && c > d) { el.innerHTML = "<span>"; }</script><span>x</span></div>"#;
        let out = transformer("#a").apply(html).unwrap();
        let d = style().declaration();
        assert_eq!(
            out,
            format!(
                r#"<div id="a" style="{d}"><script style="color:inherit;">if (a < b && c > d) {{ el.innerHTML = "<span>"; }}</script><span style="color:inherit;">x</span></div>"#
            )
        );
    }

    #[test]
    fn test_apply_keeps_doctype() {
        let html = "<!DOCTYPE html>\n<html><body id=\"b\"><p>x</p></body></html>";
        let out = transformer("#b").apply(html).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>\n<html><body id=\"b\" style="));
        assert!(out.ends_with(r#"<p style="color:inherit;">x</p></body></html>"#));
    }

    #[test]
    fn test_apply_uppercase_markup() {
        let out = transformer("#a").apply(r#"<DIV ID="a"><P>x</P></DIV>"#).unwrap();
        let d = style().declaration();
        assert_eq!(
            out,
            format!(r#"<div id="a" style="{d}"><p style="color:inherit;">x</p></div>"#)
        );
    }

    #[test]
    fn test_apply_invalid_selector() {
        let err = transformer("div >").apply("<div></div>").unwrap_err();
        assert!(matches!(err, TransformError::InvalidSelector(ref s) if s == "div >"));
    }

    #[test]
    fn test_apply_pretty_mode() {
        let t = Transformer::new("#a", &style(), SerializeMode::Pretty);
        let out = t.apply(r#"<div id="a"><span>A</span></div>"#).unwrap();
        assert!(out.starts_with(&format!(r#"<div id="a" style="{}">"#, style().declaration())));
        assert!(out.contains("\n <span style=\"color:inherit;\">\n  A\n </span>\n"));
    }
}
