//! Inline CSS declaration generation.

use std::fmt::Write;

/// Styling applied to the target element of every fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSpec {
    pub font_family: String,
    pub font_size_px: u32,
    pub font_color: String,
    pub background_image_url: String,
}

impl StyleSpec {
    /// Render the declaration list appended to the target element.
    ///
    /// Values are embedded verbatim; only the font family and the image URL
    /// are wrapped in single quotes.
    pub fn declaration(&self) -> String {
        let mut css = String::with_capacity(192 + self.background_image_url.len());
        // Writing into a String cannot fail.
        let _ = write!(
            css,
            "font-family:'{}';font-size:{}px;color:{};background-image:url('{}');",
            self.font_family, self.font_size_px, self.font_color, self.background_image_url
        );
        css.push_str("background-repeat:no-repeat;");
        css.push_str("background-position:center center;");
        css.push_str("height:100%;");
        css
    }

    /// Markup shown by `hse preview`.
    pub fn preview(&self) -> String {
        format!(
            r#"<div style="width:100%;margin:0 auto;{}"></div>"#,
            self.declaration()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StyleSpec {
        StyleSpec {
            font_family: "Nanum Gothic".to_string(),
            font_size_px: 24,
            font_color: "rgb(10,20,30)".to_string(),
            background_image_url: "https://example.com/bg.png".to_string(),
        }
    }

    #[test]
    fn test_declaration_exact() {
        assert_eq!(
            sample().declaration(),
            "font-family:'Nanum Gothic';font-size:24px;color:rgb(10,20,30);\
             background-image:url('https://example.com/bg.png');background-repeat:no-repeat;\
             background-position:center center;height:100%;"
        );
    }

    #[test]
    fn test_declaration_property_order() {
        let css = sample().declaration();
        let positions: Vec<usize> = ["font-family:", "font-size:", "color:", "background-image:"]
            .iter()
            .map(|prop| {
                assert_eq!(css.matches(prop).count(), 1, "{prop} must appear once");
                css.find(prop).unwrap()
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(css.contains("font-size:24px;"));
    }

    #[test]
    fn test_declaration_is_verbatim() {
        let sample = StyleSpec {
            font_color: "not a color".to_string(),
            ..sample()
        };
        assert!(sample.declaration().contains("color:not a color;"));
    }

    #[test]
    fn test_preview_wraps_declaration() {
        let preview = sample().preview();
        assert!(preview.starts_with(r#"<div style="width:100%;margin:0 auto;font-family:"#));
        assert!(preview.ends_with(r#"height:100%;"></div>"#));
    }
}
