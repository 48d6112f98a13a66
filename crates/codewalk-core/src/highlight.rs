//! Syntect-backed implementation of the [`Highlighter`] capability.
//!
//! Output shape:
//!
//! ```html
//! <pre class="codewalk language-javascript" style="background-color:#2b303b;color:#c0c5ce;"><code>
//! <span class="line" data-line="1">…</span>
//! <span class="line highlight" data-line="2">…</span>
//! </code></pre>
//! ```
//!
//! Code is split on `\n`, so a trailing newline produces a final empty line
//! and empty code produces a single empty line. Lines are separated by a bare
//! newline and each line span excludes its own line ending. Token colors are inlined from the theme, so no stylesheet is
//! needed to see the highlighting.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Style, Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;

use crate::annotate::{BlockNode, LineNode};
use crate::error::HighlightError;
use crate::platform::{HighlightRequest, Highlighter};

/// Class on the outer `<pre>` of every highlighted block.
pub const BLOCK_CLASS: &str = "codewalk";

/// Class on every line span.
pub const LINE_CLASS: &str = "line";

/// Highlighter over a syntect syntax set and theme set.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntectHighlighter {
    pub fn new(syntax_set: SyntaxSet, theme_set: ThemeSet) -> Self {
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Bundled syntaxes (newline variant) and themes.
    pub fn load_defaults() -> Self {
        Self::new(SyntaxSet::load_defaults_newlines(), ThemeSet::load_defaults())
    }

    /// Names of the available themes.
    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.theme_set.themes.keys().map(String::as_str)
    }

    /// Synchronous rendering; the async trait method delegates here.
    pub fn render(&self, request: HighlightRequest<'_>) -> Result<String, HighlightError> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(request.language)
            .ok_or_else(|| HighlightError::UnknownLanguage(request.language.into()))?;
        let theme = self
            .theme_set
            .themes
            .get(request.theme)
            .ok_or_else(|| HighlightError::UnknownTheme(request.theme.into()))?;

        let mut block = BlockNode::default();
        block.props.add_class(BLOCK_CLASS);
        request.annotator.on_block(request.language, &mut block);
        block.props.set_attribute("style", block_style(theme));

        let mut out = String::with_capacity(request.code.len() * 4);
        out.push_str("<pre");
        let Ok(()) = block.props.write_attrs(&mut out);
        out.push_str("><code>");

        let mut lines = HighlightLines::new(syntax, theme);
        let mut line_buf = String::new();
        for (index, line) in request.code.split('\n').enumerate() {
            // The newline syntax set expects every line to end in one.
            line_buf.clear();
            line_buf.push_str(line.strip_suffix('\r').unwrap_or(line));
            line_buf.push('\n');

            let regions = lines.highlight_line(&line_buf, &self.syntax_set)?;
            let html =
                styled_line_to_highlighted_html(&trim_line_ending(regions), IncludeBackground::No)?;

            let mut node = LineNode::default();
            node.props.add_class(LINE_CLASS);
            request
                .annotator
                .on_line(u32::try_from(index + 1).unwrap_or(u32::MAX), &mut node);

            if index > 0 {
                out.push('\n');
            }
            out.push_str("<span");
            let Ok(()) = node.props.write_attrs(&mut out);
            out.push('>');
            out.push_str(&html);
            out.push_str("</span>");
        }

        out.push_str("</code></pre>");
        Ok(out)
    }
}

impl Highlighter for SyntectHighlighter {
    async fn highlight(&self, request: HighlightRequest<'_>) -> Result<String, HighlightError> {
        self.render(request)
    }
}

fn block_style(theme: &Theme) -> String {
    let mut style = String::new();
    if let Some(bg) = theme.settings.background {
        style.push_str("background-color:");
        style.push_str(&hex(bg));
        style.push(';');
    }
    if let Some(fg) = theme.settings.foreground {
        style.push_str("color:");
        style.push_str(&hex(fg));
        style.push(';');
    }
    style
}

fn hex(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Drop the trailing newline so it lands between line spans, not inside one.
fn trim_line_ending(mut regions: Vec<(Style, &str)>) -> Vec<(Style, &str)> {
    while let Some((style, text)) = regions.pop() {
        let trimmed = text.trim_end_matches(['\n', '\r']);
        if !trimmed.is_empty() {
            regions.push((style, trimmed));
            break;
        }
    }
    regions
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::annotate::EmphasisAnnotator;
    use crate::catalog;

    fn request<'a>(code: &'a str, annotator: &'a EmphasisAnnotator<'a>) -> HighlightRequest<'a> {
        HighlightRequest {
            code,
            language: "javascript",
            theme: "base16-ocean.dark",
            annotator,
        }
    }

    #[test]
    fn test_single_line() {
        let hl = SyntectHighlighter::load_defaults();
        let lines = BTreeSet::new();
        let annotator = EmphasisAnnotator::new(&lines);
        let html = hl.render(request("x", &annotator)).unwrap();

        assert!(html.starts_with("<pre class=\"codewalk language-javascript\""));
        assert!(html.contains("<span class=\"line\" data-line=\"1\">"));
        assert!(!html.contains("data-line=\"2\""));
        assert!(html.ends_with("</code></pre>"));
    }

    #[test]
    fn test_every_line_marked_and_only_requested_emphasized() {
        let hl = SyntectHighlighter::load_defaults();
        let demo = catalog::demo();

        for section in &demo {
            let annotator = EmphasisAnnotator::new(&section.highlight_lines);
            let html = hl.render(request(&section.code, &annotator)).unwrap();
            let line_count = section.code.split('\n').count() as u32;

            assert_eq!(html.matches("data-line=").count() as u32, line_count);
            for n in 1..=line_count {
                let plain = format!("<span class=\"line\" data-line=\"{n}\">");
                let emphasized = format!("<span class=\"line highlight\" data-line=\"{n}\">");
                if section.is_emphasized(n) {
                    assert!(html.contains(&emphasized), "line {n} of {}", section.id);
                } else {
                    assert!(html.contains(&plain), "line {n} of {}", section.id);
                }
            }
        }
    }

    #[test]
    fn test_line_endings_stay_outside_spans() {
        let hl = SyntectHighlighter::load_defaults();
        let annotator = EmphasisAnnotator::default();
        let html = hl.render(request("let a = 1;\r\nlet b = 2;\n", &annotator)).unwrap();

        assert!(!html.contains("\n</span>"));
        assert!(!html.contains('\r'));
        assert_eq!(html.matches("data-line=").count(), 3);
    }

    #[test]
    fn test_trailing_empty_line_can_be_emphasized() {
        let hl = SyntectHighlighter::load_defaults();
        let lines: BTreeSet<u32> = [2].into_iter().collect();
        let annotator = EmphasisAnnotator::new(&lines);
        let html = hl.render(request("x\n", &annotator)).unwrap();

        assert!(html.contains("<span class=\"line\" data-line=\"1\">"));
        assert!(html.ends_with("<span class=\"line highlight\" data-line=\"2\"></span></code></pre>"));
    }

    #[test]
    fn test_empty_code_renders_one_line() {
        let hl = SyntectHighlighter::load_defaults();
        let annotator = EmphasisAnnotator::default();
        let html = hl.render(request("", &annotator)).unwrap();

        assert!(html.ends_with("<code><span class=\"line\" data-line=\"1\"></span></code></pre>"));
    }

    #[test]
    fn test_code_is_escaped() {
        let hl = SyntectHighlighter::load_defaults();
        let annotator = EmphasisAnnotator::default();
        let html = hl.render(request("if (a < b && c) {}", &annotator)).unwrap();

        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;&amp;"));
    }

    #[test]
    fn test_unknown_language_and_theme() {
        let hl = SyntectHighlighter::load_defaults();
        let annotator = EmphasisAnnotator::default();

        let mut req = request("x", &annotator);
        req.language = "no-such-language";
        assert!(matches!(hl.render(req), Err(HighlightError::UnknownLanguage(_))));

        let mut req = request("x", &annotator);
        req.theme = "nord";
        assert!(matches!(hl.render(req), Err(HighlightError::UnknownTheme(_))));
    }
}
