//! Paintable snapshot of the shell, and its HTML rendering.
//!
//! ```html
//! <div class="codewalk-widget">
//!   <div class="codewalk-notes">
//!     <section class="note active" data-note-index="0" data-section-id="intro">…</section>
//!     …
//!   </div>
//!   <div class="codewalk-code" data-active-index="0">
//!     <div class="codewalk-code-header">
//!       <span class="codewalk-filename">debounce.js</span>
//!       <button type="button" data-codewalk-copy>Copy</button>
//!     </div>
//!     <div class="codewalk-code-body">…</div>
//!   </div>
//! </div>
//! ```
//!
//! Highlighted markup is inserted unescaped; everything else (titles, notes,
//! filenames, raw fallback code) is escaped.

use markdown_weaver_escape::{StrWrite, escape_html};
use smol_str::SmolStr;

/// Attribute carried by every note element, holding its catalog index.
pub const NOTE_INDEX_ATTRIBUTE: &str = "data-note-index";

/// Class on the active note.
pub const ACTIVE_NOTE_CLASS: &str = "active";

/// Class on the code pane element.
pub const CODE_PANE_CLASS: &str = "codewalk-code";

/// Class on the copy button while the acknowledgment is showing.
pub const COPIED_CLASS: &str = "copied";

/// Attribute marking the copy button.
pub const COPY_ATTRIBUTE: &str = "data-codewalk-copy";

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

/// Everything needed to paint the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellView {
    /// Highlighting is still running; no panes yet.
    Loading,
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub code: CodePane,
    pub notes: Vec<NoteEntry>,
}

/// The code pane, showing only the active section.
#[derive(Debug, Clone, PartialEq)]
pub struct CodePane {
    pub index: usize,
    pub filename: Option<String>,
    pub body: CodeBody,
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeBody {
    /// Highlighted markup, trusted.
    Markup(String),
    /// Highlighting failed; the raw code, to be escaped.
    Raw(String),
}

/// One entry of the notes pane. Every section gets one.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEntry {
    pub index: usize,
    pub id: SmolStr,
    pub title: String,
    pub note: String,
    pub active: bool,
}

impl ShellView {
    pub fn is_loading(&self) -> bool {
        matches!(self, ShellView::Loading)
    }

    /// Render the whole widget.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        let Ok(()) = self.write_html(&mut out);
        out
    }

    pub fn write_html<W: StrWrite>(&self, out: &mut W) -> Result<(), W::Error> {
        match self {
            ShellView::Loading => out.write_str(
                "<div class=\"codewalk-widget\"><div class=\"codewalk-loading\" role=\"status\">Highlighting\u{2026}</div></div>",
            ),
            ShellView::Ready(ready) => {
                out.write_str("<div class=\"codewalk-widget\"><div class=\"codewalk-notes\">")?;
                for note in &ready.notes {
                    note.write_html(out)?;
                }
                out.write_str("</div>")?;
                ready.code.write_html(out)?;
                out.write_str("</div>")
            }
        }
    }
}

impl NoteEntry {
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        let Ok(()) = self.write_html(&mut out);
        out
    }

    pub fn write_html<W: StrWrite>(&self, out: &mut W) -> Result<(), W::Error> {
        out.write_str("<section class=\"note")?;
        if self.active {
            write!(out, " {ACTIVE_NOTE_CLASS}")?;
        }
        write!(out, "\" {NOTE_INDEX_ATTRIBUTE}=\"{}\" data-section-id=\"", self.index)?;
        escape_html(&mut *out, &self.id)?;
        out.write_str("\"><h3>")?;
        escape_html(&mut *out, &self.title)?;
        out.write_str("</h3><p>")?;
        escape_html(&mut *out, &self.note)?;
        out.write_str("</p></section>")
    }
}

impl CodePane {
    /// Render just the code pane, for repainting it in place.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        let Ok(()) = self.write_html(&mut out);
        out
    }

    pub fn copy_label(&self) -> &'static str {
        if self.copied { COPIED_LABEL } else { COPY_LABEL }
    }

    pub fn write_html<W: StrWrite>(&self, out: &mut W) -> Result<(), W::Error> {
        write!(
            out,
            "<div class=\"{CODE_PANE_CLASS}\" data-active-index=\"{}\"><div class=\"codewalk-code-header\">",
            self.index
        )?;
        if let Some(filename) = &self.filename {
            out.write_str("<span class=\"codewalk-filename\">")?;
            escape_html(&mut *out, filename)?;
            out.write_str("</span>")?;
        }
        write!(out, "<button type=\"button\" {COPY_ATTRIBUTE}")?;
        if self.copied {
            write!(out, " class=\"{COPIED_CLASS}\"")?;
        }
        write!(
            out,
            ">{}</button></div><div class=\"codewalk-code-body\">",
            self.copy_label()
        )?;
        match &self.body {
            CodeBody::Markup(html) => out.write_str(html)?,
            CodeBody::Raw(code) => {
                out.write_str("<pre class=\"codewalk-raw\"><code>")?;
                escape_html(&mut *out, code)?;
                out.write_str("</code></pre>")?;
            }
        }
        out.write_str("</div></div>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(index: usize, active: bool) -> NoteEntry {
        NoteEntry {
            index,
            id: SmolStr::new(format!("s{index}")),
            title: format!("Step {index}"),
            note: "a < b".into(),
            active,
        }
    }

    #[test]
    fn test_loading_has_no_panes() {
        let html = ShellView::Loading.render_html();
        assert!(html.contains("codewalk-loading"));
        assert!(!html.contains(NOTE_INDEX_ATTRIBUTE));
        assert!(!html.contains(COPY_ATTRIBUTE));
    }

    #[test]
    fn test_note_markup() {
        insta::assert_snapshot!(
            note(1, true).render_html(),
            @r#"<section class="note active" data-note-index="1" data-section-id="s1"><h3>Step 1</h3><p>a &lt; b</p></section>"#
        );
    }

    #[test]
    fn test_raw_fallback_is_escaped() {
        let pane = CodePane {
            index: 0,
            filename: Some("<x>.js".into()),
            body: CodeBody::Raw("if (a < b) {}".into()),
            copied: false,
        };
        insta::assert_snapshot!(
            pane.render_html(),
            @r#"<div class="codewalk-code" data-active-index="0"><div class="codewalk-code-header"><span class="codewalk-filename">&lt;x&gt;.js</span><button type="button" data-codewalk-copy>Copy</button></div><div class="codewalk-code-body"><pre class="codewalk-raw"><code>if (a &lt; b) {}</code></pre></div></div>"#
        );
    }

    #[test]
    fn test_markup_is_inserted_verbatim_and_label_follows_copied() {
        let pane = CodePane {
            index: 2,
            filename: None,
            body: CodeBody::Markup("<pre><b>x</b></pre>".into()),
            copied: true,
        };
        let html = pane.render_html();
        assert!(html.contains("<pre><b>x</b></pre>"));
        assert!(html.contains(COPIED_LABEL));
        assert!(!html.contains("codewalk-filename"));
    }

    #[test]
    fn test_every_note_rendered_once() {
        let view = ShellView::Ready(ReadyView {
            code: CodePane {
                index: 1,
                filename: None,
                body: CodeBody::Raw(String::new()),
                copied: false,
            },
            notes: vec![note(0, false), note(1, true), note(2, false)],
        });
        let html = view.render_html();
        assert_eq!(html.matches(NOTE_INDEX_ATTRIBUTE).count(), 3);
        assert_eq!(html.matches("note active").count(), 1);
    }
}
