use std::fmt::Write as _;

use ansi_core::config::{FontFamily, RenderConfig, SizePreset};

use crate::encode::RenderedOutput;

/// Label used when the caller supplied none.
pub const DEFAULT_LABEL: &str = "ANSI art image";

/// Text shown when conversion failed and no label is available.
pub const FALLBACK_TEXT: &str = "[Image failed to load]";

/// CSS custom property carrying the fit scale.
pub const SCALE_PROPERTY: &str = "--ansi-scale";

/// What the `<pre>` element shows.
#[derive(Clone, Copy, Debug)]
pub enum Body<'a> {
    /// Converted character-art.
    Art(&'a RenderedOutput),
    /// Conversion failed: plain fallback text.
    Failed,
    /// No source configured.
    Empty,
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Plain-text alternative: the caller label, else [`FALLBACK_TEXT`].
#[must_use]
pub fn fallback_text(alt: &str) -> &str {
    if alt.is_empty() { FALLBACK_TEXT } else { alt }
}

/// Style sheet scoped to `.ansi-image`.
///
/// The font size is multiplied by [`SCALE_PROPERTY`], so a new fit scale
/// only has to touch one inline property.
#[must_use]
pub fn style_sheet(size: SizePreset, font: FontFamily) -> String {
    format!(
        ".ansi-image {{
  display: block;
  width: 100%;
  max-width: 100%;
  overflow: hidden;
  text-align: left;
}}
.ansi-image pre {{
  display: block;
  width: fit-content;
  margin: 0;
  margin-inline-start: 0;
  margin-inline-end: auto;
  font-size: calc({size} * var({SCALE_PROPERTY}, 1));
  font-family: {font};
  line-height: 1;
  color: currentColor;
  white-space: pre;
  text-align: left;
}}
",
        size = size.font_size_css(),
        font = font.css_stack(),
    )
}

/// Assemble the standalone HTML fragment.
///
/// # Example
/// ```
/// use ansi_ascii::document::{Body, render_document};
/// use ansi_core::config::RenderConfig;
///
/// let html = render_document(Body::Failed, &RenderConfig::default(), 1.0);
/// assert!(html.contains("[Image failed to load]"));
/// assert!(html.contains("--ansi-scale: 1"));
/// ```
#[must_use]
pub fn render_document(body: Body<'_>, config: &RenderConfig, scale: f64) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"ansi-image\">\n<style>\n");
    out.push_str(&style_sheet(config.size, config.font_family));
    out.push_str("</style>\n");

    let _ = write!(out, "<pre style=\"{SCALE_PROPERTY}: {scale}\"");
    match body {
        Body::Art(output) => {
            let label = if config.alt.is_empty() { DEFAULT_LABEL } else { config.alt.as_str() };
            let _ = write!(out, " aria-label=\"{}\">", escape_attr(label));
            out.push_str(&output.markup);
        }
        Body::Failed => {
            if !config.alt.is_empty() {
                let _ = write!(out, " aria-label=\"{}\"", escape_attr(&config.alt));
            }
            out.push('>');
            out.push_str(&escape_attr(fallback_text(&config.alt)));
        }
        Body::Empty => out.push('>'),
    }
    out.push_str("</pre>\n</div>\n");
    out
}
