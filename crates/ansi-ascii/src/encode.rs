use ansi_core::error::CoreError;
use ansi_core::frame::{CellColor, GlyphCell, GlyphGrid};
use serde::Serialize;

const SPAN_OPEN: &str = "<span style=\"color: ";
const SPAN_OPEN_END: &str = "\">";
const SPAN_CLOSE: &str = "</span>";

/// Maximal sequence of same-color cells within one row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Run {
    /// Couleur partagée par toute la séquence.
    pub color: CellColor,
    /// Glyphes bruts (non échappés).
    pub text: String,
}

/// Runs of one grid row, left to right.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunRow {
    /// Runs in order.
    pub runs: Vec<Run>,
}

/// Serialized character-art, replaced wholesale on each conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedOutput {
    /// Characters per row.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Structured run list.
    #[serde(rename = "lines")]
    pub run_rows: Vec<RunRow>,
    /// Markup document: one `<span>` per run, `\n` after each row.
    #[serde(skip)]
    pub markup: String,
}

/// Escape the characters that carry meaning in markup.
///
/// # Example
/// ```
/// use ansi_ascii::encode::escape_markup;
/// assert_eq!(escape_markup("a<&>b"), "a&lt;&amp;&gt;b");
/// ```
#[must_use]
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

#[inline]
fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(ch),
    }
}

/// Split every row into color runs. No run crosses a row boundary.
#[must_use]
pub fn encode_runs(grid: &GlyphGrid) -> Vec<RunRow> {
    grid.rows()
        .map(|row| {
            let mut runs: Vec<Run> = Vec::new();
            for cell in row {
                match runs.last_mut() {
                    Some(open) if open.color == cell.color => open.text.push(cell.ch),
                    _ => runs.push(Run {
                        color: cell.color,
                        text: cell.ch.to_string(),
                    }),
                }
            }
            RunRow { runs }
        })
        .collect()
}

/// Serialize run rows as markup.
#[must_use]
pub fn runs_to_markup(run_rows: &[RunRow]) -> String {
    let mut out = String::new();
    for row in run_rows {
        for run in &row.runs {
            out.push_str(SPAN_OPEN);
            out.push_str(&run.color.to_string());
            out.push_str(SPAN_OPEN_END);
            for ch in run.text.chars() {
                push_escaped(&mut out, ch);
            }
            out.push_str(SPAN_CLOSE);
        }
        out.push('\n');
    }
    out
}

/// Encode a grid into its styled document.
///
/// # Example
/// ```
/// use ansi_ascii::encode::encode;
/// use ansi_core::frame::{CellColor, GlyphCell, GlyphGrid};
///
/// let mut grid = GlyphGrid::new(3, 1);
/// grid.set(0, 0, GlyphCell { ch: '#', color: CellColor::White });
/// let out = encode(&grid);
/// assert_eq!(
///     out.markup,
///     "<span style=\"color: #ffffff\">#</span><span style=\"color: #000000\">  </span>\n"
/// );
/// ```
#[must_use]
pub fn encode(grid: &GlyphGrid) -> RenderedOutput {
    let run_rows = encode_runs(grid);
    let markup = runs_to_markup(&run_rows);
    log::debug!(
        "Encodé {}×{} en {} runs ({} octets)",
        grid.width,
        grid.height,
        run_rows.iter().map(|r| r.runs.len()).sum::<usize>(),
        markup.len()
    );
    RenderedOutput {
        columns: grid.width,
        rows: grid.height,
        run_rows,
        markup,
    }
}

fn unescape_into(text: &str, color: CellColor, cells: &mut Vec<GlyphCell>) -> Result<usize, CoreError> {
    let mut count = 0;
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let (decoded, advance) = if ch == '&' {
            let end = rest
                .find(';')
                .ok_or_else(|| CoreError::Markup(format!("entité non terminée : {rest}")))?;
            let decoded = match &rest[..=end] {
                "&amp;" => '&',
                "&lt;" => '<',
                "&gt;" => '>',
                "&quot;" => '"',
                other => return Err(CoreError::Markup(format!("entité inconnue : {other}"))),
            };
            (decoded, end + 1)
        } else {
            (ch, ch.len_utf8())
        };
        cells.push(GlyphCell { ch: decoded, color });
        count += 1;
        rest = &rest[advance..];
    }
    Ok(count)
}

/// Decode a markup document back into the grid it was built from.
///
/// # Errors
/// [`CoreError::Markup`] on anything [`encode`] would not produce, or on
/// rows of unequal length.
///
/// # Example
/// ```
/// use ansi_ascii::encode::{decode, encode};
/// use ansi_core::frame::{CellColor, GlyphCell, GlyphGrid};
///
/// let mut grid = GlyphGrid::new(2, 2);
/// grid.set(1, 1, GlyphCell { ch: '<', color: CellColor::Rgb(1, 2, 3) });
/// assert_eq!(decode(&encode(&grid).markup).unwrap(), grid);
/// ```
pub fn decode(markup: &str) -> Result<GlyphGrid, CoreError> {
    let mut cells = Vec::new();
    let mut width: Option<usize> = None;
    let mut height = 0u32;

    for line in markup.split_terminator('\n') {
        let mut row_len = 0usize;
        let mut rest = line;
        while !rest.is_empty() {
            rest = rest
                .strip_prefix(SPAN_OPEN)
                .ok_or_else(|| CoreError::Markup(format!("span attendu : {rest}")))?;
            let (color, after) = rest
                .split_once(SPAN_OPEN_END)
                .ok_or_else(|| CoreError::Markup("balise span non fermée".into()))?;
            let color = CellColor::from_css(color)
                .ok_or_else(|| CoreError::Markup(format!("couleur invalide : {color}")))?;
            let (text, after) = after
                .split_once(SPAN_CLOSE)
                .ok_or_else(|| CoreError::Markup("</span> manquant".into()))?;
            row_len += unescape_into(text, color, &mut cells)?;
            rest = after;
        }
        match width {
            None => width = Some(row_len),
            Some(w) if w != row_len => {
                return Err(CoreError::Markup(format!(
                    "ligne {height} : {row_len} cellules, {w} attendues"
                )));
            }
            Some(_) => {}
        }
        height += 1;
    }

    Ok(GlyphGrid {
        cells,
        width: width.unwrap_or(0) as u32,
        height,
    })
}
