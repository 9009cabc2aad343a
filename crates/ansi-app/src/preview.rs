use std::io::{self, Write};

use ansi_ascii::encode::RenderedOutput;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

/// Write the run list as truecolor terminal text, one line per row.
///
/// # Errors
/// Returns an error if the writer fails.
///
/// # Example
/// ```
/// use ansi_app::preview::write_ansi;
/// use ansi_ascii::encode::encode;
/// use ansi_core::frame::GlyphGrid;
///
/// let mut buf = Vec::new();
/// write_ansi(&mut buf, &encode(&GlyphGrid::new(3, 2))).unwrap();
/// assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 2);
/// ```
pub fn write_ansi<W: Write>(out: &mut W, output: &RenderedOutput) -> io::Result<()> {
    for row in &output.run_rows {
        for run in &row.runs {
            let (r, g, b) = run.color.rgb();
            queue!(out, SetForegroundColor(Color::Rgb { r, g, b }), Print(&run.text))?;
        }
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

/// Plain fallback line for the terminal.
///
/// # Errors
/// Returns an error if the writer fails.
pub fn write_fallback<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansi_ascii::encode::encode;
    use ansi_core::frame::{CellColor, GlyphCell, GlyphGrid};

    #[test]
    fn runs_become_truecolor_sequences() {
        let mut grid = GlyphGrid::new(2, 1);
        grid.set(0, 0, GlyphCell { ch: '█', color: CellColor::Rgb(255, 0, 0) });
        grid.set(1, 0, GlyphCell { ch: '░', color: CellColor::White });
        let mut buf = Vec::new();
        write_ansi(&mut buf, &encode(&grid)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\x1b[38;2;255;0;0m█"));
        assert!(text.contains("\x1b[38;2;255;255;255m░"));
        assert!(text.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn fallback_is_one_line() {
        let mut buf = Vec::new();
        write_fallback(&mut buf, "[Image failed to load]").unwrap();
        assert_eq!(buf, b"[Image failed to load]\n");
    }
}
