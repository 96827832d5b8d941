use super::{
    frame_end, move_to, paint_hud, rgb_to_indexed, write_bg_indexed, write_fg_indexed, write_glyph,
    GlyphRenderer, TermFrame,
};
use crate::palette::Ink;
use std::io::Write;

/// xterm-256 fallback for terminals without 24-bit colour. Quantizes each
/// palette ink once per bucket; the batching bound is unchanged.
pub struct IndexedRenderer {
    last_fg: Option<u8>,
}

impl IndexedRenderer {
    pub fn new() -> Self {
        Self { last_fg: None }
    }
}

impl Default for IndexedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRenderer for IndexedRenderer {
    fn name(&self) -> &'static str {
        "indexed"
    }

    fn render(&mut self, frame: &TermFrame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if frame.term_cols == 0
            || frame.term_rows == 0
            || frame.glyphs.cols() == 0
            || frame.glyphs.rows() == 0
        {
            return Ok(());
        }
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        out.write_all(b"\x1b[?7l\x1b[H")?;
        write_bg_indexed(out, rgb_to_indexed(frame.palette.rgb(Ink::Bg)))?;
        out.write_all(b"\x1b[2J")?;
        self.last_fg = None;

        for (ink, cells) in frame.glyphs.buckets() {
            let fg = rgb_to_indexed(frame.palette.rgb(ink));
            if self.last_fg != Some(fg) {
                write_fg_indexed(out, fg)?;
                self.last_fg = Some(fg);
            }
            for cell in cells {
                move_to(out, cell.col, cell.row)?;
                write_glyph(out, cell.glyph)?;
            }
        }

        paint_hud(frame, out, |out, rgb| write_fg_indexed(out, rgb_to_indexed(rgb)))?;
        frame_end(frame, out)
    }
}
