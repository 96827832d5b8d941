use super::{
    frame_begin, frame_end, move_to, paint_hud, write_fg_rgb, write_glyph, GlyphRenderer, TermFrame,
};
use crate::palette::{Ink, Rgb};
use std::io::Write;

/// 24-bit SGR backend. One foreground change per colour bucket; glyphs are
/// cursor-addressed so empty cells cost nothing.
pub struct TrueColorRenderer {
    last_fg: Option<Rgb>,
}

impl TrueColorRenderer {
    pub fn new() -> Self {
        Self { last_fg: None }
    }
}

impl Default for TrueColorRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRenderer for TrueColorRenderer {
    fn name(&self) -> &'static str {
        "truecolor"
    }

    fn render(&mut self, frame: &TermFrame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !frame_begin(frame, out, frame.palette.rgb(Ink::Bg))? {
            return Ok(());
        }
        self.last_fg = None;

        for (ink, cells) in frame.glyphs.buckets() {
            let fg = frame.palette.rgb(ink);
            if self.last_fg != Some(fg) {
                write_fg_rgb(out, fg)?;
                self.last_fg = Some(fg);
            }
            for cell in cells {
                move_to(out, cell.col, cell.row)?;
                write_glyph(out, cell.glyph)?;
            }
        }

        paint_hud(frame, out, |out, rgb| write_fg_rgb(out, rgb))?;
        frame_end(frame, out)
    }
}
