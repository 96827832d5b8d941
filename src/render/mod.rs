mod indexed;
mod truecolor;

pub use indexed::IndexedRenderer;
pub use truecolor::TrueColorRenderer;

use crate::frame::GlyphFrame;
use crate::palette::{Palette, Rgb};
use std::io::Write;

/// Everything a backend needs to paint one frame.
pub struct TermFrame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub glyphs: &'a GlyphFrame,
    pub palette: &'a Palette,
    pub hud: &'a str,
    pub sync_updates: bool,
}

pub trait GlyphRenderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &TermFrame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Open a frame: synchronized-update begin, autowrap off, home, clear to the
/// background colour. Returns false (nothing written) for degenerate sizes.
pub(crate) fn frame_begin(
    frame: &TermFrame<'_>,
    out: &mut dyn Write,
    bg: Rgb,
) -> anyhow::Result<bool> {
    if frame.term_cols == 0
        || frame.term_rows == 0
        || frame.glyphs.cols() == 0
        || frame.glyphs.rows() == 0
    {
        return Ok(false);
    }
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    out.write_all(b"\x1b[?7l\x1b[H")?;
    write_bg_rgb(out, bg)?;
    out.write_all(b"\x1b[2J")?;
    Ok(true)
}

pub(crate) fn frame_end(frame: &TermFrame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
    out.write_all(b"\x1b[0m\x1b[?7h")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

pub(crate) fn move_to(out: &mut dyn Write, col: u16, row: u16) -> anyhow::Result<()> {
    write!(out, "\x1b[{};{}H", row + 1, col + 1)?;
    Ok(())
}

pub(crate) fn write_fg_rgb(out: &mut dyn Write, rgb: Rgb) -> anyhow::Result<()> {
    write!(out, "\x1b[38;2;{};{};{}m", rgb.r, rgb.g, rgb.b)?;
    Ok(())
}

pub(crate) fn write_bg_rgb(out: &mut dyn Write, rgb: Rgb) -> anyhow::Result<()> {
    write!(out, "\x1b[48;2;{};{};{}m", rgb.r, rgb.g, rgb.b)?;
    Ok(())
}

pub(crate) fn write_fg_indexed(out: &mut dyn Write, index: u8) -> anyhow::Result<()> {
    write!(out, "\x1b[38;5;{index}m")?;
    Ok(())
}

pub(crate) fn write_bg_indexed(out: &mut dyn Write, index: u8) -> anyhow::Result<()> {
    write!(out, "\x1b[48;5;{index}m")?;
    Ok(())
}

pub(crate) fn write_glyph(out: &mut dyn Write, glyph: char) -> anyhow::Result<()> {
    let mut buf = [0u8; 4];
    out.write_all(glyph.encode_utf8(&mut buf).as_bytes())?;
    Ok(())
}

/// Nearest xterm-256 index: 24-step grayscale ramp for neutrals, the 6x6x6
/// cube otherwise.
pub(crate) fn rgb_to_indexed(rgb: Rgb) -> u8 {
    let Rgb { r, g, b } = rgb;
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((u16::from(r) - 8) * 24 / 247) as u8;
    }
    let q = |v: u8| (u16::from(v) * 5 + 127) / 255;
    (16 + 36 * q(r) + 6 * q(g) + q(b)) as u8
}

/// Truncate the HUD to the terminal width and paint it on the last row.
pub(crate) fn paint_hud<F>(
    frame: &TermFrame<'_>,
    out: &mut dyn Write,
    set_fg: F,
) -> anyhow::Result<()>
where
    F: Fn(&mut dyn Write, Rgb) -> anyhow::Result<()>,
{
    if frame.hud.is_empty() || frame.term_rows == 0 {
        return Ok(());
    }
    move_to(out, 0, frame.term_rows - 1)?;
    out.write_all(b"\x1b[2K")?;
    set_fg(out, frame.palette.rgb(crate::palette::Ink::TextMuted))?;
    let max = frame.term_cols as usize;
    for glyph in frame.hud.chars().take(max) {
        write_glyph(out, glyph)?;
    }
    Ok(())
}
