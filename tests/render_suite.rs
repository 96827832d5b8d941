use tui_gallery::frame::GlyphFrame;
use tui_gallery::palette::{Ink, Palette};
use tui_gallery::render::{GlyphRenderer, IndexedRenderer, TermFrame, TrueColorRenderer};

fn three_ink_frame(cols: usize, rows: usize) -> GlyphFrame {
    let mut frame = GlyphFrame::new();
    frame.reset(cols, rows);
    for row in 0..rows {
        for col in 0..cols {
            let ink = match (row * cols + col) % 3 {
                0 => Ink::Accent,
                1 => Ink::Amber,
                _ => Ink::TextSubtle,
            };
            frame.push(ink, col, row, '5');
        }
    }
    frame
}

fn make_term_frame<'a>(
    cols: u16,
    rows: u16,
    glyphs: &'a GlyphFrame,
    palette: &'a Palette,
    hud: &'a str,
    sync: bool,
) -> TermFrame<'a> {
    TermFrame {
        term_cols: cols,
        term_rows: rows,
        glyphs,
        palette,
        hud,
        sync_updates: sync,
    }
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ── TrueColor renderer ──────────────────────────────────────────────────────

#[test]
fn truecolor_emits_frame_framing_sequences() {
    let palette = Palette::catalogue();
    let glyphs = three_ink_frame(10, 5);
    let frame = make_term_frame(10, 6, &glyphs, &palette, "INT/001 Drift", false);

    let mut out = Vec::new();
    TrueColorRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);

    assert!(s.contains("\x1b[H"), "missing home cursor");
    assert!(s.contains("\x1b[?7l"), "missing autowrap-off");
    assert!(s.contains("\x1b[?7h"), "missing autowrap-on");
    assert!(s.contains("\x1b[2J"), "missing clear");
    // Background uses the catalogue bg colour.
    assert!(s.contains("48;2;28;24;20"), "missing bg colour");
    assert!(s.contains("INT/001 Drift"), "HUD text missing");
}

#[test]
fn truecolor_switches_colour_once_per_bucket() {
    let palette = Palette::catalogue();
    let glyphs = three_ink_frame(10, 10);
    assert_eq!(glyphs.colour_switches(), 3);

    // Empty HUD so the only FG sequences are the buckets'.
    let frame = make_term_frame(10, 10, &glyphs, &palette, "", false);
    let mut out = Vec::new();
    TrueColorRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);

    assert_eq!(
        count_occurrences(&s, "\x1b[38;2;"),
        3,
        "expected exactly one FG change per colour bucket"
    );
}

#[test]
fn truecolor_switch_count_does_not_scale_with_cells() {
    let palette = Palette::catalogue();

    let small = three_ink_frame(10, 10); // 100 cells
    let large = three_ink_frame(100, 100); // 10,000 cells

    let mut out_small = Vec::new();
    let mut out_large = Vec::new();
    TrueColorRenderer::new()
        .render(
            &make_term_frame(10, 10, &small, &palette, "", false),
            &mut out_small,
        )
        .unwrap();
    TrueColorRenderer::new()
        .render(
            &make_term_frame(100, 100, &large, &palette, "", false),
            &mut out_large,
        )
        .unwrap();

    let switches_small =
        count_occurrences(&String::from_utf8_lossy(&out_small), "\x1b[38;2;");
    let switches_large =
        count_occurrences(&String::from_utf8_lossy(&out_large), "\x1b[38;2;");

    assert_eq!(switches_small, 3);
    assert_eq!(switches_large, 3, "FG changes scaled with the grid");
}

#[test]
fn truecolor_skips_zero_size() {
    let palette = Palette::catalogue();
    let glyphs = GlyphFrame::new();
    let frame = make_term_frame(0, 0, &glyphs, &palette, "", false);
    let mut out = Vec::new();
    TrueColorRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty(), "expected no output for a zero-size frame");
}

#[test]
fn truecolor_sync_updates_wrap_the_frame() {
    let palette = Palette::catalogue();
    let glyphs = three_ink_frame(4, 4);
    let frame = make_term_frame(4, 4, &glyphs, &palette, "", true);
    let mut out = Vec::new();
    TrueColorRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.starts_with("\x1b[?2026h"), "missing sync begin");
    assert!(s.contains("\x1b[?2026l"), "missing sync end");
}

#[test]
fn renderer_names() {
    assert_eq!(TrueColorRenderer::new().name(), "truecolor");
    assert_eq!(IndexedRenderer::new().name(), "indexed");
}

// ── Indexed renderer ────────────────────────────────────────────────────────

#[test]
fn indexed_emits_256_colour_sequences() {
    let palette = Palette::catalogue();
    let glyphs = three_ink_frame(10, 5);
    let frame = make_term_frame(10, 6, &glyphs, &palette, "hud", false);

    let mut out = Vec::new();
    IndexedRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);

    assert!(s.contains("\x1b[38;5;"), "missing indexed FG");
    assert!(s.contains("\x1b[48;5;"), "missing indexed BG");
    assert!(
        !s.contains("\x1b[38;2;"),
        "indexed renderer leaked truecolor sequences"
    );
}

#[test]
fn indexed_switches_colour_once_per_bucket() {
    let palette = Palette::catalogue();
    let glyphs = three_ink_frame(20, 20);

    let frame = make_term_frame(20, 20, &glyphs, &palette, "", false);
    let mut out = Vec::new();
    IndexedRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);

    // Three inks quantize to three distinct xterm indices.
    assert_eq!(count_occurrences(&s, "\x1b[38;5;"), 3);
}

#[test]
fn indexed_skips_zero_size() {
    let palette = Palette::catalogue();
    let glyphs = GlyphFrame::new();
    let frame = make_term_frame(0, 0, &glyphs, &palette, "", false);
    let mut out = Vec::new();
    IndexedRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty());
}
