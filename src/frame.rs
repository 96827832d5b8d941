use crate::palette::Ink;
use crate::rng::CycleRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    pub col: u16,
    pub row: u16,
    pub glyph: char,
}

/// One frame of resolved glyphs, bucketed by ink. Painting a frame costs one
/// colour change per non-empty bucket, bounded by the palette size and
/// independent of how many cells are queued.
pub struct GlyphFrame {
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<GlyphCell>>,
}

impl GlyphFrame {
    pub fn new() -> Self {
        Self {
            cols: 0,
            rows: 0,
            buckets: (0..Ink::COUNT).map(|_| Vec::new()).collect(),
        }
    }

    /// Clear all buckets and adopt the grid dimensions for this frame.
    pub fn reset(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Queue one glyph. Out-of-grid coordinates and blanks are dropped.
    pub fn push(&mut self, ink: Ink, col: usize, row: usize, glyph: char) {
        if col >= self.cols || row >= self.rows || glyph == ' ' {
            return;
        }
        self.buckets[ink.index()].push(GlyphCell {
            col: col as u16,
            row: row as u16,
            glyph,
        });
    }

    /// Queue a run of glyphs starting at (col, row), clipped at the grid edge.
    pub fn push_str(&mut self, ink: Ink, col: usize, row: usize, text: &str) {
        for (i, glyph) in text.chars().enumerate() {
            self.push(ink, col + i, row, glyph);
        }
    }

    /// Queue a run centred on the grid's horizontal midline.
    pub fn push_centered(&mut self, ink: Ink, row: usize, text: &str) {
        let len = text.chars().count();
        let col = self.cols.saturating_sub(len) / 2;
        self.push_str(ink, col, row, text);
    }

    pub fn cells(&self, ink: Ink) -> &[GlyphCell] {
        &self.buckets[ink.index()]
    }

    /// Non-empty buckets in palette order: the paint sequence for a renderer.
    pub fn buckets(&self) -> impl Iterator<Item = (Ink, &[GlyphCell])> {
        Ink::ALL
            .iter()
            .copied()
            .filter(|ink| !self.buckets[ink.index()].is_empty())
            .map(|ink| (ink, self.buckets[ink.index()].as_slice()))
    }

    /// Paint-state changes this frame would cost.
    pub fn colour_switches(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }

    pub fn cell_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

impl Default for GlyphFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat per-cell state arena indexed by `row * cols + col`. Digit, frozen and
/// visible channels persist across frames within a cycle and reset wholesale
/// at cycle start.
pub struct CellArena {
    cols: usize,
    rows: usize,
    digits: Vec<u8>,
    frozen: Vec<bool>,
    visible: Vec<bool>,
}

impl CellArena {
    pub fn new() -> Self {
        Self {
            cols: 0,
            rows: 0,
            digits: Vec::new(),
            frozen: Vec::new(),
            visible: Vec::new(),
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        let len = cols * rows;
        self.digits.resize(len, 0);
        self.frozen.resize(len, false);
        self.visible.resize(len, true);
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn idx(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    pub fn pos(&self, idx: usize) -> (usize, usize) {
        if self.cols == 0 {
            return (0, 0);
        }
        (idx % self.cols, idx / self.cols)
    }

    /// Fresh cycle: every digit redrawn from the cycle generator, all frozen
    /// and visibility flags back to initial values.
    pub fn reset_with(&mut self, rng: &mut CycleRng) {
        for digit in &mut self.digits {
            *digit = rng.digit();
        }
        self.frozen.fill(false);
        self.visible.fill(true);
    }

    pub fn digit(&self, idx: usize) -> u8 {
        self.digits.get(idx).copied().unwrap_or(0)
    }

    pub fn set_digit(&mut self, idx: usize, digit: u8) {
        if let Some(slot) = self.digits.get_mut(idx) {
            *slot = digit % 10;
        }
    }

    pub fn frozen(&self, idx: usize) -> bool {
        self.frozen.get(idx).copied().unwrap_or(false)
    }

    pub fn set_frozen(&mut self, idx: usize, frozen: bool) {
        if let Some(slot) = self.frozen.get_mut(idx) {
            *slot = frozen;
        }
    }

    pub fn visible(&self, idx: usize) -> bool {
        self.visible.get(idx).copied().unwrap_or(false)
    }

    pub fn set_visible(&mut self, idx: usize, visible: bool) {
        if let Some(slot) = self.visible.get_mut(idx) {
            *slot = visible;
        }
    }
}

impl Default for CellArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Ink;

    #[test]
    fn switches_track_distinct_inks_not_cells() {
        let mut frame = GlyphFrame::new();
        frame.reset(100, 100);
        for row in 0..100 {
            for col in 0..100 {
                let ink = match (row + col) % 3 {
                    0 => Ink::Accent,
                    1 => Ink::Amber,
                    _ => Ink::TextSubtle,
                };
                frame.push(ink, col, row, '#');
            }
        }
        assert_eq!(frame.cell_count(), 10_000);
        assert_eq!(frame.colour_switches(), 3);
    }

    #[test]
    fn out_of_grid_and_blank_pushes_are_dropped() {
        let mut frame = GlyphFrame::new();
        frame.reset(4, 4);
        frame.push(Ink::Text, 4, 0, 'x');
        frame.push(Ink::Text, 0, 4, 'x');
        frame.push(Ink::Text, 1, 1, ' ');
        assert!(frame.is_empty());
    }

    #[test]
    fn arena_reset_restores_flags() {
        let mut arena = CellArena::new();
        arena.resize(8, 4);
        arena.set_frozen(5, true);
        arena.set_visible(6, false);

        let mut rng = CycleRng::new(3);
        arena.reset_with(&mut rng);
        for i in 0..arena.len() {
            assert!(!arena.frozen(i));
            assert!(arena.visible(i));
            assert!(arena.digit(i) < 10);
        }
    }

    #[test]
    fn arena_indexing_round_trips() {
        let mut arena = CellArena::new();
        arena.resize(10, 6);
        let idx = arena.idx(3, 4).unwrap();
        assert_eq!(idx, 4 * 10 + 3);
        assert_eq!(arena.pos(idx), (3, 4));
        assert_eq!(arena.idx(10, 0), None);
        assert_eq!(arena.idx(0, 6), None);
    }
}
