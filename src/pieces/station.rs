use super::{Piece, PieceCtx, PieceMeta};
use crate::audio::SynthTargets;
use crate::frame::{CellArena, GlyphFrame};
use crate::palette::{veil_for_distance, Ink};
use crate::payload::{Message, MessageKind, MessagePool};
use crate::phase::PhaseSpec;
use crate::rng::CycleRng;
use std::collections::HashMap;

pub(crate) static META: PieceMeta = PieceMeta {
    id: "int-002",
    designation: "INT/002",
    title: "Station",
    subtitle: "numbers station transmission cycle",
    has_audio: true,
};

static TIMELINE: [PhaseSpec; 6] = [
    PhaseSpec::new("scanning", 6_000),
    PhaseSpec::new("lock", 5_000),
    PhaseSpec::new("transmission", 12_000),
    PhaseSpec::new("decode", 8_000),
    PhaseSpec::new("corruption", 6_000),
    PhaseSpec::new("lost", 5_000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationPhase {
    Scanning,
    Lock,
    Transmission,
    Decode,
    Corruption,
    Lost,
}

impl StationPhase {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Scanning,
            1 => Self::Lock,
            2 => Self::Transmission,
            3 => Self::Decode,
            4 => Self::Corruption,
            _ => Self::Lost,
        }
    }
}

// Classic five-digit groups with a one-cell gap, one blank row between
// transmission rows, two reserved rows of status chrome.
const GROUP_SIZE: usize = 5;
const GROUP_GAP: usize = 1;
const ROW_GAP: usize = 1;
const CHROME_ROWS: usize = 2;
const LAYOUT_MARGIN: usize = 4;
// Readable flicker, ~12 digit changes per second.
const DIGIT_CHANGE_INTERVAL_MS: u64 = 80;
const BAR_WIDTH: usize = 12;

struct GroupLayout {
    positions: Vec<(usize, usize)>,
    start_row: usize,
    total_rows: usize,
}

impl GroupLayout {
    fn empty() -> Self {
        Self {
            positions: Vec::new(),
            start_row: 0,
            total_rows: 0,
        }
    }
}

fn layout_groups(cols: usize, main_rows: usize, groups: usize) -> GroupLayout {
    if cols == 0 || main_rows == 0 || groups == 0 {
        return GroupLayout::empty();
    }

    let group_cell_width = GROUP_SIZE + GROUP_GAP;
    let usable = cols.saturating_sub(LAYOUT_MARGIN * 2);
    let groups_per_row = (usable / group_cell_width).max(1);
    let group_rows = groups.div_ceil(groups_per_row);
    let total_rows = group_rows + group_rows.saturating_sub(1) * ROW_GAP;
    let start_row = main_rows.saturating_sub(total_rows) / 2;
    let used_width = groups_per_row * group_cell_width - GROUP_GAP;
    let start_col = cols.saturating_sub(used_width) / 2;

    let mut positions = Vec::with_capacity(groups);
    for g in 0..groups {
        let g_row = g / groups_per_row;
        let g_col = g % groups_per_row;
        positions.push((
            start_row + g_row * (1 + ROW_GAP),
            start_col + g_col * group_cell_width,
        ));
    }

    GroupLayout {
        positions,
        start_row,
        total_rows,
    }
}

fn progress_bar(progress: f32, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f32) as usize).min(width);
    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push('█');
    }
    for _ in filled..width {
        bar.push('░');
    }
    bar
}

fn animated_dots(now_ms: u64) -> String {
    let count = (now_ms / 500) % 3 + 1;
    ".".repeat(count as usize)
}

/// INT/002: a shortwave numbers station. Scanning static locks onto a
/// carrier, five-digit groups freeze out of the noise, the payload decodes,
/// then the signal corrupts and drops.
pub struct Station {
    pool: MessagePool,
    seed: u64,
    message: Message,
    groups: Vec<[u8; GROUP_SIZE]>,
    layout: GroupLayout,
    arena: CellArena,
    cols: usize,
    main_rows: usize,
    zone: Vec<bool>,
    last_digit_change_ms: Option<u64>,
    groups_revealed: usize,
    last_beep_group: usize,
    beep_seq: u32,
}

impl Station {
    pub fn new(pool: MessagePool) -> Self {
        let message = pool.messages().first().cloned().unwrap_or(Message {
            kind: MessageKind::Phrase,
            text: "NOTHING  IS  LOST".to_string(),
            groups: 16,
        });
        Self {
            pool,
            seed: 0,
            message,
            groups: Vec::new(),
            layout: GroupLayout::empty(),
            arena: CellArena::new(),
            cols: 0,
            main_rows: 0,
            zone: Vec::new(),
            last_digit_change_ms: None,
            groups_revealed: 0,
            last_beep_group: 0,
            beep_seq: 0,
        }
    }

    fn reveal_count(&self, phase: StationPhase, progress: f32) -> usize {
        let total = self.message.groups;
        match phase {
            StationPhase::Transmission => ((progress * total as f32) as usize).min(total),
            StationPhase::Decode | StationPhase::Corruption => total,
            _ => 0,
        }
    }

    /// Mark the cells of every revealed group in the reusable zone map.
    fn mark_zone(&mut self, revealed: usize) {
        self.zone.clear();
        self.zone.resize(self.arena.len(), false);
        for &(row, col) in self.layout.positions.iter().take(revealed) {
            for d in 0..GROUP_SIZE {
                if let Some(idx) = self.arena.idx(col + d, row) {
                    self.zone[idx] = true;
                }
            }
        }
    }

    fn min_dist_to_group(&self, row: usize, col: usize, revealed: usize) -> f32 {
        let mut min = f32::INFINITY;
        for &(g_row, g_col) in self.layout.positions.iter().take(revealed) {
            // Group centre sits on the middle of the five digits.
            let dr = row as f32 - g_row as f32;
            let dc = col as f32 - (g_col + 2) as f32;
            let dist = (dr * dr + dc * dc).sqrt();
            if dist < min {
                min = dist;
            }
        }
        min
    }

    fn group_digit_at(&self, idx: usize) -> Option<u8> {
        let (col, row) = self.arena.pos(idx);
        for (g, &(g_row, g_col)) in self.layout.positions.iter().enumerate() {
            if row == g_row && col >= g_col && col < g_col + GROUP_SIZE {
                return self.groups.get(g).map(|digits| digits[col - g_col]);
            }
        }
        None
    }

    /// Grid positions of the decoded plaintext, centred within the
    /// transmission block.
    fn decode_positions(&self) -> Vec<(usize, char)> {
        let chars: Vec<char> = self.message.text.chars().collect();
        let row = self.layout.start_row + self.layout.total_rows / 2;
        let start_col = self.cols.saturating_sub(chars.len()) / 2;

        let mut positions = Vec::with_capacity(chars.len());
        for (i, &ch) in chars.iter().enumerate() {
            if let Some(idx) = self.arena.idx(start_col + i, row) {
                positions.push((idx, ch));
            }
        }
        positions
    }

    fn update_cells(&mut self, phase: StationPhase, progress: f32, ctx: &mut PieceCtx<'_>, change_digits: bool) {
        let center_row = self.main_rows / 2;

        match phase {
            StationPhase::Lock if change_digits => {
                // Freeze spreads from the vertical centre outward.
                let half = (self.main_rows as f32 / 2.0).max(1.0);
                for i in 0..self.arena.len() {
                    if self.arena.frozen(i) {
                        continue;
                    }
                    let (_, row) = self.arena.pos(i);
                    let proximity = 1.0 - (row as f32 - center_row as f32).abs() / half;
                    let freeze_chance = progress * 0.15 * (0.3 + 0.7 * proximity);
                    if ctx.rng.chance(freeze_chance) {
                        self.arena.set_frozen(i, true);
                    }
                }
            }
            StationPhase::Transmission => {
                for i in 0..self.arena.len() {
                    if self.zone[i] && !self.arena.frozen(i) {
                        self.arena.set_frozen(i, true);
                        if let Some(digit) = self.group_digit_at(i) {
                            self.arena.set_digit(i, digit);
                        }
                    }
                }
            }
            StationPhase::Corruption if change_digits => {
                for i in 0..self.arena.len() {
                    if self.arena.frozen(i) && ctx.rng.chance(progress * 0.1) {
                        self.arena.set_frozen(i, false);
                    }
                }
            }
            StationPhase::Lost if change_digits => {
                for i in 0..self.arena.len() {
                    if self.arena.visible(i) && ctx.rng.chance(progress * 0.15) {
                        self.arena.set_visible(i, false);
                    }
                }
            }
            _ => {}
        }

        if change_digits {
            for i in 0..self.arena.len() {
                if !self.arena.frozen(i) {
                    self.arena.set_digit(i, ctx.rng.digit());
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cell_ink(
        &self,
        phase: StationPhase,
        progress: f32,
        frozen: bool,
        in_zone: bool,
        decoded: bool,
        decoding: bool,
        dist: Option<f32>,
        blink_off: bool,
        rng: &mut crate::rng::FrameRng,
    ) -> Ink {
        match phase {
            StationPhase::Scanning => {
                if rng.chance(0.3) {
                    Ink::TextMuted
                } else {
                    Ink::TextSubtle
                }
            }
            StationPhase::Lock => {
                if frozen {
                    if progress > 0.6 { Ink::Amber } else { Ink::TextMuted }
                } else {
                    Ink::TextSubtle
                }
            }
            StationPhase::Transmission => {
                if in_zone && frozen {
                    Ink::Text
                } else if let Some(d) = dist {
                    veil_for_distance(d)
                } else if frozen {
                    Ink::TextMuted
                } else {
                    Ink::TextSubtle
                }
            }
            StationPhase::Decode => {
                if decoded {
                    if blink_off { Ink::Text } else { Ink::Accent }
                } else if decoding {
                    Ink::Amber
                } else if in_zone && frozen {
                    Ink::Text
                } else if let Some(d) = dist {
                    veil_for_distance(d)
                } else if rng.chance(0.3) {
                    Ink::TextMuted
                } else {
                    Ink::TextSubtle
                }
            }
            StationPhase::Corruption => {
                let fade = progress;
                if decoded && rng.next_f32() > fade * 0.8 {
                    Ink::Accent
                } else if frozen && rng.next_f32() > fade * 0.5 {
                    Ink::TextMuted
                } else if let Some(d) = dist {
                    if rng.next_f32() > fade {
                        veil_for_distance(d)
                    } else {
                        Ink::TextSubtle
                    }
                } else {
                    Ink::TextSubtle
                }
            }
            StationPhase::Lost => Ink::TextSubtle,
        }
    }

    fn paint_chrome(
        &self,
        phase: StationPhase,
        progress: f32,
        now_ms: u64,
        revealed: usize,
        frame: &mut GlyphFrame,
    ) {
        if self.cols <= LAYOUT_MARGIN * 2 {
            return;
        }
        let divider_row = self.main_rows;
        let status_row = self.main_rows + 1;
        let left = LAYOUT_MARGIN;
        let right = self.cols - LAYOUT_MARGIN;

        for col in left..right {
            frame.push(Ink::Border, col, divider_row, '─');
        }

        let total = self.message.groups;
        let (status, ink) = match phase {
            StationPhase::Scanning => {
                (format!("SCANNING {}", animated_dots(now_ms)), Ink::TextSubtle)
            }
            StationPhase::Lock => (
                format!("SIGNAL ACQUIRED  {}", progress_bar(progress, BAR_WIDTH)),
                Ink::TextMuted,
            ),
            StationPhase::Transmission => (
                format!(
                    "RECEIVING  GROUP {:02}/{:02}  {}",
                    revealed,
                    total,
                    progress_bar(progress, BAR_WIDTH)
                ),
                Ink::Amber,
            ),
            StationPhase::Decode => {
                if progress < 0.72 {
                    (format!("DECODING {}", animated_dots(now_ms)), Ink::Amber)
                } else {
                    ("DECODE COMPLETE".to_string(), Ink::Accent)
                }
            }
            StationPhase::Corruption => (
                format!("SIGNAL DEGRADING  {}", progress_bar(1.0 - progress, BAR_WIDTH)),
                Ink::TextMuted,
            ),
            StationPhase::Lost => ("SIGNAL LOST".to_string(), Ink::TextSubtle),
        };
        frame.push_str(ink, left, status_row, &status);

        let freq = if phase == StationPhase::Scanning {
            "FREQ: -----.-- kHz"
        } else {
            "FREQ: 4625.00 kHz"
        };
        let freq_col = right.saturating_sub(freq.chars().count());
        frame.push_str(Ink::TextSubtle, freq_col, status_row, freq);
    }
}

impl Piece for Station {
    fn meta(&self) -> &'static PieceMeta {
        &META
    }

    fn timeline(&self) -> &'static [PhaseSpec] {
        &TIMELINE
    }

    fn begin_cycle(&mut self, seed: u64, cols: usize, rows: usize) {
        let mut rng = CycleRng::new(seed);

        self.seed = seed;
        self.cols = cols;
        self.main_rows = rows.saturating_sub(CHROME_ROWS);

        self.message = self.pool.pick(&mut rng).clone();
        self.groups = (0..self.message.groups)
            .map(|_| std::array::from_fn(|_| rng.digit()))
            .collect();

        self.arena.resize(cols, self.main_rows);
        self.arena.reset_with(&mut rng);
        self.layout = layout_groups(cols, self.main_rows, self.message.groups);

        self.last_digit_change_ms = None;
        self.groups_revealed = 0;
        self.last_beep_group = 0;
    }

    fn on_resize(&mut self, cols: usize, rows: usize) {
        // Content is cycle-scoped; a resize re-derives the same cycle for the
        // current seed at the new dimensions.
        self.begin_cycle(self.seed, cols, rows);
    }

    fn render(&mut self, ctx: &mut PieceCtx<'_>, frame: &mut GlyphFrame) {
        if self.main_rows == 0 || self.cols == 0 {
            return;
        }
        let phase = StationPhase::from_index(ctx.phase);
        let progress = ctx.progress;

        let change_digits = match self.last_digit_change_ms {
            None => true,
            Some(t) => ctx.now_ms.saturating_sub(t) >= DIGIT_CHANGE_INTERVAL_MS,
        };
        if change_digits {
            self.last_digit_change_ms = Some(ctx.now_ms);
        }

        let revealed = self.reveal_count(phase, progress);
        self.groups_revealed = revealed;
        self.mark_zone(revealed);

        self.update_cells(phase, progress, ctx, change_digits);

        let use_decode = matches!(phase, StationPhase::Decode | StationPhase::Corruption);
        let decode_lookup: HashMap<usize, (char, usize)> = if use_decode {
            self.decode_positions()
                .into_iter()
                .enumerate()
                .map(|(i, (idx, ch))| (idx, (ch, i)))
                .collect()
        } else {
            HashMap::new()
        };

        let msg_len = self.message.text.chars().count();
        let chars_decoded = match phase {
            StationPhase::Decode => (progress * (msg_len + 3) as f32 * 1.5) as usize,
            StationPhase::Corruption => msg_len + 3,
            _ => 0,
        };
        let all_decoded = phase == StationPhase::Decode && chars_decoded >= msg_len + 3;
        let blink_off = all_decoded && (ctx.now_ms / 500) % 2 == 1;

        let gradient_phase = matches!(
            phase,
            StationPhase::Transmission | StationPhase::Decode | StationPhase::Corruption
        );

        for i in 0..self.arena.len() {
            if !self.arena.visible(i) {
                continue;
            }
            let (col, row) = self.arena.pos(i);
            let frozen = self.arena.frozen(i);
            let in_zone = self.zone[i];

            let decode_info = decode_lookup.get(&i).copied();
            let decoded = decode_info.is_some_and(|(_, di)| di + 3 < chars_decoded);
            let decoding = !decoded && decode_info.is_some_and(|(_, di)| di < chars_decoded);

            let dist = (gradient_phase && revealed > 0 && !in_zone)
                .then(|| self.min_dist_to_group(row, col, revealed));

            let glyph = if decoded && phase == StationPhase::Decode {
                if blink_off {
                    char::from_digit(self.arena.digit(i) as u32, 10).unwrap_or('0')
                } else {
                    decode_info.map(|(ch, _)| ch).unwrap_or('0')
                }
            } else if decoding && phase == StationPhase::Decode {
                // Spin through printable noise while a character resolves.
                char::from_u32(33 + (ctx.rng.next_f32() * 93.0) as u32).unwrap_or('#')
            } else if phase == StationPhase::Corruption && decode_info.is_some() {
                if ctx.rng.next_f32() > progress * 0.8 {
                    decode_info.map(|(ch, _)| ch).unwrap_or('0')
                } else {
                    char::from_digit(ctx.rng.digit() as u32, 10).unwrap_or('0')
                }
            } else {
                char::from_digit(self.arena.digit(i) as u32, 10).unwrap_or('0')
            };

            let ink = self.cell_ink(
                phase, progress, frozen, in_zone, decoded, decoding, dist, blink_off, ctx.rng,
            );
            frame.push(ink, col, row, glyph);
        }

        self.paint_chrome(phase, progress, ctx.now_ms, revealed, frame);
    }

    fn tune_audio(&mut self, phase: usize, progress: f32, now_ms: u64, t: &mut SynthTargets) {
        let phase = StationPhase::from_index(phase);
        let now = now_ms as f32 / 1000.0;

        match phase {
            StationPhase::Scanning => {
                // Shortwave static dominates; the band-pass sweeps slowly.
                t.static_gain = 0.35;
                t.bp_center_hz = 1_500.0 + (now * 0.7).sin() * 800.0;
                t.bp_q = 1.5 + (now * 1.3).sin() * 0.5;
                t.am_rate_hz = 3.0 + (now * 0.4).sin() * 2.0;
                t.carrier_gain = 0.0;
            }
            StationPhase::Lock => {
                // Static recedes while the carrier fades in, detuned at first.
                t.static_gain = 0.25 - progress * 0.1;
                t.bp_center_hz = 2_000.0;
                t.bp_q = 2.0;
                t.am_rate_hz = 2.0;
                t.carrier_hz = 440.0 + (1.0 - progress) * 30.0;
                t.carrier_gain = progress * 0.08;
            }
            StationPhase::Transmission => {
                t.static_gain = 0.08;
                t.bp_center_hz = 2_500.0;
                t.bp_q = 3.0;
                t.am_rate_hz = 1.0;
                t.carrier_hz = 440.0;
                t.carrier_gain = 0.06;

                if self.groups_revealed > self.last_beep_group {
                    self.last_beep_group = self.groups_revealed;
                    self.beep_seq = self.beep_seq.wrapping_add(1);
                }
            }
            StationPhase::Decode => {
                t.static_gain = 0.06;
                t.bp_center_hz = 3_000.0 + progress * 1_000.0;
                t.carrier_hz = 440.0 + progress * 220.0;
                t.carrier_gain = 0.07 + progress * 0.03;
            }
            StationPhase::Corruption => {
                t.static_gain = 0.15 + progress * 0.25;
                t.bp_center_hz = 1_800.0 + (now * 5.0).sin() * 1_000.0;
                t.bp_q = (1.0 + (now * 3.0).sin() * 2.0).max(0.2);
                t.am_rate_hz = 6.0 + progress * 8.0;
                t.carrier_hz = 440.0 + (now * 2.5).sin() * 100.0 * progress;
                t.carrier_gain = 0.1 * (1.0 - progress);
            }
            StationPhase::Lost => {
                t.static_gain = 0.02 * (1.0 - progress);
                t.carrier_gain = 0.0;
            }
        }

        t.beep_seq = self.beep_seq;
    }
}
