use crate::audio::{AudioSync, SynthTargets};
use crate::frame::GlyphFrame;
use crate::palette::Palette;
use crate::phase::Timeline;
use crate::pieces::{Piece, PieceCtx, PieceMeta};
use crate::rng::{advance_seed, entropy_seed, FrameRng};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Fixed cell pitch in pixels; the engine derives its grid by dividing the
    /// supplied pixel area by this.
    pub cell_width: u32,
    pub cell_height: u32,
    /// Minimum interval between frame bodies. Ticks inside the window are
    /// skipped without stopping the schedule.
    pub fps_cap: Option<u32>,
    /// Pin the cycle seed chain for reproducible runs; `None` draws entropy
    /// at every cycle boundary.
    pub seed: Option<u64>,
    pub audio: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_width: 14,
            cell_height: 20,
            fps_cap: None,
            seed: None,
            audio: true,
        }
    }
}

/// One piece's animation engine. Owns the cycle, the phase clock and all cell
/// state exclusively; driven through `tick(now_ms)` so the whole pipeline runs
/// identically under synthetic timestamps.
pub struct Engine {
    piece: Box<dyn Piece>,
    palette: Palette,
    timeline: Timeline,
    frame: GlyphFrame,
    cols: usize,
    rows: usize,
    cell_width: u32,
    cell_height: u32,
    min_frame_ms: u64,
    last_frame_ms: Option<u64>,
    fixed_seed: bool,
    next_seed: u64,
    cycle_seed: u64,
    audio: Option<AudioSync>,
    muted: bool,
}

impl Engine {
    pub fn new(piece: Box<dyn Piece>, palette: Palette, cfg: EngineConfig) -> Self {
        let timeline = Timeline::new(piece.timeline());
        let audio = (cfg.audio && piece.meta().has_audio).then(AudioSync::new);
        let next_seed = cfg.seed.unwrap_or_else(entropy_seed);

        Self {
            piece,
            palette,
            timeline,
            frame: GlyphFrame::new(),
            cols: 0,
            rows: 0,
            cell_width: cfg.cell_width.max(1),
            cell_height: cfg.cell_height.max(1),
            min_frame_ms: cfg.fps_cap.map_or(0, |fps| 1_000 / u64::from(fps.max(1))),
            last_frame_ms: None,
            fixed_seed: cfg.seed.is_some(),
            next_seed,
            cycle_seed: next_seed,
            audio,
            muted: false,
        }
    }

    /// Adopt a new pixel area; the grid is the area divided by the cell pitch.
    pub fn resize(&mut self, px_width: u32, px_height: u32) {
        let cols = (px_width / self.cell_width) as usize;
        let rows = (px_height / self.cell_height) as usize;
        if cols == self.cols && rows == self.rows {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        self.piece.on_resize(cols, rows);
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn meta(&self) -> &'static PieceMeta {
        self.piece.meta()
    }

    pub fn phase_name(&self) -> &'static str {
        self.timeline.phase_name()
    }

    pub fn cycle_seed(&self) -> u64 {
        self.cycle_seed
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Forwarded readiness gate; harmless for silent pieces.
    pub fn set_audio_ready(&mut self, ready: bool) {
        if let Some(audio) = self.audio.as_mut() {
            audio.set_ready(ready);
        }
    }

    pub fn audio_running(&self) -> bool {
        self.audio.as_ref().is_some_and(AudioSync::is_running)
    }

    /// Advance to `now_ms` and produce the frame. Returns `None` when the
    /// grid is degenerate (retry after a resize) or the tick landed inside
    /// the throttle window; the schedule itself never stops here.
    pub fn tick(&mut self, now_ms: u64) -> Option<&GlyphFrame> {
        if self.cols == 0 || self.rows == 0 {
            return None;
        }
        if self.min_frame_ms > 0 {
            if let Some(last) = self.last_frame_ms {
                if now_ms.saturating_sub(last) < self.min_frame_ms {
                    return None;
                }
            }
        }
        self.last_frame_ms = Some(now_ms);

        let tick = self.timeline.tick(now_ms);
        if tick.cycle_renewed {
            self.cycle_seed = self.next_seed;
            self.next_seed = if self.fixed_seed {
                advance_seed(self.cycle_seed)
            } else {
                entropy_seed()
            };
            self.piece.begin_cycle(self.cycle_seed, self.cols, self.rows);
        }

        let mut rng = FrameRng::for_timestamp(now_ms);
        self.frame.reset(self.cols, self.rows);

        let mut ctx = PieceCtx {
            now_ms,
            phase: tick.index,
            progress: tick.progress,
            cycle_elapsed_ms: tick.cycle_elapsed_ms,
            cols: self.cols,
            rows: self.rows,
            rng: &mut rng,
        };
        self.piece.render(&mut ctx, &mut self.frame);

        if let Some(audio) = self.audio.as_mut() {
            let mut targets = SynthTargets::default();
            self.piece
                .tune_audio(tick.index, tick.progress, now_ms, &mut targets);
            audio.publish(&targets, self.muted);
        }

        Some(&self.frame)
    }
}
