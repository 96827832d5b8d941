use super::{Piece, PieceCtx, PieceMeta};
use crate::field::{FieldParams, FlowField};
use crate::frame::GlyphFrame;
use crate::palette::Ink;
use crate::phase::PhaseSpec;
use crate::rng::FrameRng;
use std::f32::consts::PI;

pub(crate) static META: PieceMeta = PieceMeta {
    id: "int-001",
    designation: "INT/001",
    title: "Drift",
    subtitle: "signal drift across a coherent field",
    has_audio: false,
};

static TIMELINE: [PhaseSpec; 6] = [
    PhaseSpec::new("emergence", 5_000),
    PhaseSpec::new("flow", 20_000),
    PhaseSpec::new("turbulence", 10_000),
    PhaseSpec::new("dissolution", 3_000),
    PhaseSpec::new("terminal", 2_000),
    PhaseSpec::new("reacquisition", 2_000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftPhase {
    Emergence,
    Flow,
    Turbulence,
    Dissolution,
    Terminal,
    Reacquisition,
}

impl DriftPhase {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Emergence,
            1 => Self::Flow,
            2 => Self::Turbulence,
            3 => Self::Dissolution,
            4 => Self::Terminal,
            _ => Self::Reacquisition,
        }
    }
}

// Directional glyphs for the eight flow octants, with lighter variants
// scattered at ~12% for texture within currents.
const FLOW_GLYPHS: [char; 8] = ['─', '╲', '│', '╱', '─', '╲', '│', '╱'];
const FLOW_GLYPHS_LIGHT: [char; 8] = ['╌', '╲', '╎', '╱', '╌', '╲', '╎', '╱'];
// Noise floor marks.
const GHOST_GLYPHS: [char; 4] = ['·', '∙', ':', '∶'];
// Block texture, admitted only while the field forms or falls apart.
const BLOCK_GLYPHS: [char; 2] = ['░', '▒'];
const STATIC_GLYPHS: [char; 4] = ['∴', '∶', '◦', '·'];

const LIGHT_VARIANT_P: f32 = 0.12;
const BLANK_CUT: f32 = 0.30;
const GHOST_CUT: f32 = 0.40;
pub const ACCENT_CUT: f32 = 0.82;

/// Field parameters for the active phase, recomputed once per frame.
pub fn field_params(phase: DriftPhase, progress: f32) -> FieldParams {
    match phase {
        // Starts tighter, coheres to the base scale as the field fills in.
        DriftPhase::Emergence => FieldParams {
            scale: 0.025 - 0.01 * progress,
            time_speed: 0.0004,
            magnitude_mul: progress,
        },
        // Base scale: broad sweeping currents.
        DriftPhase::Flow => FieldParams {
            scale: 0.015,
            time_speed: 0.0004,
            magnitude_mul: 1.0,
        },
        // Fragments toward dissolution.
        DriftPhase::Turbulence => FieldParams {
            scale: 0.015 + 0.025 * progress,
            time_speed: 0.0004 + 0.002 * progress,
            magnitude_mul: 1.0,
        },
        DriftPhase::Dissolution => FieldParams {
            scale: 0.04,
            time_speed: 0.002,
            magnitude_mul: 1.0 - progress * 0.9,
        },
        DriftPhase::Terminal => FieldParams {
            scale: 0.04,
            time_speed: 0.001,
            magnitude_mul: 0.05,
        },
        DriftPhase::Reacquisition => FieldParams {
            scale: 0.025 - 0.01 * progress,
            time_speed: 0.0004,
            magnitude_mul: progress * 0.5,
        },
    }
}

fn octant_glyph(angle: f32, rng: &mut FrameRng) -> char {
    let normalised = angle.rem_euclid(PI * 2.0);
    let index = ((normalised / (PI / 4.0)).round() as usize) % 8;
    if rng.chance(LIGHT_VARIANT_P) {
        FLOW_GLYPHS_LIGHT[index]
    } else {
        FLOW_GLYPHS[index]
    }
}

/// Threshold ladder from sample to glyph class. `None` is negative space.
pub fn glyph_for(angle: f32, magnitude: f32, phase: DriftPhase, rng: &mut FrameRng) -> Option<char> {
    // Dissolution/terminal: progressive dropout into static.
    if matches!(phase, DriftPhase::Dissolution | DriftPhase::Terminal)
        && rng.next_f32() > magnitude * 2.0
    {
        if rng.chance(0.08) {
            return Some(*rng.pick(&STATIC_GLYPHS));
        }
        if rng.chance(0.05) {
            return Some(*rng.pick(&BLOCK_GLYPHS));
        }
        return None;
    }

    // Emergence: block noise breaking into flow.
    if phase == DriftPhase::Emergence && rng.chance(0.15 * (1.0 - magnitude)) {
        return Some(*rng.pick(&BLOCK_GLYPHS));
    }

    if magnitude < BLANK_CUT {
        return None;
    }
    if magnitude < GHOST_CUT {
        return Some(*rng.pick(&GHOST_GLYPHS));
    }
    Some(octant_glyph(angle, rng))
}

/// Colour band ladder; monotonic in magnitude, accent reserved for the rare
/// hot streaks.
pub fn colour_for(magnitude: f32, phase: DriftPhase) -> Ink {
    if matches!(phase, DriftPhase::Terminal | DriftPhase::Reacquisition) {
        return Ink::TextSubtle;
    }

    if magnitude > ACCENT_CUT {
        Ink::Accent
    } else if magnitude > 0.70 {
        Ink::Amber
    } else if magnitude > 0.55 {
        Ink::AmberLight
    } else if magnitude > 0.40 {
        Ink::TextMuted
    } else {
        Ink::TextSubtle
    }
}

/// INT/001: a flow field that coheres, sweeps, fragments and dissolves.
pub struct Drift {
    field: FlowField,
}

impl Drift {
    pub fn new() -> Self {
        Self {
            field: FlowField::new(0),
        }
    }
}

impl Default for Drift {
    fn default() -> Self {
        Self::new()
    }
}

impl Piece for Drift {
    fn meta(&self) -> &'static PieceMeta {
        &META
    }

    fn timeline(&self) -> &'static [PhaseSpec] {
        &TIMELINE
    }

    fn begin_cycle(&mut self, seed: u64, _cols: usize, _rows: usize) {
        self.field = FlowField::new(seed);
    }

    fn render(&mut self, ctx: &mut PieceCtx<'_>, frame: &mut GlyphFrame) {
        let phase = DriftPhase::from_index(ctx.phase);
        let params = field_params(phase, ctx.progress);

        for row in 0..ctx.rows {
            for col in 0..ctx.cols {
                let sample = self.field.sample(col, row, ctx.cycle_elapsed_ms, &params);
                if let Some(glyph) = glyph_for(sample.angle, sample.magnitude, phase, ctx.rng) {
                    frame.push(colour_for(sample.magnitude, phase), col, row, glyph);
                }
            }
        }

        let mid_row = ctx.rows / 2;
        match phase {
            DriftPhase::Terminal => {
                frame.push_centered(Ink::TextSubtle, mid_row, "· · SIGNAL LOST · ·");
            }
            DriftPhase::Reacquisition => {
                let count = (ctx.now_ms / 500) % 3 + 1;
                let mut msg = String::from("REACQUIRING");
                for _ in 0..count {
                    msg.push_str(" ·");
                }
                frame.push_centered(Ink::TextSubtle, mid_row, &msg);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_ladder_is_monotonic() {
        let order = |ink: Ink| match ink {
            Ink::TextSubtle => 0,
            Ink::TextMuted => 1,
            Ink::AmberLight => 2,
            Ink::Amber => 3,
            Ink::Accent => 4,
            other => panic!("unexpected flow ink {other:?}"),
        };
        let mut last = 0;
        for step in 0..=100 {
            let mag = step as f32 / 100.0;
            let rank = order(colour_for(mag, DriftPhase::Flow));
            assert!(rank >= last, "band cooled as magnitude rose at {mag}");
            last = rank;
        }
    }

    #[test]
    fn accent_threshold_is_sharp() {
        assert_eq!(colour_for(0.85, DriftPhase::Flow), Ink::Accent);
        assert_eq!(colour_for(0.81, DriftPhase::Flow), Ink::Amber);
    }

    #[test]
    fn blocks_never_appear_in_steady_flow() {
        let mut rng = FrameRng::for_timestamp(77);
        for i in 0..20_000 {
            let mag = 0.31 + (i % 60) as f32 / 100.0;
            if let Some(glyph) = glyph_for(1.3, mag.min(1.0), DriftPhase::Flow, &mut rng) {
                assert!(
                    !BLOCK_GLYPHS.contains(&glyph),
                    "block glyph {glyph} leaked into flow phase"
                );
            }
        }
    }

    #[test]
    fn low_magnitude_is_negative_space() {
        let mut rng = FrameRng::for_timestamp(5);
        for i in 0..1_000 {
            let mag = (i % 29) as f32 / 100.0;
            assert!(glyph_for(0.4, mag, DriftPhase::Flow, &mut rng).is_none());
        }
    }
}
