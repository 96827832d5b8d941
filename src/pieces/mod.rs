pub mod drift;
pub mod station;

pub use drift::Drift;
pub use station::Station;

use crate::audio::SynthTargets;
use crate::frame::GlyphFrame;
use crate::payload::MessagePool;
use crate::phase::PhaseSpec;
use crate::rng::FrameRng;

/// Catalogue entry metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceMeta {
    pub id: &'static str,
    pub designation: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub has_audio: bool,
}

/// Per-frame context handed to a piece. Time is injected, never read from a
/// clock, so pieces behave identically under synthetic timestamps.
pub struct PieceCtx<'a> {
    pub now_ms: u64,
    pub phase: usize,
    pub progress: f32,
    pub cycle_elapsed_ms: u64,
    pub cols: usize,
    pub rows: usize,
    pub rng: &'a mut FrameRng,
}

/// One catalogue piece: a phase table plus the sampling, mapping and payload
/// behaviour bound to it. The engine is generic over this; no per-piece
/// branching lives in the render path.
pub trait Piece {
    fn meta(&self) -> &'static PieceMeta;
    fn timeline(&self) -> &'static [PhaseSpec];
    /// Called at every cycle boundary (including the first tick) with the
    /// fresh seed and current grid dimensions.
    fn begin_cycle(&mut self, seed: u64, cols: usize, rows: usize);
    fn on_resize(&mut self, _cols: usize, _rows: usize) {}
    fn render(&mut self, ctx: &mut PieceCtx<'_>, frame: &mut GlyphFrame);
    /// Map the phase clock onto synthesis targets. Only audible pieces
    /// override this.
    fn tune_audio(&mut self, _phase: usize, _progress: f32, _now_ms: u64, _t: &mut SynthTargets) {}
}

pub fn metas() -> Vec<&'static PieceMeta> {
    vec![&drift::META, &station::META]
}

pub fn make_pieces(pool: &MessagePool) -> Vec<Box<dyn Piece>> {
    vec![
        Box::new(Drift::new()),
        Box::new(Station::new(pool.clone())),
    ]
}

pub fn build_piece(index: usize, pool: &MessagePool) -> Option<Box<dyn Piece>> {
    match index {
        0 => Some(Box::new(Drift::new())),
        1 => Some(Box::new(Station::new(pool.clone()))),
        _ => None,
    }
}

/// Resolve a `--piece` request: catalogue index, exact id, or case-blind
/// substring of designation/title.
pub fn select_piece(requested: Option<&str>) -> Option<usize> {
    let p = requested?.trim();
    if p.is_empty() {
        return None;
    }
    if let Ok(i) = p.parse::<usize>() {
        return (i < metas().len()).then_some(i);
    }
    let p_l = p.to_lowercase();
    metas().iter().position(|m| {
        m.id == p_l
            || m.designation.to_lowercase().contains(&p_l)
            || m.title.to_lowercase().contains(&p_l)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_by_index_id_and_title() {
        assert_eq!(select_piece(Some("0")), Some(0));
        assert_eq!(select_piece(Some("int-002")), Some(1));
        assert_eq!(select_piece(Some("drift")), Some(0));
        assert_eq!(select_piece(Some("STATION")), Some(1));
        assert_eq!(select_piece(Some("nope")), None);
        assert_eq!(select_piece(Some("9")), None);
        assert_eq!(select_piece(None), None);
    }

    #[test]
    fn metas_match_catalogue_order() {
        let metas = metas();
        let pool = MessagePool::builtin();
        for (i, meta) in metas.iter().enumerate() {
            let piece = build_piece(i, &pool).expect("catalogue index");
            assert_eq!(piece.meta().id, meta.id);
        }
        assert!(build_piece(metas.len(), &pool).is_none());
    }
}
