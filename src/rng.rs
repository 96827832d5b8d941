/// Cycle-scoped deterministic generator. Seeded exactly once per cycle; the
/// same seed reproduces the same payload, digit streams and field structure.
pub struct CycleRng {
    rng: fastrand::Rng,
}

impl CycleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.rng.f32()
    }

    pub fn digit(&mut self) -> u8 {
        self.rng.u8(0..10)
    }

    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.usize(0..len)
    }
}

/// Fast per-frame generator for cosmetic jitter (glyph variants, dropout,
/// flicker). Reseeded from the frame timestamp, so identical synthetic
/// timestamps reproduce identical frames, but wall-clock runs do not.
pub struct FrameRng {
    rng: fastrand::Rng,
}

impl FrameRng {
    pub fn for_timestamp(now_ms: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(now_ms ^ 0x9E37_79B9_7F4A_7C15),
        }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.rng.f32()
    }

    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.f32() < p
    }

    pub fn digit(&mut self) -> u8 {
        self.rng.u8(0..10)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.usize(0..items.len())]
    }
}

/// Non-deterministic seed for a fresh cycle.
pub fn entropy_seed() -> u64 {
    fastrand::u64(..)
}

/// Deterministic successor in a fixed-seed chain. Each cycle still gets a
/// distinct seed when the user pins `--seed`.
pub fn advance_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_rng_is_reproducible() {
        let mut a = CycleRng::new(42);
        let mut b = CycleRng::new(42);
        for _ in 0..256 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn digits_stay_in_range() {
        let mut rng = CycleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.digit() < 10);
        }
    }

    #[test]
    fn seed_chain_moves() {
        let s = 42u64;
        assert_ne!(advance_seed(s), s);
        assert_ne!(advance_seed(advance_seed(s)), advance_seed(s));
    }
}
