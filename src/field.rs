use std::f32::consts::PI;

/// Per-phase sampling parameters, recomputed once per frame (never per cell).
/// `scale` sets how tight the spatial structure is, `time_speed` how fast the
/// field evolves per millisecond, `magnitude_mul` how much of the field is
/// allowed to surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    pub scale: f32,
    pub time_speed: f32,
    pub magnitude_mul: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    /// Radians; callers normalize into [0, 2pi).
    pub angle: f32,
    /// [0,1] after the phase multiplier.
    pub magnitude: f32,
}

/// Seeded coherent noise field. Three octaves of value noise: the first sets
/// the broad currents, later octaves add controlled irregularity.
pub struct FlowField {
    seed: u32,
}

const OCTAVES: u32 = 3;

impl FlowField {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: (seed ^ (seed >> 32)) as u32,
        }
    }

    /// Fractal noise in [-1, 1].
    pub fn fbm(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut value = 0.0f32;
        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f32;
        let mut max_amplitude = 0.0f32;

        for octave in 0..OCTAVES {
            let seed = self.seed.wrapping_add(octave.wrapping_mul(0x9E37_79B9));
            let n = value_noise_3d(x * frequency, y * frequency, z * frequency, seed);
            value += (n * 2.0 - 1.0) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value / max_amplitude.max(1e-6)
    }

    pub fn sample(&self, col: usize, row: usize, time_offset_ms: u64, p: &FieldParams) -> FlowSample {
        let nx = col as f32 * p.scale;
        let ny = row as f32 * p.scale;
        let nz = time_offset_ms as f32 * p.time_speed;

        let angle = self.fbm(nx, ny, nz) * PI * 2.0;

        // Decorrelated magnitude sample: different spatial frequency, offset
        // along the time axis so the two fields never line up.
        let mag_noise = (self.fbm(nx * 1.7, ny * 1.7, nz + 100.0) + 1.0) / 2.0;
        let magnitude = (mag_noise * p.magnitude_mul).clamp(0.0, 1.0);

        FlowSample { angle, magnitude }
    }
}

fn hash_3d(ix: i32, iy: i32, iz: i32, seed: u32) -> u32 {
    let mut h = seed
        .wrapping_add((ix as u32).wrapping_mul(374_761_393))
        .wrapping_add((iy as u32).wrapping_mul(668_265_263))
        .wrapping_add((iz as u32).wrapping_mul(2_147_483_647));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Trilinear value noise in [0, 1].
fn value_noise_3d(x: f32, y: f32, z: f32, seed: u32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let z0 = z.floor();
    let sx = smoothstep(x - x0);
    let sy = smoothstep(y - y0);
    let sz = smoothstep(z - z0);
    let (ix, iy, iz) = (x0 as i32, y0 as i32, z0 as i32);

    let v = |dx: i32, dy: i32, dz: i32| -> f32 {
        let h = hash_3d(ix.wrapping_add(dx), iy.wrapping_add(dy), iz.wrapping_add(dz), seed);
        h as f32 / u32::MAX as f32
    };

    let x00 = lerp(v(0, 0, 0), v(1, 0, 0), sx);
    let x10 = lerp(v(0, 1, 0), v(1, 1, 0), sx);
    let x01 = lerp(v(0, 0, 1), v(1, 0, 1), sx);
    let x11 = lerp(v(0, 1, 1), v(1, 1, 1), sx);

    let y0v = lerp(x00, x10, sy);
    let y1v = lerp(x01, x11, sy);

    lerp(y0v, y1v, sz)
}
