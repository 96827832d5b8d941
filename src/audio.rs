use anyhow::{anyhow, Context};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use std::f32::consts::PI;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

const MASTER_LEVEL: f32 = 0.6;
const BEEP_HZ: f32 = 880.0;

/// Per-frame synthesis targets published by the render loop. The audio thread
/// ramps toward these; it never reads animation state directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthTargets {
    pub master_gain: f32,
    pub static_gain: f32,
    pub bp_center_hz: f32,
    pub bp_q: f32,
    pub am_rate_hz: f32,
    pub carrier_hz: f32,
    pub carrier_gain: f32,
    pub beep_gain: f32,
    /// Monotonic reveal counter; each increment fires one beep envelope.
    pub beep_seq: u32,
}

impl Default for SynthTargets {
    fn default() -> Self {
        Self {
            master_gain: MASTER_LEVEL,
            static_gain: 0.0,
            bp_center_hz: 2_000.0,
            bp_q: 1.5,
            am_rate_hz: 2.0,
            carrier_hz: 440.0,
            carrier_gain: 0.0,
            beep_gain: 0.12,
            beep_seq: 0,
        }
    }
}

impl SynthTargets {
    /// Master gain is a single multiplicative mute control; muting ramps the
    /// whole graph to silence without touching the per-voice targets.
    pub fn with_mute(mut self, muted: bool) -> Self {
        self.master_gain = if muted { 0.0 } else { MASTER_LEVEL };
        self
    }
}

/// Lock-free shared parameter block. Seqlock: odd sequence means a write is in
/// progress; readers retry until they observe a stable even pair.
pub struct AtomicSynthTargets {
    seq: AtomicU64,
    master_gain: AtomicU32,
    static_gain: AtomicU32,
    bp_center_hz: AtomicU32,
    bp_q: AtomicU32,
    am_rate_hz: AtomicU32,
    carrier_hz: AtomicU32,
    carrier_gain: AtomicU32,
    beep_gain: AtomicU32,
    beep_seq: AtomicU32,
}

impl AtomicSynthTargets {
    pub fn new() -> Self {
        let s = Self {
            seq: AtomicU64::new(0),
            master_gain: AtomicU32::new(0),
            static_gain: AtomicU32::new(0),
            bp_center_hz: AtomicU32::new(0),
            bp_q: AtomicU32::new(0),
            am_rate_hz: AtomicU32::new(0),
            carrier_hz: AtomicU32::new(0),
            carrier_gain: AtomicU32::new(0),
            beep_gain: AtomicU32::new(0),
            beep_seq: AtomicU32::new(0),
        };
        s.store(&SynthTargets::default());
        s
    }

    pub fn store(&self, t: &SynthTargets) {
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        self.master_gain.store(t.master_gain.to_bits(), Ordering::Relaxed);
        self.static_gain.store(t.static_gain.to_bits(), Ordering::Relaxed);
        self.bp_center_hz.store(t.bp_center_hz.to_bits(), Ordering::Relaxed);
        self.bp_q.store(t.bp_q.to_bits(), Ordering::Relaxed);
        self.am_rate_hz.store(t.am_rate_hz.to_bits(), Ordering::Relaxed);
        self.carrier_hz.store(t.carrier_hz.to_bits(), Ordering::Relaxed);
        self.carrier_gain.store(t.carrier_gain.to_bits(), Ordering::Relaxed);
        self.beep_gain.store(t.beep_gain.to_bits(), Ordering::Relaxed);
        self.beep_seq.store(t.beep_seq, Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> SynthTargets {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }

            let t = SynthTargets {
                master_gain: f32::from_bits(self.master_gain.load(Ordering::Relaxed)),
                static_gain: f32::from_bits(self.static_gain.load(Ordering::Relaxed)),
                bp_center_hz: f32::from_bits(self.bp_center_hz.load(Ordering::Relaxed)),
                bp_q: f32::from_bits(self.bp_q.load(Ordering::Relaxed)),
                am_rate_hz: f32::from_bits(self.am_rate_hz.load(Ordering::Relaxed)),
                carrier_hz: f32::from_bits(self.carrier_hz.load(Ordering::Relaxed)),
                carrier_gain: f32::from_bits(self.carrier_gain.load(Ordering::Relaxed)),
                beep_gain: f32::from_bits(self.beep_gain.load(Ordering::Relaxed)),
                beep_seq: self.beep_seq.load(Ordering::Relaxed),
            };

            let v2 = self.seq.load(Ordering::Acquire);
            if v1 == v2 {
                return t;
            }
        }
    }
}

impl Default for AtomicSynthTargets {
    fn default() -> Self {
        Self::new()
    }
}

/// Synthesis state owned by the output callback. Fixed graph: white noise
/// through a band-pass and amplitude modulation, a sine carrier, a beep voice,
/// one master gain. All parameter moves are smoothed to avoid clicks.
struct Voice {
    sample_rate: f32,
    smooth: f32,
    master_smooth: f32,
    beep_decay: f32,

    master: f32,
    static_gain: f32,
    carrier_gain: f32,
    am_rate: f32,
    carrier_hz: f32,

    bp_center: f32,
    bp_q: f32,
    filter: DirectForm2Transposed<f32>,

    noise_state: u32,
    am_phase: f32,
    carrier_phase: f32,
    beep_phase: f32,
    beep_env: f32,
    last_beep_seq: u32,
}

impl Voice {
    fn new(sample_rate: f32) -> Self {
        let coeffs = bandpass_coeffs(sample_rate, 2_000.0, 1.5);
        Self {
            sample_rate,
            smooth: one_pole(sample_rate, 0.08),
            master_smooth: one_pole(sample_rate, 0.10),
            beep_decay: (-1.0 / (0.035 * sample_rate)).exp(),
            master: 0.0,
            static_gain: 0.0,
            carrier_gain: 0.0,
            am_rate: 2.0,
            carrier_hz: 440.0,
            bp_center: 2_000.0,
            bp_q: 1.5,
            filter: DirectForm2Transposed::<f32>::new(coeffs),
            noise_state: 0x2545_F491,
            am_phase: 0.0,
            carrier_phase: 0.0,
            beep_phase: 0.0,
            beep_env: 0.0,
            last_beep_seq: 0,
        }
    }

    fn fill(&mut self, targets: &SynthTargets, buf: &mut [f32]) {
        if targets.beep_seq != self.last_beep_seq {
            self.last_beep_seq = targets.beep_seq;
            self.beep_env = 1.0;
            self.beep_phase = 0.0;
        }

        // Filter coefficients move once per block, not per sample.
        let center = targets.bp_center_hz.clamp(50.0, self.sample_rate * 0.45);
        let q = targets.bp_q.clamp(0.2, 12.0);
        self.bp_center += (center - self.bp_center) * 0.25;
        self.bp_q += (q - self.bp_q) * 0.25;
        self.filter
            .update_coefficients(bandpass_coeffs(self.sample_rate, self.bp_center, self.bp_q));

        let dt = 1.0 / self.sample_rate;

        for slot in buf.iter_mut() {
            self.master += (targets.master_gain - self.master) * self.master_smooth;
            self.static_gain += (targets.static_gain - self.static_gain) * self.smooth;
            self.carrier_gain += (targets.carrier_gain - self.carrier_gain) * self.smooth;
            self.am_rate += (targets.am_rate_hz - self.am_rate) * self.smooth;
            self.carrier_hz += (targets.carrier_hz - self.carrier_hz) * self.smooth;

            self.am_phase = wrap_phase(self.am_phase + 2.0 * PI * self.am_rate * dt);
            self.carrier_phase = wrap_phase(self.carrier_phase + 2.0 * PI * self.carrier_hz * dt);
            self.beep_phase = wrap_phase(self.beep_phase + 2.0 * PI * BEEP_HZ * dt);

            let noise = self.next_noise();
            let shaped = self.filter.run(noise);
            let am = 0.65 + 0.35 * self.am_phase.sin();
            let static_voice = shaped * am * self.static_gain;

            let carrier = self.carrier_phase.sin() * self.carrier_gain;

            self.beep_env *= self.beep_decay;
            let beep = self.beep_phase.sin() * self.beep_env * targets.beep_gain;

            *slot = ((static_voice + carrier + beep) * self.master).clamp(-1.0, 1.0);
        }
    }

    fn next_noise(&mut self) -> f32 {
        self.noise_state = self.noise_state.wrapping_add(1);
        let mut n = self.noise_state.wrapping_mul(374_761_393);
        n ^= n >> 13;
        n = n.wrapping_mul(1_274_126_177);
        n ^= n >> 16;
        (n & 0x00FF_FFFF) as f32 / 16_777_215.0 * 2.0 - 1.0
    }
}

fn one_pole(sample_rate: f32, tau_s: f32) -> f32 {
    1.0 - (-1.0 / (tau_s * sample_rate)).exp()
}

fn wrap_phase(p: f32) -> f32 {
    if p > 2.0 * PI { p - 2.0 * PI } else { p }
}

fn bandpass_coeffs(sample_rate: f32, center: f32, q: f32) -> Coefficients<f32> {
    let center = center.clamp(50.0, sample_rate * 0.45);
    Coefficients::<f32>::from_params(Type::BandPass, sample_rate.hz(), center.hz(), q.max(0.2))
        .unwrap_or_else(|_| {
            Coefficients::<f32>::from_params(Type::BandPass, 48_000.0f32.hz(), 2_000.0f32.hz(), 1.5)
                .expect("reference band-pass coefficients")
        })
}

/// Phase-clock synchronized audio layer. Tolerates being driven before audio
/// hardware is ready (skips silently), starts its generator graph lazily
/// exactly once, and fails silently into visual-only operation when no output
/// device can be acquired.
pub struct AudioSync {
    params: Arc<AtomicSynthTargets>,
    ready: bool,
    failed: bool,
    stream: Option<cpal::Stream>,
}

impl AudioSync {
    pub fn new() -> Self {
        Self {
            params: Arc::new(AtomicSynthTargets::new()),
            ready: false,
            failed: false,
            stream: None,
        }
    }

    /// Readiness is gated externally (user gesture); flipping it on triggers
    /// the one-time stream start.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
        if self.ready {
            self.ensure_started();
        }
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Publish this frame's targets. A no-op until ready; mute overrides the
    /// master gain so the callback ramps to silence rather than stepping.
    pub fn publish(&mut self, targets: &SynthTargets, muted: bool) {
        if !self.ready || self.failed {
            return;
        }
        self.params.store(&targets.with_mute(muted));
    }

    fn ensure_started(&mut self) {
        if self.stream.is_some() || self.failed {
            return;
        }
        match build_output_stream(Arc::clone(&self.params)) {
            Ok(stream) => {
                if stream.play().is_ok() {
                    self.stream = Some(stream);
                } else {
                    self.failed = true;
                }
            }
            // Audio is strictly additive; the piece stays fully functional.
            Err(_) => self.failed = true,
        }
    }
}

impl Drop for AudioSync {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
    }
}

impl Default for AudioSync {
    fn default() -> Self {
        Self::new()
    }
}

/// True when an output device exists; used by the capability probe.
pub fn output_available() -> bool {
    cpal::default_host().default_output_device().is_some()
}

fn build_output_stream(params: Arc<AtomicSynthTargets>) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no default output device"))?;
    let supported = device
        .default_output_config()
        .context("query default output config")?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    match sample_format {
        SampleFormat::F32 => spawn_stream::<f32>(&device, &config, params),
        SampleFormat::I16 => spawn_stream::<i16>(&device, &config, params),
        SampleFormat::U16 => spawn_stream::<u16>(&device, &config, params),
        other => Err(anyhow!("unsupported output sample format {other:?}")),
    }
}

fn spawn_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    params: Arc<AtomicSynthTargets>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut voice = Voice::new(config.sample_rate.0 as f32);
    let mut mono = Vec::<f32>::new();

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _| {
                let frames = data.len() / channels;
                mono.resize(frames, 0.0);
                let targets = params.load();
                voice.fill(&targets, &mut mono);
                for (frame, sample) in data.chunks_exact_mut(channels).zip(&mono) {
                    let v = T::from_sample(*sample);
                    for slot in frame.iter_mut() {
                        *slot = v;
                    }
                }
            },
            // The render loop owns the terminal; nothing useful to print here.
            |_err| {},
            None,
        )
        .context("build output stream")?;

    Ok(stream)
}
