use crate::capability;
use crate::config::{Config, RendererMode};
use crate::engine::{Engine, EngineConfig};
use crate::palette::Palette;
use crate::payload::MessagePool;
use crate::pieces;
use crate::prefs::{prefs_storage_path, AppPrefs};
use crate::render::{GlyphRenderer, IndexedRenderer, TermFrame, TrueColorRenderer};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};

/// `--list-pieces`: print the catalogue without touching the terminal modes.
pub fn list_pieces() {
    println!("Catalogue:");
    for (i, meta) in pieces::metas().iter().enumerate() {
        println!(
            "  [{i}] {}  {} — {}{}",
            meta.designation,
            meta.title,
            meta.subtitle,
            if meta.has_audio { "  (audio)" } else { "" },
        );
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let pool = match &cfg.messages_file {
        Some(path) => MessagePool::load(path).with_context(|| format!("load message pool {path}"))?,
        None => MessagePool::builtin(),
    };

    let report = capability::probe_runtime(cfg.renderer, cfg.audio, cfg.auto_probe);
    let mut renderer: Box<dyn GlyphRenderer> = match report.renderer {
        RendererMode::TrueColor => Box::new(TrueColorRenderer::new()),
        RendererMode::Indexed => Box::new(IndexedRenderer::new()),
    };

    let prefs_path = prefs_storage_path();
    let prefs = AppPrefs::load(prefs_path.as_deref()).unwrap_or_default();
    let mut muted = cfg.muted || prefs.muted;

    let piece_count = pieces::metas().len();
    let mut active = pieces::select_piece(cfg.piece.as_deref()).unwrap_or(0);
    let palette = Palette::catalogue();

    let engine_cfg = EngineConfig {
        cell_width: cfg.cell_width.max(1),
        cell_height: cfg.cell_height.max(1),
        fps_cap: None,
        seed: cfg.seed,
        audio: report.audio,
    };
    let mut engine = build_engine(active, &pool, &engine_cfg)?;
    engine.set_muted(muted);

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut last_size = crate::terminal::term_size()?;
    if last_size.0 < 8 || last_size.1 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 8x4, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut show_hud = true;
    let mut audio_ready = false;

    resize_engine(&mut engine, &engine_cfg, last_size, show_hud);

    let start = Instant::now();
    let mut fps = FpsCounter::new();

    loop {
        let now = Instant::now();
        let now_ms = now.duration_since(start).as_millis() as u64;

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    // Any keypress is the user gesture that unlocks audio.
                    if !audio_ready {
                        audio_ready = true;
                        engine.set_audio_ready(true);
                    }

                    match key_action(k.code, k.modifiers) {
                        Action::Quit => return Ok(()),
                        Action::PrevPiece => {
                            active = (active + piece_count - 1) % piece_count;
                            engine = build_engine(active, &pool, &engine_cfg)?;
                            engine.set_muted(muted);
                            engine.set_audio_ready(audio_ready);
                            resize_engine(&mut engine, &engine_cfg, last_size, show_hud);
                        }
                        Action::NextPiece => {
                            active = (active + 1) % piece_count;
                            engine = build_engine(active, &pool, &engine_cfg)?;
                            engine.set_muted(muted);
                            engine.set_audio_ready(audio_ready);
                            resize_engine(&mut engine, &engine_cfg, last_size, show_hud);
                        }
                        Action::ToggleMute => {
                            muted = !muted;
                            engine.set_muted(muted);
                            let _ = AppPrefs { muted }.save(prefs_path.as_deref());
                        }
                        Action::ToggleHud => {
                            show_hud = !show_hud;
                            resize_engine(&mut engine, &engine_cfg, last_size, show_hud);
                        }
                        Action::None => {}
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    resize_engine(&mut engine, &engine_cfg, last_size, show_hud);
                }
                _ => {}
            }
        }

        // Size check once per frame; resize events can be missed in some
        // terminals.
        let size = crate::terminal::term_size()?;
        if size != last_size {
            last_size = size;
            resize_engine(&mut engine, &engine_cfg, last_size, show_hud);
        }

        // HUD reads engine state before the tick borrows it for the frame;
        // one frame of phase-label lag is invisible.
        let hud = if show_hud {
            build_hud(&engine, fps.fps(), muted, audio_ready)
        } else {
            String::new()
        };

        if let Some(glyphs) = engine.tick(now_ms) {
            let frame = TermFrame {
                term_cols: last_size.0,
                term_rows: last_size.1,
                glyphs,
                palette: &palette,
                hud: &hud,
                sync_updates: cfg.sync_updates,
            };
            renderer.render(&frame, &mut out)?;
        }

        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn build_engine(active: usize, pool: &MessagePool, cfg: &EngineConfig) -> anyhow::Result<Engine> {
    let piece = pieces::build_piece(active, pool)
        .ok_or_else(|| anyhow::anyhow!("piece index {active} out of range"))?;
    Ok(Engine::new(piece, Palette::catalogue(), *cfg))
}

fn resize_engine(engine: &mut Engine, cfg: &EngineConfig, size: (u16, u16), show_hud: bool) {
    let (cols, rows) = size;
    let hud_rows: u16 = if show_hud { 1 } else { 0 };
    let visual_rows = rows.saturating_sub(hud_rows);
    engine.resize(
        u32::from(cols) * cfg.cell_width,
        u32::from(visual_rows) * cfg.cell_height,
    );
}

enum Action {
    Quit,
    PrevPiece,
    NextPiece,
    ToggleMute,
    ToggleHud,
    None,
}

fn key_action(code: KeyCode, mods: KeyModifiers) -> Action {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Action::Quit;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Left => Action::PrevPiece,
        KeyCode::Right => Action::NextPiece,
        KeyCode::Char('m') | KeyCode::Char('M') => Action::ToggleMute,
        KeyCode::Char('i') | KeyCode::Char('I') => Action::ToggleHud,
        _ => Action::None,
    }
}

fn build_hud(engine: &Engine, fps: f32, muted: bool, audio_ready: bool) -> String {
    let meta = engine.meta();
    let audio_label = if !meta.has_audio {
        "—"
    } else if muted {
        "muted"
    } else if engine.audio_running() {
        "on"
    } else if audio_ready {
        "standby"
    } else {
        "press any key"
    };
    format!(
        "{} {}  |  phase {}  |  {:.0} fps  |  audio {}",
        meta.designation,
        meta.title,
        engine.phase_name(),
        fps,
        audio_label,
    )
}

struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
