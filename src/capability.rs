use crate::config::RendererMode;

#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub auto_probe: bool,
    pub requested_renderer: RendererMode,
    pub renderer: RendererMode,
    pub audio_requested: bool,
    pub audio: bool,
    notes: Vec<String>,
}

impl CapabilityReport {
    pub fn changed(&self) -> bool {
        self.renderer != self.requested_renderer || self.audio != self.audio_requested
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn status_label(&self) -> String {
        if !self.auto_probe {
            return format!("off (renderer={:?}, audio={})", self.renderer, self.audio);
        }
        if self.changed() {
            return format!(
                "fallback ren {:?}->{:?}, audio {}->{}",
                self.requested_renderer, self.renderer, self.audio_requested, self.audio
            );
        }
        format!("ok ren={:?}, audio={}", self.renderer, self.audio)
    }
}

pub fn probe_runtime(
    requested_renderer: RendererMode,
    audio_requested: bool,
    auto_probe: bool,
) -> CapabilityReport {
    let mut report = CapabilityReport {
        auto_probe,
        requested_renderer,
        renderer: requested_renderer,
        audio_requested,
        audio: audio_requested,
        notes: Vec::new(),
    };

    if !auto_probe {
        report.push_note("capability probe disabled by --auto-probe=false");
        return report;
    }

    if requested_renderer == RendererMode::TrueColor && !truecolor_available() {
        report.renderer = RendererMode::Indexed;
        report.push_note("terminal does not advertise 24-bit colour; falling back to indexed renderer");
    }

    if audio_requested && !crate::audio::output_available() {
        report.audio = false;
        report.push_note("no default audio output device; pieces run visual-only");
    }

    if report.notes.is_empty() {
        report.push_note("probe selected requested renderer/audio with no fallback");
    }

    report
}

fn truecolor_available() -> bool {
    if let Ok(v) = std::env::var("TUIGALLERY_FORCE_TRUECOLOR") {
        let s = v.trim().to_ascii_lowercase();
        if s == "1" || s == "true" || s == "yes" || s == "on" {
            return true;
        }
        if s == "0" || s == "false" || s == "no" || s == "off" {
            return false;
        }
    }

    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return true;
    }

    let term = std::env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("direct") || term.contains("kitty") {
        return true;
    }

    let term_program = std::env::var("TERM_PROGRAM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    term_program.contains("ghostty")
        || term_program.contains("kitty")
        || term_program.contains("wezterm")
        || term_program.contains("iterm")
}
