use tui_gallery::capability::probe_runtime;
use tui_gallery::config::RendererMode;
use tui_gallery::payload::{MessageKind, MessagePool, PayloadError};
use tui_gallery::prefs::AppPrefs;
use tui_gallery::rng::CycleRng;

// ── Message pool ────────────────────────────────────────────────────────────

#[test]
fn builtin_pool_is_sane() {
    let pool = MessagePool::builtin();
    assert!(pool.len() >= 10, "builtin pool too small: {}", pool.len());

    for msg in pool.messages() {
        assert!(!msg.text.trim().is_empty());
        assert!(msg.groups >= 1 && msg.groups <= 200, "groups {}", msg.groups);
    }
    // All three transmission kinds are represented.
    for kind in [
        MessageKind::Coordinates,
        MessageKind::Designation,
        MessageKind::Phrase,
    ] {
        assert!(
            pool.messages().iter().any(|m| m.kind == kind),
            "missing kind {kind:?}"
        );
    }
}

#[test]
fn pick_is_deterministic_per_seed() {
    let pool = MessagePool::builtin();
    let mut a = CycleRng::new(42);
    let mut b = CycleRng::new(42);
    for _ in 0..32 {
        assert_eq!(pool.pick(&mut a), pool.pick(&mut b));
    }
}

#[test]
fn parse_accepts_comments_and_blank_lines() {
    let text = "\
# station pool v1
coordinates | 24 | 52.5163N  13.3777E

phrase | 16 | VERIFY  AT  DAWN
designation | 18 | ECHO  7  CONFIRMED
";
    let pool = MessagePool::parse(text).expect("valid pool");
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.messages()[0].kind, MessageKind::Coordinates);
    assert_eq!(pool.messages()[0].groups, 24);
    assert_eq!(pool.messages()[1].text, "VERIFY  AT  DAWN");
}

#[test]
fn parse_rejects_missing_separators() {
    let err = MessagePool::parse("phrase 16 VERIFY").unwrap_err();
    assert!(matches!(err, PayloadError::Parse { line: 1, .. }), "{err}");
}

#[test]
fn parse_rejects_unknown_kind() {
    let err = MessagePool::parse("weather | 16 | SUNNY").unwrap_err();
    assert!(
        matches!(err, PayloadError::InvalidValue { field: "kind", line: 1, .. }),
        "{err}"
    );
}

#[test]
fn parse_rejects_bad_group_counts() {
    let zero = MessagePool::parse("phrase | 0 | X").unwrap_err();
    assert!(matches!(zero, PayloadError::InvalidValue { field: "groups", .. }), "{zero}");

    let huge = MessagePool::parse("phrase | 9999 | X").unwrap_err();
    assert!(matches!(huge, PayloadError::InvalidValue { field: "groups", .. }), "{huge}");

    let word = MessagePool::parse("phrase | many | X").unwrap_err();
    assert!(matches!(word, PayloadError::InvalidValue { field: "groups", .. }), "{word}");
}

#[test]
fn parse_rejects_empty_text_and_empty_pool() {
    let blank = MessagePool::parse("phrase | 16 |   ").unwrap_err();
    assert!(matches!(blank, PayloadError::InvalidValue { field: "text", .. }), "{blank}");

    let empty = MessagePool::parse("# nothing here\n\n").unwrap_err();
    assert!(matches!(empty, PayloadError::Empty), "{empty}");
}

#[test]
fn payload_errors_render_readable_messages() {
    let err = MessagePool::parse("weather | 16 | SUNNY").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("line 1"), "{rendered}");
    assert!(rendered.contains("kind"), "{rendered}");
}

// ── Prefs ───────────────────────────────────────────────────────────────────

#[test]
fn prefs_parse_and_save_round_trip() {
    let parsed = AppPrefs::parse("# comment\nmuted = true\n").unwrap();
    assert!(parsed.muted);

    let dir = std::env::temp_dir().join(format!("tui_gallery_test_{}", std::process::id()));
    let path = dir.join("prefs.txt");
    let prefs = AppPrefs { muted: true };
    prefs.save(Some(&path)).expect("save prefs");
    let loaded = AppPrefs::load(Some(&path)).expect("load prefs");
    assert_eq!(loaded, prefs);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn prefs_reject_malformed_lines() {
    assert!(AppPrefs::parse("muted maybe").is_err());
    assert!(AppPrefs::parse("muted = maybe").is_err());
    // Unknown keys are ignored for forward compatibility.
    assert!(AppPrefs::parse("volume = 3").is_ok());
}

#[test]
fn missing_prefs_file_yields_defaults() {
    let path = std::env::temp_dir().join("tui_gallery_definitely_missing_prefs.txt");
    let _ = std::fs::remove_file(&path);
    let prefs = AppPrefs::load(Some(&path)).expect("missing file is not an error");
    assert_eq!(prefs, AppPrefs::default());
}

// ── Capability probe ────────────────────────────────────────────────────────

#[test]
fn probe_disabled_keeps_requests_verbatim() {
    let report = probe_runtime(RendererMode::TrueColor, true, false);
    assert_eq!(report.renderer, RendererMode::TrueColor);
    assert!(report.audio);
    assert!(!report.notes().is_empty());
    assert!(report.status_label().starts_with("off"));
}

#[test]
fn probe_always_records_a_note() {
    let report = probe_runtime(RendererMode::Indexed, false, true);
    assert!(!report.notes().is_empty());
    assert_eq!(report.renderer, RendererMode::Indexed);
    assert!(!report.audio);
}
