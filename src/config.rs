use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tui-gallery",
    version,
    about = "Terminal catalogue of phase-driven generative glyph pieces"
)]
pub struct Config {
    /// Piece to open: catalogue index, id (int-001) or title substring.
    #[arg(long)]
    pub piece: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_pieces: bool,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = RendererMode::TrueColor)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub audio: bool,

    #[arg(long, default_value_t = false)]
    pub muted: bool,

    /// Pin the cycle seed chain for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_probe: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Replace the built-in transmission pool: one `kind | groups | text`
    /// message per line.
    #[arg(long)]
    pub messages_file: Option<String>,

    #[arg(long, default_value_t = 14)]
    pub cell_width: u32,

    #[arg(long, default_value_t = 20)]
    pub cell_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "truecolor", alias = "rgb", alias = "24bit")]
    TrueColor,
    #[value(name = "indexed", alias = "256", alias = "ansi")]
    Indexed,
}
