use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = tui_gallery::config::Config::parse();
    if cfg.list_pieces {
        tui_gallery::app::list_pieces();
        return Ok(());
    }

    tui_gallery::app::run(cfg)
}
