use std::path::PathBuf;

use anyhow::Context;
use engine::EngineContext;
use game::{config::DEFAULT_CONFIG, AppConfig, CardScene};

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = AppConfig::load(&path).with_context(|| format!("loading {}", path.display()))?;

    // ---- Create engine context (game owns this) ----
    let ctx = EngineContext::new(config.engine, CardScene::new(config.game))
        .context("creating engine context")?;
    ctx.run().context("running card table")
}
