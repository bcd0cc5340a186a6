//! Show or save the effective configuration.

use std::path::PathBuf;

use framelens_common::config::config_file_path;
use framelens_engine::EngineConfig;

pub fn run(config: &EngineConfig, path: Option<PathBuf>, save: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);

    if save {
        config.save_to(&path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
