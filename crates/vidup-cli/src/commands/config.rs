//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use vidup_config::Config;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));

    if paths.config_file.exists() {
        let contents =
            std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;
        println!("{}", contents);
    } else {
        println!("{}", "(no config file, showing defaults)".dimmed());
        println!("{}", Config::default_config_string());
    }

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;

    // Parse key path (e.g., "openrouter.model")
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "app_dir"] => config.general.app_dir = Some(value.to_string()),
        ["openrouter", "base_url"] => config.openrouter.base_url = value.to_string(),
        ["openrouter", "model"] => config.openrouter.model = value.to_string(),
        ["openrouter", "max_tokens"] => {
            config.openrouter.max_tokens = value.parse().context("Invalid max_tokens value")?;
        }
        ["openrouter", "temperature"] => {
            config.openrouter.temperature = value.parse().context("Invalid temperature value")?;
        }
        ["openrouter", "timeout_seconds"] => {
            config.openrouter.timeout_seconds = value.parse().context("Invalid timeout value")?;
        }
        ["deps", "ffmpeg_url"] => config.deps.ffmpeg_url = value.to_string(),
        ["deps", "realesrgan_url"] => config.deps.realesrgan_url = value.to_string(),
        ["deps", "user_agent"] => config.deps.user_agent = value.to_string(),
        ["deps", "timeout_seconds"] => {
            config.deps.timeout_seconds = value.parse().context("Invalid timeout value")?;
        }
        ["video", "frame_count"] => {
            config.video.frame_count = value.parse().context("Invalid frame_count value")?;
        }
        ["video", "thumbnail_width"] => {
            config.video.thumbnail_width = value.parse().context("Invalid width value")?;
        }
        ["video", "thumbnail_height"] => {
            config.video.thumbnail_height = value.parse().context("Invalid height value")?;
        }
        ["icon", "sizes"] => {
            config.icon.sizes = value
                .split(',')
                .map(|s| s.trim().parse::<u32>())
                .collect::<Result<_, _>>()
                .context("Invalid sizes list, expected e.g. 256,64,16")?;
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    config
        .validate()
        .with_context(|| format!("Rejected value for {}", key))?;
    config.save_to(&paths.config_file).context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}
