//! Initialize vidup.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use vidup_config::Config;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} vidup is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing vidup...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("Next steps:");
    println!("  1. Check external tools: {}", "vidup deps check".cyan());
    println!("  2. Install missing tools: {}", "vidup deps install".cyan());
    println!(
        "  3. Test the OpenRouter key: {}",
        "OPENROUTER_API_KEY=... vidup probe".cyan()
    );

    Ok(())
}
