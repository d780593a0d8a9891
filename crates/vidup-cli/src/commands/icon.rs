//! Icon command - pack a PNG into a .ico file.

use super::{format_size, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use vidup_icon::{pack_icon, parse_directory};

pub fn run(source: &Path, output: Option<PathBuf>, inspect: bool) -> Result<()> {
    if inspect {
        return show(source);
    }

    let config = load_config()?;
    let output = output.unwrap_or_else(|| source.with_extension("ico"));

    let count = pack_icon(source, &output, &config.icon.sizes)
        .with_context(|| format!("Failed to pack {}", source.display()))?;

    println!(
        "{} {} ({} sizes)",
        "Icon:".green().bold(),
        output.display(),
        count
    );
    show(&output)
}

fn show(icon: &Path) -> Result<()> {
    let bytes = std::fs::read(icon).with_context(|| format!("Failed to read {}", icon.display()))?;
    let entries = parse_directory(&bytes)?;

    println!("{} ({})", icon.display(), format_size(bytes.len() as u64));
    for entry in entries {
        println!(
            "  {:>3}x{:<3} {:>2}-bit  {:>10}  @ {}",
            entry.pixel_width(),
            entry.pixel_height(),
            entry.bit_depth,
            format_size(entry.size as u64),
            entry.offset
        );
    }

    Ok(())
}
