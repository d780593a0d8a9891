//! Dependency commands - check and install external tools.

use super::{load_config, resolve_app_dir};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use vidup_core::{StatusEvent, Tool};
use vidup_deps::Provisioner;

fn provisioner(app_dir: Option<PathBuf>) -> Result<Provisioner> {
    let config = load_config()?;
    let app_dir = resolve_app_dir(app_dir, &config)?;
    Provisioner::new(&config.deps, app_dir).context("Failed to create HTTP client")
}

fn print_status(provisioner: &Provisioner) {
    println!("{}", "External Tools".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("App directory: {}", provisioner.app_dir().display());
    println!();

    for status in provisioner.status() {
        match status.path {
            Some(path) => println!(
                "  {} {:<12} {}",
                "●".green(),
                status.tool.display_name(),
                path.display()
            ),
            None => println!(
                "  {} {:<12} {}",
                "✗".red(),
                status.tool.display_name(),
                "not installed".dimmed()
            ),
        }
    }
}

pub fn check(app_dir: Option<PathBuf>) -> Result<()> {
    let provisioner = provisioner(app_dir)?;
    print_status(&provisioner);

    if !provisioner.missing().is_empty() {
        println!();
        println!("Run {} to download missing tools.", "vidup deps install".cyan());
    }

    Ok(())
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn report(pb: &ProgressBar, event: StatusEvent) {
    match event {
        StatusEvent::Status(update) => {
            if let Some(progress) = update.progress {
                pb.set_position((progress * 100.0).round() as u64);
            }
            pb.set_message(update.message);
        }
        StatusEvent::Complete => pb.finish_and_clear(),
    }
}

pub fn install(app_dir: Option<PathBuf>, only: Option<String>) -> Result<()> {
    let provisioner = provisioner(app_dir)?;

    if let Some(name) = only {
        let tool: Tool = name.parse()?;
        let pb = progress_bar()?;
        let rt = Runtime::new().context("Failed to create async runtime")?;
        let ok = rt.block_on(provisioner.download_tool(tool, &|event: StatusEvent| report(&pb, event)));
        pb.finish_and_clear();

        if !ok {
            anyhow::bail!("{} could not be installed (see log above)", tool.display_name());
        }
        println!("{} {} installed", "✓".green(), tool.display_name());
        return Ok(());
    }

    let pb = progress_bar()?;
    let sink = pb.clone();
    match provisioner.ensure_dependencies(move |event| report(&sink, event)) {
        Some(worker) => {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("Download worker panicked"))?;
        }
        None => {
            println!("{} All tools are already installed.", "✓".green());
            return Ok(());
        }
    }

    println!();
    print_status(&provisioner);

    let missing = provisioner.missing();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(Tool::display_name).collect();
        anyhow::bail!("Could not install: {}", names.join(", "));
    }

    Ok(())
}
