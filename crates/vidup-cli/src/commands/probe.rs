//! Probe command - check OpenRouter connectivity.

use super::load_config;
use anyhow::{Context, Result};
use colored::Colorize;
use tokio::runtime::Runtime;
use vidup_openrouter::{truncate_body, HeaderSet, OpenRouterClient};

/// Characters of each response body shown.
const BODY_PREVIEW: usize = 500;

pub fn run(api_key: Option<String>, model: Option<String>) -> Result<()> {
    let config = load_config()?;

    let api_key = api_key
        .or_else(|| config.openrouter.api_key.clone())
        .unwrap_or_default();

    let mut client = OpenRouterClient::from_config(&config.openrouter, api_key)
        .context("Failed to create OpenRouter client")?;
    if let Some(model) = model {
        client = client.with_model(model);
    }

    println!(
        "{} {} ({})",
        "Probing:".cyan().bold(),
        config.openrouter.base_url,
        client.model()
    );

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let report = rt.block_on(client.probe())?;

    for (i, attempt) in report.attempts.iter().enumerate() {
        let headers = match attempt.headers {
            HeaderSet::Full => "full headers",
            HeaderSet::Minimal => "minimal headers",
        };
        let status = if attempt.is_success() {
            attempt.status.to_string().green()
        } else {
            attempt.status.to_string().red()
        };

        println!();
        println!("Attempt {} ({}): status {}", i + 1, headers, status);
        println!("{}", truncate_body(&attempt.body, BODY_PREVIEW).dimmed());
    }

    println!();
    if !report.succeeded() {
        anyhow::bail!("OpenRouter rejected the request after {} attempts", report.attempts.len());
    }

    match report.reply() {
        Some(reply) => println!("{} {}", "Reply:".green().bold(), reply.trim()),
        None => println!("{} request accepted", "✓".green()),
    }

    Ok(())
}
