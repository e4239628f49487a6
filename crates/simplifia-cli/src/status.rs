//! `simplifia status` — show configuration and provider credential status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use simplifia_core::config::{get_config_path, load_config};
use simplifia_providers::registry::PROVIDERS;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "💡 SimplifIA Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using env)".dimmed().to_string()
        }
    );
    println!(
        "  {:<18} {}",
        "Listen:".bold(),
        config.server.bind_address()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let provider = config.providers.get_by_name(spec.name).cloned().unwrap_or_default();
        let model = provider.model.as_deref().unwrap_or(spec.default_model);
        let key_status = if provider.is_configured() {
            "✓ key set".green().to_string()
        } else {
            format!("✗ {} not set", spec.env_key).red().to_string()
        };
        println!(
            "    {:<12} {:<28} {}",
            spec.display_name,
            model.dimmed(),
            key_status
        );
    }
    println!();

    Ok(())
}
