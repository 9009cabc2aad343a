use ansi_app::{app, cli};
use ansi_core::config::Settings;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config
    let settings = resolve_settings(&cli)?;

    // 4. Convertir (une fois, ou en continu avec --watch)
    if cli.watch {
        app::run_watch(&cli, settings)
    } else {
        app::run_once(&cli, &settings)
    }
}

/// Load the config file if present, defaults otherwise.
fn resolve_settings(cli: &cli::Cli) -> Result<Settings> {
    if cli.config.exists() {
        ansi_core::config::load_config(&cli.config)
    } else if cli.watch {
        anyhow::bail!(
            "--watch requiert un fichier de config existant : {}",
            cli.config.display()
        );
    } else {
        log::debug!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(Settings::default())
    }
}
