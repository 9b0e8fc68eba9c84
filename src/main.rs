use anyhow::Result;
use tracing::info;

use strings_catalog::config::Config;

fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strings_catalog=info".parse()?),
        )
        .init();

    info!("Opening string catalog");

    let config = Config::from_env()?;
    let catalog = config.open_catalog()?;

    let stats = catalog.stats()?;
    info!(
        projects = stats.projects,
        expressions = stats.expressions,
        translations = stats.translations,
        "Catalog opened"
    );

    let locales = catalog.locale_identifiers()?;
    if locales.is_empty() {
        info!("Catalog has no translations yet");
    } else {
        info!("Locale coverage: {}", locales.join(", "));
    }

    Ok(())
}
