//! Cache settings commands

use colored::Colorize;
use iocscout::cache::CacheSettings;
use iocscout::error::{Error, Result};

use crate::cli::{CommandContext, OutputFormat};
use crate::output::{json, pretty, table};

/// Show current cache settings
pub async fn show(ctx: &CommandContext) -> Result<()> {
    let settings = ctx.open_cache()?.get_settings().await;
    print_settings(ctx.format, &settings)
}

/// Update retention and/or the enabled flag
pub async fn set(
    ctx: &CommandContext,
    retention_days: Option<u32>,
    enabled: Option<bool>,
) -> Result<()> {
    if retention_days.is_none() && enabled.is_none() {
        return Err(Error::Other(
            "Nothing to change: pass --retention-days and/or --enabled".to_string(),
        ));
    }

    let cache = ctx.open_cache()?;
    let mut settings = cache.get_settings().await;
    if let Some(days) = retention_days {
        settings.retention_days = days;
    }
    if let Some(enabled) = enabled {
        settings.enabled = enabled;
    }

    cache.save_settings(&settings).await?;

    if ctx.format != OutputFormat::Json {
        println!("{} Cache settings updated", "✓".green());
    }
    print_settings(ctx.format, &settings)
}

fn print_settings(format: OutputFormat, settings: &CacheSettings) -> Result<()> {
    let fields = [
        ("Retention", format!("{} days", settings.retention_days)),
        ("Enabled", settings.enabled.to_string()),
    ];
    match format {
        OutputFormat::Json => println!("{}", json::format_json(settings)?),
        OutputFormat::Table => println!("{}", table::format_record(&fields)),
        OutputFormat::Pretty => println!("{}", pretty::format_fields("Cache Settings", &fields)),
    }
    Ok(())
}
