//! Cache management commands

use colored::Colorize;
use dialoguer::Confirm;
use iocscout::cache::{CacheStatistics, storage::DB_FILE};
use iocscout::error::Result;

use crate::cli::{CommandContext, OutputFormat};
use crate::output::{json, pretty, table};

/// Show cache statistics
pub async fn status(ctx: &CommandContext) -> Result<()> {
    let cache = ctx.open_cache()?;
    let stats = cache.get_statistics().await;
    let settings = cache.get_settings().await;
    let path = cache.store().db_path().display().to_string();

    match ctx.format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "total_entries": stats.total_entries,
                "total_size_bytes": stats.total_size,
                "total_size_human": format_size(stats.total_size),
                "bucket_count": stats.bucket_count,
                "oldest_date": stats.oldest_date,
                "newest_date": stats.newest_date,
                "retention_days": settings.retention_days,
                "enabled": settings.enabled,
                "path": path,
            });
            println!("{}", json::format_json(&data)?);
        }
        OutputFormat::Table => {
            println!("{}", table::format_record(&status_fields(&stats, &path)));
        }
        OutputFormat::Pretty => {
            let mut fields = status_fields(&stats, &path);
            fields.push(("Retention", format!("{} days", settings.retention_days)));
            fields.push(("Enabled", settings.enabled.to_string()));
            println!("{}", pretty::format_fields("Cache Status", &fields));
        }
    }

    Ok(())
}

fn status_fields(stats: &CacheStatistics, path: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Location", path.to_string()),
        ("Entries", stats.total_entries.to_string()),
        ("Day buckets", stats.bucket_count.to_string()),
        ("Total size", format_size(stats.total_size)),
        ("Oldest day", display_date(stats.oldest_date.as_deref())),
        ("Newest day", display_date(stats.newest_date.as_deref())),
    ]
}

/// YYYYMMDD -> YYYY-MM-DD
fn display_date(date: Option<&str>) -> String {
    match date {
        Some(d) if d.len() == 8 => format!("{}-{}-{}", &d[..4], &d[4..6], &d[6..]),
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

/// Clear all cached results, asking first unless `yes`
pub async fn clear(ctx: &CommandContext, yes: bool) -> Result<()> {
    let cache = ctx.open_cache()?;

    if !yes {
        let stats = cache.get_statistics().await;
        eprintln!(
            "{} Remove {} cached results across {} day buckets?",
            "⚠".yellow(),
            stats.total_entries,
            stats.bucket_count
        );

        let confirm = Confirm::new()
            .with_prompt("Confirm clear?")
            .default(false)
            .interact()?;

        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    let removed = cache.clear_all().await?;

    match ctx.format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "buckets_removed": removed,
                "success": true,
            });
            println!("{}", json::format_json(&data)?);
        }
        _ => {
            if removed > 0 {
                println!("{} Cleared {} day buckets", "✓".green(), removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Drop buckets older than the retention window
pub async fn clean(ctx: &CommandContext) -> Result<()> {
    let cache = ctx.open_cache()?;
    let settings = cache.get_settings().await;
    let removed = cache.clean_old_cache().await;

    match ctx.format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "buckets_removed": removed,
                "retention_days": settings.retention_days,
            });
            println!("{}", json::format_json(&data)?);
        }
        _ => println!(
            "Removed {} expired day buckets (retention {} days)",
            removed, settings.retention_days
        ),
    }

    Ok(())
}

/// Print cache database path
pub fn path(ctx: &CommandContext) -> Result<()> {
    println!("{}", ctx.cache_dir()?.join(DB_FILE).display());
    Ok(())
}

/// Format bytes as human-readable size
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
