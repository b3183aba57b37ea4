//! Import and export commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use persona_core::service::transfer::{self, TransferFormat};

use crate::cli::spinner;
use crate::state::AppState;

/// Explicit flag, else the file extension.
fn resolve_format(path: &Path, format: Option<TransferFormat>) -> Option<TransferFormat> {
    format.or_else(|| TransferFormat::from_path(path))
}

/// Write every bot to `path`.
pub async fn export_bots(
    state: &AppState,
    path: &Path,
    format: Option<TransferFormat>,
    json: bool,
) -> Result<()> {
    let format = resolve_format(path, format).unwrap_or(TransferFormat::Json);
    let bots = state.registry.list();
    let content = transfer::export(bots, format)?;

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exported": bots.len(),
                "format": format,
                "path": path.display().to_string(),
            })
        );
    } else {
        println!(
            "  {} Exported {} bot(s) as {} to {}",
            style("✓").green().bold(),
            bots.len(),
            format,
            style(path.display()).cyan()
        );
    }

    Ok(())
}

/// Read `path` and add every entry as a new bot. Nothing is added unless
/// the whole file is valid.
pub async fn import_bots(
    state: &mut AppState,
    path: &Path,
    format: Option<TransferFormat>,
    json: bool,
) -> Result<()> {
    let format = resolve_format(path, format).with_context(|| {
        format!(
            "cannot tell the format of {}; pass --format json or --format csv",
            path.display()
        )
    })?;

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let progress = if json {
        None
    } else {
        Some(spinner(format!("Importing {}...", path.display()))?)
    };

    let result = async {
        let entries = transfer::import(&text, format)?;
        state.registry.import_bots(entries).await
    }
    .await;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let created = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    println!(
        "  {} Imported {} bot(s) from {}",
        style("✓").green().bold(),
        created.len(),
        style(path.display()).cyan()
    );
    for bot in &created {
        println!("    {} {} ({})", style("•").dim(), bot.name, style(&bot.slug).dim());
    }

    Ok(())
}
