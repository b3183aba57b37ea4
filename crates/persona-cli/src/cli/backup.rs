//! Backup listing and restore.

use anyhow::{Result, bail};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use persona_infra::filesystem::backups_dir;

use crate::state::AppState;

pub async fn list_backups(state: &AppState, json: bool) -> Result<()> {
    let store = state.registry.store();
    let names = store.list_backups().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if names.is_empty() {
        println!();
        println!(
            "  {} No backups yet in {}",
            style("i").blue().bold(),
            style(backups_dir(&state.data_dir).display()).dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Backup").fg(Color::White),
        Cell::new("Bots").fg(Color::White),
    ]);

    for name in &names {
        let bots = match store.read_backup(name).await {
            Ok(Some(registry)) => Cell::new(registry.len()),
            Ok(None) => Cell::new("missing").fg(Color::DarkGrey),
            Err(_) => Cell::new("corrupt").fg(Color::Red),
        };
        table.add_row(vec![Cell::new(name).fg(Color::Cyan), bots]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  Keeping the newest {} (storage.max_backups)",
        style(state.config.storage.max_backups).bold()
    );
    println!();
    Ok(())
}

/// Replace the registry with a backup. The current registry is itself
/// backed up by the save.
pub async fn restore_backup(state: &mut AppState, name: &str, force: bool, json: bool) -> Result<()> {
    let Some(snapshot) = state.registry.store().read_backup(name).await? else {
        bail!("backup '{name}' not found (see `persona backup list`)");
    };

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Replace {} current bot(s) with {} bot(s) from '{}'?",
                state.registry.list().len(),
                snapshot.len(),
                style(name).yellow()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let count = snapshot.len();
    state.registry.replace(snapshot).await?;

    if json {
        println!("{}", serde_json::json!({"restored": name, "bots": count}));
    } else {
        println!(
            "  {} Restored {} bot(s) from {}",
            style("✓").green().bold(),
            count,
            style(name).cyan()
        );
    }
    Ok(())
}
