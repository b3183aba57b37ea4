//! Bot lifecycle CLI commands: create, list, show, delete, rename, clone, clear.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::{Confirm, Input};

use persona_core::personality::random_personality;
use persona_core::personality::template::Template;
use persona_types::bot::{Bot, CreateBotRequest};
use persona_types::personality::{Band, Factor, Score};

use crate::cli::score_bar;
use crate::state::AppState;

/// Create a new bot, prompting for the name if it was not given.
///
/// # Examples
///
/// ```bash
/// persona create bot --name "Aria"
/// persona create bot --name "Rex" --template leader
/// persona create bot --name "Wildcard" --random
/// ```
pub async fn create_bot(
    state: &mut AppState,
    name: Option<String>,
    template: Option<Template>,
    random: bool,
    json: bool,
) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Bot name")
            .interact_text()?,
    };

    let mut request = CreateBotRequest::named(name);
    if random {
        request = request.with_personality(random_personality(&mut rand::thread_rng()));
    } else if let Some(template) = template {
        request = request.with_personality(template.personality());
    }

    let bot = state.registry.create(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bot)?);
        return Ok(());
    }

    println!();
    println!("  {} Bot created successfully!", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&bot.name).cyan());
    println!("  {}  {}", style("Slug:").bold(), &bot.slug);
    println!(
        "  {}    {}",
        style("ID:").bold(),
        style(bot.id.to_string()).dim()
    );
    println!();
    println!(
        "  Tune it: {}",
        style(format!("persona edit {}", bot.slug)).yellow()
    );
    println!();

    Ok(())
}

/// List bots in a table, optionally filtered by minimum factor scores.
pub fn list_bots(state: &AppState, minimums: &[(Factor, Score)], json: bool) -> Result<()> {
    let bots = state.registry.find_by_traits(minimums);

    if json {
        println!("{}", serde_json::to_string_pretty(&bots)?);
        return Ok(());
    }

    if bots.is_empty() {
        println!();
        if minimums.is_empty() {
            println!(
                "  {} No bots found. Create one with: {}",
                style("i").blue().bold(),
                style("persona create bot").yellow()
            );
        } else {
            println!("  {} No bots match those minimums.", style("i").blue().bold());
        }
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Slug").fg(Color::White),
    ];
    header.extend(Factor::ALL.iter().map(|f| Cell::new(f.code()).fg(Color::White)));
    table.set_header(header);

    for bot in &bots {
        let mut row = vec![
            Cell::new(&bot.name).fg(Color::Cyan),
            Cell::new(&bot.slug).fg(Color::White),
        ];
        row.extend(bot.personality.iter().map(|(_, score)| score_cell(score)));
        table.add_row(row);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} bot{}",
        style(bots.len()).bold(),
        if bots.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show one bot's full factor profile.
pub fn show_bot(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let bot = state.registry.resolve(reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(bot)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&bot.name).cyan().bold());
    println!();
    println!("  {}", style("── Details ──").dim());
    println!("  {}       {}", style("Slug:").bold(), &bot.slug);
    println!(
        "  {}         {}",
        style("ID:").bold(),
        style(bot.id.to_string()).dim()
    );
    println!(
        "  {}    {}",
        style("Created:").bold(),
        bot.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  {}    {}",
        style("Updated:").bold(),
        bot.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();
    println!("  {}", style("── Personality ──").dim());
    println!("{}", factor_table(bot));
    println!();

    Ok(())
}

/// Delete a bot permanently with confirmation.
pub async fn delete_bot(
    state: &mut AppState,
    reference: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let bot = state.registry.resolve(reference)?.clone();

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete bot '{}'?",
                style(&bot.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.registry.delete(&bot.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": bot.id, "slug": bot.slug})
        );
    } else {
        println!("  {} Bot '{}' deleted.", style("✓").red().bold(), bot.name);
    }

    Ok(())
}

pub async fn rename_bot(
    state: &mut AppState,
    reference: &str,
    name: &str,
    json: bool,
) -> Result<()> {
    let id = state.registry.resolve(reference)?.id.clone();
    let old_name = state.registry.get(&id)?.name.clone();
    let bot = state.registry.rename(&id, name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bot)?);
    } else {
        println!(
            "  {} Renamed '{}' to '{}'",
            style("✓").green().bold(),
            old_name,
            style(&bot.name).cyan()
        );
    }

    Ok(())
}

/// Clone a bot's personality under a new identity.
pub async fn clone_bot(state: &mut AppState, reference: &str, json: bool) -> Result<()> {
    let source = state.registry.resolve(reference)?.clone();
    let cloned = state.registry.clone_bot(&source.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cloned)?);
    } else {
        println!(
            "  {} Cloned '{}' as '{}'",
            style("✓").green().bold(),
            source.name,
            style(&cloned.name).cyan()
        );
        println!("  New slug: {}", style(&cloned.slug).bold());
    }

    Ok(())
}

/// Remove every bot after confirmation.
pub async fn clear_bots(state: &mut AppState, force: bool, json: bool) -> Result<()> {
    let count = state.registry.list().len();

    if !force && !json && count > 0 {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} bots? A backup of the current registry is kept.",
                style(count).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = state.registry.clear().await?;

    if json {
        println!("{}", serde_json::json!({"cleared": removed}));
    } else {
        println!("  {} Removed {} bot(s).", style("✓").red().bold(), removed);
    }

    Ok(())
}

// --- Formatting helpers ---

/// Per-factor table with poles, score bar and band.
pub(crate) fn factor_table(bot: &Bot) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Factor").fg(Color::White),
        Cell::new("Low pole").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("").fg(Color::White),
        Cell::new("High pole").fg(Color::White),
        Cell::new("Band").fg(Color::White),
    ]);

    for (factor, score) in bot.personality.iter() {
        table.add_row(vec![
            Cell::new(format!("{:<3} {}", factor.code(), factor.name())).fg(Color::Cyan),
            Cell::new(factor.low_pole()).fg(Color::DarkGrey),
            score_cell(score),
            Cell::new(score_bar(score)).fg(band_color(score.band())),
            Cell::new(factor.high_pole()).fg(Color::DarkGrey),
            Cell::new(score.band().to_string()),
        ]);
    }

    table
}

fn score_cell(score: Score) -> Cell {
    Cell::new(score.value()).fg(band_color(score.band()))
}

fn band_color(band: Band) -> Color {
    match band {
        Band::VeryLow => Color::Blue,
        Band::Low => Color::Cyan,
        Band::Average => Color::White,
        Band::High => Color::Yellow,
        Band::VeryHigh => Color::Red,
    }
}
