//! Personality editing commands: set, edit, template, randomize.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::{Confirm, Input, Select};

use persona_core::personality::template::Template;
use persona_core::service::editor::parse_factor;
use persona_types::bot::Bot;
use persona_types::error::RegistryError;
use persona_types::personality::{Factor, Score};

use crate::cli::bot::factor_table;
use crate::cli::retry_failed_save;
use crate::state::AppState;

/// Set a single factor from the command line.
pub async fn set_factor(
    state: &mut AppState,
    reference: &str,
    factor_name: &str,
    value: i64,
    json: bool,
) -> Result<()> {
    let id = state.registry.resolve(reference)?.id.clone();
    let factor = parse_factor(factor_name)?;
    let score = state.registry.set_factor(&id, factor.code(), value).await?;
    let bot = state.registry.get(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(bot)?);
        return Ok(());
    }

    println!(
        "  {} {} {} = {} ({})",
        style("✓").green().bold(),
        style(&bot.name).cyan(),
        factor.name(),
        style(score).bold(),
        score.band().describe(factor)
    );

    Ok(())
}

/// Interactive editor: pick a factor, enter a score, repeat, then save all
/// changes together.
pub async fn edit_interactive(state: &mut AppState, reference: &str, json: bool) -> Result<()> {
    let bot = state.registry.resolve(reference)?.clone();
    let mut draft = bot.personality;

    loop {
        let mut items: Vec<String> = draft
            .iter()
            .map(|(factor, score)| {
                let marker = if score == bot.personality[factor] { " " } else { "*" };
                format!(
                    "{marker} {:<3} {:<20} {:>2}  {}",
                    factor.code(),
                    factor.name(),
                    score,
                    score.band().describe(factor)
                )
            })
            .collect();
        items.push("Save and exit".to_string());
        items.push("Discard changes".to_string());

        let choice = Select::new()
            .with_prompt(format!("Editing {} (select a factor)", bot.name))
            .items(&items)
            .default(0)
            .interact()?;

        if choice == Factor::COUNT {
            break;
        }
        if choice == Factor::COUNT + 1 {
            println!("  Cancelled.");
            return Ok(());
        }

        let factor = Factor::ALL[choice];
        let value: i64 = Input::new()
            .with_prompt(format!(
                "{} ({} 1 .. 10 {})",
                factor.name(),
                factor.low_pole(),
                factor.high_pole()
            ))
            .default(i64::from(draft[factor].value()))
            .validate_with(|v: &i64| -> Result<(), String> {
                Score::new(*v).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;
        draft.set(factor, Score::clamped(value));
    }

    let edits: Vec<(Factor, i64)> = draft
        .iter()
        .filter(|&(factor, score)| score != bot.personality[factor])
        .map(|(factor, score)| (factor, i64::from(score.value())))
        .collect();

    if edits.is_empty() {
        println!("  {} No changes.", style("i").blue().bold());
        return Ok(());
    }

    let updated = match state.registry.set_factors(&bot.id, &edits).await {
        Ok(updated) => updated,
        Err(err) => {
            retry_failed_save(&mut state.registry, err, confirm_retry).await?;
            state.registry.get(&bot.id)?.clone()
        }
    };
    print_updated(&updated, &format!("{} factor(s) updated", edits.len()), json)
}

fn confirm_retry(err: &RegistryError) -> Result<bool> {
    eprintln!("  {} {err}", style("✗").red().bold());
    Ok(Confirm::new()
        .with_prompt("Your edits are still in memory. Retry saving?")
        .default(true)
        .interact()?)
}

/// Print the template catalogue.
pub fn list_templates(json: bool) -> Result<()> {
    if json {
        let templates: Vec<_> = Template::ALL
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t,
                    "summary": t.summary(),
                    "personality": t.personality(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Template").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
        Cell::new("Raised / lowered").fg(Color::White),
    ]);

    for template in Template::ALL {
        let moved: Vec<String> = template
            .personality()
            .iter()
            .filter(|(_, score)| *score != Score::MIDPOINT)
            .map(|(factor, score)| format!("{factor}={score}"))
            .collect();
        table.add_row(vec![
            Cell::new(template).fg(Color::Cyan),
            Cell::new(template.summary()),
            Cell::new(moved.join(" ")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn apply_template(
    state: &mut AppState,
    reference: &str,
    template: Template,
    json: bool,
) -> Result<()> {
    let id = state.registry.resolve(reference)?.id.clone();
    let bot = state.registry.apply_template(&id, template).await?;
    print_updated(&bot, &format!("Applied template '{template}'"), json)
}

pub async fn randomize(state: &mut AppState, reference: &str, json: bool) -> Result<()> {
    let id = state.registry.resolve(reference)?.id.clone();
    let bot = state.registry.randomize(&id, &mut rand::thread_rng()).await?;
    print_updated(&bot, "Randomized personality", json)
}

fn print_updated(bot: &Bot, message: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bot)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} for {}",
        style("✓").green().bold(),
        message,
        style(&bot.name).cyan()
    );
    println!("{}", factor_table(bot));
    println!();
    Ok(())
}
