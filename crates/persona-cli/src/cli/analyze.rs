//! Read-only analysis commands: analyze, compare, similar, suggest, stats.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use serde::Serialize;

use persona_core::personality::analysis::{analyze, compatibility, describe, suggest_adjustments};
use persona_core::personality::similarity;
use persona_core::personality::template::Template;
use persona_core::service::stats::registry_stats;

use crate::state::AppState;

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render a value in [-1, 1] as a signed percentage.
fn signed_percent(value: f64) -> String {
    format!("{:+.0}%", value * 100.0)
}

pub fn analyze_bot(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let bot = state.registry.resolve(reference)?;
    let analysis = analyze(&bot.personality);
    let description = describe(&bot.personality);

    if json {
        let out = serde_json::json!({
            "bot": { "id": bot.id, "slug": bot.slug, "name": bot.name },
            "analysis": analysis,
            "description": description,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&bot.name).cyan().bold());
    println!("  {}", style(&description).dim());
    println!();

    println!("  {}", style("── Profile ──").dim());
    println!("  {}          {}", style("Shape:").bold(), analysis.profile);
    println!("  {}    {}", style("Decisions:").bold(), analysis.decision_style);
    println!("  {}       {}", style("Social:").bold(), analysis.social_orientation);
    println!(
        "  {}    {}",
        style("Stability:").bold(),
        signed_percent(analysis.emotional_stability)
    );
    println!(
        "  {} {}",
        style("Adaptability:").bold(),
        signed_percent(analysis.adaptability)
    );
    println!();

    println!("  {}", style("── Dominant traits ──").dim());
    if analysis.dominant_traits.is_empty() {
        println!("  {}", style("none").dim());
    }
    for t in &analysis.dominant_traits {
        println!(
            "  {} {:<3} {:<22} {}",
            style("•").dim(),
            t.factor.code(),
            t.label,
            style(t.score).bold()
        );
    }
    println!();

    let mut tendencies = table();
    tendencies.set_header(vec![
        Cell::new("Tendency").fg(Color::White),
        Cell::new("Level").fg(Color::White),
    ]);
    for (name, value) in analysis.tendencies.entries() {
        let color = if value > 0.3 {
            Color::Green
        } else if value < -0.3 {
            Color::Yellow
        } else {
            Color::White
        };
        tendencies.add_row(vec![Cell::new(name), Cell::new(signed_percent(value)).fg(color)]);
    }
    println!("{tendencies}");
    println!();

    println!("  {}", style("── Closest templates ──").dim());
    for affinity in analysis.template_affinity.iter().take(3) {
        println!(
            "  {} {:<12} {:.0}%",
            style("•").dim(),
            affinity.template,
            affinity.affinity * 100.0
        );
    }
    println!();

    Ok(())
}

pub fn compare_bots(state: &AppState, a: &str, b: &str, json: bool) -> Result<()> {
    let first = state.registry.resolve(a)?;
    let second = state.registry.resolve(b)?;
    let score = compatibility(&first.personality, &second.personality);
    let similar = similarity(&first.personality, &second.personality);

    if json {
        let out = serde_json::json!({
            "a": first.slug,
            "b": second.slug,
            "compatibility": score,
            "similarity": similar,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = table();
    table.set_header(vec![
        Cell::new("Factor").fg(Color::White),
        Cell::new(&first.name).fg(Color::Cyan),
        Cell::new(&second.name).fg(Color::Cyan),
        Cell::new("Gap").fg(Color::White),
    ]);
    for ((factor, x), (_, y)) in first.personality.iter().zip(second.personality.iter()) {
        let gap = x.value().abs_diff(y.value());
        let color = match gap {
            0..=1 => Color::Green,
            2..=4 => Color::White,
            _ => Color::Red,
        };
        table.add_row(vec![
            Cell::new(format!("{:<3} {}", factor.code(), factor.name())),
            Cell::new(x.value()),
            Cell::new(y.value()),
            Cell::new(gap).fg(color),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} {:.0}%   {} {:.0}%",
        style("Compatibility:").bold(),
        score * 100.0,
        style("Similarity:").bold(),
        similar * 100.0
    );
    println!();
    Ok(())
}

#[derive(Serialize)]
struct SimilarRow<'a> {
    id: String,
    slug: &'a str,
    name: &'a str,
    similarity: f64,
}

pub fn similar_bots(state: &AppState, reference: &str, threshold: f64, json: bool) -> Result<()> {
    let bot = state.registry.resolve(reference)?;
    let matches = state.registry.similar_to(&bot.id, threshold)?;

    if json {
        let rows: Vec<SimilarRow<'_>> = matches
            .iter()
            .map(|m| SimilarRow {
                id: m.bot.id.to_string(),
                slug: &m.bot.slug,
                name: &m.bot.name,
                similarity: m.similarity,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!();
        println!(
            "  {} No bots at least {:.0}% similar to {}.",
            style("i").blue().bold(),
            threshold * 100.0,
            style(&bot.name).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = table();
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Slug").fg(Color::White),
        Cell::new("Similarity").fg(Color::White),
    ]);
    for m in &matches {
        table.add_row(vec![
            Cell::new(&m.bot.name).fg(Color::Cyan),
            Cell::new(&m.bot.slug),
            Cell::new(format!("{:.1}%", m.similarity * 100.0)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub fn suggest(state: &AppState, reference: &str, template: Template, json: bool) -> Result<()> {
    let bot = state.registry.resolve(reference)?;
    let adjustments = suggest_adjustments(&bot.personality, template);

    if json {
        println!("{}", serde_json::to_string_pretty(&adjustments)?);
        return Ok(());
    }

    if adjustments.is_empty() {
        println!(
            "  {} {} already matches '{}'.",
            style("✓").green().bold(),
            style(&bot.name).cyan(),
            template
        );
        return Ok(());
    }

    println!();
    println!(
        "  To move {} to '{}':",
        style(&bot.name).cyan(),
        style(template).bold()
    );
    for adj in &adjustments {
        let delta = if adj.delta > 0 {
            style(format!("{:+}", adj.delta)).green()
        } else {
            style(format!("{:+}", adj.delta)).yellow()
        };
        println!(
            "  {} {:<3} {:<20} {:>2} -> {:>2}  ({})",
            style("•").dim(),
            adj.factor.code(),
            adj.factor.name(),
            adj.current,
            adj.target,
            delta
        );
    }
    println!();
    println!(
        "  Apply all: {}",
        style(format!("persona template apply {} {}", bot.slug, template)).yellow()
    );
    println!();
    Ok(())
}

pub fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = registry_stats(state.registry.list());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Bots:").bold(), stats.total);
    if stats.total == 0 {
        println!();
        return Ok(());
    }

    let profiles: Vec<String> = stats
        .profiles
        .iter()
        .map(|(profile, count)| format!("{profile} {count}"))
        .collect();
    println!("  {} {}", style("Profiles:").bold(), profiles.join(", "));
    println!();

    let mut table = table();
    table.set_header(vec![
        Cell::new("Factor").fg(Color::White),
        Cell::new("Min").fg(Color::White),
        Cell::new("Mean").fg(Color::White),
        Cell::new("Max").fg(Color::White),
    ]);
    for f in &stats.factors {
        table.add_row(vec![
            Cell::new(format!("{:<3} {}", f.factor.code(), f.factor.name())).fg(Color::Cyan),
            Cell::new(f.min),
            Cell::new(format!("{:.1}", f.mean)),
            Cell::new(f.max),
        ]);
    }
    println!("{table}");
    println!();
    Ok(())
}
