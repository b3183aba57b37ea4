//! Persona CLI entry point.
//!
//! Binary name: `persona`
//!
//! Parses CLI arguments, opens the registry in the data directory, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{
    BackupCommand, Cli, CloneResource, Commands, CreateResource, DeleteResource, ListResource,
    TemplateCommand,
};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,persona=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions and template listing don't need the registry
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "persona", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Template {
            action: TemplateCommand::List,
        } => {
            return cli::edit::list_templates(cli.json);
        }
        _ => {}
    }

    let mut state = AppState::init(cli.data_dir.clone()).await?;
    let json = cli.json;

    match cli.command {
        Commands::Create { resource } => match resource {
            CreateResource::Bot {
                name,
                template,
                random,
            } => {
                cli::bot::create_bot(&mut state, name, template, random, json).await?;
            }
        },

        Commands::List { resource } => match resource {
            ListResource::Bots { minimums } => {
                cli::bot::list_bots(&state, &minimums, json)?;
            }
        },

        Commands::Show { bot } => {
            cli::bot::show_bot(&state, &bot, json)?;
        }

        Commands::Delete { resource } => match resource {
            DeleteResource::Bot { bot, force } => {
                cli::bot::delete_bot(&mut state, &bot, force, json).await?;
            }
        },

        Commands::Rename { bot, name } => {
            cli::bot::rename_bot(&mut state, &bot, &name, json).await?;
        }

        Commands::Clone { resource } => match resource {
            CloneResource::Bot { bot } => {
                cli::bot::clone_bot(&mut state, &bot, json).await?;
            }
        },

        Commands::Clear { force } => {
            cli::bot::clear_bots(&mut state, force, json).await?;
        }

        Commands::Set { bot, factor, value } => {
            cli::edit::set_factor(&mut state, &bot, &factor, value, json).await?;
        }

        Commands::Edit { bot } => {
            cli::edit::edit_interactive(&mut state, &bot, json).await?;
        }

        Commands::Template { action } => match action {
            TemplateCommand::Apply { bot, template } => {
                cli::edit::apply_template(&mut state, &bot, template, json).await?;
            }
            TemplateCommand::List => unreachable!("handled above"),
        },

        Commands::Randomize { bot } => {
            cli::edit::randomize(&mut state, &bot, json).await?;
        }

        Commands::Analyze { bot } => {
            cli::analyze::analyze_bot(&state, &bot, json)?;
        }

        Commands::Compare { a, b } => {
            cli::analyze::compare_bots(&state, &a, &b, json)?;
        }

        Commands::Similar { bot, threshold } => {
            cli::analyze::similar_bots(&state, &bot, threshold, json)?;
        }

        Commands::Suggest { bot, template } => {
            cli::analyze::suggest(&state, &bot, template, json)?;
        }

        Commands::Stats => {
            cli::analyze::stats(&state, json)?;
        }

        Commands::Export { path, format } => {
            cli::transfer::export_bots(&state, &path, format, json).await?;
        }

        Commands::Import { path, format } => {
            cli::transfer::import_bots(&mut state, &path, format, json).await?;
        }

        Commands::Backup { action } => match action {
            BackupCommand::List => {
                cli::backup::list_backups(&state, json).await?;
            }
            BackupCommand::Restore { name, force } => {
                cli::backup::restore_backup(&mut state, &name, force, json).await?;
            }
        },

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
