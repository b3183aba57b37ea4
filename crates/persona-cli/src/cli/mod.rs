//! CLI command definitions for the `persona` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a verb-noun
//! pattern (e.g., `persona create bot`, `persona list bots`).

pub mod analyze;
pub mod backup;
pub mod bot;
pub mod edit;
pub mod transfer;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use persona_core::personality::template::Template;
use persona_core::repository::registry::RegistryStore;
use persona_core::service::editor::{checked_score, parse_factor};
use persona_core::service::registry::BotRegistry;
use persona_core::service::transfer::TransferFormat;
use persona_types::error::RegistryError;
use persona_types::personality::{Factor, Score};

/// Manage 16PF personalities for your chatbots.
#[derive(Parser)]
#[command(name = "persona", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory (default: ~/.persona).
    #[arg(long, global = true, env = "PERSONA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new resource.
    Create {
        #[command(subcommand)]
        resource: CreateResource,
    },

    /// List resources.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Show a bot's personality profile.
    Show {
        /// Bot id or slug.
        bot: String,
    },

    /// Delete a resource.
    #[command(alias = "rm")]
    Delete {
        #[command(subcommand)]
        resource: DeleteResource,
    },

    /// Change a bot's display name (the slug is kept).
    Rename {
        /// Bot id or slug.
        bot: String,

        /// New display name.
        name: String,
    },

    /// Clone an existing bot's personality into a new bot.
    Clone {
        #[command(subcommand)]
        resource: CloneResource,
    },

    /// Remove every bot from the registry.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Set one personality factor (by code like `Q3` or name like `warmth`).
    Set {
        /// Bot id or slug.
        bot: String,

        /// Factor code or name.
        factor: String,

        /// Sten score, 1-10.
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },

    /// Edit a bot's factors interactively.
    Edit {
        /// Bot id or slug.
        bot: String,
    },

    /// Personality templates.
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },

    /// Give a bot a random personality.
    Randomize {
        /// Bot id or slug.
        bot: String,
    },

    /// Analyze a bot's personality.
    Analyze {
        /// Bot id or slug.
        bot: String,
    },

    /// Score how compatible two bots are.
    Compare {
        /// First bot id or slug.
        a: String,

        /// Second bot id or slug.
        b: String,
    },

    /// Find bots with a similar personality.
    Similar {
        /// Bot id or slug.
        bot: String,

        /// Minimum similarity, 0.0-1.0.
        #[arg(long, default_value = "0.8", value_parser = parse_threshold)]
        threshold: f64,
    },

    /// Show the changes that would turn a bot into a template.
    Suggest {
        /// Bot id or slug.
        bot: String,

        /// Target template.
        #[arg(value_parser = parse_template)]
        template: Template,
    },

    /// Registry-wide statistics.
    Stats,

    /// Export all bots to a file.
    Export {
        /// Output file.
        path: PathBuf,

        /// File format (default: from the extension, else json).
        #[arg(long, value_parser = parse_format)]
        format: Option<TransferFormat>,
    },

    /// Import bots from a file as new bots.
    Import {
        /// Input file.
        path: PathBuf,

        /// File format (default: from the extension).
        #[arg(long, value_parser = parse_format)]
        format: Option<TransferFormat>,
    },

    /// Registry backups.
    Backup {
        #[command(subcommand)]
        action: BackupCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CreateResource {
    /// Create a new bot.
    Bot {
        /// Bot name (prompted if omitted).
        #[arg(long)]
        name: Option<String>,

        /// Start from a template instead of the configured default.
        #[arg(long, value_parser = parse_template, conflicts_with = "random")]
        template: Option<Template>,

        /// Start from a random personality.
        #[arg(long)]
        random: bool,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List all bots.
    Bots {
        /// Only bots scoring at least V on factor F (repeatable, e.g. `--min A=7`).
        #[arg(long = "min", value_name = "F=V", value_parser = parse_minimum)]
        minimums: Vec<(Factor, Score)>,
    },
}

#[derive(Subcommand)]
pub enum DeleteResource {
    /// Delete a bot permanently.
    Bot {
        /// Bot id or slug.
        bot: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum CloneResource {
    /// Clone an existing bot.
    Bot {
        /// Bot id or slug.
        bot: String,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List available templates.
    List,

    /// Overwrite a bot's personality with a template.
    Apply {
        /// Bot id or slug.
        bot: String,

        #[arg(value_parser = parse_template)]
        template: Template,
    },
}

#[derive(Subcommand)]
pub enum BackupCommand {
    /// List registry backups, newest first.
    List,

    /// Replace the registry with a backup.
    Restore {
        /// Backup file name (from `backup list`).
        name: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

fn parse_template(s: &str) -> Result<Template, String> {
    s.parse()
}

fn parse_format(s: &str) -> Result<TransferFormat, String> {
    s.parse()
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0.0 and 1.0, got {value}"))
    }
}

/// Parse `F=V` where F is a factor code or name.
fn parse_minimum(s: &str) -> Result<(Factor, Score), String> {
    let (factor, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FACTOR=VALUE, got '{s}'"))?;
    let factor = parse_factor(factor).map_err(|e| e.to_string())?;
    let value: i64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an integer", value.trim()))?;
    let score = checked_score(factor, value).map_err(|e| e.to_string())?;
    Ok((factor, score))
}

/// A cyan spinner in the same style across commands.
pub(crate) fn spinner(message: impl Into<String>) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

/// A ten-cell bar for a sten score.
pub(crate) fn score_bar(score: Score) -> String {
    let filled = usize::from(score.value());
    format!("{}{}", "█".repeat(filled), "░".repeat(usize::from(Score::MAX) - filled))
}

/// Keep offering to re-save after a `WriteError` until the save succeeds or
/// `ask` declines. Any other error is returned as is.
///
/// The registry stays dirty in memory between attempts, so nothing the user
/// changed is lost while they fix the disk.
pub(crate) async fn retry_failed_save<S: RegistryStore>(
    registry: &mut BotRegistry<S>,
    mut err: RegistryError,
    mut ask: impl FnMut(&RegistryError) -> anyhow::Result<bool>,
) -> anyhow::Result<()> {
    loop {
        if !matches!(err, RegistryError::WriteError(_)) || !ask(&err)? {
            return Err(err.into());
        }
        match registry.flush().await {
            Ok(()) => return Ok(()),
            Err(next) => {
                tracing::warn!(error = %next, "retry of registry save failed");
                err = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use persona_types::bot::CreateBotRequest;
    use persona_types::error::StoreError;
    use persona_types::registry::Registry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fails the next `failures` saves, then behaves.
    #[derive(Clone, Default)]
    struct FlakyStore {
        failures: Arc<AtomicUsize>,
        saved: Arc<Mutex<Option<Registry>>>,
    }

    impl RegistryStore for FlakyStore {
        async fn load(&self) -> Result<Registry, StoreError> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
        }

        async fn save(&self, registry: &Registry) -> Result<(), StoreError> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(StoreError::Write("disk full".to_string()));
            }
            *self.saved.lock().unwrap() = Some(registry.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_edit_is_saved_on_retry() {
        let store = FlakyStore::default();
        let mut registry = BotRegistry::open(store.clone()).await.unwrap();
        let bot = registry.create(CreateBotRequest::named("Aria")).await.unwrap();

        store.failures.store(2, Ordering::SeqCst);
        let err = registry
            .set_factors(&bot.id, &[(Factor::A, 9), (Factor::Q4, 2)])
            .await
            .unwrap_err();
        assert!(registry.is_dirty());

        let mut asked = 0;
        retry_failed_save(&mut registry, err, |_| {
            asked += 1;
            Ok(true)
        })
        .await
        .unwrap();

        assert_eq!(asked, 2);
        assert!(!registry.is_dirty());
        let saved = store.saved.lock().unwrap().clone().unwrap();
        let saved_bot = saved.get(&bot.id).unwrap();
        assert_eq!(saved_bot.personality[Factor::A].value(), 9);
        assert_eq!(saved_bot.personality[Factor::Q4].value(), 2);
    }

    #[tokio::test]
    async fn declined_retry_keeps_edit_in_memory() {
        let store = FlakyStore::default();
        let mut registry = BotRegistry::open(store.clone()).await.unwrap();
        let bot = registry.create(CreateBotRequest::named("Aria")).await.unwrap();

        store.failures.store(1, Ordering::SeqCst);
        let err = registry.set_factors(&bot.id, &[(Factor::A, 9)]).await.unwrap_err();
        let result = retry_failed_save(&mut registry, err, |_| Ok(false)).await;

        assert!(result.is_err());
        assert!(registry.is_dirty());
        assert_eq!(registry.get(&bot.id).unwrap().personality[Factor::A].value(), 9);
    }

    #[tokio::test]
    async fn non_write_errors_are_not_retried() {
        let mut registry = BotRegistry::open(FlakyStore::default()).await.unwrap();
        let err = RegistryError::BotNotFound("ghost".to_string());
        let result = retry_failed_save(&mut registry, err, |_| panic!("should not ask")).await;
        assert!(result.is_err());
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_minimum_accepts_codes_and_names() {
        assert_eq!(
            parse_minimum("A=7").unwrap(),
            (Factor::A, Score::new(7).unwrap())
        );
        assert_eq!(
            parse_minimum("warmth = 3").unwrap(),
            (Factor::A, Score::new(3).unwrap())
        );
        assert!(parse_minimum("A7").is_err());
        assert!(parse_minimum("Charisma=5").is_err());
        assert!(parse_minimum("A=11").is_err());
    }

    #[test]
    fn parse_threshold_range() {
        assert_eq!(parse_threshold("0.5").unwrap(), 0.5);
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn score_bar_width() {
        assert_eq!(score_bar(Score::new(3).unwrap()), "███░░░░░░░");
        assert_eq!(score_bar(Score::new(10).unwrap()).chars().count(), 10);
    }

    #[test]
    fn parses_set_command() {
        let cli = Cli::try_parse_from(["persona", "set", "aria", "warmth", "8"]).unwrap();
        match cli.command {
            Commands::Set { bot, factor, value } => {
                assert_eq!(bot, "aria");
                assert_eq!(factor, "warmth");
                assert_eq!(value, 8);
            }
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn create_rejects_template_with_random() {
        let result = Cli::try_parse_from([
            "persona", "create", "bot", "--template", "leader", "--random",
        ]);
        assert!(result.is_err());
    }
}
