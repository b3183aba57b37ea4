//! Application state wiring the registry to the JSON store.

use std::path::PathBuf;

use persona_core::personality::template::Template;
use persona_core::service::registry::BotRegistry;
use persona_infra::config::load_global_config;
use persona_infra::filesystem::resolve_data_dir;
use persona_infra::store::JsonRegistryStore;
use persona_types::config::GlobalConfig;

/// The registry pinned to the concrete file store.
pub type ConcreteRegistry = BotRegistry<JsonRegistryStore>;

pub struct AppState {
    pub registry: ConcreteRegistry,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load config, and open the registry.
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
        tracing::debug!(data_dir = %data_dir.display(), "using data directory");

        let config = load_global_config(&data_dir).await;
        let default_template = default_template(&config);

        let store = JsonRegistryStore::new(data_dir.clone(), config.storage.clone());
        let registry = BotRegistry::open(store)
            .await?
            .with_default_personality(default_template.personality());

        Ok(Self {
            registry,
            config,
            data_dir,
        })
    }
}

/// The configured default template, or neutral if it names no template.
fn default_template(config: &GlobalConfig) -> Template {
    let name = &config.personality.default_template;
    name.parse().unwrap_or_else(|err| {
        tracing::warn!("{err} in config.toml, falling back to neutral");
        Template::Neutral
    })
}
