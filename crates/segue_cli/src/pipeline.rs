//! Shared setup for CLI commands: configuration lookup, logging and the
//! composition of the content and validation services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use segue_cache::{ContentManager, IndexManager};
use segue_config::{LogFormat, SegueConfig, CONFIG_FILE_NAME};
use segue_content::ContentDeserializer;
use segue_search::MemorySearchIndex;
use segue_store::DirectoryVersionStore;
use segue_validate::{HttpChemistryChecker, ValidatorSet};
use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `segue.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads the configuration and returns it with the directory relative paths
/// in it are resolved against.
///
/// `--config` may name the file or its directory. Without it the nearest
/// `segue.toml` above the current directory is used, and failing that the
/// defaults.
pub fn load_settings(
    global: &GlobalArgs,
) -> Result<(SegueConfig, PathBuf), Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            let config = segue_config::load_config_from_str(&text)?;
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok((config, dir));
        }
        return Ok((segue_config::load_config(&path)?, path));
    }

    let cwd = std::env::current_dir()?;
    match find_project_root(&cwd) {
        Some(root) => Ok((segue_config::load_config(&root)?, root)),
        None => Ok((SegueConfig::default(), cwd)),
    }
}

/// Picks the log filter: `RUST_LOG` first, then `--quiet` / `--verbose`,
/// then the configured level.
pub fn log_directive(config: &SegueConfig, global: &GlobalArgs) -> String {
    if global.quiet {
        "error".to_string()
    } else if global.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Installs the global tracing subscriber. Logs go to stderr so that
/// command output on stdout stays machine readable.
pub fn init_logging(config: &SegueConfig, global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(config, global)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match config.logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        eprintln!("warning: logging already initialised: {e}");
    }
}

/// The services every command works through.
pub struct Services {
    /// Version caches and content queries.
    pub manager: Arc<ContentManager>,
    /// Answer validators.
    pub validators: ValidatorSet,
    /// Where version aliases are persisted.
    pub aliases_file: PathBuf,
    /// Alias tracking the newest version.
    pub latest_alias: String,
}

impl Services {
    /// Builds the services from configuration, resolving relative paths
    /// against `root`.
    pub fn from_config(
        config: &SegueConfig,
        root: &Path,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let store = DirectoryVersionStore::new(root.join(&config.content.store));
        let manager = Arc::new(ContentManager::new(
            Arc::new(store),
            Arc::new(MemorySearchIndex::new()),
            ContentDeserializer::default(),
        ));
        let checker = HttpChemistryChecker::new(&config.chemistry_checker)?;
        let validators = ValidatorSet::new(
            config.validation.default_significant_figures,
            Arc::new(checker),
        );
        Ok(Self {
            manager,
            validators,
            aliases_file: root.join(&config.content.aliases_file),
            latest_alias: config.content.latest_alias.clone(),
        })
    }

    /// Opens the alias manager over this service's content manager.
    pub fn index_manager(&self) -> Result<IndexManager, Box<dyn std::error::Error>> {
        Ok(IndexManager::load(
            Arc::clone(&self.manager),
            &self.aliases_file,
            self.latest_alias.as_str(),
        )?)
    }

    /// Resolves a version argument that may be an alias.
    pub fn resolve_version(&self, version: &str) -> Result<String, Box<dyn std::error::Error>> {
        if self.manager.is_valid_version(version) {
            return Ok(version.to_string());
        }
        match self.index_manager()?.named_version(version) {
            Some(resolved) => Ok(resolved),
            None => Err(format!("unknown content version or alias '{version}'").into()),
        }
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
