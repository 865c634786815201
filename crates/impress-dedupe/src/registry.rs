//! Registry of named pipelines
//!
//! The registry provides:
//! - The builtin presets (`title_only`, `id_only`, `id_and_title`)
//! - Loading of user pipelines from config files (loaded > builtin)
//! - Lookup by name

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::config::{ModuleConfig, PipelineConfig};
use crate::error::{DedupeError, Result};
use crate::pipeline::Pipeline;
use crate::similarity::Scorer;

/// Threshold used by the builtin fuzzy title matchers
pub const DEFAULT_TITLE_THRESHOLD: f64 = 90.0;

/// Where a registered pipeline came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineSource {
    /// Compiled into the crate
    Builtin,
    /// Registered at runtime or loaded from a config file
    Loaded,
}

impl PipelineSource {
    /// Resolution priority (higher = takes precedence)
    pub fn priority(&self) -> u8 {
        match self {
            PipelineSource::Builtin => 0,
            PipelineSource::Loaded => 1,
        }
    }
}

fn fuzzy_title() -> ModuleConfig {
    ModuleConfig::Fuzzy {
        field: "title".to_string(),
        threshold: DEFAULT_TITLE_THRESHOLD,
        scorer: Scorer::WeightedRatio,
    }
}

fn unique_id() -> ModuleConfig {
    ModuleConfig::Unique {
        fields: vec!["id".to_string()],
        case_sensitive: true,
    }
}

/// The builtin preset configurations
pub fn builtin_pipelines() -> Vec<PipelineConfig> {
    vec![
        PipelineConfig::new("title_only", vec![fuzzy_title()]),
        PipelineConfig::new("id_only", vec![unique_id()]),
        PipelineConfig::new("id_and_title", vec![unique_id(), fuzzy_title()]),
    ]
}

/// Named pipeline configurations, built on lookup
#[derive(Debug, Default)]
pub struct PipelineRegistry {
    configs: BTreeMap<String, (PipelineConfig, PipelineSource)>,
}

impl PipelineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the builtin presets
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for config in builtin_pipelines() {
            registry.insert(config, PipelineSource::Builtin);
        }
        registry
    }

    /// Register a config, replacing any builtin of the same name.
    ///
    /// The config is validated first, so a registered name always builds.
    pub fn register(&mut self, config: PipelineConfig) -> Result<()> {
        config.build()?;
        self.insert(config, PipelineSource::Loaded);
        Ok(())
    }

    fn insert(&mut self, config: PipelineConfig, source: PipelineSource) {
        if let Some((_, existing)) = self.configs.get(&config.name) {
            if source.priority() < existing.priority() {
                return;
            }
        }
        self.configs.insert(config.name.clone(), (config, source));
    }

    /// Load every `*.toml` file in `dir`.
    ///
    /// Files that fail to parse or validate are logged and skipped. Returns
    /// the number of pipelines registered; a missing directory loads nothing.
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match PipelineConfig::load(&path).and_then(|config| self.register(config)) {
                Ok(()) => loaded += 1,
                Err(err) => warn!(path = %path.display(), error = %err, "skipping pipeline config"),
            }
        }
        info!(dir = %dir.display(), loaded, "loaded pipeline configs");
        Ok(loaded)
    }

    /// The config registered under `name`
    pub fn config(&self, name: &str) -> Result<&PipelineConfig> {
        self.configs
            .get(name)
            .map(|(config, _)| config)
            .ok_or_else(|| DedupeError::UnknownPipeline(name.to_string()))
    }

    /// Build the pipeline registered under `name`
    pub fn pipeline(&self, name: &str) -> Result<Pipeline> {
        self.config(name)?.build()
    }

    pub fn source(&self, name: &str) -> Option<PipelineSource> {
        self.configs.get(name).map(|(_, source)| *source)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
