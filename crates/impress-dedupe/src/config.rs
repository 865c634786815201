//! Pipeline configuration files
//!
//! A pipeline can be described in TOML (or JSON) and built at runtime:
//!
//! ```toml
//! name = "id_and_title"
//! known_fields = ["id", "title", "doi"]
//!
//! [[modules]]
//! kind = "unique"
//! fields = ["id"]
//!
//! [[modules]]
//! kind = "fuzzy"
//! field = "title"
//! threshold = 90.0
//! scorer = "weighted_ratio"
//! ```
//!
//! Configs are only validated when built, so a parsed config may still
//! describe an invalid pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::modules::{DedupeModule, FuzzyDedupe, UniqueDedupe, UniqueTogetherDedupe};
use crate::pipeline::Pipeline;
use crate::similarity::Scorer;

fn default_case_sensitive() -> bool {
    true
}

/// One matching module, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleConfig {
    /// Records sharing a value in any of `fields`
    Unique {
        fields: Vec<String>,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    /// Records sharing values across `fields` without conflicts
    UniqueTogether {
        fields: Vec<String>,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    /// Records whose `field` scores at least `threshold`
    Fuzzy {
        field: String,
        threshold: f64,
        #[serde(default)]
        scorer: Scorer,
    },
}

impl ModuleConfig {
    /// Validate and construct the module
    pub fn build(&self) -> Result<Box<dyn DedupeModule>> {
        let module: Box<dyn DedupeModule> = match self {
            ModuleConfig::Unique {
                fields,
                case_sensitive,
            } => Box::new(UniqueDedupe::new(fields.clone(), *case_sensitive)?),
            ModuleConfig::UniqueTogether {
                fields,
                case_sensitive,
            } => Box::new(UniqueTogetherDedupe::new(fields.clone(), *case_sensitive)?),
            ModuleConfig::Fuzzy {
                field,
                threshold,
                scorer,
            } => Box::new(FuzzyDedupe::with_scorer(field.clone(), *threshold, *scorer)?),
        };
        Ok(module)
    }
}

/// A named pipeline: an ordered list of modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,

    /// Record schema; module fields outside it are rejected at build time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_fields: Option<Vec<String>>,

    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

impl PipelineConfig {
    pub fn new(name: impl Into<String>, modules: Vec<ModuleConfig>) -> Self {
        Self {
            name: name.into(),
            known_fields: None,
            modules,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a config file, JSON for a `.json` extension and TOML otherwise
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Validate every module and build the pipeline
    pub fn build(&self) -> Result<Pipeline> {
        let mut builder = Pipeline::builder(self.name.clone());
        if let Some(known) = &self.known_fields {
            builder = builder.known_fields(known.iter().cloned());
        }
        for module in &self.modules {
            builder = builder.boxed_module(module.build()?);
        }
        builder.build()
    }
}
