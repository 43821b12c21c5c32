//! Configuration management for the CLI.
//!
//! Lookup order: `--config`, `./warrant.toml`, `<config dir>/warrant/config.toml`,
//! then built-in defaults.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use warrant_acql::{AcqlConfig, AcqlEngine};
use warrant_argtl::ArgTlEngine;
use warrant_fragments::{FragmentLibrary, FragmentPattern};
use warrant_reasoning::{Defeater, ReasoningConfig, ReasoningEngine, Theory};
use warrant_tracker::{ArchitectureComponent, ArchitectureMapper, DesignRequirement};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "warrant.toml";

/// Interface text recorded for dependencies declared in configuration.
const CONFIGURED_INTERFACE: &str = "declared in configuration";

/// CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: Settings,

    /// ACQL limits
    pub acql: AcqlConfig,

    /// Reasoning weights
    pub reasoning: ReasoningConfig,

    /// Extra fragment patterns
    pub patterns: Vec<PatternEntry>,

    /// Fragments to instantiate
    pub fragments: Vec<FragmentEntry>,

    /// Extra theories (replace built-ins with the same id)
    pub theories: Vec<Theory>,

    /// Extra defeaters (replace built-ins with the same id)
    pub defeaters: Vec<Defeater>,

    /// Implementation components compared against `requirements`
    pub components: Vec<ArchitectureComponent>,

    /// Design requirements
    pub requirements: Vec<DesignRequirement>,
}

/// Output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Text and tables
    Text,
    /// JSON format
    Json,
}

/// A named pattern definition.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    /// Registry key
    pub key: String,

    /// Pattern body
    #[serde(flatten)]
    pub pattern: FragmentPattern,
}

/// A fragment instantiated from a pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentEntry {
    /// Fragment id
    pub id: String,

    /// Pattern key
    pub pattern: String,

    /// Component the fragment argues about
    pub component: String,

    /// Evidence already available
    #[serde(default)]
    pub evidence: Vec<EvidenceEntry>,

    /// Fragments this one depends on
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// An evidence item supplied to a fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceEntry {
    /// Evidence id
    pub id: String,

    /// Evidence type, matched against the pattern's required types
    #[serde(rename = "type")]
    pub evidence_type: String,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration following the lookup order.
    ///
    /// An explicit path must exist; the other locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loading configuration");
        Self::from_toml_str(&contents)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("warrant").join("config.toml"));
        }
        paths
    }

    /// Library with built-in and configured patterns and the configured fragments.
    pub fn build_library(&self) -> Result<FragmentLibrary> {
        let mut library = FragmentLibrary::new();
        for entry in &self.patterns {
            library.register_pattern(&entry.key, entry.pattern.clone())?;
        }

        for entry in &self.fragments {
            library.create_from_pattern_with_id(&entry.pattern, &entry.component, &entry.id)?;
            if let Some(fragment) = library.get_fragment_mut(&entry.id) {
                for evidence in &entry.evidence {
                    fragment.link_evidence(&evidence.id, &evidence.evidence_type);
                }
                fragment.assess_strength();
            }
        }

        Ok(library)
    }

    /// ArgTL engine over [`Config::build_library`], with configured dependencies linked.
    pub fn build_argtl_engine(&self) -> Result<ArgTlEngine> {
        let mut engine = ArgTlEngine::new(self.build_library()?);
        for entry in &self.fragments {
            for dependency in &entry.depends_on {
                engine.link_fragments(&entry.id, dependency, CONFIGURED_INTERFACE)?;
            }
        }
        Ok(engine)
    }

    /// ACQL engine with the configured limits.
    pub fn acql_engine(&self) -> AcqlEngine {
        AcqlEngine::new(self.acql.clone())
    }

    /// Reasoning engine with built-in and configured registries.
    pub fn build_reasoning_engine(&self) -> Result<ReasoningEngine> {
        let mut engine = ReasoningEngine::new(self.reasoning.clone());
        for theory in &self.theories {
            engine.register_theory(theory.clone())?;
        }
        for defeater in &self.defeaters {
            engine.register_defeater(defeater.clone())?;
        }
        Ok(engine)
    }
}

impl Config {
    /// Mapper loaded with the configured components and requirements.
    pub fn build_architecture_mapper(&self) -> ArchitectureMapper {
        let mut mapper = ArchitectureMapper::new();
        for component in &self.components {
            mapper.register_component(component.clone());
        }
        mapper.load_design_requirements(self.requirements.iter().cloned());
        mapper
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Text,
        }
    }
}
