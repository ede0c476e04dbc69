//! Generator configuration.
//!
//! Configuration can be built in code or loaded from YAML or JSON. Every
//! field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! source_root: app/src
//! skip_dirs: [benches]
//! selection:
//!   prefix: "api/*"
//!   routes: [users.index]
//! simulation:
//!   disable_middleware: true
//!   acting_user: "1"
//!   headers:
//!     X-Tenant: acme
//! ```

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration of a documentation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root of the application sources that declare the handlers
    pub source_root: PathBuf,
    /// Extra directory names the source scan leaves out
    pub skip_dirs: Vec<String>,
    pub selection: SelectionConfig,
    pub simulation: SimulationConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            skip_dirs: Vec::new(),
            selection: SelectionConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Which routes get documented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// URI pattern, `*` matching any run of characters
    pub prefix: Option<String>,
    /// Route names documented regardless of the prefix
    pub routes: Vec<String>,
}

/// How sample responses are obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Run only the route's own handler stack, skipping global middleware
    pub disable_middleware: bool,
    /// User the simulated requests are made as
    pub acting_user: Option<String>,
    /// Extra headers sent with every simulated request
    pub headers: IndexMap<String, String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            disable_middleware: true,
            acting_user: None,
            headers: IndexMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a configuration file, picking the format from the extension:
    /// `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;

        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        };

        parsed.map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
