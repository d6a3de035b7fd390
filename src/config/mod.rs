// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Conversion profiles.
//!
//! A profile bundles the file naming convention, the named translation
//! tables and the instrument scripts that reference them. The built-in
//! profile converts gh2 charts to ms charts; other conventions can be
//! described in YAML or TOML and loaded at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::pipeline::{gh2, InstrumentScript};
use crate::tables::TranslationTable;

/// Problems found while validating a profile
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// A step names a table the profile does not define
    #[error("instrument '{instrument}' uses unknown table '{table}'")]
    UnknownTable { instrument: String, table: String },

    /// A table maps from or to a note above 127
    #[error("table '{table}' uses note {note}, outside 0-127")]
    NoteOutOfRange { table: String, note: u8 },

    /// A naming suffix is empty
    #[error("{0} suffix must not be empty")]
    EmptySuffix(&'static str),
}

/// Root of a profile file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Profile name
    #[serde(default = "default_profile_name")]
    pub name: String,
    /// Input/output file naming
    #[serde(default)]
    pub naming: NamingConfig,
    /// Named translation tables
    #[serde(default)]
    pub tables: BTreeMap<String, TranslationTable>,
    /// Instrument scripts, run in order
    #[serde(default)]
    pub instruments: Vec<InstrumentScript>,
}

fn default_profile_name() -> String {
    "custom".to_string()
}

impl Profile {
    /// The built-in gh2 to ms profile
    pub fn builtin() -> Self {
        Self {
            name: "gh2-to-ms".to_string(),
            naming: NamingConfig::default(),
            tables: gh2::tables(),
            instruments: gh2::instruments(),
        }
    }

    /// Load and validate a profile, choosing the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {:?}", path))?;

        let profile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        profile
            .validate()
            .with_context(|| format!("Invalid profile: {:?}", path))?;
        Ok(profile)
    }

    /// Parse a profile from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML profile")
    }

    /// Parse a profile from TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse TOML profile")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize profile to YAML")
    }

    /// Check that every table is in range and every step's table exists
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.naming.input_suffix.is_empty() {
            return Err(ProfileError::EmptySuffix("input"));
        }
        if self.naming.output_suffix.is_empty() {
            return Err(ProfileError::EmptySuffix("output"));
        }

        for (name, table) in &self.tables {
            if let Some(note) = table.first_out_of_range() {
                return Err(ProfileError::NoteOutOfRange {
                    table: name.clone(),
                    note,
                });
            }
            for source in table.empty_fans() {
                warn!("Table '{}' maps note {} to nothing", name, source);
            }
        }

        for script in &self.instruments {
            for table in script.steps.iter().filter_map(|step| step.table()) {
                if !self.tables.contains_key(table) {
                    return Err(ProfileError::UnknownTable {
                        instrument: script.name.clone(),
                        table: table.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::builtin()
    }
}

/// How charts to convert are found and how outputs are named
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamingConfig {
    /// File names ending with this are inputs
    #[serde(default = "default_input_suffix")]
    pub input_suffix: String,
    /// Replaces the input's extension to form the output name; file names
    /// already ending with it are never inputs
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

fn default_input_suffix() -> String {
    "_gh2.mid".to_string()
}
fn default_output_suffix() -> String {
    "_ms.mid".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            input_suffix: default_input_suffix(),
            output_suffix: default_output_suffix(),
        }
    }
}

impl NamingConfig {
    /// Check whether a file name is a chart to convert
    pub fn is_input(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.input_suffix) && !file_name.ends_with(&self.output_suffix)
    }

    /// Output path for `input`: same directory, extension replaced by the
    /// output suffix
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        input.with_file_name(format!("{}{}", stem, self.output_suffix))
    }
}
