// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Batch conversion of chart files.
//!
//! Finds charts by file name, runs the pipeline over each one and writes the
//! result next to the input. Each file is loaded, converted and saved before
//! the next is opened.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::config::NamingConfig;
use crate::document::Document;
use crate::pipeline::{Pipeline, PipelineReport};

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Inputs converted, with their output paths
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Inputs that failed, with the error
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchSummary {
    /// Check if every input was converted
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Find charts to convert directly inside `dir`, sorted by path
pub fn discover<P: AsRef<Path>>(dir: P, naming: &NamingConfig) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    let mut charts: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| naming.is_input(name))
        })
        .map(|entry| entry.into_path())
        .collect();
    charts.sort();
    Ok(charts)
}

/// Convert one chart file into `output`
pub fn convert_file(input: &Path, output: &Path, pipeline: &Pipeline) -> Result<PipelineReport> {
    info!("Processing: {:?}", input);
    let bytes = fs::read(input).with_context(|| format!("Failed to read chart: {:?}", input))?;
    let mut doc =
        Document::parse(&bytes).with_context(|| format!("Failed to parse chart: {:?}", input))?;

    let report = pipeline.run(&mut doc);

    doc.save(output)
        .with_context(|| format!("Failed to write chart: {:?}", output))?;
    info!("Saved as: {:?}", output);
    Ok(report)
}

/// Convert every input, continuing past failures
pub fn run_batch(inputs: &[PathBuf], pipeline: &Pipeline, naming: &NamingConfig) -> BatchSummary {
    let mut summary = BatchSummary::default();
    if inputs.is_empty() {
        warn!("No MIDI files found");
        return summary;
    }

    for input in inputs {
        let output = naming.output_path(input);
        match convert_file(input, &output, pipeline) {
            Ok(_) => summary.converted.push((input.clone(), output)),
            Err(err) => {
                error!("{:#}", err);
                summary.failed.push((input.clone(), err));
            }
        }
    }
    summary
}
