//! udoc: extracts doc comments from a C++ source tree and turns them into
//! cross-linked documentation pages.
//!
//! The pipeline is strictly sequential: source files under the root are
//! discovered in sorted order and scanned (pulling in the headers their
//! `\class` comments name), the class hierarchy is built, and every doc
//! block is interpreted into a [`render::Sink`].

pub mod cursor;
pub mod diagnostic;
pub mod docblock;
pub mod generate;
pub mod model;
pub mod parser;
pub mod registry;
pub mod render;

use anyhow::{bail, Context, Result};
use registry::Registry;
use render::Sink;
use std::path::PathBuf;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory walked for source files.
    pub root: PathBuf,
    /// File-name suffix of source files.
    pub suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            suffix: ".cpp".to_string(),
        }
    }
}

/// Finds every source file under the root, recursively, sorted.
pub fn discover(config: &Config) -> Result<Vec<PathBuf>> {
    if !config.root.is_dir() {
        bail!("root directory not found: {}", config.root.display());
    }
    let pattern = format!(
        "{}/**/*{}",
        glob::Pattern::escape(&config.root.to_string_lossy()),
        glob::Pattern::escape(&config.suffix)
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        let path = entry.with_context(|| format!("failed to walk {}", config.root.display()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

/// Runs the whole pipeline, emitting documentation into `sink`. Returns the
/// registry, which carries the diagnostics of the run.
pub fn run(config: &Config, sink: &mut dyn Sink) -> Result<Registry> {
    let files = discover(config)?;
    if files.is_empty() {
        log::warn!(
            "no *{} files found under {}",
            config.suffix,
            config.root.display()
        );
    }

    let mut reg = Registry::new();
    for path in &files {
        parser::scan_source_file(&mut reg, path)?;
    }
    reg.build_hierarchy();
    generate::generate(&mut reg, sink);
    log::debug!(
        "{} source files, {} diagnostics",
        files.len(),
        reg.diagnostics.len()
    );
    Ok(reg)
}
