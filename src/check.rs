// SPDX-License-Identifier: PMPL-1.0-or-later

//! Batch validation of `.ts` files.

use crate::catalog::Catalog;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &["target", "build", "node_modules", "__pycache__", "dist"];

/// What a successfully parsed file contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub language: Option<String>,
    pub contexts: usize,
    pub messages: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    pub fingerprint: String,
}

impl CheckSummary {
    fn of(catalog: &Catalog) -> Self {
        let (mut unfinished, mut obsolete) = (0, 0);
        for (_, message) in catalog.messages() {
            if !message.is_live() {
                obsolete += 1;
            } else if !message.is_finished() {
                unfinished += 1;
            }
        }
        Self {
            language: catalog.language().map(str::to_string),
            contexts: catalog.contexts().len(),
            messages: catalog.len(),
            unfinished,
            obsolete,
            fingerprint: catalog.fingerprint(),
        }
    }
}

/// Result of checking one file. Errors are rendered to text.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub path: PathBuf,
    pub result: Result<CheckSummary, String>,
}

/// Expand `paths` into the `.ts` files they name, sorted.
///
/// Files are taken as given; directories are walked recursively,
/// skipping hidden and build directories.
pub fn collect_ts_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            anyhow::bail!("No such file or directory: {}", path.display());
        }
        let walker = WalkDir::new(path).into_iter().filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_type().is_dir() || !is_skipped(entry.path())
        });
        for entry in walker {
            let entry = entry.with_context(|| format!("walking {}", path.display()))?;
            if entry.file_type().is_file() && has_ts_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_skipped(dir: &Path) -> bool {
    let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.starts_with('.') || SKIP_DIRS.contains(&name)
}

fn has_ts_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("ts")
}

/// Parse every file in parallel. Output order follows `files`.
pub fn check_files(files: &[PathBuf]) -> Vec<CheckOutcome> {
    files
        .par_iter()
        .map(|path| {
            let result = Catalog::from_path(path)
                .map(|catalog| CheckSummary::of(&catalog))
                .map_err(|err| err.to_string());
            if let Err(message) = &result {
                tracing::debug!(path = %path.display(), error = %message, "check failed");
            }
            CheckOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
