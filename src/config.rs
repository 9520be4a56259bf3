// SPDX-License-Identifier: PMPL-1.0-or-later

//! Translator configuration.
//!
//! ```yaml
//! locale: zh_CN          # optional; TSCAT_LOCALE and the system locale apply otherwise
//! search_paths: [i18n, app/plotter/i18n]
//! catalogs: ["", plotter_]
//! format_mode: strict
//! source_language: zh_CN  # always listed as available
//! ```
//!
//! Each entry of `catalogs` is a file-name prefix: `plotter_` selects
//! `plotter_zh_CN.ts`. The first catalog listed takes precedence.

use crate::format::FormatMode;
use crate::i18n::{detect_locale_with, Locale};
use crate::loader::{CatalogSource, FsSource};
use crate::translator::Translator;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured locale.
pub const LOCALE_OVERRIDE_VAR: &str = "TSCAT_LOCALE";

/// Locale used when nothing else names one.
pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub locale: Option<String>,
    pub search_paths: Vec<PathBuf>,
    pub catalogs: Vec<String>,
    pub format_mode: FormatMode,
    /// Language the source strings are written in.
    pub source_language: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            locale: None,
            search_paths: vec![PathBuf::from("i18n")],
            catalogs: vec![String::new()],
            format_mode: FormatMode::Lenient,
            source_language: None,
        }
    }
}

impl TranslatorConfig {
    /// Load from YAML (`.yaml`/`.yml`) or JSON (anything else).
    ///
    /// Relative search paths are taken relative to the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = load_json_or_yaml(path)?;
        if let Some(base) = path.parent() {
            for dir in &mut config.search_paths {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        tracing::debug!(path = %path.display(), ?config, "loaded translator config");
        Ok(config)
    }

    /// Locale to load, from the process environment.
    pub fn resolve_locale(&self) -> Result<Locale> {
        self.resolve_locale_with(|name| std::env::var(name).ok())
    }

    /// `TSCAT_LOCALE`, then the configured locale, then `LANG` / `LC_ALL` /
    /// `LC_MESSAGES`, then English.
    pub fn resolve_locale_with<F>(&self, lookup: F) -> Result<Locale>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(LOCALE_OVERRIDE_VAR).filter(|v| !v.is_empty()) {
            return Locale::parse(&value)
                .with_context(|| format!("{LOCALE_OVERRIDE_VAR}={value} is not a usable locale"));
        }
        if let Some(value) = &self.locale {
            return Locale::parse(value)
                .with_context(|| format!("configured locale {value:?} is not usable"));
        }
        if let Some(locale) = detect_locale_with(&lookup) {
            return Ok(locale);
        }
        Ok(Locale::parse(DEFAULT_LOCALE)?)
    }

    /// One file-system source per configured catalog prefix.
    pub fn sources(&self) -> Vec<FsSource> {
        self.catalogs
            .iter()
            .map(|prefix| FsSource::with_dirs(self.search_paths.clone()).prefix(prefix.as_str()))
            .collect()
    }

    /// Locales that can be switched to: the source language first, then
    /// every tag with a catalog under any configured prefix.
    pub fn available_locales(&self) -> Result<Vec<String>> {
        let mut tags = BTreeSet::new();
        for source in self.sources() {
            let found = source
                .available()
                .with_context(|| format!("listing catalogs in {:?}", source.dirs()))?;
            tags.extend(found);
        }
        let mut available = Vec::with_capacity(tags.len() + 1);
        if let Some(value) = &self.source_language {
            let tag = Locale::parse(value)
                .with_context(|| format!("source language {value:?} is not usable"))?
                .tag();
            tags.remove(&tag);
            available.push(tag);
        }
        available.extend(tags);
        Ok(available)
    }

    /// Build a translator loaded for [`resolve_locale`](Self::resolve_locale).
    pub fn build_translator(&self) -> Result<Translator> {
        let locale = self.resolve_locale()?;
        self.build_translator_for(&locale)
    }

    /// Build a translator loaded for `locale`.
    pub fn build_translator_for(&self, locale: &Locale) -> Result<Translator> {
        let sources = self.sources();
        let dyn_sources: Vec<&dyn CatalogSource> =
            sources.iter().map(|s| s as &dyn CatalogSource).collect();
        let translator = Translator::new();
        translator
            .reload(&dyn_sources, locale)
            .with_context(|| format!("loading catalogs for {locale}"))?;
        Ok(translator)
    }
}

fn load_json_or_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str::<T>(&raw).with_context(|| format!("parsing {}", path.display()))
        }
        _ => serde_json::from_str::<T>(&raw).with_context(|| format!("parsing {}", path.display())),
    }
}
