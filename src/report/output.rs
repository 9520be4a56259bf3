// SPDX-License-Identifier: PMPL-1.0-or-later

//! Serialization helpers for exported catalogs and coverage reports

use crate::catalog::Catalog;
use crate::coverage::CoverageReport;
use crate::report::formatter::ReportFormatter;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Target format of `tscat export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Yaml,
    Ts,
}

impl ExportFormat {
    pub fn serialize(&self, catalog: &Catalog) -> Result<String> {
        match self {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&CatalogExport::new(catalog))?),
            ExportFormat::Yaml => Ok(serde_yaml::to_string(&CatalogExport::new(catalog))?),
            ExportFormat::Ts => Ok(catalog.to_ts_string()),
        }
    }
}

/// Structured export envelope.
#[derive(Debug, Serialize)]
struct CatalogExport<'a> {
    generated_at: String,
    origin: &'a str,
    fingerprint: String,
    #[serde(flatten)]
    catalog: &'a Catalog,
}

impl<'a> CatalogExport<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            origin: catalog.origin(),
            fingerprint: catalog.fingerprint(),
            catalog,
        }
    }
}

/// Output format of `tscat coverage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CoverageFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl CoverageFormat {
    pub fn serialize(&self, report: &CoverageReport) -> Result<String> {
        match self {
            CoverageFormat::Text => Ok(ReportFormatter::new().coverage_text(report)),
            CoverageFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            CoverageFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        }
    }
}
