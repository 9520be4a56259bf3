// SPDX-License-Identifier: PMPL-1.0-or-later

//! tscat: inspect, query and validate Qt Linguist `.ts` translation catalogs
//!
//! Checks catalogs for structural errors and conflicting duplicates, resolves
//! individual messages the way a running application would, and reports
//! translation coverage against a reference catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ts_catalog::check;
use ts_catalog::report::{self, CoverageFormat, ExportFormat, ReportFormatter};
use ts_catalog::{
    Catalog, FormatMode, Locale, PluralRule, TranslationSet, Translator, TranslatorConfig,
};

#[derive(Parser)]
#[command(name = "tscat")]
#[command(version)]
#[command(about = "Inspect, query and validate Qt Linguist .ts translation catalogs")]
#[command(long_about = None)]
struct Cli {
    /// Translator config (YAML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse .ts files and report structural errors
    Check {
        /// Files or directories (searched recursively)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Resolve one message
    Lookup {
        /// Catalog file (default: catalogs from the config)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Context name, e.g. SidePanel
        #[arg(short, long)]
        context: String,

        /// Source text
        #[arg(short, long)]
        source: String,

        /// Disambiguation comment
        #[arg(short = 'k', long)]
        comment: Option<String>,

        /// Count for plural messages
        #[arg(short)]
        n: Option<u64>,

        /// Locale to load from the config's catalogs
        #[arg(short, long, conflicts_with = "file")]
        locale: Option<String>,
    },

    /// Resolve one message and substitute positional arguments
    Format {
        /// Catalog file (default: catalogs from the config)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Context name
        #[arg(short, long)]
        context: String,

        /// Source text
        #[arg(short, long)]
        source: String,

        /// Disambiguation comment
        #[arg(short = 'k', long)]
        comment: Option<String>,

        /// Fail when placeholder and argument counts differ
        #[arg(long)]
        strict: bool,

        /// Positional arguments
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Translation coverage per context
    Coverage {
        /// Catalog to measure
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Catalog supplying the expected keys
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: CoverageFormat,

        /// Write the report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a catalog to JSON, YAML or normalized .ts
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resolved locale, its fallback chain and the installed locales
    Locale {
        /// Locale to inspect instead of the configured/system one
        #[arg(long)]
        lang: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => TranslatorConfig::load(path)?,
        None => TranslatorConfig::default(),
    };

    match cli.command {
        Commands::Check { paths } => {
            let files = check::collect_ts_files(&paths)?;
            if files.is_empty() {
                println!("{}", "No .ts files found".yellow());
                return Ok(());
            }
            let outcomes = check::check_files(&files);
            ReportFormatter::new()
                .verbose(cli.verbose)
                .print_check(&outcomes);
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
            if failed > 0 {
                anyhow::bail!("{failed} catalog(s) failed to parse");
            }
        }

        Commands::Lookup {
            file,
            context,
            source,
            comment,
            n,
            locale,
        } => {
            let translator = open_translator(&config, file.as_deref(), locale.as_deref())?;
            let text = match n {
                Some(n) => translator.lookup_plural(&context, &source, comment.as_deref(), n),
                None => translator.lookup(&context, &source, comment.as_deref()),
            };
            println!("{text}");
        }

        Commands::Format {
            file,
            context,
            source,
            comment,
            strict,
            args,
        } => {
            let translator = open_translator(&config, file.as_deref(), None)?;
            let mode = if strict {
                FormatMode::Strict
            } else {
                config.format_mode
            };
            let text =
                translator.format(&context, &source, comment.as_deref(), args.as_slice(), mode)?;
            println!("{text}");
        }

        Commands::Coverage {
            file,
            reference,
            format,
            output,
        } => {
            let candidate = load_catalog(&file)?;
            let reference = reference.as_deref().map(load_catalog).transpose()?;
            let coverage = ts_catalog::coverage(&candidate, reference.as_ref());
            if format == CoverageFormat::Text && output.is_none() {
                ReportFormatter::new()
                    .verbose(cli.verbose)
                    .print_coverage(&coverage);
            } else {
                report::write_output(&format.serialize(&coverage)?, output.as_deref())?;
            }
        }

        Commands::Export {
            file,
            format,
            output,
        } => {
            let catalog = load_catalog(&file)?;
            report::write_output(&format.serialize(&catalog)?, output.as_deref())?;
        }

        Commands::Locale { lang } => {
            let locale = match lang {
                Some(value) => Locale::parse(&value)?,
                None => config.resolve_locale()?,
            };
            println!("{}", "LOCALE".bold().yellow());
            println!("  Tag: {}", locale.tag().bold());
            println!(
                "  Language: {} ({})",
                locale.language_name().unwrap_or("unknown"),
                locale.native_name().unwrap_or("-")
            );
            println!("  Fallback chain: {}", locale.fallback_chain().join(" -> "));
            let rule = PluralRule::for_language(locale.language(), locale.territory());
            println!("  Plural rule: {:?} ({} form(s))", rule, rule.form_count());
            let available = config.available_locales()?;
            if available.is_empty() {
                println!("  Available: {}", "none".dimmed());
            } else {
                println!("  Available: {}", available.join(", "));
            }
            if cli.verbose {
                for source in config.sources() {
                    for tag in locale.fallback_chain() {
                        println!("  candidate: {}", ts_catalog::CatalogSource::describe(&source, &tag));
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::from_path(path).with_context(|| format!("loading {}", path.display()))
}

/// A translator over one file, or over the configured catalogs.
fn open_translator(
    config: &TranslatorConfig,
    file: Option<&Path>,
    locale: Option<&str>,
) -> Result<Translator> {
    if let Some(path) = file {
        let catalog = load_catalog(path)?;
        let locale = catalog.language().and_then(|tag| Locale::parse(tag).ok());
        return Ok(Translator::with_set(TranslationSet::new(
            locale,
            vec![Arc::new(catalog)],
        )));
    }
    match locale {
        Some(value) => config.build_translator_for(&Locale::parse(value)?),
        None => config.build_translator(),
    }
}
