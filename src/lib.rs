// SPDX-License-Identifier: PMPL-1.0-or-later

//! ts-catalog: context-scoped translation catalogs for Qt `.ts` resources.
//!
//! A catalog resolves a `(context, source, comment)` triple to the
//! translated string for one locale. Lookup never fails: anything the
//! catalog cannot answer resolves to the source text itself.
//!
//! BUILDING BLOCKS:
//! 1. **Catalog**: parses and writes `.ts` documents and indexes messages
//!    by context, then by source and disambiguation comment.
//! 2. **Translator**: publishes an immutable stack of catalogs behind one
//!    atomically swapped `Arc`, so a locale reload is never observed half
//!    applied.
//! 3. **Format**: positional `{}` / `{N}` substitution after lookup, and
//!    `%n` plural selection by language.
//!
//! ```
//! use ts_catalog::{Catalog, FormatMode};
//!
//! let catalog = Catalog::parse(r#"<TS version="2.1" language="en_US">
//! <context>
//!     <name>SidePanel</name>
//!     <message>
//!         <source>子图{}</source>
//!         <comment>f_subplot</comment>
//!         <translation>Subplot {}</translation>
//!     </message>
//! </context>
//! </TS>"#).unwrap();
//!
//! let title = catalog
//!     .format("SidePanel", "子图{}", Some("f_subplot"), &["3"], FormatMode::Lenient)
//!     .unwrap();
//! assert_eq!(title, "Subplot 3");
//! ```

pub mod catalog;
pub mod check;
pub mod columns;
pub mod config;
pub mod coverage;
pub mod error;
pub mod format;
pub mod i18n;
pub mod loader;
pub mod report;
pub mod translator;
pub mod types;

pub use catalog::{Catalog, Context, Inserted, TS_VERSION};
pub use columns::{ColumnNameTranslator, COLUMN_CONTEXT};
pub use config::TranslatorConfig;
pub use coverage::{coverage, CoverageReport};
pub use error::CatalogError;
pub use format::{format_positional, FormatMode};
pub use i18n::{Locale, PluralRule};
pub use loader::{CatalogSource, FsSource, MemorySource, Resource};
pub use translator::{ListenerId, LocaleChange, TranslationSet, Translator};
pub use types::{Location, Message, Translation, TranslationStatus};
