// SPDX-License-Identifier: PMPL-1.0-or-later

//! Typed errors for catalog loading and formatting.
//!
//! Missing translations and unknown contexts are deliberately absent here:
//! they resolve to the source string and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, parsing or formatting catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The resource is not a well-formed `.ts` document.
    #[error("malformed catalog {origin} at {line}:{column}: {message}")]
    Malformed {
        /// Where the document came from (file path or source label).
        origin: String,
        /// 1-based line of the offending construct.
        line: usize,
        /// 1-based column of the offending construct.
        column: usize,
        /// Human-readable description.
        message: String,
    },

    /// Two live entries share context, source and comment but disagree.
    #[error(
        "duplicate key in context '{context}': source {source_text:?}{} translates to both {first:?} and {second:?}",
        comment.as_deref().map(|c| format!(" (comment {c:?})")).unwrap_or_default()
    )]
    DuplicateKey {
        /// Context name.
        context: String,
        /// Source string shared by both entries.
        source_text: String,
        /// Disambiguation comment shared by both entries.
        comment: Option<String>,
        /// Translation of the first entry.
        first: String,
        /// Translation of the conflicting entry.
        second: String,
    },

    /// Strict formatting found a placeholder/argument count mismatch.
    #[error("placeholder mismatch: template expects {expected} argument(s), {supplied} supplied")]
    PlaceholderMismatch {
        /// Arguments the template consumes.
        expected: usize,
        /// Arguments the caller passed.
        supplied: usize,
    },

    /// No resource exists for any locale in the fallback chain.
    #[error("no catalog found for locale '{locale}' (tried: {})", tried.join(", "))]
    NotFound {
        /// Requested locale tag.
        locale: String,
        /// Resource names that were tried, in order.
        tried: Vec<String>,
    },

    /// A locale identifier could not be parsed.
    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    /// Reading a resource failed.
    #[error("reading {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_mentions_comment() {
        let err = CatalogError::DuplicateKey {
            context: "AxisConfigPanel".into(),
            source_text: "最小值:".into(),
            comment: Some("f_minimum".into()),
            first: "Minimum:".into(),
            second: "Min:".into(),
        };
        let text = err.to_string();
        assert!(text.contains("AxisConfigPanel"));
        assert!(text.contains("f_minimum"));
    }

    #[test]
    fn not_found_lists_attempts() {
        let err = CatalogError::NotFound {
            locale: "zh_CN".into(),
            tried: vec!["zh_CN.ts".into(), "zh.ts".into()],
        };
        assert_eq!(
            err.to_string(),
            "no catalog found for locale 'zh_CN' (tried: zh_CN.ts, zh.ts)"
        );
    }
}
