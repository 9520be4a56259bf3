// SPDX-License-Identifier: PMPL-1.0-or-later

//! Display names for data columns.
//!
//! Column identifiers (`voltage`, `dianya`) are translated through a
//! dedicated context so that user-visible headers can be localized while
//! the data keeps its raw names.

use crate::translator::{TranslationSet, Translator};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Default context holding column names.
pub const COLUMN_CONTEXT: &str = "ColumnNames";

/// Reverse map built for one snapshot.
type ReverseIndex = (Arc<TranslationSet>, Arc<HashMap<String, String>>);

/// Translates column names in both directions.
#[derive(Debug)]
pub struct ColumnNameTranslator {
    translator: Arc<Translator>,
    context: String,
    reverse: Mutex<Option<ReverseIndex>>,
}

impl ColumnNameTranslator {
    pub fn new(translator: Arc<Translator>) -> Self {
        Self::with_context(translator, COLUMN_CONTEXT)
    }

    pub fn with_context(translator: Arc<Translator>, context: impl Into<String>) -> Self {
        Self {
            translator,
            context: context.into(),
            reverse: Mutex::new(None),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Localized header for `actual`, or `actual` itself.
    pub fn display_name(&self, actual: &str) -> String {
        self.translator.lookup(&self.context, actual, None)
    }

    /// Column name behind a localized header, or `display` itself when it
    /// is not a known translation.
    pub fn actual_name(&self, display: &str) -> String {
        self.reverse_index()
            .get(display)
            .cloned()
            .unwrap_or_else(|| display.to_string())
    }

    /// Reverse map for the current snapshot, rebuilt after a reload.
    fn reverse_index(&self) -> Arc<HashMap<String, String>> {
        let snapshot = self.translator.snapshot();
        let mut cached = self.reverse.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((set, index)) = cached.as_ref() {
            if Arc::ptr_eq(set, &snapshot) {
                return Arc::clone(index);
            }
        }

        // Only what display_name would return for each column: a shadowed
        // lower-layer translation is not reachable in reverse either.
        let mut index = HashMap::new();
        let mut seen = HashSet::new();
        for catalog in snapshot.layers() {
            let Some(context) = catalog.context(&self.context) else {
                continue;
            };
            for message in context.live_messages() {
                if message.comment.is_some() || !seen.insert(message.source.as_str()) {
                    continue;
                }
                if let Some(text) = snapshot.translation(&self.context, &message.source, None) {
                    index
                        .entry(text.to_string())
                        .or_insert_with(|| message.source.clone());
                }
            }
        }
        tracing::debug!(
            context = %self.context,
            entries = index.len(),
            "built column reverse index"
        );
        let index = Arc::new(index);
        *cached = Some((snapshot, Arc::clone(&index)));
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::Message;

    fn columns(pairs: &[(&str, &str)]) -> Arc<Catalog> {
        let mut catalog = Catalog::new(Some("zh_CN"));
        for (actual, display) in pairs {
            catalog
                .insert(COLUMN_CONTEXT, Message::new(*actual, None, *display))
                .unwrap();
        }
        Arc::new(catalog)
    }

    #[test]
    fn translates_both_ways() {
        let translator = Arc::new(Translator::new());
        translator.install(columns(&[("voltage", "电压"), ("current", "电流")]));
        let names = ColumnNameTranslator::new(Arc::clone(&translator));

        assert_eq!(names.display_name("voltage"), "电压");
        assert_eq!(names.display_name("temperature"), "temperature");
        assert_eq!(names.actual_name("电流"), "current");
        assert_eq!(names.actual_name("温度"), "温度");
    }

    #[test]
    fn reverse_index_follows_reload() {
        let translator = Arc::new(Translator::new());
        translator.install(columns(&[("voltage", "电压")]));
        let names = ColumnNameTranslator::new(Arc::clone(&translator));
        assert_eq!(names.actual_name("电压"), "voltage");

        translator.replace(TranslationSet::new(
            None,
            vec![columns(&[("voltage", "Voltage (V)")])],
        ));
        assert_eq!(names.actual_name("电压"), "电压");
        assert_eq!(names.actual_name("Voltage (V)"), "voltage");
    }

    #[test]
    fn custom_context() {
        let mut catalog = Catalog::new(Some("zh_CN"));
        catalog
            .insert("Headers", Message::new("speed", None, "速度"))
            .unwrap();
        let translator = Arc::new(Translator::new());
        translator.install(Arc::new(catalog));
        let names = ColumnNameTranslator::with_context(translator, "Headers");
        assert_eq!(names.context(), "Headers");
        assert_eq!(names.display_name("speed"), "速度");
    }

    #[test]
    fn shadowed_translations_are_not_reversed() {
        let translator = Arc::new(Translator::new());
        translator.install(columns(&[("voltage", "电压"), ("current", "电流")]));
        translator.install(columns(&[("voltage", "电压值")]));
        let names = ColumnNameTranslator::new(Arc::clone(&translator));

        assert_eq!(names.display_name("voltage"), "电压值");
        assert_eq!(names.actual_name("电压值"), "voltage");
        assert_eq!(names.actual_name("电压"), "电压");
        assert_eq!(names.actual_name("电流"), "current");
    }
}
