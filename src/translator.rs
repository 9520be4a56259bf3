// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared, atomically reloadable translation state.
//!
//! A [`Translator`] publishes one immutable [`TranslationSet`] behind an
//! `Arc`. Readers clone the `Arc` and resolve against that snapshot, so a
//! concurrent reload can only ever be observed as a whole: the old set or
//! the new one. The lock guards the pointer, never a lookup.
//!
//! Listeners registered with [`Translator::connect`] hear about every
//! successful [`reload`](Translator::reload) or
//! [`replace`](Translator::replace), after the new set is visible.

use crate::catalog::{self, Catalog};
use crate::error::CatalogError;
use crate::format::{self, FormatMode};
use crate::i18n::Locale;
use crate::loader::CatalogSource;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// An immutable stack of catalogs for one locale.
///
/// Layers are ordered newest first; the first layer with a usable
/// translation answers the lookup.
#[derive(Debug, Clone, Default)]
pub struct TranslationSet {
    locale: Option<Locale>,
    layers: Vec<Arc<Catalog>>,
}

impl TranslationSet {
    /// A set with no catalogs: every lookup returns its source.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set over `layers`, highest priority first.
    pub fn new(locale: Option<Locale>, layers: Vec<Arc<Catalog>>) -> Self {
        Self { locale, layers }
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn layers(&self) -> &[Arc<Catalog>] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Same set with `catalog` stacked on top.
    fn with_layer(&self, catalog: Arc<Catalog>) -> Self {
        let mut layers = Vec::with_capacity(self.layers.len() + 1);
        layers.push(catalog);
        layers.extend(self.layers.iter().cloned());
        Self {
            locale: self.locale.clone(),
            layers,
        }
    }

    /// Translation for the triple, `None` when lookup would fall back.
    pub fn translation(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&str> {
        self.layers
            .iter()
            .find_map(|catalog| catalog.translation(context, source, comment))
    }

    /// Resolve a message, falling back to `source`.
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        self.translation(context, source, comment).unwrap_or(source)
    }

    /// Resolve a plural message for `n`, substituting `%n`.
    pub fn lookup_plural(&self, context: &str, source: &str, comment: Option<&str>, n: u64) -> String {
        let template = self
            .layers
            .iter()
            .find_map(|catalog| {
                catalog
                    .find(context, source, comment)
                    .and_then(|message| catalog::select_form(message, catalog.plural_rule(), n))
            })
            .unwrap_or(source);
        format::substitute_count(template, n)
    }

    /// Resolve a message and substitute positional arguments.
    pub fn format<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        args: &[S],
        mode: FormatMode,
    ) -> Result<String, CatalogError> {
        format::format_positional(self.lookup(context, source, comment), args, mode)
    }

    /// Fingerprints of every layer, highest priority first.
    pub fn fingerprints(&self) -> Vec<String> {
        self.layers.iter().map(|catalog| catalog.fingerprint()).collect()
    }
}

/// Locale switch delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChange {
    pub current: Option<Locale>,
    pub previous: Option<Locale>,
}

/// Handle for [`Translator::disconnect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&LocaleChange) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

/// Shared handle to the current [`TranslationSet`].
///
/// Starts unloaded. Share it between consumers as `Arc<Translator>`.
#[derive(Default)]
pub struct Translator {
    current: RwLock<Arc<TranslationSet>>,
    listeners: Mutex<Listeners>,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("current", &self.snapshot())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Translator {
    /// Unloaded translator: lookups return their source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translator publishing `set` from the start.
    pub fn with_set(set: TranslationSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(set)),
            listeners: Mutex::default(),
        }
    }

    /// The set every lookup made now would see.
    pub fn snapshot(&self) -> Arc<TranslationSet> {
        // A poisoned lock still holds a complete Arc.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish `set`, returning the one it replaced.
    pub fn replace(&self, set: TranslationSet) -> Arc<TranslationSet> {
        let next = Arc::new(set);
        let previous = self.publish(Arc::clone(&next));
        self.notify(&next, &previous);
        previous
    }

    fn publish(&self, next: Arc<TranslationSet>) -> Arc<TranslationSet> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Stack `catalog` above the current layers.
    pub fn install(&self, catalog: Arc<Catalog>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(
            origin = catalog.origin(),
            layers = guard.layers.len() + 1,
            "installed catalog"
        );
        let next = guard.with_layer(catalog);
        *guard = Arc::new(next);
    }

    /// Load `locale` from every source and publish the result atomically.
    ///
    /// Sources are listed highest priority first. A source with no
    /// document anywhere on the locale's fallback chain is skipped with a
    /// warning. Any other error, or no source finding anything, leaves
    /// the current set untouched.
    pub fn reload(
        &self,
        sources: &[&dyn CatalogSource],
        locale: &Locale,
    ) -> Result<Arc<TranslationSet>, CatalogError> {
        let mut layers = Vec::with_capacity(sources.len());
        let mut missing = None;
        for source in sources {
            match Catalog::load(*source, locale) {
                Ok(catalog) => layers.push(Arc::new(catalog)),
                Err(err @ CatalogError::NotFound { .. }) => {
                    tracing::warn!(locale = %locale, error = %err, "skipping catalog");
                    missing = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        if layers.is_empty() {
            if let Some(err) = missing {
                return Err(err);
            }
        }

        let set = Arc::new(TranslationSet::new(Some(locale.clone()), layers));
        let previous = self.publish(Arc::clone(&set));
        tracing::info!(locale = %locale, layers = set.layers.len(), "reloaded translations");
        self.notify(&set, &previous);
        Ok(set)
    }

    /// Call `listener` after every successful reload or replace.
    pub fn connect<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&LocaleChange) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Remove one listener. False when `id` was not connected.
    pub fn disconnect(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    pub fn disconnect_all(&self) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.entries.clear();
    }

    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.entries.len()
    }

    /// Run listeners in registration order outside the lock. A panicking
    /// listener is logged and the rest still run.
    fn notify(&self, current: &TranslationSet, previous: &TranslationSet) {
        let listeners: Vec<(ListenerId, Listener)> = {
            let guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            guard.entries.clone()
        };
        if listeners.is_empty() {
            return;
        }
        let change = LocaleChange {
            current: current.locale.clone(),
            previous: previous.locale.clone(),
        };
        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&change))).is_err() {
                tracing::warn!(listener = id.0, "locale listener panicked");
            }
        }
    }

    /// Locale of the current set, if any was loaded.
    pub fn locale(&self) -> Option<Locale> {
        self.snapshot().locale().cloned()
    }

    /// Whether any catalog is published.
    pub fn is_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }

    /// Resolve against the current set.
    pub fn lookup(&self, context: &str, source: &str, comment: Option<&str>) -> String {
        self.snapshot().lookup(context, source, comment).to_string()
    }

    pub fn lookup_plural(&self, context: &str, source: &str, comment: Option<&str>, n: u64) -> String {
        self.snapshot().lookup_plural(context, source, comment, n)
    }

    pub fn format<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        args: &[S],
        mode: FormatMode,
    ) -> Result<String, CatalogError> {
        self.snapshot().format(context, source, comment, args, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemorySource;
    use crate::types::Message;

    fn catalog(language: &str, translation: &str) -> Arc<Catalog> {
        let mut catalog = Catalog::new(Some(language));
        catalog
            .insert("MainWindow", Message::new("Update", None, translation))
            .unwrap();
        Arc::new(catalog)
    }

    fn document(translation: &str) -> String {
        format!(
            "<TS version=\"2.1\" language=\"zh_CN\"><context><name>MainWindow</name>\
             <message><source>Update</source><translation>{translation}</translation></message>\
             </context></TS>"
        )
    }

    #[test]
    fn unloaded_translator_returns_source() {
        let translator = Translator::new();
        assert!(!translator.is_loaded());
        assert_eq!(translator.lookup("MainWindow", "Update", None), "Update");
        assert_eq!(translator.locale(), None);
    }

    #[test]
    fn newest_installed_catalog_wins() {
        let translator = Translator::new();
        translator.install(catalog("zh_CN", "更新"));
        translator.install(catalog("zh_CN", "升级"));
        assert_eq!(translator.lookup("MainWindow", "Update", None), "升级");
        assert_eq!(translator.snapshot().layers().len(), 2);
    }

    #[test]
    fn empty_top_layer_defers_to_lower_layer() {
        let translator = Translator::new();
        translator.install(catalog("zh_CN", "更新"));
        translator.install(catalog("zh_CN", ""));
        assert_eq!(translator.lookup("MainWindow", "Update", None), "更新");
    }

    #[test]
    fn snapshot_outlives_replacement() {
        let translator = Translator::new();
        translator.install(catalog("zh_CN", "更新"));
        let before = translator.snapshot();
        translator.replace(TranslationSet::empty());
        assert_eq!(before.lookup("MainWindow", "Update", None), "更新");
        assert_eq!(translator.lookup("MainWindow", "Update", None), "Update");
    }

    #[test]
    fn reload_walks_fallback_and_skips_missing_sources() {
        let app = MemorySource::new("app").with("zh", document("更新"));
        let plugins = MemorySource::new("plugins");
        let translator = Translator::new();
        let locale = Locale::parse("zh_CN").unwrap();

        let set = translator.reload(&[&plugins, &app], &locale).unwrap();
        assert_eq!(set.layers().len(), 1);
        assert_eq!(translator.lookup("MainWindow", "Update", None), "更新");
        assert_eq!(translator.locale(), Some(locale));
    }

    #[test]
    fn failed_reload_keeps_current_set() {
        let good = MemorySource::new("good").with("zh_CN", document("更新"));
        let broken = MemorySource::new("broken").with("zh_CN", "<TS><context>");
        let empty = MemorySource::new("empty");
        let translator = Translator::new();
        let locale = Locale::parse("zh_CN").unwrap();
        translator.reload(&[&good], &locale).unwrap();
        let before = translator.snapshot();

        assert!(translator.reload(&[&broken], &locale).is_err());
        assert!(matches!(
            translator.reload(&[&empty], &locale),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(Arc::ptr_eq(&before, &translator.snapshot()));
    }

    #[test]
    fn plural_and_format_delegate_to_snapshot() {
        let mut zh = Catalog::new(Some("en_US"));
        zh.insert(
            "SidePanel",
            Message::numerus("%n 条曲线", None, vec!["%n curve".into(), "%n curves".into()]),
        )
        .unwrap();
        zh.insert("SidePanel", Message::new("子图{}", Some("f_subplot"), "Subplot {}"))
            .unwrap();
        let translator = Translator::with_set(TranslationSet::new(None, vec![Arc::new(zh)]));
        assert_eq!(translator.lookup_plural("SidePanel", "%n 条曲线", None, 2), "2 curves");
        assert_eq!(
            translator
                .format("SidePanel", "子图{}", Some("f_subplot"), &["3"], FormatMode::Lenient)
                .unwrap(),
            "Subplot 3"
        );
    }

    fn recorder(translator: &Translator) -> (ListenerId, Arc<Mutex<Vec<LocaleChange>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = translator.connect(move |change| sink.lock().unwrap().push(change.clone()));
        (id, seen)
    }

    #[test]
    fn listeners_hear_successful_switches_only() {
        let zh = MemorySource::new("app").with("zh_CN", document("更新"));
        let broken = MemorySource::new("broken").with("en", "<TS><context>");
        let translator = Translator::new();
        let (_, seen) = recorder(&translator);
        let zh_cn = Locale::parse("zh_CN").unwrap();

        translator.reload(&[&zh], &zh_cn).unwrap();
        assert!(translator.reload(&[&broken], &Locale::parse("en").unwrap()).is_err());
        assert!(translator.reload(&[&zh], &Locale::parse("ja").unwrap()).is_err());
        translator.replace(TranslationSet::empty());

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                LocaleChange {
                    current: Some(zh_cn.clone()),
                    previous: None
                },
                LocaleChange {
                    current: None,
                    previous: Some(zh_cn)
                },
            ]
        );
    }

    #[test]
    fn panicking_listener_does_not_stop_the_others() {
        let translator = Translator::new();
        translator.connect(|_| panic!("listener failure"));
        let (_, seen) = recorder(&translator);
        translator.replace(TranslationSet::empty());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn disconnect_removes_listeners() {
        let translator = Translator::new();
        let (first, seen) = recorder(&translator);
        let (_second, _) = recorder(&translator);
        assert_eq!(translator.listener_count(), 2);

        assert!(translator.disconnect(first));
        assert!(!translator.disconnect(first));
        translator.replace(TranslationSet::empty());
        assert!(seen.lock().unwrap().is_empty());

        translator.disconnect_all();
        assert_eq!(translator.listener_count(), 0);
    }

    #[test]
    fn listener_can_read_the_new_set() {
        let translator = Arc::new(Translator::new());
        let observed = Arc::new(Mutex::new(String::new()));
        let (handle, sink) = (Arc::downgrade(&translator), Arc::clone(&observed));
        translator.connect(move |_| {
            if let Some(translator) = handle.upgrade() {
                *sink.lock().unwrap() = translator.lookup("MainWindow", "Update", None);
            }
        });
        translator.replace(TranslationSet::new(None, vec![catalog("zh_CN", "更新")]));
        assert_eq!(*observed.lock().unwrap(), "更新");
    }
}
