// SPDX-License-Identifier: PMPL-1.0-or-later

//! Context-scoped translation catalog.
//!
//! A [`Catalog`] is the in-memory form of one `.ts` document: an ordered
//! list of [`Context`]s, each an ordered list of [`Message`]s. Lookup is a
//! two-level index, context name first and then `(source, comment)`.
//! Document order is kept so that [`Catalog::to_ts_string`] regenerates a
//! stable, diffable file.
//!
//! # Invariants
//!
//! 1. **Unique live keys**: within a context, `(source, comment)` names at
//!    most one live (finished or unfinished) message. An identical repeat
//!    collapses into the first entry, and a conflicting repeat is rejected.
//! 2. **Soft fallback**: `lookup` never fails. Unknown contexts, unknown
//!    keys, empty translations and obsolete entries all resolve to the
//!    source string.
//! 3. **Immutable once shared**: construction methods take `&mut self`;
//!    consumers receive `Arc<Catalog>` and only read.

mod parser;
mod writer;

use crate::error::CatalogError;
use crate::format::{self, FormatMode};
use crate::i18n::{Locale, PluralRule};
use crate::loader::{self, CatalogSource};
use crate::types::{Message, Translation};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Default `version` attribute for new documents.
pub const TS_VERSION: &str = "2.1";

/// Messages of one UI surface.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    name: String,
    messages: Vec<Message>,
    /// source -> positions of live messages with that source.
    #[serde(skip)]
    index: HashMap<String, Vec<usize>>,
}

/// What happened to a message passed to [`Context::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    /// Stored as a new entry.
    Added,
    /// Identical to an existing live entry; dropped.
    Collapsed,
}

impl Context {
    /// Empty context.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Context name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Messages in document order, including obsolete ones.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, including obsolete ones.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the context holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Live message for `(source, comment)`.
    pub fn find(&self, source: &str, comment: Option<&str>) -> Option<&Message> {
        let comment = comment.filter(|c| !c.is_empty());
        self.index
            .get(source)?
            .iter()
            .map(|&pos| &self.messages[pos])
            .find(|message| message.comment.as_deref() == comment)
    }

    /// Add a message, enforcing the unique live key invariant.
    pub fn insert(&mut self, message: Message) -> Result<Inserted, CatalogError> {
        if message.is_live() {
            if let Some(existing) = self.find(&message.source, message.comment.as_deref()) {
                if existing.translation == message.translation {
                    tracing::debug!(
                        context = %self.name,
                        source = %message.source,
                        "collapsing repeated message"
                    );
                    return Ok(Inserted::Collapsed);
                }
                return Err(CatalogError::DuplicateKey {
                    context: self.name.clone(),
                    source_text: message.source.clone(),
                    comment: message.comment.clone(),
                    first: describe(&existing.translation),
                    second: describe(&message.translation),
                });
            }
            self.index
                .entry(message.source.clone())
                .or_default()
                .push(self.messages.len());
        }
        self.messages.push(message);
        Ok(Inserted::Added)
    }

    /// Live messages only.
    pub fn live_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_live())
    }
}

fn describe(translation: &Translation) -> String {
    match translation {
        Translation::Text(text) => text.clone(),
        Translation::Numerus(forms) => forms.join(" | "),
    }
}

/// One locale's translations, grouped by context.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<String>,
    contexts: Vec<Context>,
    #[serde(skip)]
    context_index: HashMap<String, usize>,
    #[serde(skip)]
    plural_rule: PluralRule,
    #[serde(skip)]
    origin: String,
}

impl Catalog {
    /// Empty catalog for `language` (a locale tag as written in the `TS`
    /// element; not validated).
    pub fn new(language: Option<&str>) -> Self {
        let plural_rule = language
            .and_then(|tag| Locale::parse(tag).ok())
            .map(|locale| PluralRule::for_language(locale.language(), locale.territory()))
            .unwrap_or_default();
        Self {
            version: TS_VERSION.to_string(),
            language: language.map(str::to_string),
            source_language: None,
            contexts: Vec::new(),
            context_index: HashMap::new(),
            plural_rule,
            origin: String::from("<memory>"),
        }
    }

    /// Parse a `.ts` document held in memory.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        parser::parse_document(text, "<memory>")
    }

    /// Parse a `.ts` document, labelling errors with `origin`.
    pub fn parse_with_origin(text: &str, origin: &str) -> Result<Self, CatalogError> {
        parser::parse_document(text, origin)
    }

    /// Read and parse a `.ts` file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = loader::read_resource(path)?;
        parser::parse_document(&text, &path.display().to_string())
    }

    /// Load the catalog for `locale` from `source`, walking the locale's
    /// fallback chain (`zh_CN`, then `zh`).
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] when no locale in the chain has a
    /// resource; parse errors from the first resource found.
    pub fn load(source: &dyn CatalogSource, locale: &Locale) -> Result<Self, CatalogError> {
        let chain = locale.fallback_chain();
        for tag in &chain {
            if let Some(resource) = source.fetch(tag)? {
                let catalog = parser::parse_document(&resource.text, &resource.origin)?;
                tracing::info!(
                    locale = %locale,
                    resolved = %tag,
                    origin = %resource.origin,
                    contexts = catalog.contexts.len(),
                    messages = catalog.len(),
                    "loaded catalog"
                );
                return Ok(catalog);
            }
        }
        Err(CatalogError::NotFound {
            locale: locale.tag(),
            tried: chain.iter().map(|tag| source.describe(tag)).collect(),
        })
    }

    pub(crate) fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Set the `sourcelanguage` attribute.
    pub fn set_source_language(&mut self, language: Option<&str>) {
        self.source_language = language.map(str::to_string);
    }

    pub(crate) fn set_origin(&mut self, origin: &str) {
        self.origin = origin.to_string();
    }

    /// Add a message to `context`, creating the context on first use.
    pub fn insert(&mut self, context: &str, message: Message) -> Result<Inserted, CatalogError> {
        let pos = match self.context_index.get(context) {
            Some(&pos) => pos,
            None => {
                self.contexts.push(Context::new(context));
                self.context_index
                    .insert(context.to_string(), self.contexts.len() - 1);
                self.contexts.len() - 1
            }
        };
        self.contexts[pos].insert(message)
    }

    /// Make sure `context` exists, even with no messages.
    pub fn ensure_context(&mut self, context: &str) {
        if !self.context_index.contains_key(context) {
            self.contexts.push(Context::new(context));
            self.context_index
                .insert(context.to_string(), self.contexts.len() - 1);
        }
    }

    /// Format version from the `TS` element.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Target language tag as written in the document.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Source language tag, if declared.
    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    /// Where the catalog was read from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Plural rule derived from the target language.
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// Contexts in document order.
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Context by name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.context_index.get(name).map(|&pos| &self.contexts[pos])
    }

    /// Every message with its context, in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&Context, &Message)> {
        self.contexts
            .iter()
            .flat_map(|context| context.messages.iter().map(move |m| (context, m)))
    }

    /// Total number of messages, including obsolete ones.
    pub fn len(&self) -> usize {
        self.contexts.iter().map(Context::len).sum()
    }

    /// Whether the catalog holds no messages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live message for the triple, if any.
    pub fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Message> {
        self.context(context)?.find(source, comment)
    }

    /// Translation for the triple, `None` when lookup would fall back.
    pub fn translation(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&str> {
        self.find(context, source, comment)?.resolved()
    }

    /// Resolve a message, falling back to `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_catalog::{Catalog, Message};
    ///
    /// let mut catalog = Catalog::new(Some("en_US"));
    /// catalog
    ///     .insert("SidePanel", Message::new("通用设置", Some("f_config_general"), "General Config"))
    ///     .unwrap();
    ///
    /// assert_eq!(catalog.lookup("SidePanel", "通用设置", Some("f_config_general")), "General Config");
    /// assert_eq!(catalog.lookup("SidePanel", "通用设置", None), "通用设置");
    /// assert_eq!(catalog.lookup("Nowhere", "通用设置", None), "通用设置");
    /// ```
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        match self.translation(context, source, comment) {
            Some(text) => text,
            None => {
                tracing::trace!(context, source, comment = ?comment, "translation missing, using source");
                source
            }
        }
    }

    /// Resolve a plural message for count `n` and substitute `%n`.
    pub fn lookup_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: u64,
    ) -> String {
        let template = self
            .find(context, source, comment)
            .and_then(|message| select_form(message, self.plural_rule, n))
            .unwrap_or(source);
        format::substitute_count(template, n)
    }

    /// Resolve a message and substitute positional arguments.
    ///
    /// # Errors
    ///
    /// [`CatalogError::PlaceholderMismatch`] in [`FormatMode::Strict`] when
    /// the resolved template and `args` disagree on count.
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

    /// Content digest over everything that a written document would carry.
    ///
    /// Two catalogs with equal fingerprints resolve every lookup the same
    /// way.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        let mut field = |value: &str| {
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        };
        field(&self.version);
        field(self.language.as_deref().unwrap_or(""));
        field(self.source_language.as_deref().unwrap_or(""));
        for context in &self.contexts {
            field("\u{1}context");
            field(&context.name);
            for message in &context.messages {
                field("\u{1}message");
                field(&message.source);
                field(message.comment.as_deref().unwrap_or("\u{0}"));
                field(message.status.as_attr().unwrap_or(""));
                match &message.translation {
                    Translation::Text(text) => field(text),
                    Translation::Numerus(forms) => {
                        field("\u{1}numerus");
                        for form in forms {
                            field(form);
                        }
                    }
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Render the catalog as a `.ts` document.
    pub fn to_ts_string(&self) -> String {
        writer::write_document(self)
    }
}

/// Numerus form for `n`, or the singular text for ordinary messages.
pub(crate) fn select_form(message: &Message, rule: PluralRule, n: u64) -> Option<&str> {
    if !message.is_live() {
        return None;
    }
    match &message.translation {
        Translation::Numerus(forms) => rule.select(forms, n).filter(|form| !form.is_empty()),
        Translation::Text(_) => message.resolved(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TranslationStatus;

    fn side_panel() -> Catalog {
        let mut catalog = Catalog::new(Some("en_US"));
        catalog
            .insert("SidePanel", Message::new("子图{}", Some("f_subplot"), "Subplot {}"))
            .unwrap();
        catalog
            .insert("SidePanel", Message::new("小时", Some("f_time_hour"), "Hour"))
            .unwrap();
        catalog
            .insert("AxisConfigPanel", Message::new("自动", Some("f_auto"), "Auto"))
            .unwrap();
        catalog
    }

    #[test]
    fn lookup_resolves_and_falls_back() {
        let catalog = side_panel();
        assert_eq!(catalog.lookup("SidePanel", "小时", Some("f_time_hour")), "Hour");
        assert_eq!(catalog.lookup("SidePanel", "小时", Some("other")), "小时");
        assert_eq!(catalog.lookup("SidePanel", "天", Some("f_time_day")), "天");
        assert_eq!(catalog.lookup("Missing", "小时", Some("f_time_hour")), "小时");
    }

    #[test]
    fn comment_key_does_not_fall_back_to_bare_source() {
        let mut catalog = Catalog::new(Some("zh_CN"));
        catalog.insert("MainWindow", Message::new("Auto", None, "跟随系统")).unwrap();
        assert_eq!(catalog.lookup("MainWindow", "Auto", None), "跟随系统");
        assert_eq!(catalog.lookup("MainWindow", "Auto", Some("theme")), "Auto");
    }

    #[test]
    fn same_source_different_comments_coexist() {
        let mut catalog = Catalog::new(Some("en_US"));
        catalog
            .insert("AxisConfigPanel", Message::new("值", Some("f_value_axis_src"), "Source Value:"))
            .unwrap();
        catalog
            .insert("AxisConfigPanel", Message::new("值", Some("f_value_axis_tgt"), "Target Value:"))
            .unwrap();
        assert_eq!(
            catalog.lookup("AxisConfigPanel", "值", Some("f_value_axis_tgt")),
            "Target Value:"
        );
    }

    #[test]
    fn conflicting_duplicate_rejected() {
        let mut catalog = side_panel();
        let err = catalog
            .insert("SidePanel", Message::new("小时", Some("f_time_hour"), "Hours"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKey { ref context, .. } if context == "SidePanel"));
    }

    #[test]
    fn identical_duplicate_collapses() {
        let mut catalog = side_panel();
        let outcome = catalog
            .insert("SidePanel", Message::new("小时", Some("f_time_hour"), "Hour"))
            .unwrap();
        assert_eq!(outcome, Inserted::Collapsed);
        assert_eq!(catalog.context("SidePanel").unwrap().len(), 2);
    }

    #[test]
    fn obsolete_entries_do_not_conflict_or_resolve() {
        let mut catalog = side_panel();
        catalog
            .insert(
                "SidePanel",
                Message::new("小时", Some("f_time_hour"), "Hours (old)")
                    .with_status(TranslationStatus::Obsolete),
            )
            .unwrap();
        catalog
            .insert(
                "SidePanel",
                Message::new("分钟", None, "Minute").with_status(TranslationStatus::Vanished),
            )
            .unwrap();
        assert_eq!(catalog.lookup("SidePanel", "小时", Some("f_time_hour")), "Hour");
        assert_eq!(catalog.lookup("SidePanel", "分钟", None), "分钟");
    }

    #[test]
    fn format_substitutes_after_lookup() {
        let catalog = side_panel();
        assert_eq!(
            catalog
                .format("SidePanel", "子图{}", Some("f_subplot"), &["3"], FormatMode::Lenient)
                .unwrap(),
            "Subplot 3"
        );
        assert_eq!(
            catalog
                .format("SidePanel", "子图{}", Some("missing"), &["3"], FormatMode::Lenient)
                .unwrap(),
            "子图3"
        );
        assert!(catalog
            .format("SidePanel", "子图{}", Some("f_subplot"), &["3", "4"], FormatMode::Strict)
            .is_err());
    }

    #[test]
    fn plural_lookup_uses_language_rule() {
        let mut catalog = Catalog::new(Some("en_US"));
        catalog
            .insert(
                "CurveConfigPanel",
                Message::numerus("%n 条曲线", None, vec!["%n curve".into(), "%n curves".into()]),
            )
            .unwrap();
        assert_eq!(catalog.lookup_plural("CurveConfigPanel", "%n 条曲线", None, 1), "1 curve");
        assert_eq!(catalog.lookup_plural("CurveConfigPanel", "%n 条曲线", None, 4), "4 curves");
        assert_eq!(catalog.lookup_plural("CurveConfigPanel", "%n 个", None, 4), "4 个");
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = side_panel();
        let b = side_panel();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = side_panel();
        c.insert("SidePanel", Message::new("天", Some("f_time_day"), "Day"))
            .unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let catalog = side_panel();
        let names: Vec<&str> = catalog.contexts().iter().map(Context::name).collect();
        assert_eq!(names, vec!["SidePanel", "AxisConfigPanel"]);
        let sources: Vec<&str> = catalog.messages().map(|(_, m)| m.source.as_str()).collect();
        assert_eq!(sources, vec!["子图{}", "小时", "自动"]);
    }
}
