// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for ts-catalog
//!
//! Mirrors the `<message>` element of a Qt Linguist `.ts` document. Only
//! `source`, `comment` and `translation` take part in lookup; the rest is
//! carried so that a catalog can be written back without losing data.

use serde::{Deserialize, Serialize};

/// Translation state as recorded by the `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// No `type` attribute: the translator marked the entry done.
    #[default]
    Finished,
    /// `type="unfinished"`: used for lookup when non-empty.
    Unfinished,
    /// `type="obsolete"`: source text no longer exists; never used.
    Obsolete,
    /// `type="vanished"`: like obsolete, written by newer lupdate.
    Vanished,
}

impl TranslationStatus {
    /// Parse the `type` attribute value. `None` for unknown values.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "" => Some(TranslationStatus::Finished),
            "unfinished" => Some(TranslationStatus::Unfinished),
            "obsolete" => Some(TranslationStatus::Obsolete),
            "vanished" => Some(TranslationStatus::Vanished),
            _ => None,
        }
    }

    /// Attribute value to write back, `None` for finished entries.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            TranslationStatus::Finished => None,
            TranslationStatus::Unfinished => Some("unfinished"),
            TranslationStatus::Obsolete => Some("obsolete"),
            TranslationStatus::Vanished => Some("vanished"),
        }
    }

    /// Whether entries with this status take part in lookup.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            TranslationStatus::Finished | TranslationStatus::Unfinished
        )
    }
}

/// Translated text: a single string or one string per plural form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation {
    /// Ordinary message.
    Text(String),
    /// `numerus="yes"` message, one entry per `<numerusform>`.
    Numerus(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Translation::Text(String::new())
    }
}

impl Translation {
    /// True when no form carries any text.
    pub fn is_empty(&self) -> bool {
        match self {
            Translation::Text(text) => text.is_empty(),
            Translation::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }

    /// Singular text: the text itself, or the first numerus form.
    pub fn singular(&self) -> Option<&str> {
        let text = match self {
            Translation::Text(text) => text.as_str(),
            Translation::Numerus(forms) => forms.first().map(String::as_str)?,
        };
        (!text.is_empty()).then_some(text)
    }
}

/// A `<location>` reference into the UI sources. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Kept as text: lupdate may write relative lines such as `+3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

/// One translatable message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Canonical text as written in the UI code.
    pub source: String,
    /// Disambiguation key; `None` when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub translation: Translation,
    #[serde(default)]
    pub status: TranslationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator_comment: Option<String>,
}

impl Message {
    /// A finished singular message.
    pub fn new(
        source: impl Into<String>,
        comment: Option<&str>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            comment: comment.filter(|c| !c.is_empty()).map(str::to_string),
            translation: Translation::Text(translation.into()),
            ..Self::default()
        }
    }

    /// A finished numerus message.
    pub fn numerus(source: impl Into<String>, comment: Option<&str>, forms: Vec<String>) -> Self {
        Self {
            translation: Translation::Numerus(forms),
            ..Self::new(source, comment, "")
        }
    }

    /// Same message with a different status.
    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the message takes part in lookup.
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Text a lookup resolves to, `None` if it must fall back to the source.
    pub fn resolved(&self) -> Option<&str> {
        if self.is_live() {
            self.translation.singular()
        } else {
            None
        }
    }

    /// Whether lookup would return a translator-approved string.
    pub fn is_finished(&self) -> bool {
        self.status == TranslationStatus::Finished && !self.translation.is_empty()
    }

    /// Whether this is a plural message.
    pub fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Numerus(_))
    }
}
