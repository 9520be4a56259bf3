// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locale identifiers for catalog selection.
//!
//! Catalog files are named after their locale (`zh_CN.ts`,
//! `plotter_en_US.ts`), so a [`Locale`] renders to the underscore form.
//! Parsing is lenient about the input shape: POSIX environment values
//! (`zh_CN.UTF-8`, `de_DE@euro`) and BCP 47 tags (`zh-Hans-CN`, `en-US`)
//! both normalize to the same identifier.

use crate::error::CatalogError;
use crate::i18n::iso639;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Environment variables consulted by [`detect_system_locale`], in order.
pub const LOCALE_ENV_VARS: [&str; 3] = ["LANG", "LC_ALL", "LC_MESSAGES"];

fn locale_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<lang>[A-Za-z]{2,3})(?:[_-](?P<script>[A-Za-z]{4}))?(?:[_-](?P<territory>[A-Za-z]{2}|[0-9]{3}))?(?:\.[A-Za-z0-9_-]+)?(?:@[A-Za-z0-9_-]+)?$",
        )
        .expect("locale pattern is valid")
    })
}

/// A normalized `language[_Script][_TERRITORY]` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    script: Option<String>,
    territory: Option<String>,
}

impl Locale {
    /// Parse and normalize a locale string.
    ///
    /// Two-letter languages must be ISO 639-1 codes. `C` and `POSIX` are
    /// rejected: they name the absence of a locale, not a language.
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("c") || trimmed.eq_ignore_ascii_case("posix") {
            return Err(CatalogError::InvalidLocale(value.to_string()));
        }
        let caps = locale_pattern()
            .captures(trimmed)
            .ok_or_else(|| CatalogError::InvalidLocale(value.to_string()))?;

        let language = caps["lang"].to_ascii_lowercase();
        if language.len() == 2 && !iso639::is_valid_iso639_1(&language) {
            return Err(CatalogError::InvalidLocale(value.to_string()));
        }
        let script = caps.name("script").map(|m| title_case(m.as_str()));
        let territory = caps.name("territory").map(|m| m.as_str().to_ascii_uppercase());

        Ok(Locale {
            language,
            script,
            territory,
        })
    }

    /// Language subtag, lowercase.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Script subtag in title case, if any.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Territory subtag, uppercase, if any.
    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref()
    }

    /// Canonical tag used in resource file names.
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        for part in [&self.script, &self.territory].into_iter().flatten() {
            tag.push('_');
            tag.push_str(part);
        }
        tag
    }

    /// Tags to try, most specific first.
    ///
    /// `zh_Hans_CN` yields `[zh_Hans_CN, zh_Hans, zh]`; `en_US` yields
    /// `[en_US, en]`.
    pub fn fallback_chain(&self) -> Vec<String> {
        let mut chain = vec![self.tag()];
        if self.script.is_some() && self.territory.is_some() {
            chain.push(Locale {
                language: self.language.clone(),
                script: self.script.clone(),
                territory: None,
            }
            .tag());
        }
        if self.script.is_some() || self.territory.is_some() {
            chain.push(self.language.clone());
        }
        chain
    }

    /// English name of the language, when known.
    pub fn language_name(&self) -> Option<&'static str> {
        iso639::language_name(&self.language)
    }

    /// Native name of the language, when known.
    pub fn native_name(&self) -> Option<&'static str> {
        iso639::native_name(&self.language)
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_ascii_uppercase()
            .to_string()
            .chars()
            .chain(chars.map(|c| c.to_ascii_lowercase()))
            .collect(),
        None => String::new(),
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag()
    }
}

/// Detect the user interface locale from the process environment.
///
/// Checks `LANG`, then `LC_ALL`, then `LC_MESSAGES`; the first value that
/// parses wins.
pub fn detect_system_locale() -> Option<Locale> {
    detect_locale_with(|name| std::env::var(name).ok())
}

/// [`detect_system_locale`] over an arbitrary variable lookup.
pub fn detect_locale_with<F>(lookup: F) -> Option<Locale>
where
    F: Fn(&str) -> Option<String>,
{
    LOCALE_ENV_VARS.iter().find_map(|name| {
        let value = lookup(name)?;
        match Locale::parse(&value) {
            Ok(locale) => Some(locale),
            Err(_) => {
                tracing::debug!(variable = *name, value = %value, "ignoring unusable locale value");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn posix_values_normalize() {
        let locale = Locale::parse("zh_CN.UTF-8").unwrap();
        assert_eq!(locale.tag(), "zh_CN");
        assert_eq!(Locale::parse("de_DE@euro").unwrap().tag(), "de_DE");
        assert_eq!(Locale::parse("EN_us").unwrap().tag(), "en_US");
    }

    #[test]
    fn bcp47_tags_normalize() {
        let locale = Locale::parse("zh-hans-cn").unwrap();
        assert_eq!(locale.tag(), "zh_Hans_CN");
        assert_eq!(locale.script(), Some("Hans"));
        assert_eq!(locale.territory(), Some("CN"));
        assert_eq!(Locale::parse("es-419").unwrap().tag(), "es_419");
    }

    #[test]
    fn rejects_non_locales() {
        assert!(Locale::parse("C").is_err());
        assert!(Locale::parse("POSIX").is_err());
        assert!(Locale::parse("xx_XX").is_err());
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("en_US_extra_junk").is_err());
    }

    #[test]
    fn fallback_chain_shortens() {
        assert_eq!(
            Locale::parse("zh_Hans_CN").unwrap().fallback_chain(),
            vec!["zh_Hans_CN", "zh_Hans", "zh"]
        );
        assert_eq!(Locale::parse("en_US").unwrap().fallback_chain(), vec!["en_US", "en"]);
        assert_eq!(Locale::parse("en").unwrap().fallback_chain(), vec!["en"]);
    }

    #[test]
    fn detection_follows_variable_order() {
        let env: HashMap<&str, &str> = [("LC_ALL", "fr_FR.UTF-8"), ("LC_MESSAGES", "de_DE")]
            .into_iter()
            .collect();
        let found = detect_locale_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(found.map(|l| l.tag()), Some("fr_FR".to_string()));
    }

    #[test]
    fn detection_skips_c_locale() {
        let env: HashMap<&str, &str> = [("LANG", "C"), ("LC_MESSAGES", "ja_JP.UTF-8")]
            .into_iter()
            .collect();
        let found = detect_locale_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(found.map(|l| l.tag()), Some("ja_JP".to_string()));
    }

    #[test]
    fn serde_uses_tag() {
        let locale: Locale = serde_json::from_str("\"zh-CN\"").unwrap();
        assert_eq!(serde_json::to_string(&locale).unwrap(), "\"zh_CN\"");
    }
}
