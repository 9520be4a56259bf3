// SPDX-License-Identifier: PMPL-1.0-or-later

//! Numerus form selection.
//!
//! A `numerus="yes"` message stores one `<numerusform>` per plural form of
//! the target language, in the order Qt Linguist presents them. The rule
//! only has to map a count to an index into that list.

use serde::{Deserialize, Serialize};

/// Plural rule families, keyed by language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluralRule {
    /// One form for every count (Chinese, Japanese, Korean, ...).
    Single,
    /// `1` vs everything else (English, German, Spanish, ...).
    OneOther,
    /// `0` and `1` share the singular (French, Brazilian Portuguese).
    French,
    /// Russian-style three forms on the last two digits.
    Slavic,
    /// Polish three forms.
    Polish,
    /// Czech/Slovak: `1`, `2..=4`, other.
    Czech,
}

impl PluralRule {
    /// Rule for a language subtag, with an optional territory.
    pub fn for_language(language: &str, territory: Option<&str>) -> Self {
        match (language, territory) {
            ("zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms", _) => PluralRule::Single,
            ("fr", _) | ("pt", Some("BR")) => PluralRule::French,
            ("ru" | "uk" | "be" | "sr" | "hr" | "bs", _) => PluralRule::Slavic,
            ("pl", _) => PluralRule::Polish,
            ("cs" | "sk", _) => PluralRule::Czech,
            _ => PluralRule::OneOther,
        }
    }

    /// Number of forms this rule distinguishes.
    pub fn form_count(&self) -> usize {
        match self {
            PluralRule::Single => 1,
            PluralRule::OneOther | PluralRule::French => 2,
            PluralRule::Slavic | PluralRule::Polish | PluralRule::Czech => 3,
        }
    }

    /// Form index for `n`.
    pub fn index(&self, n: u64) -> usize {
        let mod10 = n % 10;
        let mod100 = n % 100;
        match self {
            PluralRule::Single => 0,
            PluralRule::OneOther => usize::from(n != 1),
            PluralRule::French => usize::from(n > 1),
            PluralRule::Slavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            PluralRule::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            PluralRule::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
        }
    }

    /// Pick the form for `n`, clamping to the last available form.
    pub fn select<'a>(&self, forms: &'a [String], n: u64) -> Option<&'a str> {
        let last = forms.len().checked_sub(1)?;
        forms.get(self.index(n).min(last)).map(String::as_str)
    }
}

impl Default for PluralRule {
    fn default() -> Self {
        PluralRule::OneOther
    }
}
