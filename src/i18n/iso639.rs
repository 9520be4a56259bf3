// SPDX-License-Identifier: PMPL-1.0-or-later

//! Two-letter language codes and display names.
//!
//! [`Locale`](super::Locale) rejects a two-letter language subtag that is
//! not listed here; three-letter subtags pass through unchecked.

/// ISO 639-1 codes, sorted for binary search.
const CODES: &[&str] = &[
    "aa", "ab", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", //
    "ba", "be", "bg", "bh", "bi", "bm", "bn", "bo", "br", "bs", //
    "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv", "cy", //
    "da", "de", "dv", "dz", //
    "ee", "el", "en", "eo", "es", "et", "eu", //
    "fa", "ff", "fi", "fj", "fo", "fr", "fy", //
    "ga", "gd", "gl", "gn", "gu", "gv", //
    "ha", "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz", //
    "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", //
    "ja", "jv", //
    "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw", "ky", //
    "la", "lb", "lg", "li", "ln", "lo", "lt", "lu", "lv", //
    "mg", "mh", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", //
    "na", "nb", "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv", "ny", //
    "oc", "oj", "om", "or", "os", //
    "pa", "pi", "pl", "ps", "pt", //
    "qu", //
    "rm", "rn", "ro", "ru", "rw", //
    "sa", "sc", "sd", "se", "sg", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr", "ss", "st",
    "su", "sv", "sw", //
    "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr", "ts", "tt", "tw", "ty", //
    "ug", "uk", "ur", "uz", //
    "ve", "vi", "vo", //
    "wa", "wo", //
    "xh", //
    "yi", "yo", //
    "za", "zh", "zu",
];

/// `(code, English name, native name)` for the languages the plural rules
/// cover, plus a few common ones.
const NAMES: &[(&str, &str, &str)] = &[
    ("ar", "Arabic", "العربية"),
    ("be", "Belarusian", "Беларуская"),
    ("bs", "Bosnian", "Bosanski"),
    ("cs", "Czech", "Čeština"),
    ("da", "Danish", "Dansk"),
    ("de", "German", "Deutsch"),
    ("el", "Greek", "Ελληνικά"),
    ("en", "English", "English"),
    ("es", "Spanish", "Español"),
    ("fi", "Finnish", "Suomi"),
    ("fr", "French", "Français"),
    ("he", "Hebrew", "עברית"),
    ("hi", "Hindi", "हिन्दी"),
    ("hr", "Croatian", "Hrvatski"),
    ("hu", "Hungarian", "Magyar"),
    ("id", "Indonesian", "Bahasa Indonesia"),
    ("it", "Italian", "Italiano"),
    ("ja", "Japanese", "日本語"),
    ("ko", "Korean", "한국어"),
    ("ms", "Malay", "Bahasa Melayu"),
    ("nb", "Norwegian Bokmål", "Norsk bokmål"),
    ("nl", "Dutch", "Nederlands"),
    ("no", "Norwegian", "Norsk"),
    ("pl", "Polish", "Polski"),
    ("pt", "Portuguese", "Português"),
    ("ro", "Romanian", "Română"),
    ("ru", "Russian", "Русский"),
    ("sk", "Slovak", "Slovenčina"),
    ("sr", "Serbian", "Српски"),
    ("sv", "Swedish", "Svenska"),
    ("th", "Thai", "ไทย"),
    ("tr", "Turkish", "Türkçe"),
    ("uk", "Ukrainian", "Українська"),
    ("vi", "Vietnamese", "Tiếng Việt"),
    ("zh", "Chinese", "中文"),
];

/// Whether `code` is a lowercase ISO 639-1 code.
///
/// ```
/// use ts_catalog::i18n::is_valid_iso639_1;
///
/// assert!(is_valid_iso639_1("zh"));
/// assert!(!is_valid_iso639_1("ZH"));
/// ```
pub fn is_valid_iso639_1(code: &str) -> bool {
    CODES.binary_search(&code).is_ok()
}

fn names(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    NAMES.iter().find(|(known, _, _)| *known == code)
}

/// English name, shown by `tscat locale`.
pub fn language_name(code: &str) -> Option<&'static str> {
    names(code).map(|(_, english, _)| *english)
}

/// Name of the language written in that language.
pub fn native_name(code: &str) -> Option<&'static str> {
    names(code).map(|(_, _, native)| *native)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_table_is_sorted_and_unique() {
        assert!(CODES.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(CODES.iter().all(|code| code.len() == 2));
    }

    #[test]
    fn every_named_language_is_a_valid_code() {
        for (code, _, _) in NAMES {
            assert!(is_valid_iso639_1(code), "{code}");
        }
    }

    #[test]
    fn lookup_by_code() {
        assert!(is_valid_iso639_1("uk"));
        assert!(!is_valid_iso639_1("qq"));
        assert!(!is_valid_iso639_1("zho"));
        assert_eq!(language_name("zh"), Some("Chinese"));
        assert_eq!(native_name("cs"), Some("Čeština"));
        assert_eq!(native_name("eo"), None);
    }
}
