// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locale identifiers and language metadata.
//!
//! ## Supported shapes
//!
//! | Input          | Normalized   | Fallback chain             |
//! |----------------|--------------|----------------------------|
//! | `zh_CN.UTF-8`  | `zh_CN`      | `zh_CN`, `zh`              |
//! | `en-US`        | `en_US`      | `en_US`, `en`              |
//! | `zh-Hans-CN`   | `zh_Hans_CN` | `zh_Hans_CN`, `zh_Hans`, `zh` |
//! | `ja`           | `ja`         | `ja`                       |
//!
//! Plural rules are chosen from the language subtag so that numerus
//! messages pick the right `<numerusform>`.

mod iso639;
mod locale;
mod plural;

pub use iso639::{is_valid_iso639_1, language_name, native_name};
pub use locale::{detect_locale_with, detect_system_locale, Locale, LOCALE_ENV_VARS};
pub use plural::PluralRule;
