// SPDX-License-Identifier: PMPL-1.0-or-later

//! Positional placeholder substitution for translated templates.
//!
//! Templates use the brace syntax the resource files already carry
//! (`"Subplot {}"`, `"Found new version: {}"`):
//!
//! - `{}` consumes the next positional argument
//! - `{N}` takes argument `N` without advancing the positional cursor
//! - `{{` and `}}` are literal braces
//! - anything else in braces (`{name}`) and unclosed braces are copied through
//!
//! Substitution is single-pass: argument values are never re-scanned.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};

/// How to treat a placeholder/argument count mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// Substitute what is available; unmatched placeholders stay verbatim.
    #[default]
    Lenient,
    /// Reject templates whose placeholder count differs from the arguments.
    Strict,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Char(char),
    Next,
    Index(usize, &'a str),
}

fn tokenize(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                push_literal(&mut segments, template, literal_start, i);
                segments.push(Segment::Char(bytes[i] as char));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let Some(close) = template[i + 1..].find('}') else {
                    // Unclosed: the rest is literal text.
                    break;
                };
                let inner = &template[i + 1..i + 1 + close];
                let segment = if inner.is_empty() {
                    Some(Segment::Next)
                } else if inner.bytes().all(|b| b.is_ascii_digit()) {
                    inner
                        .parse::<usize>()
                        .ok()
                        .map(|idx| Segment::Index(idx, &template[i..i + close + 2]))
                } else {
                    None
                };
                match segment {
                    Some(segment) => {
                        push_literal(&mut segments, template, literal_start, i);
                        segments.push(segment);
                        i += close + 2;
                        literal_start = i;
                    }
                    None => i += 1,
                }
            }
            _ => i += 1,
        }
    }
    push_literal(&mut segments, template, literal_start, template.len());
    segments
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, template: &'a str, start: usize, end: usize) {
    if start < end {
        segments.push(Segment::Literal(&template[start..end]));
    }
}

/// Number of arguments a template consumes.
///
/// This is the larger of the `{}` count and the highest `{N}` index plus one.
pub fn placeholder_count(template: &str) -> usize {
    let mut next = 0;
    let mut max_index = 0;
    for segment in tokenize(template) {
        match segment {
            Segment::Next => next += 1,
            Segment::Index(idx, _) => max_index = max_index.max(idx.saturating_add(1)),
            Segment::Literal(_) | Segment::Char(_) => {}
        }
    }
    next.max(max_index)
}

/// Substitute positional arguments into `template`.
///
/// # Errors
///
/// Returns [`CatalogError::PlaceholderMismatch`] only in
/// [`FormatMode::Strict`] when the counts differ.
pub fn format_positional<S: AsRef<str>>(
    template: &str,
    args: &[S],
    mode: FormatMode,
) -> Result<String, CatalogError> {
    let segments = tokenize(template);

    if mode == FormatMode::Strict {
        let expected = placeholder_count(template);
        if expected != args.len() {
            return Err(CatalogError::PlaceholderMismatch {
                expected,
                supplied: args.len(),
            });
        }
    }

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Char(c) => out.push(c),
            Segment::Next => {
                match args.get(cursor) {
                    Some(arg) => out.push_str(arg.as_ref()),
                    None => out.push_str("{}"),
                }
                cursor += 1;
            }
            Segment::Index(idx, raw) => match args.get(idx) {
                Some(arg) => out.push_str(arg.as_ref()),
                None => out.push_str(raw),
            },
        }
    }
    Ok(out)
}

/// Replace Qt's `%n` / `%Ln` count markers with `n`.
pub fn substitute_count(template: &str, n: u64) -> String {
    if !template.contains('%') {
        return template.to_string();
    }
    let count = n.to_string();
    template.replace("%Ln", &count).replace("%n", &count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(template: &str, args: &[&str]) -> String {
        format_positional(template, args, FormatMode::Lenient).unwrap()
    }

    #[test]
    fn sequential_placeholders() {
        assert_eq!(lenient("Subplot {}", &["3"]), "Subplot 3");
        assert_eq!(lenient("{} of {}", &["1", "4"]), "1 of 4");
    }

    #[test]
    fn indexed_placeholders() {
        assert_eq!(lenient("{1} before {0}", &["a", "b"]), "b before a");
        assert_eq!(lenient("{0}{0}", &["x"]), "xx");
    }

    #[test]
    fn escapes_and_named_tokens_survive() {
        assert_eq!(lenient("{{}} {}", &["v"]), "{} v");
        assert_eq!(lenient("Hello {name}", &["v"]), "Hello {name}");
        assert_eq!(lenient("open {brace", &["v"]), "open {brace");
        assert_eq!(lenient("close } brace", &[]), "close } brace");
    }

    #[test]
    fn lenient_leaves_unmatched_verbatim() {
        assert_eq!(lenient("{} and {}", &["one"]), "one and {}");
        assert_eq!(lenient("{2}", &["a"]), "{2}");
        assert_eq!(lenient("plain", &["extra"]), "plain");
    }

    #[test]
    fn strict_rejects_mismatch() {
        let err = format_positional("{} and {}", &["one"], FormatMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::PlaceholderMismatch {
                expected: 2,
                supplied: 1
            }
        ));
        assert!(format_positional("plain", &["extra"], FormatMode::Strict).is_err());
        assert_eq!(
            format_positional("{} and {}", &["a", "b"], FormatMode::Strict).unwrap(),
            "a and b"
        );
    }

    #[test]
    fn counts_placeholders() {
        assert_eq!(placeholder_count("none"), 0);
        assert_eq!(placeholder_count("{} {}"), 2);
        assert_eq!(placeholder_count("{3}"), 4);
        assert_eq!(placeholder_count("{{}}"), 0);
    }

    #[test]
    fn huge_indices_do_not_overflow() {
        let max = format!("{{{}}}", usize::MAX);
        assert_eq!(placeholder_count(&max), usize::MAX);
        let err = format_positional(&max, &["a"], FormatMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::PlaceholderMismatch {
                expected: usize::MAX,
                supplied: 1
            }
        ));
        assert_eq!(lenient(&max, &["a"]), max);

        // Past usize the digits are plain text.
        let beyond = "{99999999999999999999999}";
        assert_eq!(placeholder_count(beyond), 0);
        assert_eq!(lenient(beyond, &["a"]), beyond);
    }

    #[test]
    fn arguments_are_not_rescanned() {
        assert_eq!(lenient("{} {}", &["{}", "x"]), "{} x");
    }

    #[test]
    fn count_markers() {
        assert_eq!(substitute_count("%n curves", 3), "3 curves");
        assert_eq!(substitute_count("%Ln files", 12), "12 files");
        assert_eq!(substitute_count("no marker", 1), "no marker");
    }
}
