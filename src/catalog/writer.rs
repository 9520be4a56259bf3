// SPDX-License-Identifier: PMPL-1.0-or-later

//! `.ts` document writer in lupdate's layout.

use super::Catalog;
use crate::types::{Message, Translation};
use quick_xml::escape::escape;
use std::borrow::Cow;
use std::fmt::Write;

pub(crate) fn write_document(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n");
    out.push_str("<TS version=\"");
    out.push_str(&escape(catalog.version()));
    out.push('"');
    if let Some(language) = catalog.language() {
        let _ = write!(out, " language=\"{}\"", escape(language));
    }
    if let Some(source_language) = catalog.source_language() {
        let _ = write!(out, " sourcelanguage=\"{}\"", escape(source_language));
    }
    out.push_str(">\n");

    for context in catalog.contexts() {
        out.push_str("<context>\n");
        let _ = writeln!(out, "    <name>{}</name>", text(context.name()));
        for message in context.messages() {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }
    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, message: &Message) {
    if message.is_numerus() {
        out.push_str("    <message numerus=\"yes\">\n");
    } else {
        out.push_str("    <message>\n");
    }
    for location in &message.locations {
        out.push_str("        <location");
        if let Some(filename) = &location.filename {
            let _ = write!(out, " filename=\"{}\"", escape(filename.as_str()));
        }
        if let Some(line) = &location.line {
            let _ = write!(out, " line=\"{}\"", escape(line.as_str()));
        }
        out.push_str("/>\n");
    }
    element(out, "source", Some(&message.source));
    element(out, "oldsource", message.old_source.as_deref());
    element(out, "comment", message.comment.as_deref());
    element(out, "oldcomment", message.old_comment.as_deref());
    element(out, "extracomment", message.extra_comment.as_deref());
    element(out, "translatorcomment", message.translator_comment.as_deref());

    let kind = message
        .status
        .as_attr()
        .map(|attr| format!(" type=\"{attr}\""))
        .unwrap_or_default();
    match &message.translation {
        Translation::Text(text) => {
            let _ = writeln!(
                out,
                "        <translation{kind}>{}</translation>",
                self::text(text)
            );
        }
        Translation::Numerus(forms) => {
            let _ = writeln!(out, "        <translation{kind}>");
            for form in forms {
                let _ = writeln!(
                    out,
                    "            <numerusform>{}</numerusform>",
                    text(form)
                );
            }
            out.push_str("        </translation>\n");
        }
    }
    out.push_str("    </message>\n");
}

fn element(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = writeln!(out, "        <{name}>{}</{name}>", text(value));
    }
}

/// Escaped character data. Characters XML 1.0 cannot carry are written as
/// `<byte value="xNN"/>`, as lupdate does.
fn text(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_byte_element) {
        return escape(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    let mut start = 0;
    for (i, ch) in value.char_indices() {
        if needs_byte_element(ch) {
            out.push_str(&escape(&value[start..i]));
            let _ = write!(out, "<byte value=\"x{:x}\"/>", u32::from(ch));
            start = i + ch.len_utf8();
        }
    }
    out.push_str(&escape(&value[start..]));
    Cow::Owned(out)
}

fn needs_byte_element(ch: char) -> bool {
    matches!(
        ch,
        '\0'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}
