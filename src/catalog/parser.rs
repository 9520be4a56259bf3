// SPDX-License-Identifier: PMPL-1.0-or-later

//! `.ts` document reader.
//!
//! Streams quick-xml events through a small element stack. Text is kept
//! verbatim: trailing spaces in strings such as `起始时间: ` matter to the
//! UI, so nothing is trimmed. Whitespace between structural elements is
//! ignored; any other stray text is a structural error.

use super::Catalog;
use crate::error::CatalogError;
use crate::types::{Location, Message, Translation, TranslationStatus};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements whose character content we collect.
const TEXT_ELEMENTS: &[&str] = &[
    "name",
    "source",
    "comment",
    "oldsource",
    "oldcomment",
    "extracomment",
    "translatorcomment",
    "translation",
    "numerusform",
    "lengthvariant",
];

/// `<name>` plus the messages of an open `<context>` block.
#[derive(Default)]
struct ContextDraft {
    name: Option<String>,
    messages: Vec<Message>,
}

/// Fields of an open `<message>` block.
#[derive(Default)]
struct MessageDraft {
    numerus: bool,
    source: Option<String>,
    message: Message,
    forms: Vec<String>,
    /// Position of the `<message>` tag, for errors raised at `</message>`.
    opened_at: usize,
}

struct DocumentParser<'a> {
    input: &'a str,
    origin: &'a str,
    reader: Reader<&'a [u8]>,
    stack: Vec<String>,
    catalog: Option<Catalog>,
    closed_root: bool,
    context: Option<ContextDraft>,
    message: Option<MessageDraft>,
    text: String,
    capture: bool,
    variants_seen: usize,
    skip_depth: usize,
}

/// Parse a complete `.ts` document.
pub(crate) fn parse_document(input: &str, origin: &str) -> Result<Catalog, CatalogError> {
    let mut parser = DocumentParser {
        input,
        origin,
        reader: Reader::from_str(input),
        stack: Vec::new(),
        catalog: None,
        closed_root: false,
        context: None,
        message: None,
        text: String::new(),
        capture: false,
        variants_seen: 0,
        skip_depth: 0,
    };
    parser.run()
}

impl<'a> DocumentParser<'a> {
    fn run(&mut self) -> Result<Catalog, CatalogError> {
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let offset = to_offset(self.reader.error_position());
                    return Err(self.malformed_at(offset, err.to_string()));
                }
            };
            match event {
                Event::Start(e) => self.open(&e)?,
                Event::Empty(e) => {
                    self.open(&e)?;
                    let name = element_name(&e);
                    self.close(&name)?;
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.close(&name)?;
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| self.malformed(format!("bad character data: {err}")))?;
                    self.characters(&text)?;
                }
                Event::CData(e) => {
                    let raw = e.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|err| self.malformed(format!("bad CDATA section: {err}")))?
                        .to_string();
                    self.characters(&text)?;
                }
                Event::Eof => break,
                // Declaration, doctype, comments and processing instructions
                // carry no catalog data.
                _ => {}
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(self.malformed(format!("document ends inside <{open}>")));
        }
        let mut catalog = self
            .catalog
            .take()
            .ok_or_else(|| self.malformed("document has no <TS> root element".to_string()))?;
        catalog.set_origin(self.origin);
        Ok(catalog)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), CatalogError> {
        let name = element_name(e);
        // Every open, empty or not, is matched by one close().
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return Ok(());
        }

        let parent = self.stack.last().cloned();
        match (parent.as_deref(), name.as_str()) {
            (None, "TS") if !self.closed_root => self.open_root(e)?,
            (None, _) if self.closed_root => {
                return Err(self.malformed(format!("<{name}> after the </TS> root closed")));
            }
            (None, other) => {
                return Err(self.malformed(format!(
                    "root element must be <TS>, found <{other}>"
                )));
            }
            (Some("TS"), "context") => self.context = Some(ContextDraft::default()),
            (Some("context"), "context") => {
                return Err(self.malformed("<context> nested inside <context>".to_string()));
            }
            (Some("context"), "name") => {
                let named = self.context.as_ref().is_some_and(|c| c.name.is_some());
                if named {
                    return Err(self.malformed(
                        "<context> has more than one <name>; contexts must each be closed"
                            .to_string(),
                    ));
                }
                self.begin_text();
            }
            (Some("context"), "message") => {
                let named = self.context.as_ref().is_some_and(|c| c.name.is_some());
                if !named {
                    return Err(self.malformed("<message> before the context <name>".to_string()));
                }
                let numerus = self.attribute(e, "numerus")?.as_deref() == Some("yes");
                self.message = Some(MessageDraft {
                    numerus,
                    opened_at: self.position(),
                    ..MessageDraft::default()
                });
            }
            (Some(_), "message") => {
                return Err(self.malformed("<message> outside of a <context>".to_string()));
            }
            (Some("message"), "location") => {
                let location = Location {
                    filename: self.attribute(e, "filename")?,
                    line: self.attribute(e, "line")?,
                };
                if let Some(draft) = self.message.as_mut() {
                    draft.message.locations.push(location);
                }
            }
            (Some("message"), "translation") => {
                let kind = self.attribute(e, "type")?.unwrap_or_default();
                let status = TranslationStatus::from_attr(&kind).ok_or_else(|| {
                    self.malformed(format!("unknown translation type \"{kind}\""))
                })?;
                let numerus = self.message.as_ref().is_some_and(|d| d.numerus);
                if let Some(draft) = self.message.as_mut() {
                    draft.message.status = status;
                }
                self.begin_text();
                self.variants_seen = 0;
                // Numerus text lives in <numerusform> children.
                self.capture = !numerus;
            }
            (
                Some("message"),
                "source" | "comment" | "oldsource" | "oldcomment" | "extracomment"
                | "translatorcomment",
            ) => self.begin_text(),
            (Some("translation"), "numerusform") => {
                self.begin_text();
                self.variants_seen = 0;
            }
            (Some("translation" | "numerusform"), "lengthvariant") => {
                self.variants_seen += 1;
                if self.variants_seen == 1 {
                    self.text.clear();
                    self.capture = true;
                } else {
                    self.capture = false;
                }
            }
            (Some(_), "byte") => {
                let value = self.attribute(e, "value")?.unwrap_or_default();
                let ch = decode_byte(&value)
                    .ok_or_else(|| self.malformed(format!("bad <byte value=\"{value}\">")))?;
                if self.capture {
                    self.text.push(ch);
                }
                // <byte> is always empty; nothing to push on the stack.
                return Ok(());
            }
            (Some(parent), other) => {
                tracing::debug!(
                    origin = self.origin,
                    element = other,
                    parent,
                    "skipping unknown element"
                );
                self.skip_depth = 1;
                return Ok(());
            }
        }

        self.stack.push(name);
        Ok(())
    }

    fn open_root(&mut self, e: &BytesStart<'_>) -> Result<(), CatalogError> {
        let language = self.attribute(e, "language")?;
        let mut catalog = Catalog::new(language.as_deref().filter(|l| !l.is_empty()));
        if let Some(version) = self.attribute(e, "version")? {
            catalog.set_version(version);
        }
        catalog.set_source_language(
            self.attribute(e, "sourcelanguage")?
                .as_deref()
                .filter(|l| !l.is_empty()),
        );
        self.catalog = Some(catalog);
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), CatalogError> {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return Ok(());
        }
        if name == "byte" {
            return Ok(());
        }
        match self.stack.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(self.malformed(format!("</{name}> closes <{open}>")));
            }
            None => return Err(self.malformed(format!("unexpected </{name}>"))),
        }

        match name {
            "TS" => self.closed_root = true,
            "context" => self.finish_context()?,
            "name" => {
                let text = self.take_text();
                if let Some(context) = self.context.as_mut() {
                    context.name = Some(text);
                }
            }
            "message" => self.finish_message()?,
            "source" | "comment" | "oldsource" | "oldcomment" | "extracomment"
            | "translatorcomment" => {
                let text = self.take_text();
                if let Some(draft) = self.message.as_mut() {
                    let optional = (!text.is_empty()).then_some(text.clone());
                    match name {
                        "source" => draft.source = Some(text),
                        "comment" => draft.message.comment = optional,
                        "oldsource" => draft.message.old_source = optional,
                        "oldcomment" => draft.message.old_comment = optional,
                        "extracomment" => draft.message.extra_comment = optional,
                        _ => draft.message.translator_comment = optional,
                    }
                }
            }
            "numerusform" => {
                let text = self.take_text();
                if let Some(draft) = self.message.as_mut() {
                    draft.forms.push(text);
                }
            }
            "lengthvariant" => {
                // Whatever follows the first variant is discarded.
                self.capture = false;
            }
            "translation" => {
                let text = self.take_text();
                if let Some(draft) = self.message.as_mut() {
                    draft.message.translation = if draft.numerus {
                        Translation::Numerus(std::mem::take(&mut draft.forms))
                    } else {
                        Translation::Text(text)
                    };
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_message(&mut self) -> Result<(), CatalogError> {
        let Some(draft) = self.message.take() else {
            return Ok(());
        };
        let Some(source) = draft.source else {
            return Err(self.malformed_at(draft.opened_at, "<message> has no <source>".to_string()));
        };
        let mut message = draft.message;
        message.source = source;
        if draft.numerus && !message.is_numerus() {
            // numerus="yes" with no <translation> at all.
            message.translation = Translation::Numerus(Vec::new());
        }
        if let Some(context) = self.context.as_mut() {
            context.messages.push(message);
        }
        Ok(())
    }

    fn finish_context(&mut self) -> Result<(), CatalogError> {
        let Some(draft) = self.context.take() else {
            return Ok(());
        };
        let Some(name) = draft.name else {
            return Err(self.malformed("<context> has no <name>".to_string()));
        };
        let Some(catalog) = self.catalog.as_mut() else {
            return Ok(());
        };
        // A repeated context name continues the earlier block.
        catalog.ensure_context(&name);
        for message in draft.messages {
            catalog.insert(&name, message)?;
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), CatalogError> {
        if self.skip_depth > 0 {
            return Ok(());
        }
        if self.capture {
            self.text.push_str(text);
            return Ok(());
        }
        if text.trim().is_empty() {
            return Ok(());
        }
        let inside = match self.stack.last() {
            Some(open) if TEXT_ELEMENTS.contains(&open.as_str()) => return Ok(()),
            Some(open) => format!("inside <{open}>"),
            None => "outside the root element".to_string(),
        };
        Err(self.malformed(format!("unexpected text {inside}: {:?}", text.trim())))
    }

    fn begin_text(&mut self) {
        self.text.clear();
        self.capture = true;
    }

    fn take_text(&mut self) -> String {
        self.capture = false;
        std::mem::take(&mut self.text)
    }

    fn attribute(&self, e: &BytesStart<'_>, key: &str) -> Result<Option<String>, CatalogError> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.malformed(format!("bad attribute: {err}")))?;
            if attr.key.as_ref() == key.as_bytes() {
                let value = attr
                    .unescape_value()
                    .map_err(|err| self.malformed(format!("bad value for {key}: {err}")))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn position(&self) -> usize {
        to_offset(self.reader.buffer_position())
    }

    fn malformed(&self, message: String) -> CatalogError {
        self.malformed_at(self.position(), message)
    }

    fn malformed_at(&self, offset: usize, message: String) -> CatalogError {
        let (line, column) = line_column(self.input, offset);
        CatalogError::Malformed {
            origin: self.origin.to_string(),
            line,
            column,
            message,
        }
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn to_offset<P>(position: P) -> usize
where
    usize: TryFrom<P>,
{
    usize::try_from(position).unwrap_or(usize::MAX)
}

/// 1-based line and column (in characters) of a byte offset.
fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(input.len());
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Decode Qt's `<byte value="x1b"/>` / `<byte value="27"/>` escapes.
fn decode_byte(value: &str) -> Option<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
