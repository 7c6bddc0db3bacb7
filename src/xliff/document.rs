use std::ops::Range;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use super::{Segment, TermsMap, TransUnit, XliffError};
use crate::locale::Locale;

const DEFAULT_INDENT_STEP: &str = "  ";

/// A parsed XLIFF document that can be written back with a new set of units.
///
/// The original text is kept; rendering splices new `<body>` content into it
/// so bytes outside the first `<file>`'s body are preserved.
#[derive(Debug, Clone)]
pub struct XliffDocument {
    text: String,
    file: FileTag,
    body: BodySpan,
    layout: Layout,
    units: TermsMap,
    body_extras: Vec<String>,
}

#[derive(Debug, Clone)]
struct FileTag {
    span: Range<usize>,
    name: String,
    /// Attribute name and raw (still escaped) value, in document order.
    attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct BodySpan {
    /// Range replaced on render: the inner content, or the whole `<body/>` tag.
    replace: Range<usize>,
    self_closing: bool,
    name: String,
}

#[derive(Debug, Clone)]
struct Layout {
    body_indent: String,
    unit_indent: String,
    step: String,
}

struct BodyContent {
    units: TermsMap,
    extras: Vec<String>,
    close_start: usize,
    unit_indent: Option<String>,
}

impl XliffDocument {
    pub fn parse(text: impl Into<String>) -> Result<Self, XliffError> {
        let text = text.into();
        let mut reader = Reader::from_str(&text);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut files_seen = 0usize;
        let mut file: Option<FileTag> = None;
        let mut parsed_body: Option<(BodySpan, String, BodyContent)> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| xml_error(&reader, e))?;
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    let local = e.local_name().as_ref().to_vec();
                    if stack.is_empty() && local != b"xliff" {
                        return Err(XliffError::UnexpectedRoot(lossy(&local)));
                    }
                    if stack.len() == 1 && local == b"file" {
                        files_seen += 1;
                        if files_seen == 1 {
                            file = Some(FileTag::from_start(&e, start..end, &reader)?);
                        }
                    }
                    if in_first_file(&stack, files_seen) && local == b"body" && parsed_body.is_none() {
                        let content = parse_body(&mut reader, &text)?;
                        let span = BodySpan {
                            replace: end..content.close_start,
                            self_closing: false,
                            name: lossy(e.name().as_ref()),
                        };
                        let body_indent = line_indent_before(&text, start).unwrap_or_default();
                        parsed_body = Some((span, body_indent, content));
                        // parse_body consumed the closing tag
                        continue;
                    }
                    stack.push(local);
                }
                Event::Empty(e) => {
                    let local = e.local_name().as_ref().to_vec();
                    if stack.is_empty() {
                        return Err(if local == b"xliff" {
                            XliffError::MissingElement("file")
                        } else {
                            XliffError::UnexpectedRoot(lossy(&local))
                        });
                    }
                    if stack.len() == 1 && local == b"file" {
                        files_seen += 1;
                        if files_seen == 1 {
                            return Err(XliffError::MissingElement("body"));
                        }
                    }
                    if in_first_file(&stack, files_seen) && local == b"body" && parsed_body.is_none() {
                        let span = BodySpan {
                            replace: start..end,
                            self_closing: true,
                            name: lossy(e.name().as_ref()),
                        };
                        let body_indent = line_indent_before(&text, start).unwrap_or_default();
                        let content = BodyContent {
                            units: TermsMap::new(),
                            extras: Vec::new(),
                            close_start: end,
                            unit_indent: None,
                        };
                        parsed_body = Some((span, body_indent, content));
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XliffError::UnexpectedEof("xliff"));
        }
        let file = file.ok_or(XliffError::MissingElement("file"))?;
        let (body, body_indent, content) = parsed_body.ok_or(XliffError::MissingElement("body"))?;

        let unit_indent = content
            .unit_indent
            .unwrap_or_else(|| format!("{}{}", body_indent, DEFAULT_INDENT_STEP));
        let step = match unit_indent.strip_prefix(body_indent.as_str()) {
            Some(step) if !step.is_empty() => step.to_string(),
            _ => DEFAULT_INDENT_STEP.to_string(),
        };

        Ok(Self {
            text,
            file,
            body,
            layout: Layout {
                body_indent,
                unit_indent,
                step,
            },
            units: content.units,
            body_extras: content.extras,
        })
    }

    pub fn units(&self) -> &TermsMap {
        &self.units
    }

    pub fn into_units(self) -> TermsMap {
        self.units
    }

    /// Value of the first `<file>` element's `target-language` attribute.
    pub fn target_language(&self) -> Option<&str> {
        self.file
            .attributes
            .iter()
            .find(|(name, _)| name == "target-language")
            .map(|(_, value)| value.as_str())
    }

    /// The document with the first body's units replaced by `units`.
    ///
    /// With `target_language` set, the first `<file>` element's
    /// `target-language` attribute is set to it.
    pub fn render<'a, I>(&self, units: I, target_language: Option<&Locale>) -> String
    where
        I: IntoIterator<Item = &'a TransUnit>,
    {
        let Layout {
            body_indent,
            unit_indent,
            step,
        } = &self.layout;

        let mut body = String::new();
        for unit in units {
            body.push('\n');
            body.push_str(unit_indent);
            unit.write_xml(&mut body, unit_indent, step);
        }
        for extra in &self.body_extras {
            body.push('\n');
            body.push_str(unit_indent);
            body.push_str(extra);
        }
        body.push('\n');
        body.push_str(body_indent);

        let file_tag = match target_language {
            Some(locale) if self.target_language() != Some(locale.as_str()) => {
                self.file.stamped(locale)
            }
            _ => self.text[self.file.span.clone()].to_string(),
        };

        let mut out = String::with_capacity(self.text.len() + body.len());
        out.push_str(&self.text[..self.file.span.start]);
        out.push_str(&file_tag);
        out.push_str(&self.text[self.file.span.end..self.body.replace.start]);
        if self.body.self_closing {
            out.push('<');
            out.push_str(&self.body.name);
            out.push('>');
            out.push_str(&body);
            out.push_str("</");
            out.push_str(&self.body.name);
            out.push('>');
        } else {
            out.push_str(&body);
        }
        out.push_str(&self.text[self.body.replace.end..]);
        out
    }
}

impl FileTag {
    fn from_start(
        e: &BytesStart<'_>,
        span: Range<usize>,
        reader: &Reader<&[u8]>,
    ) -> Result<Self, XliffError> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| xml_error(reader, err.into()))?;
            attributes.push((lossy(attr.key.as_ref()), lossy(&attr.value)));
        }
        Ok(Self {
            span,
            name: lossy(e.name().as_ref()),
            attributes,
        })
    }

    fn stamped(&self, locale: &Locale) -> String {
        let mut tag = format!("<{}", self.name);
        let mut stamped = false;
        for (name, value) in &self.attributes {
            let value = if name == "target-language" {
                stamped = true;
                locale.as_str()
            } else {
                value.as_str()
            };
            tag.push_str(&format!(" {}=\"{}\"", name, value.replace('"', "&quot;")));
        }
        if !stamped {
            tag.push_str(&format!(" target-language=\"{}\"", locale));
        }
        tag.push('>');
        tag
    }
}

fn in_first_file(stack: &[Vec<u8>], files_seen: usize) -> bool {
    files_seen == 1 && stack.len() == 2 && stack[1] == b"file"
}

/// Read the children of `<body>` up to and including `</body>`.
fn parse_body(reader: &mut Reader<&[u8]>, text: &str) -> Result<BodyContent, XliffError> {
    let mut units = TermsMap::new();
    let mut extras = Vec::new();
    let mut unit_indent = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| xml_error(reader, e))?;

        match event {
            Event::Start(e) if e.local_name().as_ref() == b"trans-unit" => {
                if unit_indent.is_none() {
                    unit_indent = line_indent_before(text, start);
                }
                units.insert(parse_trans_unit(reader, text, &e, start)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"trans-unit" => {
                let id = unit_id(&e, reader)?.ok_or(XliffError::MissingId { position: start })?;
                return Err(XliffError::MissingSource { id });
            }
            Event::Start(e) => {
                reader
                    .read_to_end(e.name())
                    .map_err(|err| xml_error(reader, err))?;
                extras.push(text[start..reader.buffer_position() as usize].to_string());
            }
            Event::Empty(_) | Event::Comment(_) | Event::CData(_) | Event::PI(_) => {
                extras.push(text[start..reader.buffer_position() as usize].to_string());
            }
            Event::Text(_) => push_text(&mut extras, &text[start..reader.buffer_position() as usize]),
            Event::End(_) => {
                return Ok(BodyContent {
                    units,
                    extras,
                    close_start: start,
                    unit_indent,
                });
            }
            Event::Eof => return Err(XliffError::UnexpectedEof("body")),
            _ => {}
        }
    }
}

fn parse_trans_unit(
    reader: &mut Reader<&[u8]>,
    text: &str,
    start_tag: &BytesStart<'_>,
    position: usize,
) -> Result<TransUnit, XliffError> {
    let id = unit_id(start_tag, reader)?.ok_or(XliffError::MissingId { position })?;
    let attributes = raw_attributes(start_tag);

    let mut source: Option<(Segment, String)> = None;
    let mut target: Option<(Segment, String)> = None;
    let mut extras = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| xml_error(reader, e))?;

        match event {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                let inner = reader
                    .read_to_end(e.name())
                    .map_err(|err| xml_error(reader, err))?;
                let content = &text[inner.start as usize..inner.end as usize];
                match local.as_slice() {
                    b"source" if source.is_none() => {
                        source = Some((Segment::from_raw(content), raw_attributes(&e)));
                    }
                    b"target" if target.is_none() => {
                        target = Some((Segment::from_raw(content), raw_attributes(&e)));
                    }
                    _ => extras.push(text[start..reader.buffer_position() as usize].to_string()),
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"source" if source.is_none() => {
                    source = Some((Segment::default(), raw_attributes(&e)));
                }
                b"target" if target.is_none() => {
                    target = Some((Segment::default(), raw_attributes(&e)));
                }
                _ => extras.push(text[start..reader.buffer_position() as usize].to_string()),
            },
            Event::Comment(_) | Event::CData(_) | Event::PI(_) => {
                extras.push(text[start..reader.buffer_position() as usize].to_string());
            }
            Event::Text(_) => push_text(&mut extras, &text[start..reader.buffer_position() as usize]),
            Event::End(_) => break,
            Event::Eof => return Err(XliffError::UnexpectedEof("trans-unit")),
            _ => {}
        }
    }

    let source = source.ok_or_else(|| XliffError::MissingSource { id: id.clone() })?;
    Ok(TransUnit::from_parts(id, attributes, source, target, extras))
}

/// Keep stray text, dropping the indentation around it.
fn push_text(extras: &mut Vec<String>, raw: &str) {
    let raw = raw.trim();
    if !raw.is_empty() {
        extras.push(raw.to_string());
    }
}

fn unit_id(tag: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Option<String>, XliffError> {
    let attr = tag
        .try_get_attribute("id")
        .map_err(|e| xml_error(reader, e.into()))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(reader, e.into()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Attribute text of a start tag, with a single leading space when non-empty.
fn raw_attributes(tag: &BytesStart<'_>) -> String {
    let raw = String::from_utf8_lossy(tag.attributes_raw());
    let raw = raw.trim();
    if raw.is_empty() {
        String::new()
    } else {
        format!(" {}", raw)
    }
}

/// Whitespace between the previous newline and `pos`, if only whitespace.
fn line_indent_before(text: &str, pos: usize) -> Option<String> {
    let before = &text[..pos];
    let line_start = before.rfind('\n')? + 1;
    let indent = &before[line_start..];
    indent
        .chars()
        .all(|c| c == ' ' || c == '\t')
        .then(|| indent.to_string())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn xml_error(reader: &Reader<&[u8]>, source: quick_xml::Error) -> XliffError {
    XliffError::Xml {
        position: reader.error_position() as u64,
        source,
    }
}
