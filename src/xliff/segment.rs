use std::borrow::Cow;

use quick_xml::{
    Reader,
    escape::{partial_escape, unescape},
    events::Event,
};

use super::XliffError;

/// Content of a `<source>` or `<target>` element.
///
/// Stored as the raw inner XML exactly as it appears in the file, so inline
/// elements such as `<x id="INTERPOLATION"/>` survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    raw: String,
}

impl Segment {
    /// Segment holding plain text. Markup characters are escaped.
    pub fn from_text(text: &str) -> Self {
        Self {
            raw: partial_escape(text).into_owned(),
        }
    }

    /// Segment holding XML content. The content must be well-formed.
    pub fn from_markup(raw: impl Into<String>) -> Result<Self, XliffError> {
        let raw = raw.into();
        check_fragment(&raw)?;
        Ok(Self { raw })
    }

    /// Segment read from a document that the reader already checked.
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True when the segment contains inline elements, comments or CDATA.
    pub fn has_markup(&self) -> bool {
        self.raw.contains('<')
    }

    /// Text handed to translators.
    ///
    /// Plain segments are unescaped; markup segments are returned raw.
    pub fn text(&self) -> Cow<'_, str> {
        if self.has_markup() {
            return Cow::Borrowed(&self.raw);
        }
        unescape(&self.raw).unwrap_or(Cow::Borrowed(&self.raw))
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Verify that `raw` can stand as the content of an element.
fn check_fragment(raw: &str) -> Result<(), XliffError> {
    let wrapped = format!("<segment>{}</segment>", raw);
    let mut reader = Reader::from_str(&wrapped);
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| XliffError::InvalidMarkup("unbalanced end tag".to_string()))?;
            }
            Ok(Event::Text(text)) => {
                text.unescape()
                    .map_err(|e| XliffError::InvalidMarkup(e.to_string()))?;
            }
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {
                return Err(XliffError::InvalidMarkup(
                    "declarations are not allowed inside a segment".to_string(),
                ));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XliffError::InvalidMarkup(e.to_string())),
        }
    }

    if depth != 0 {
        return Err(XliffError::InvalidMarkup("unclosed element".to_string()));
    }
    Ok(())
}
