use std::collections::HashMap;

use quick_xml::escape::escape;

use super::Segment;

/// A single `<trans-unit>`.
///
/// Besides id, source and target, the unit keeps the raw attributes of its
/// tags and every other child element (`<note>`, `<context-group>`, ...) so a
/// rewritten file loses nothing the synchronizer does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransUnit {
    pub id: String,
    pub source: Segment,
    pub target: Option<Segment>,
    attributes: String,
    source_attributes: String,
    target_attributes: String,
    extras: Vec<String>,
}

impl TransUnit {
    pub fn new(id: impl Into<String>, source: Segment) -> Self {
        let id = id.into();
        let attributes = format!(" id=\"{}\"", escape(id.as_str()));
        Self {
            id,
            source,
            target: None,
            attributes,
            source_attributes: String::new(),
            target_attributes: String::new(),
            extras: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        id: String,
        attributes: String,
        source: (Segment, String),
        target: Option<(Segment, String)>,
        extras: Vec<String>,
    ) -> Self {
        let (target, target_attributes) = match target {
            Some((segment, attrs)) => (Some(segment), attrs),
            None => (None, String::new()),
        };
        Self {
            id,
            source: source.0,
            target,
            attributes,
            source_attributes: source.1,
            target_attributes,
            extras,
        }
    }

    /// The target, if it holds something other than whitespace.
    pub fn translation(&self) -> Option<&Segment> {
        self.target.as_ref().filter(|target| !target.is_blank())
    }

    pub fn is_translated(&self) -> bool {
        self.translation().is_some()
    }

    /// This unit with `target` attached, replacing any previous target.
    pub fn with_target(mut self, target: Segment) -> Self {
        self.target = Some(target);
        self
    }

    /// Raw child elements other than `<source>` and `<target>`.
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// Serialize the unit. `indent` is the unit's own indentation, `step` the
    /// extra indentation of its children. No leading indentation is written.
    pub(crate) fn write_xml(&self, out: &mut String, indent: &str, step: &str) {
        let child = format!("\n{}{}", indent, step);

        out.push_str("<trans-unit");
        out.push_str(&self.attributes);
        out.push('>');

        out.push_str(&child);
        push_element(out, "source", &self.source_attributes, &self.source);

        if let Some(target) = &self.target {
            out.push_str(&child);
            push_element(out, "target", &self.target_attributes, target);
        }

        for extra in &self.extras {
            out.push_str(&child);
            out.push_str(extra);
        }

        out.push('\n');
        out.push_str(indent);
        out.push_str("</trans-unit>");
    }
}

fn push_element(out: &mut String, name: &str, attributes: &str, segment: &Segment) {
    out.push('<');
    out.push_str(name);
    out.push_str(attributes);
    out.push('>');
    out.push_str(segment.raw());
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Units keyed by id, iterated in first-insertion order.
///
/// Inserting an id that is already present replaces the unit but keeps its
/// original position.
#[derive(Debug, Clone, Default)]
pub struct TermsMap {
    units: Vec<TransUnit>,
    index: HashMap<String, usize>,
}

impl TermsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a unit, returning the unit it replaced.
    pub fn insert(&mut self, unit: TransUnit) -> Option<TransUnit> {
        match self.index.get(&unit.id) {
            Some(&position) => Some(std::mem::replace(&mut self.units[position], unit)),
            None => {
                self.index.insert(unit.id.clone(), self.units.len());
                self.units.push(unit);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&TransUnit> {
        self.index.get(id).map(|&position| &self.units[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransUnit> {
        self.units.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.id.as_str())
    }
}

impl FromIterator<TransUnit> for TermsMap {
    fn from_iter<I: IntoIterator<Item = TransUnit>>(iter: I) -> Self {
        let mut map = Self::new();
        for unit in iter {
            map.insert(unit);
        }
        map
    }
}

impl<'a> IntoIterator for &'a TermsMap {
    type Item = &'a TransUnit;
    type IntoIter = std::slice::Iter<'a, TransUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unit(id: &str, source: &str) -> TransUnit {
        TransUnit::new(id, Segment::from_text(source))
    }

    #[test]
    fn test_terms_map_keeps_first_position_on_duplicate() {
        let mut map = TermsMap::new();
        map.insert(unit("a", "first"));
        map.insert(unit("b", "second"));
        let replaced = map.insert(unit("a", "third"));

        assert_eq!(replaced.map(|u| u.source.text().to_string()), Some("first".to_string()));
        assert_eq!(map.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a").unwrap().source.text(), "third");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_translation_ignores_blank_target() {
        let blank = unit("a", "Hello").with_target(Segment::from_text("  "));
        assert!(!blank.is_translated());

        let done = unit("a", "Hello").with_target(Segment::from_text("Hallo"));
        assert_eq!(done.translation().map(|t| t.raw()), Some("Hallo"));
    }

    #[test]
    fn test_write_xml() {
        let mut out = String::new();
        unit("greeting", "Fish & Chips")
            .with_target(Segment::from_text("Fisch & Pommes"))
            .write_xml(&mut out, "      ", "  ");

        assert_eq!(
            out,
            "<trans-unit id=\"greeting\">\n        <source>Fish &amp; Chips</source>\n        <target>Fisch &amp; Pommes</target>\n      </trans-unit>"
        );
    }
}
