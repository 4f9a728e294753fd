//! Community XML block.
//!
//! Maps and replays carry a short XML document (`<header type="map" ...>`)
//! summarising the file for online services. The raw text is always kept;
//! elements and their attributes are extracted when the XML is well formed.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{ChunkReader, Describe, Field, Fields};
use crate::Result;

/// One XML element and its attributes, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl XmlElement {
    /// Value of attribute `key`, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Community {
    pub xml: String,
    /// Every element of the document, flattened in document order. Empty
    /// when the XML could not be parsed.
    pub elements: Vec<XmlElement>,
}

impl Community {
    /// First element named `name`.
    pub fn element(&self, name: &str) -> Option<&XmlElement> {
        self.elements.iter().find(|e| e.name == name)
    }
}

impl Describe for Community {
    fn describe(&self) -> Vec<Field> {
        let mut fields = Fields::new().add("Xml", &self.xml);
        if let Some(ident) = self.element("ident") {
            fields = fields
                .opt("Uid", &ident.attr("uid"))
                .opt("Name", &ident.attr("name"))
                .opt("Author", &ident.attr("author"));
        }
        if let Some(desc) = self.element("desc") {
            fields = fields
                .opt("Environment", &desc.attr("envir"))
                .opt("Mood", &desc.attr("mood"));
        }
        if let Some(times) = self.element("times") {
            fields = fields.opt("AuthorTime", &times.attr("authortime"));
        }
        fields.build()
    }
}

fn element(start: &BytesStart<'_>) -> XmlElement {
    let attributes = start
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            (key, value)
        })
        .collect();
    XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
    }
}

/// Extract every element of `xml`.
pub(crate) fn parse_elements(xml: &str) -> std::result::Result<Vec<XmlElement>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut elements = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => elements.push(element(&e)),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(elements)
}

pub(super) fn read_community(r: &mut ChunkReader<'_, '_>, out: &mut Community) -> Result<()> {
    out.xml = r.string()?;
    match parse_elements(&out.xml) {
        Ok(elements) => out.elements = elements,
        Err(e) => tracing::warn!("community XML not parsed: {e}"),
    }
    Ok(())
}
