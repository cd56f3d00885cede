//! Minimal quick-xml helpers shared by the annotation and Zefania readers.
use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Error;

/// Attributes of an element, keyed by local name (`xlink:href` is stored as `href`).
#[derive(Debug, Default, Clone)]
pub struct Attributes {
    element: String,
    values: HashMap<String, String>,
}

impl Attributes {
    pub fn from_start(start: &BytesStart<'_>) -> Result<Self, Error> {
        let element = local_name(start);
        let mut values = HashMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            values.insert(key, value);
        }
        Ok(Self { element, values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Get an attribute, failing if it is absent.
    pub fn require(&self, key: &str) -> Result<&str, Error> {
        self.get(key).ok_or_else(|| Error::MissingAttribute {
            element: self.element.clone(),
            attribute: key.to_string(),
        })
    }
}

pub fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Build a reader that keeps whitespace as is: body offsets depend on it.
pub fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}

/// Collect the attributes of every element named `name`, in document order.
pub fn elements(xml: &str, name: &str) -> Result<Vec<Attributes>, Error> {
    let mut reader = reader(xml);
    let mut found = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == name.as_bytes() => {
                found.push(Attributes::from_start(&e)?);
            }
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(found)
}

/// Concatenated character data of the first element named `name`,
/// including the text of nested elements.
///
/// Returns [None] if no such element exists.
pub fn text_of(xml: &str, name: &str) -> Result<Option<String>, Error> {
    let mut reader = reader(xml);
    let mut text: Option<String> = None;
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth > 0 {
                    depth += 1;
                } else if text.is_none() && e.local_name().as_ref() == name.as_bytes() {
                    text = Some(String::new());
                    depth = 1;
                }
            }
            Event::Empty(e) => {
                if depth == 0 && text.is_none() && e.local_name().as_ref() == name.as_bytes() {
                    return Ok(Some(String::new()));
                }
            }
            Event::End(_) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(t) if depth > 0 => {
                if let Some(s) = text.as_mut() {
                    s.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) if depth > 0 => {
                if let Some(s) = text.as_mut() {
                    s.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(text)
}
