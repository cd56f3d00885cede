//! Zefania Bible XML reader.
//!
//! Zefania files nest `BIBLEBOOK[bnumber]`, `CHAPTER[cnumber]` and `VERS[vnumber]` elements.
//! Verse text is the character data of `VERS`, including nested elements (notes, styling).
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, warn};
use quick_xml::events::Event;

use crate::align::{format_verse_id, ReferenceVerse};
use crate::annotation::xml::{self, Attributes};
use crate::error::Error;

/// A parsed verse, before naming its book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZefaniaVerse {
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

fn number(attrs: &Attributes, key: &str) -> Result<u32, Error> {
    let raw = attrs.require(key)?;
    raw.trim()
        .parse()
        .map_err(|_| Error::Custom(format!("{key}={raw:?} is not a number")))
}

/// Every verse of the file, in document order.
///
/// Verses outside of a book or chapter element are ignored.
pub fn parse_verses(xml_str: &str) -> Result<Vec<ZefaniaVerse>, Error> {
    let mut reader = xml::reader(xml_str);
    let mut verses = Vec::new();

    let mut book: Option<u32> = None;
    let mut chapter: Option<u32> = None;
    // (verse number, text, depth of nested elements)
    let mut current: Option<(u32, String, usize)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if let Some((_, _, depth)) = current.as_mut() {
                    *depth += 1;
                    continue;
                }
                let attrs = Attributes::from_start(&e)?;
                match e.local_name().as_ref() {
                    b"BIBLEBOOK" => book = Some(number(&attrs, "bnumber")?),
                    b"CHAPTER" => chapter = Some(number(&attrs, "cnumber")?),
                    b"VERS" => current = Some((number(&attrs, "vnumber")?, String::new(), 0)),
                    _ => (),
                }
            }
            Event::Empty(e) if current.is_none() && e.local_name().as_ref() == b"VERS" => {
                let attrs = Attributes::from_start(&e)?;
                if let (Some(b), Some(c)) = (book, chapter) {
                    verses.push(ZefaniaVerse {
                        book: b,
                        chapter: c,
                        verse: number(&attrs, "vnumber")?,
                        text: String::new(),
                    });
                }
            }
            Event::End(e) => {
                if let Some((verse, text, depth)) = current.as_mut() {
                    if *depth > 0 {
                        *depth -= 1;
                        continue;
                    }
                    match (book, chapter) {
                        (Some(b), Some(c)) => verses.push(ZefaniaVerse {
                            book: b,
                            chapter: c,
                            verse: *verse,
                            text: text.trim().to_string(),
                        }),
                        _ => warn!("verse {} outside of a chapter", verse),
                    }
                    current = None;
                    continue;
                }
                match e.local_name().as_ref() {
                    b"BIBLEBOOK" => book = None,
                    b"CHAPTER" => chapter = None,
                    _ => (),
                }
            }
            Event::Text(t) => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    debug!("parsed {} verses", verses.len());
    Ok(verses)
}

/// Verses of one book, with ids `"<book_name> <chapter>.<verse>"`.
pub fn extract_book(
    xml_str: &str,
    book_number: u32,
    book_name: &str,
) -> Result<Vec<ReferenceVerse>, Error> {
    Ok(parse_verses(xml_str)?
        .into_iter()
        .filter(|v| v.book == book_number)
        .map(|v| ReferenceVerse::new(format_verse_id(book_name, v.chapter, v.verse), v.text))
        .collect())
}

/// Verses of every book of `catalogue`, in document order.
pub fn extract_catalogue(
    xml_str: &str,
    catalogue: &BTreeMap<u32, &'static str>,
) -> Result<Vec<ReferenceVerse>, Error> {
    Ok(parse_verses(xml_str)?
        .into_iter()
        .filter_map(|v| {
            catalogue
                .get(&v.book)
                .map(|name| ReferenceVerse::new(format_verse_id(name, v.chapter, v.verse), v.text))
        })
        .collect())
}

/// Verses of every book of `catalogue`, by verse id.
pub fn extract_all(
    xml_str: &str,
    catalogue: &BTreeMap<u32, &'static str>,
) -> Result<HashMap<String, String>, Error> {
    Ok(extract_catalogue(xml_str, catalogue)?
        .into_iter()
        .map(|v| (v.verse_id, v.text))
        .collect())
}

pub fn read(path: &Path) -> Result<String, Error> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIBLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<XMLBIBLE biblename="Segond">
  <BIBLEBOOK bnumber="41" bname="Marc">
    <CHAPTER cnumber="1">
      <VERS vnumber="1"> Commencement de l'Évangile de Jésus Christ, Fils de Dieu. </VERS>
      <VERS vnumber="2">Selon ce qui est écrit <NOTE>Malachie</NOTE> dans Ésaïe</VERS>
      <VERS vnumber="3"/>
    </CHAPTER>
    <CHAPTER cnumber="2">
      <VERS vnumber="1">Quelques jours après, Jésus revint à Capernaüm.</VERS>
    </CHAPTER>
  </BIBLEBOOK>
  <BIBLEBOOK bnumber="48" bname="Galates">
    <CHAPTER cnumber="1">
      <VERS vnumber="1">Paul, apôtre &amp; serviteur</VERS>
    </CHAPTER>
  </BIBLEBOOK>
</XMLBIBLE>"#;

    #[test]
    fn book() {
        let verses = extract_book(BIBLE, 41, "Mark").unwrap();
        assert_eq!(verses.len(), 4);
        assert_eq!(verses[0].verse_id, "Mark 1.1");
        assert_eq!(
            verses[0].text,
            "Commencement de l'Évangile de Jésus Christ, Fils de Dieu."
        );
        assert_eq!(verses[1].text, "Selon ce qui est écrit Malachie dans Ésaïe");
        assert_eq!(verses[2].text, "");
        assert_eq!(verses[3].verse_id, "Mark 2.1");
    }

    #[test]
    fn catalogue() {
        let mut catalogue = BTreeMap::new();
        catalogue.insert(48, "Galantians");
        let verses = extract_all(BIBLE, &catalogue).unwrap();
        assert_eq!(verses.len(), 1);
        assert_eq!(verses["Galantians 1.1"], "Paul, apôtre & serviteur");

        catalogue.insert(41, "Mark");
        let ordered = extract_catalogue(BIBLE, &catalogue).unwrap();
        assert_eq!(ordered.len(), 5);
        assert_eq!(ordered[0].verse_id, "Mark 1.1");
        assert_eq!(ordered[4].verse_id, "Galantians 1.1");
    }

    #[test]
    fn bad_number() {
        let xml = r#"<XMLBIBLE><BIBLEBOOK bnumber="x"></BIBLEBOOK></XMLBIBLE>"#;
        assert!(parse_verses(xml).is_err());
    }
}
