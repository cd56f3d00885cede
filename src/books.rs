//! Book catalogue.
//!
//! Maps the book numbers used by Scriptorium folder names and Zefania `bnumber`s
//! to the display names used in verse identifiers.
//!
//! Display names are those of the published corpus. They are kept as is
//! (including `Galantians` and `Hebrew`) since verse ids are the join key across files.
use std::collections::BTreeMap;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref OLD_TESTAMENT: BTreeMap<u32, &'static str> = {
        let mut m = BTreeMap::new();
        m.insert(1, "Genesis");
        m.insert(2, "Exodus");
        m.insert(3, "Leviticus");
        m.insert(4, "Numbers");
        m.insert(5, "Deuteronomy");
        m.insert(6, "Joshua");
        m.insert(7, "Judges");
        m.insert(8, "Ruth");
        m.insert(9, "I Samuel");
        m.insert(10, "II Samuel");
        m.insert(11, "I Kings");
        m.insert(12, "II Kings");
        m.insert(13, "I Chronicles");
        m.insert(14, "II Chronicles");
        m.insert(17, "Esther");
        m.insert(18, "Job");
        m.insert(19, "Psalms");
        m.insert(20, "Proverbs");
        m.insert(21, "Ecclesiastes");
        m.insert(22, "Song of Solomon");
        m.insert(23, "Isaiah");
        m.insert(24, "Jeremiah");
        m.insert(25, "Lamentations");
        m.insert(26, "Ezekiel");
        m.insert(27, "Daniel");
        m.insert(28, "Hosea");
        m.insert(29, "Joel");
        m.insert(30, "Amos");
        m.insert(31, "Obadiah");
        m.insert(32, "Jonah");
        m.insert(33, "Micah");
        m.insert(34, "Nahum");
        m.insert(35, "Habakkuk");
        m.insert(36, "Zephaniah");
        m.insert(37, "Haggai");
        m.insert(38, "Zechariah");
        m
    };

    pub static ref NEW_TESTAMENT: BTreeMap<u32, &'static str> = {
        let mut m = BTreeMap::new();
        m.insert(40, "Matthew");
        m.insert(41, "Mark");
        m.insert(42, "Luke");
        m.insert(43, "John");
        m.insert(44, "Acts of the Apostles");
        m.insert(45, "Romans");
        m.insert(46, "1 Corinthians");
        m.insert(47, "2 Corinthians");
        m.insert(48, "Galantians");
        m.insert(49, "Ephesians");
        m.insert(50, "Philippians");
        m.insert(51, "Colossians");
        m.insert(52, "1 Thessalonians");
        m.insert(53, "2 Thessalonians");
        m.insert(54, "1 Timothy");
        m.insert(55, "2 Timothy");
        m.insert(56, "Titus");
        m.insert(57, "Philemon");
        m.insert(58, "Hebrew");
        m.insert(59, "James");
        m.insert(60, "1 Peter");
        m.insert(61, "2 Peter");
        m.insert(62, "1 John");
        m.insert(63, "2 John");
        m.insert(64, "3 John");
        m.insert(65, "Jude");
        m.insert(66, "Revelation");
        m
    };

    pub static ref DEUTEROCANONICAL: BTreeMap<u32, &'static str> = {
        let mut m = BTreeMap::new();
        m.insert(67, "Tobit");
        m.insert(71, "Sirach");
        m
    };

    /// Every known book.
    pub static ref BOOKS: BTreeMap<u32, &'static str> = OLD_TESTAMENT
        .iter()
        .chain(NEW_TESTAMENT.iter())
        .chain(DEUTEROCANONICAL.iter())
        .map(|(k, v)| (*k, *v))
        .collect();
}

/// A book to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    code: u32,
    name: String,
    folder_prefix: String,
}

impl Book {
    /// Book with the default Scriptorium folder prefix (`41_Mark_`, `09_I_Samuel_`...).
    pub fn new(code: u32, name: &str) -> Self {
        let folder_prefix = format!("{:02}_{}_", code, name.replace(' ', "_"));
        Self {
            code,
            name: name.to_string(),
            folder_prefix,
        }
    }

    /// Book whose chapter folders do not follow the default naming.
    pub fn with_prefix(code: u32, name: &str, folder_prefix: &str) -> Self {
        Self {
            code,
            name: name.to_string(),
            folder_prefix: folder_prefix.to_string(),
        }
    }

    /// Look a book up in [BOOKS].
    pub fn from_code(code: u32) -> Option<Self> {
        BOOKS.get(&code).map(|name| Self::new(code, name))
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder_prefix(&self) -> &str {
        &self.folder_prefix
    }
}

/// Catalogue by name: `old`, `new`, `deuterocanonical` or `all`.
pub fn catalogue(name: &str) -> Option<&'static BTreeMap<u32, &'static str>> {
    match name {
        "old" => Some(&*OLD_TESTAMENT),
        "new" => Some(&*NEW_TESTAMENT),
        "deuterocanonical" => Some(&*DEUTEROCANONICAL),
        "all" => Some(&*BOOKS),
        _ => None,
    }
}

/// Books of a catalogue, in code order.
pub fn books_of(catalogue: &BTreeMap<u32, &'static str>) -> Vec<Book> {
    catalogue
        .iter()
        .map(|(code, name)| Book::new(*code, name))
        .collect()
}
