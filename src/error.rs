//! Error enum
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    Csv(csv::Error),
    Serde(serde_json::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    /// A required element (e.g. `body`) is absent from an annotation file.
    MissingElement(String),
    /// An element lacks an attribute the schema requires.
    MissingAttribute { element: String, attribute: String },
    MissingColumn(String),
    /// A probability outside of `[0, 1]`.
    InvalidProbability(f64),
    /// A confusion table entry without alternatives.
    EmptyConfusion(char),
    /// A unit (chapter folder) file could not be found.
    MissingFile(PathBuf),
    Custom(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io: {e}"),
            Error::Xml(e) => write!(f, "xml: {e}"),
            Error::Csv(e) => write!(f, "csv: {e}"),
            Error::Serde(e) => write!(f, "json: {e}"),
            Error::Glob(e) => write!(f, "glob: {e}"),
            Error::GlobPattern(e) => write!(f, "glob pattern: {e}"),
            Error::MissingElement(name) => write!(f, "missing element <{name}>"),
            Error::MissingAttribute { element, attribute } => {
                write!(f, "element <{element}> has no attribute {attribute:?}")
            }
            Error::MissingColumn(name) => write!(f, "missing column {name:?}"),
            Error::InvalidProbability(p) => write!(f, "probability {p} is not within [0, 1]"),
            Error::EmptyConfusion(c) => write!(f, "no alternatives for {c:?}"),
            Error::MissingFile(path) => write!(f, "file not found: {path:?}"),
            Error::Custom(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Error {
        Error::Xml(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Error {
        Error::Xml(quick_xml::Error::InvalidAttr(e))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        Error::Csv(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
