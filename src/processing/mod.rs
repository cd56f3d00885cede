/*! Corpus processing

Operations on whole corpus tables: clean-up before training, and concatenation of
corpus files into training data.
!*/
pub mod clean;
pub mod concat;

pub use clean::{clean, CleanReport};
pub use concat::{concat_files, find_files, ConcatReport, Selection};
