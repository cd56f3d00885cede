/*!
# IO utilities

CSV verse tables, the exchange format between every step of the pipeline.
!*/
pub mod table;

pub use table::{Table, VERSE_ID};
