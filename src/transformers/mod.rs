/*! Verse transformers.

Transforms verse text, either into another script ([romanize]) or by corrupting it ([noise]).

!*/

pub mod noise;
pub mod romanize;

pub use noise::{noisy_table, ConfusionTable, NoiseLevel, NoiseModel, NoisyReport, DELETED};
pub use romanize::{romanize_column, romanize_preserving, CopticRomanizer, Romanize, MISSING};
