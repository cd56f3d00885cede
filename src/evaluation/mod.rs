/*! Evaluation

Interfaces to translation models and metrics, with their batch runners.
No model or metric is shipped: implement [Translate] or [Score] to plug one in.
!*/
pub mod score;
pub mod translate;

pub use score::{score_checked, Score, Summary};
pub use translate::{run_models, LanguagePair, ModelReport, Translate};
