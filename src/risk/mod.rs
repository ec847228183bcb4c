mod engine;

pub use engine::{RiskEngine, BASELINE_SCORE, MAX_SCORE, MIN_SCORE};
