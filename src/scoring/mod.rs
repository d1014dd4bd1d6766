pub mod engine;
pub mod normalize;

pub use engine::{score_slate, ScoringError, SlateScore};
pub use normalize::{match_key, TitleMode};
