pub mod chart;
pub mod result;
pub mod slate;

pub use chart::{Cadence, ChartKind, ChartRound, Schedule};
pub use result::{LeaderboardEntry, ResultSummary, RoundResult, SongPoints};
pub use slate::{PredictionSlate, SongPick};
