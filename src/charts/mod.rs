pub mod client;
pub mod fixed;
pub mod rank_feed;
pub mod snapshot;
pub mod stream_table;

pub use client::{ChartClient, ChartClientConfig, ChartFetchError, ChartSource};
pub use fixed::FixedChartSource;
pub use rank_feed::RankFeedPayload;
pub use snapshot::{adapt, ChartDataError, ChartEntry, ChartPair, ChartSnapshot, RawChart, SnapshotSide};
pub use stream_table::{parse_stream_table, RowError, StreamRow};
