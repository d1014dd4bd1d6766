use std::env;

use crate::charts::ChartClientConfig;

const DEFAULT_RANK_FEED_URL: &str = "http://localhost:8090/rank-feed";
const DEFAULT_STREAM_CHART_URL: &str = "http://localhost:8090/stream-charts";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// In-memory store is used when unset.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,

    /// Operator token for settlement. Unset means settlement is refused.
    pub admin_token: Option<String>,

    // Chart sources
    pub rank_feed_base_url: String,
    pub stream_chart_base_url: String,
    pub stream_chart_header_rows: usize,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            admin_token: env::var("ADMIN_TOKEN").ok().filter(|s| !s.is_empty()),

            rank_feed_base_url: env::var("RANK_FEED_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RANK_FEED_URL.into()),
            stream_chart_base_url: env::var("STREAM_CHART_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_STREAM_CHART_URL.into()),
            stream_chart_header_rows: env::var("STREAM_CHART_HEADER_ROWS")
                .unwrap_or_else(|_| "2".into())
                .parse()
                .unwrap_or(2),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
        })
    }

    /// Config for tests and local runs: in-memory store, given admin token.
    pub fn local(admin_token: Option<&str>) -> Self {
        Self {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            admin_token: admin_token.map(str::to_string),
            rank_feed_base_url: "http://localhost".into(),
            stream_chart_base_url: "http://localhost".into(),
            stream_chart_header_rows: 2,
            http_timeout_secs: 5,
        }
    }

    pub fn chart_client(&self) -> ChartClientConfig {
        ChartClientConfig {
            rank_feed_base_url: self.rank_feed_base_url.clone(),
            stream_chart_base_url: self.stream_chart_base_url.clone(),
            stream_header_rows: self.stream_chart_header_rows,
            timeout_secs: self.http_timeout_secs,
        }
    }
}
