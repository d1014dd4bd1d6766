use std::sync::Arc;

use chartleague::api::router::create_router;
use chartleague::charts::ChartClient;
use chartleague::config::AppConfig;
use chartleague::settlement::Settler;
use chartleague::store::{MemoryStore, PgStore, SettlementStore};
use chartleague::{db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = chartleague::metrics::init_metrics();

    let store: Arc<dyn SettlementStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::init_pool(url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Database connected, migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, using an empty in-memory store: no charts or slates \
                 can be loaded, so the API is read-only and there is nothing to settle"
            );
            Arc::new(MemoryStore::new())
        }
    };

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, settlement endpoint will refuse every request");
    }

    let chart_client = ChartClient::new(config.chart_client())?;
    let settler = Arc::new(Settler::new(store.clone(), Arc::new(chart_client)));

    let state = AppState {
        store,
        settler,
        config,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chartleague=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
