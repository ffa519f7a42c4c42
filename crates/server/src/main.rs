// crates/server/src/main.rs
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mealweek_core::llm::{ApiCredential, HttpProvider, KeyRotationExecutor};
use mealweek_db::Database;
use mealweek_server::{create_app, state::AppState};
use tracing_subscriber::EnvFilter;

/// Age (seconds) after which a non-terminal job left over from a
/// previous process is swept to an error at startup.
const STALE_JOB_TTL_SECS: i64 = 3600;

#[derive(Parser, Debug)]
#[command(name = "mealweek", version, about = "Meal plan generation server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "MEALWEEK_PORT")]
    port: u16,

    /// SQLite database path (defaults to the platform data directory)
    #[arg(long, env = "MEALWEEK_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Directory for rendered share documents
    #[arg(long, env = "MEALWEEK_SHARE_DIR")]
    share_dir: Option<PathBuf>,

    /// Generation API endpoint
    #[arg(long, env = "MEALWEEK_LLM_ENDPOINT")]
    llm_endpoint: String,

    /// Model name passed to the generation API
    #[arg(long, default_value = "gpt-4o-mini", env = "MEALWEEK_LLM_MODEL")]
    llm_model: String,
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine platform data directory")?;
    Ok(base.join("mealweek"))
}

/// Read credentials from MEALWEEK_API_KEYS (comma-separated, first is
/// primary). Keys never appear in logs; labels do.
fn load_credentials() -> anyhow::Result<Vec<ApiCredential>> {
    let raw = std::env::var("MEALWEEK_API_KEYS")
        .context("MEALWEEK_API_KEYS is not set (comma-separated API keys)")?;
    let credentials: Vec<ApiCredential> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .enumerate()
        .map(|(i, key)| {
            let label = if i == 0 {
                "primary".to_string()
            } else {
                format!("fallback-{i}")
            };
            ApiCredential::new(label, key)
        })
        .collect();
    anyhow::ensure!(!credentials.is_empty(), "MEALWEEK_API_KEYS is empty");
    Ok(credentials)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let data_dir = default_data_dir()?;
    let db_path = args
        .db_path
        .unwrap_or_else(|| data_dir.join("mealweek.db"));
    let share_dir = args.share_dir.unwrap_or_else(|| data_dir.join("shared"));

    let credentials = load_credentials()?;
    tracing::info!(count = credentials.len(), "Loaded API credentials");

    let db = Database::new(&db_path)
        .await
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    let swept = db.sweep_stale_jobs(STALE_JOB_TTL_SECS).await?;
    if swept > 0 {
        tracing::warn!(count = swept, "Swept stale jobs from a previous run");
    }

    let provider = Arc::new(HttpProvider::new(&args.llm_endpoint, &args.llm_model));
    let executor = Arc::new(KeyRotationExecutor::new(provider, credentials));

    let state = AppState::new(db, executor, share_dir.clone());
    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(
        %addr,
        db = %db_path.display(),
        share_dir = %share_dir.display(),
        "mealweek server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
