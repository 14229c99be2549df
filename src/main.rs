use anyhow::{Context, Result};
use chrono::Utc;
use ghostguard::{
    storage::RegistryStore,
    utils::{config::Config, sample::generate_dataset},
    Engine,
};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_SAMPLE_SIZE: usize = 10;

enum Source {
    Dataset(String),
    Sample(usize),
}

fn parse_args() -> Result<Source> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(Source::Sample(DEFAULT_SAMPLE_SIZE)),
        Some("--sample") => {
            let size = match args.next() {
                Some(value) => value
                    .parse()
                    .with_context(|| format!("Invalid sample size: {}", value))?,
                None => DEFAULT_SAMPLE_SIZE,
            };
            Ok(Source::Sample(size))
        }
        Some(path) => Ok(Source::Dataset(path.to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::new().context("Failed to load configuration")?;

    // Logs go to stderr so the report on stdout stays machine-readable
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.node.log_level)),
        )
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting {} v{}", config.node.name, env!("CARGO_PKG_VERSION"));

    let now = Utc::now();
    let store = match parse_args()? {
        Source::Dataset(path) => RegistryStore::load(&path).map_err(|e| {
            error!("Failed to load dataset {}: {}", path, e);
            e
        })?,
        Source::Sample(size) => {
            info!(subjects = size, "Generating sample dataset");
            RegistryStore::from_dataset(generate_dataset(&mut rand::thread_rng(), size, now))
        }
    };

    let engine = Engine::new(config, None).context("Failed to initialize engine")?;

    let report = engine
        .fraud_report(&store, now)
        .await
        .context("Failed to build fraud report")?;

    let metrics = engine.metrics();
    metrics.log_summary();

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "report": report,
            "metrics": metrics.snapshot(),
        }))?
    );

    Ok(())
}
