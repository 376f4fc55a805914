//! CLI entry point for the delivery risk rater.
//!
//! Provides subcommands for scoring a shipment's delay risk, building the
//! cache-aware enhanced assessment, and recording observed delivery
//! outcomes for continuous learning.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use delivery_risk_rater::engine::RiskEngine;
use delivery_risk_rater::engine::level::risk_level;
use delivery_risk_rater::output::{append_outcome, print_json};
use delivery_risk_rater::shipment::{Carrier, Shipment};
use delivery_risk_rater::store::MemoryStore;
use delivery_risk_rater::weather::{CannedProvider, OpenWeatherClient, WeatherProvider};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "delivery_risk_rater")]
#[command(about = "Scores shipment delay risk from historical and live signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ShipmentArgs {
    /// Package identifier
    #[arg(long)]
    package_id: String,

    /// Destination zip code
    #[arg(long)]
    destination_zip: String,

    /// Destination city, used for the weather lookup
    #[arg(long)]
    destination_city: String,

    /// Carrier handling the shipment (UPS, FedEx, USPS, DHL)
    #[arg(long)]
    carrier: Carrier,

    /// Expected delivery date (YYYY-MM-DD)
    #[arg(long)]
    expected_delivery_date: String,
}

impl ShipmentArgs {
    fn into_shipment(self) -> Shipment {
        Shipment {
            package_id: self.package_id,
            destination_zip: self.destination_zip,
            destination_city: self.destination_city,
            carrier: self.carrier,
            expected_delivery_date: self.expected_delivery_date,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the additive six-factor risk score for a shipment
    Score {
        #[command(flatten)]
        shipment: ShipmentArgs,
    },
    /// Compute the weighted, cache-aware enhanced assessment
    Assess {
        #[command(flatten)]
        shipment: ShipmentArgs,
    },
    /// Record an observed delivery outcome for continuous learning
    Record {
        /// Package identifier
        #[arg(long)]
        package_id: String,

        /// Carrier that handled the delivery
        #[arg(long)]
        carrier: Carrier,

        /// Origin zip code
        #[arg(long, default_value = "00000")]
        origin_zip: String,

        /// Destination zip code
        #[arg(long)]
        destination_zip: String,

        /// Scheduled delivery date (YYYY-MM-DD)
        #[arg(long)]
        scheduled_date: String,

        /// Actual delivery date (YYYY-MM-DD)
        #[arg(long)]
        actual_date: String,

        /// Comma-separated delay reason tags
        #[arg(long, value_delimiter = ',')]
        delay_reasons: Vec<String>,

        /// CSV file to append the outcome to
        #[arg(short, long, default_value = "outcomes.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/delivery_risk_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("delivery_risk_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let store = MemoryStore::seeded();

    match std::env::var("OPENWEATHER_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            info!("Using live OpenWeatherMap conditions");
            run(cli, RiskEngine::new(store, OpenWeatherClient::new(api_key)?)).await
        }
        _ => {
            info!("OPENWEATHER_API_KEY not set, using canned weather table");
            run(cli, RiskEngine::new(store, CannedProvider)).await
        }
    }
}

async fn run<W: WeatherProvider>(cli: Cli, engine: RiskEngine<MemoryStore, W>) -> Result<()> {
    match cli.command {
        Commands::Score { shipment } => {
            let shipment = shipment.into_shipment();
            let assessment = engine.basic_assessment(&shipment).await?;

            info!(
                package_id = %shipment.package_id,
                risk_score = assessment.risk_score,
                level = risk_level(assessment.risk_score),
                "Shipment scored"
            );
            print_json(&assessment)?;
        }
        Commands::Assess { shipment } => {
            let shipment = shipment.into_shipment();
            let assessment = engine.enhanced_assessment(&shipment).await?;

            info!(
                package_id = %shipment.package_id,
                score = assessment.score,
                confidence = assessment.confidence_level,
                "Enhanced assessment ready"
            );
            print_json(&assessment)?;
        }
        Commands::Record {
            package_id,
            carrier,
            origin_zip,
            destination_zip,
            scheduled_date,
            actual_date,
            delay_reasons,
            output,
        } => {
            let outcome = engine
                .record_outcome(
                    &package_id,
                    carrier,
                    &origin_zip,
                    &destination_zip,
                    &scheduled_date,
                    &actual_date,
                    delay_reasons,
                )
                .await?;

            append_outcome(&output, &outcome)?;
            info!(
                output = %output,
                was_delayed = outcome.was_delayed,
                "Outcome appended to log"
            );
        }
    }

    Ok(())
}
