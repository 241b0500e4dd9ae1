//! CLI entry point for the ETA calibrator.
//!
//! Loads the runtime configuration, wires up the routing-engine client, and
//! answers a single ETA query, reporting the result and response times.

use anyhow::Result;
use clap::Parser;
use eta_calibrator::calibrator::{Calibrator, EtaQuery};
use eta_calibrator::config::Config;
use eta_calibrator::engine;
use eta_calibrator::geometry::Point;

#[derive(Parser)]
#[command(name = "eta_calibrator")]
#[command(about = "Answer an ETA query calibrated against ground-truth travel times", long_about = None)]
struct Cli {
    /// Path to the key=value config file
    #[arg(value_name = "CONFIG")]
    config: String,

    /// Start point longitude
    #[arg(long, default_value_t = -73.95267486572266)]
    start_lon: f64,

    /// Start point latitude
    #[arg(long, default_value_t = 40.723175048828125)]
    start_lat: f64,

    /// End point longitude
    #[arg(long, default_value_t = -73.92391967773438)]
    end_lon: f64,

    /// End point latitude
    #[arg(long, default_value_t = 40.76137924194336)]
    end_lat: f64,

    /// Departure timestamp, `YYYY-MM-DD HH:MM:SS`
    #[arg(long, default_value = "2016-01-01 00:19:39")]
    at: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::init(); // Initialize logger

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    let engine = engine::from_config(&config)?;
    let calibrator = Calibrator::new(&config, engine)?;

    let query = EtaQuery {
        start: Point::new(cli.start_lon, cli.start_lat),
        end: Point::new(cli.end_lon, cli.end_lat),
        departure: cli.at,
    };

    let (eta, timing) = calibrator.request(&query).await;

    println!("Output ETA: {eta}");
    println!("Total response time: {:.3} ms", timing.total_ms);
    println!("Engine response time: {:.3} ms", timing.routing_engine_ms);
    println!("Calibrator overhead: {:.3} ms", timing.overhead_ms);

    Ok(())
}
