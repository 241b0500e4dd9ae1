//! Clients for the external open-source routing engines.
//!
//! Each client answers a single question: the point-to-point driving
//! duration in seconds, or unavailable. The calibrator never sees which
//! engine sits behind the trait.

mod ors;
mod osrm;
mod valhalla;

pub use ors::OrsClient;
pub use osrm::OsrmClient;
pub use valhalla::ValhallaClient;

use crate::config::Config;
use crate::error::Error;
use crate::geometry::Point;
use async_trait::async_trait;
use std::time::Duration;

/// A point-to-point duration oracle.
#[async_trait]
pub trait RoutingEngine: Send + Sync {
    /// Returns the driving duration in seconds from `start` to `end`.
    async fn point_to_point_duration(&self, start: Point, end: Point) -> Result<f64, Error>;
}

/// Builds the engine client named in the config.
pub fn from_config(config: &Config) -> Result<Box<dyn RoutingEngine>, Error> {
    match config.engine.as_str() {
        "osrm" => Ok(Box::new(OsrmClient::new(&config.routingengine_server))),
        "ors" => Ok(Box::new(OrsClient::new(&config.routingengine_server))),
        "val" => Ok(Box::new(ValhallaClient::new(&config.routingengine_server))),
        other => Err(Error::ConfigInvalid(format!(
            "unknown engine {other:?}, expected \"osrm\", \"ors\" or \"val\""
        ))),
    }
}

/// Shared reqwest client with request and connect timeouts.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
}
