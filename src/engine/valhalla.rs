use super::RoutingEngine;
use crate::error::Error;
use crate::geometry::Point;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const VALHALLA_PORT: u16 = 8002;

/// Valhalla reachability error: no path between the locations.
const NO_ROUTE_FOUND: i64 = 442;

/// Valhalla `/route` client with `auto` costing.
pub struct ValhallaClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct RouteResponse {
    error_code: Option<i64>,
    trip: Option<Trip>,
}

#[derive(Deserialize)]
struct Trip {
    summary: Summary,
}

#[derive(Deserialize)]
struct Summary {
    time: f64,
}

impl ValhallaClient {
    pub fn new(server: &str) -> Self {
        Self {
            client: super::http_client(),
            base_url: format!("http://{server}:{VALHALLA_PORT}"),
        }
    }
}

#[async_trait]
impl RoutingEngine for ValhallaClient {
    async fn point_to_point_duration(&self, start: Point, end: Point) -> Result<f64, Error> {
        let body = json!({
            "locations": [
                {"lat": start.lat, "lon": start.lon},
                {"lat": end.lat, "lon": end.lon},
            ],
            "costing": "auto",
        });

        // Valhalla reports errors with a non-2xx status and a JSON body, so
        // the body is parsed regardless of the status code.
        let response = self
            .client
            .post(format!("{}/route", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::RoutingUnavailable(e.to_string()))?;
        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| Error::ProtocolParse(e.to_string()))?;

        match body.error_code {
            Some(NO_ROUTE_FOUND) => Err(Error::RoutingUnavailable(
                "no route between the points (Valhalla 442)".to_string(),
            )),
            Some(code) => Err(Error::RoutingUnavailable(format!(
                "Valhalla error_code {code}"
            ))),
            None => body
                .trip
                .map(|trip| trip.summary.time)
                .ok_or_else(|| Error::ProtocolParse("Valhalla returned no trip".to_string())),
        }
    }
}
