use super::RoutingEngine;
use crate::error::Error;
use crate::geometry::Point;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const ORS_PORT: u16 = 8082;

/// OpenRouteService `driving-car` directions client.
pub struct OrsClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    summary: Summary,
}

#[derive(Deserialize)]
struct Summary {
    duration: f64,
}

impl OrsClient {
    pub fn new(server: &str) -> Self {
        Self {
            client: super::http_client(),
            base_url: format!("http://{server}:{ORS_PORT}"),
        }
    }
}

#[async_trait]
impl RoutingEngine for OrsClient {
    async fn point_to_point_duration(&self, start: Point, end: Point) -> Result<f64, Error> {
        let body = json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
        });

        let response = self
            .client
            .post(format!("{}/ors/v2/directions/driving-car", self.base_url))
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::RoutingUnavailable(e.to_string()))?;
        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| Error::ProtocolParse(e.to_string()))?;

        body.routes
            .first()
            .map(|route| route.summary.duration)
            .ok_or_else(|| Error::ProtocolParse("ORS returned no routes".to_string()))
    }
}
