use super::RoutingEngine;
use crate::error::Error;
use crate::geometry::Point;
use async_trait::async_trait;
use serde::Deserialize;

const OSRM_PORT: u16 = 5000;

/// OSRM `/route/v1/driving` client.
pub struct OsrmClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct RouteResponse {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    duration: f64,
}

impl OsrmClient {
    pub fn new(server: &str) -> Self {
        Self {
            client: super::http_client(),
            base_url: format!("http://{server}:{OSRM_PORT}"),
        }
    }
}

#[async_trait]
impl RoutingEngine for OsrmClient {
    async fn point_to_point_duration(&self, start: Point, end: Point) -> Result<f64, Error> {
        // f64 Display is shortest-round-trip, so coordinates keep full
        // precision in the path.
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.base_url, start.lon, start.lat, end.lon, end.lat
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::RoutingUnavailable(e.to_string()))?;
        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| Error::ProtocolParse(e.to_string()))?;

        body.routes
            .first()
            .map(|route| route.duration)
            .ok_or_else(|| Error::ProtocolParse("OSRM returned no routes".to_string()))
    }
}
