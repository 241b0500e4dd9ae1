//! The online ETA pipeline.
//!
//! One request runs: spatial zoning of both endpoints, temporal zoning of
//! the departure time, a key lookup into the ground-truth index, a routing
//! engine call, a percentile ranking of the engine's answer inside the
//! zone pair's historical table, and finally an interpolation of the
//! ground-truth aggregate at that rank.

use crate::config::Config;
use crate::engine::RoutingEngine;
use crate::error::Error;
use crate::grid::GridIndex;
use crate::hashindex::{AggregateType, HashIndex};
use crate::stat::find_stat;
use crate::table::EtaTableReader;
use crate::timebucket::{self, TimeBucket};
use crate::zones;
use crate::geometry::Point;
use log::error;
use std::time::Instant;

/// The failure sentinel callers receive in place of an ETA.
pub const ETA_UNAVAILABLE: f64 = -1.0;

/// An ETA query: start point, end point, departure timestamp.
#[derive(Debug, Clone)]
pub struct EtaQuery {
    pub start: Point,
    pub end: Point,
    /// `YYYY-MM-DD HH:MM:SS`, naive local time.
    pub departure: String,
}

/// Wall-clock phases of one request, in milliseconds. `overhead_ms` is the
/// calibrator's own cost: total minus the routing engine call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timing {
    pub total_ms: f64,
    pub routing_engine_ms: f64,
    pub overhead_ms: f64,
}

/// Which temporal fields go into the aggregate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoningType {
    /// season, day of week, hour of day
    DowHod,
    /// season, daytype, hour of day
    DaytypeHod,
    /// season, day of week, hour range
    DowRange,
    /// season, daytype, hour range
    DaytypeRange,
}

impl TimeZoningType {
    /// Maps the numeric config code 0-3.
    pub fn from_code(code: u32) -> Result<Self, Error> {
        match code {
            0 => Ok(TimeZoningType::DowHod),
            1 => Ok(TimeZoningType::DaytypeHod),
            2 => Ok(TimeZoningType::DowRange),
            3 => Ok(TimeZoningType::DaytypeRange),
            other => Err(Error::ConfigInvalid(format!(
                "time_zoning_type must be 0-3, got {other}"
            ))),
        }
    }
}

/// Owns all calibration data for the lifetime of the process: zones, grid,
/// hash index, table reader, and the routing engine client. Immutable after
/// construction, so shared references are safe to hand out.
pub struct Calibrator {
    grid: GridIndex,
    index: HashIndex,
    tables: EtaTableReader,
    engine: Box<dyn RoutingEngine>,
    time_zoning: TimeZoningType,
    aggregate: AggregateType,
}

impl Calibrator {
    /// Loads zones and the hash index and wires the pipeline together. Any
    /// failure here is fatal; there is no degraded mode.
    pub fn new(config: &Config, engine: Box<dyn RoutingEngine>) -> Result<Self, Error> {
        let zones = zones::load_zones(&config.zones_csv_file)?;
        let grid = GridIndex::new(zones, config.cells_per_degree);
        let index = HashIndex::load(&config.hashindex_file)?;
        let tables = EtaTableReader::new(
            config.spatial_eta_path.as_str(),
            config.record_size,
            config.eta_offset,
        );

        Ok(Self {
            grid,
            index,
            tables,
            engine,
            time_zoning: config.time_zoning_type,
            aggregate: config.aggregate_type,
        })
    }

    /// Answers one query. On any failure [`ETA_UNAVAILABLE`] is returned and
    /// the cause is logged; `Timing` reflects whatever phases completed.
    pub async fn request(&self, query: &EtaQuery) -> (f64, Timing) {
        let mut timing = Timing::default();
        let started = Instant::now();

        let result = self.answer(query, &mut timing).await;

        timing.total_ms = started.elapsed().as_secs_f64() * 1000.0;
        timing.overhead_ms = timing.total_ms - timing.routing_engine_ms;

        match result {
            Ok(eta) => (eta, timing),
            Err(e) => {
                error!("ETA request failed: {e}");
                (ETA_UNAVAILABLE, timing)
            }
        }
    }

    async fn answer(&self, query: &EtaQuery, timing: &mut Timing) -> Result<f64, Error> {
        let start_zone = self.grid.locate(query.start).ok_or(Error::ZoneNotFound {
            lon: query.start.lon,
            lat: query.start.lat,
        })?;
        let end_zone = self.grid.locate(query.end).ok_or(Error::ZoneNotFound {
            lon: query.end.lon,
            lat: query.end.lat,
        })?;

        let bucket = timebucket::zone_timestamp(&query.departure)?;
        let key = self.bucket_key(start_zone, end_zone, &bucket);

        let values = self.index.get(&key)?;
        let ranks = self.aggregate.ranks();
        let ground_truth = self.aggregate.select(values);

        let engine_started = Instant::now();
        let engine_result = self.engine.point_to_point_duration(query.start, query.end).await;
        timing.routing_engine_ms = engine_started.elapsed().as_secs_f64() * 1000.0;
        let os_eta = engine_result?;

        let search = self.tables.binary_search(start_zone, end_zone, os_eta)?;
        let lower = search.lower.ok_or_else(|| Error::EtaTableIo {
            path: self.tables.table_path(start_zone, end_zone).display().to_string(),
            reason: "table has no records".to_string(),
        })?;

        let rank = match search.upper {
            None => lower.index as f64,
            Some(upper) => lower.index as f64 + (os_eta - lower.eta) / (upper.eta - lower.eta),
        };
        let rank_percent = if search.total_records > 1 {
            rank / (search.total_records - 1) as f64 * 100.0
        } else {
            0.0
        };

        let stat = find_stat(ranks, ground_truth, rank_percent);
        stat.interpolate(rank_percent)
            .ok_or_else(|| Error::BadAggregateType("empty aggregate vector".to_string()))
    }

    /// The comma-separated index key for a zone pair and time bucket.
    fn bucket_key(&self, start_zone: &str, end_zone: &str, bucket: &TimeBucket) -> String {
        match self.time_zoning {
            TimeZoningType::DowHod => format!(
                "{start_zone},{end_zone},{},{},{}",
                bucket.season, bucket.day_of_week, bucket.adjusted_hour
            ),
            TimeZoningType::DaytypeHod => format!(
                "{start_zone},{end_zone},{},{},{}",
                bucket.season, bucket.daytype, bucket.adjusted_hour
            ),
            TimeZoningType::DowRange => format!(
                "{start_zone},{end_zone},{},{},{},{}",
                bucket.season, bucket.day_of_week, bucket.start_hour, bucket.end_hour
            ),
            TimeZoningType::DaytypeRange => format!(
                "{start_zone},{end_zone},{},{},{},{}",
                bucket.season, bucket.daytype, bucket.start_hour, bucket.end_hour
            ),
        }
    }
}
