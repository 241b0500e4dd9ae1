//! End-to-end pipeline scenarios over generated zone, index, and table
//! fixtures, with the routing engine stubbed out.

use async_trait::async_trait;
use eta_calibrator::calibrator::{Calibrator, EtaQuery, TimeZoningType, ETA_UNAVAILABLE};
use eta_calibrator::config::Config;
use eta_calibrator::engine::RoutingEngine;
use eta_calibrator::error::Error;
use eta_calibrator::geometry::Point;
use eta_calibrator::hashindex::AggregateType;
use std::fs;
use std::path::{Path, PathBuf};

/// Always answers with a fixed duration.
struct FixedEngine {
    duration: f64,
}

#[async_trait]
impl RoutingEngine for FixedEngine {
    async fn point_to_point_duration(&self, _start: Point, _end: Point) -> Result<f64, Error> {
        Ok(self.duration)
    }
}

/// Always unavailable.
struct DownEngine;

#[async_trait]
impl RoutingEngine for DownEngine {
    async fn point_to_point_duration(&self, _start: Point, _end: Point) -> Result<f64, Error> {
        Err(Error::RoutingUnavailable("engine offline".to_string()))
    }
}

#[tokio::test]
async fn test_min_max_exact_hit_in_table() {
    let fixture = Fixture::new("min_max_exact", &[100.0, 200.0, 300.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 200.0);

    // os_eta hits record 1 of 3 exactly: rank percent 50, interpolated
    // halfway between min 60 and max 600.
    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 330.0);
}

#[tokio::test]
async fn test_min_max_interpolated_rank() {
    let fixture = Fixture::new("min_max_interp", &[100.0, 200.0, 300.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 150.0);

    // os_eta falls halfway between records 0 and 1: rank 0.5 of 2, rank
    // percent 25.
    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 195.0);
}

#[tokio::test]
async fn test_min_med_max_bracketed_stat() {
    let fixture = Fixture::new("min_med_max", &[10.0, 20.0, 30.0, 40.0, 50.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMedMax, 35.0);

    // rank 2.5 of 4 -> 62.5%, interpolated between median 300 and max 900.
    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 450.0);
}

#[tokio::test]
async fn test_percentiles_snap_below_minimum() {
    let fixture = Fixture::new("snap_min", &[10.0, 90.0]);
    let calibrator = fixture.calibrator(AggregateType::Percentiles, 5.0);

    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 50.0);
}

#[tokio::test]
async fn test_percentiles_snap_above_maximum() {
    let fixture = Fixture::new("snap_max", &[10.0, 90.0]);
    let calibrator = fixture.calibrator(AggregateType::Percentiles, 9999.0);

    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 800.0);
}

#[tokio::test]
async fn test_single_record_table_pins_rank_to_zero() {
    let fixture = Fixture::new("single_record", &[120.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 500.0);

    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 60.0);
}

#[tokio::test]
async fn test_unavailable_engine_yields_sentinel() {
    let fixture = Fixture::new("engine_down", &[100.0, 200.0, 300.0]);
    let config = fixture.config(AggregateType::MinMax);
    let calibrator = Calibrator::new(&config, Box::new(DownEngine)).unwrap();

    let (eta, timing) = calibrator.request(&query()).await;
    assert_eq!(eta, ETA_UNAVAILABLE);
    // The phases that ran are still timed.
    assert!(timing.total_ms >= timing.routing_engine_ms);
    assert!(timing.overhead_ms >= 0.0);
}

#[tokio::test]
async fn test_missing_table_yields_sentinel() {
    let fixture = Fixture::new("missing_table", &[100.0]);
    fs::remove_file(fixture.dir.join("tables").join("A_B.bin")).unwrap();
    let calibrator = fixture.calibrator(AggregateType::MinMax, 200.0);

    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, ETA_UNAVAILABLE);
}

#[tokio::test]
async fn test_empty_table_yields_sentinel() {
    let fixture = Fixture::new("empty_table", &[]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 200.0);

    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, ETA_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_bucket_key_yields_sentinel() {
    let fixture = Fixture::new("unknown_key", &[100.0, 200.0, 300.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 200.0);

    // A Monday noon departure maps to a bucket the index has no entry for.
    let mut q = query();
    q.departure = "2016-01-04 12:00:00".to_string();
    let (eta, _) = calibrator.request(&q).await;
    assert_eq!(eta, ETA_UNAVAILABLE);
}

#[tokio::test]
async fn test_point_outside_zones_yields_sentinel() {
    let fixture = Fixture::new("no_zone", &[100.0, 200.0, 300.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 200.0);

    let mut q = query();
    q.start = Point::new(30.0, 30.0);
    let (eta, _) = calibrator.request(&q).await;
    assert_eq!(eta, ETA_UNAVAILABLE);
}

#[tokio::test]
async fn test_bad_timestamp_yields_sentinel() {
    let fixture = Fixture::new("bad_timestamp", &[100.0, 200.0, 300.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMax, 200.0);

    let mut q = query();
    q.departure = "01/01/2016 00:19:39".to_string();
    let (eta, _) = calibrator.request(&q).await;
    assert_eq!(eta, ETA_UNAVAILABLE);
}

#[tokio::test]
async fn test_daytype_range_key_layout() {
    let fixture = Fixture::new("daytype_range", &[100.0, 200.0, 300.0]);
    let mut config = fixture.config(AggregateType::MinMax);
    config.time_zoning_type = TimeZoningType::DaytypeRange;
    let calibrator = Calibrator::new(&config, Box::new(FixedEngine { duration: 200.0 })).unwrap();

    // The fixture index carries "A,B,4,weekday,0,6" as well.
    let (eta, _) = calibrator.request(&query()).await;
    assert_eq!(eta, 330.0);
}

#[tokio::test]
async fn test_identical_queries_are_idempotent() {
    let fixture = Fixture::new("idempotent", &[100.0, 200.0, 300.0]);
    let calibrator = fixture.calibrator(AggregateType::MinMedMax, 170.0);

    let (first, _) = calibrator.request(&query()).await;
    let (second, _) = calibrator.request(&query()).await;
    assert_eq!(first.to_bits(), second.to_bits());
}

#[tokio::test]
async fn test_construction_fails_on_missing_index() {
    let fixture = Fixture::new("missing_index", &[100.0]);
    let mut config = fixture.config(AggregateType::MinMax);
    config.hashindex_file = "/nonexistent/index.bin".to_string();
    assert!(Calibrator::new(&config, Box::new(DownEngine)).is_err());
}

/// The standard query: start inside zone A, end inside zone B, departing
/// Friday 2016-01-01 00:19:39 (season 4, weekday 4, adjusted hour 0).
fn query() -> EtaQuery {
    EtaQuery {
        start: Point::new(0.5, 0.5),
        end: Point::new(2.5, 0.5),
        departure: "2016-01-01 00:19:39".to_string(),
    }
}

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    /// Lays out zones A and B, a hash index for their pair, and an `A_B`
    /// ETA table with the given records.
    fn new(name: &str, table_etas: &[f64]) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "eta_calibrator_pipeline_{name}_{}",
            std::process::id()
        ));
        let tables = dir.join("tables");
        fs::create_dir_all(&tables).unwrap();

        fs::write(
            dir.join("zones.csv"),
            "zone_id,geometry\n\
             A,\"POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))\"\n\
             B,\"MULTIPOLYGON (((2 0, 3 0, 3 1, 2 1, 2 0)))\"\n",
        )
        .unwrap();

        let values = [
            60.0, 600.0, // min_max
            50.0, 300.0, 900.0, // min_med_max
            50.0, 100.0, 200.0, 400.0, 800.0, // percentiles
        ];
        write_index(
            &dir.join("index.bin"),
            &[("A,B,4,4,0", values), ("A,B,4,weekday,0,6", values)],
        );

        write_table(&tables.join("A_B.bin"), table_etas);

        Self { dir }
    }

    fn config(&self, aggregate_type: AggregateType) -> Config {
        Config {
            hashindex_file: path_string(&self.dir.join("index.bin")),
            zones_csv_file: path_string(&self.dir.join("zones.csv")),
            spatial_eta_path: path_string(&self.dir.join("tables")),
            time_zoning_type: TimeZoningType::DowHod,
            routingengine_server: "127.0.0.1".to_string(),
            engine: "osrm".to_string(),
            aggregate_type,
            record_size: 8,
            eta_offset: 0,
            cells_per_degree: 10,
        }
    }

    fn calibrator(&self, aggregate_type: AggregateType, engine_duration: f64) -> Calibrator {
        let config = self.config(aggregate_type);
        Calibrator::new(
            &config,
            Box::new(FixedEngine {
                duration: engine_duration,
            }),
        )
        .unwrap()
    }
}

fn write_index(path: &Path, entries: &[(&str, [f64; 10])]) {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    for (key, values) in entries {
        buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
        buf.extend_from_slice(key.as_bytes());
        for value in values {
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
    fs::write(path, buf).unwrap();
}

fn write_table(path: &Path, etas: &[f64]) {
    let mut buf = Vec::new();
    for eta in etas {
        buf.extend_from_slice(&eta.to_le_bytes());
    }
    fs::write(path, buf).unwrap();
}

fn path_string(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}
