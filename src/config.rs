//! Runtime configuration, loaded from a key=value file.

use crate::calibrator::TimeZoningType;
use crate::error::Error;
use crate::grid::DEFAULT_CELLS_PER_DEGREE;
use crate::hashindex::AggregateType;
use crate::table::{DEFAULT_ETA_OFFSET, DEFAULT_RECORD_SIZE};
use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

/// Everything the calibrator and its collaborators need at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub hashindex_file: String,
    pub zones_csv_file: String,
    pub spatial_eta_path: String,
    pub time_zoning_type: TimeZoningType,
    pub routingengine_server: String,
    pub engine: String,
    pub aggregate_type: AggregateType,
    pub record_size: u64,
    pub eta_offset: u64,
    pub cells_per_degree: u32,
}

impl Config {
    /// Parses the file at `path`. Lines starting with `#`, `;` or `//` are
    /// comments; keys and values are whitespace-trimmed; lines without `=`
    /// are ignored.
    pub fn load(path: &str) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigInvalid(format!("cannot read {path}: {e}")))?;

        let mut kv = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with("//") {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                kv.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        let time_zoning_type = TimeZoningType::from_code(parse_required(&kv, "time_zoning_type")?)?;
        let aggregate_type = AggregateType::parse(required(&kv, "aggregate_type")?)?;

        let record_size = parse_optional(&kv, "record_size", DEFAULT_RECORD_SIZE)?;
        if record_size == 0 {
            return Err(Error::ConfigInvalid("record_size must be positive".to_string()));
        }

        Ok(Config {
            hashindex_file: required(&kv, "hashindex_file")?.to_string(),
            zones_csv_file: required(&kv, "zones_csv_file")?.to_string(),
            spatial_eta_path: required(&kv, "spatial_eta_path")?.to_string(),
            time_zoning_type,
            routingengine_server: required(&kv, "routingengine_server")?.to_string(),
            engine: required(&kv, "engine")?.to_string(),
            aggregate_type,
            record_size,
            eta_offset: parse_optional(&kv, "eta_offset", DEFAULT_ETA_OFFSET)?,
            cells_per_degree: parse_optional(&kv, "cells_per_degree", DEFAULT_CELLS_PER_DEGREE)?,
        })
    }
}

fn required<'a>(kv: &'a HashMap<String, String>, key: &str) -> Result<&'a str, Error> {
    kv.get(key)
        .map(String::as_str)
        .ok_or_else(|| Error::ConfigInvalid(format!("missing key {key:?}")))
}

fn parse_required<T: FromStr>(kv: &HashMap<String, String>, key: &str) -> Result<T, Error> {
    parse_value(required(kv, key)?, key)
}

fn parse_optional<T: FromStr>(kv: &HashMap<String, String>, key: &str, default: T) -> Result<T, Error> {
    match kv.get(key) {
        Some(value) => parse_value(value, key),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(value: &str, key: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::ConfigInvalid(format!("{key} has invalid value {value:?}")))
}
