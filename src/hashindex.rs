//! The precomputed ground-truth index: zone-pair + time-bucket keys mapped
//! to compact aggregate vectors of observed travel times.
//!
//! On disk the index is little-endian: a `u64` entry count, then per entry a
//! `u32` key length, the UTF-8 key, and ten `f64` values split into the three
//! aggregate vectors.

use crate::error::Error;
use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};

/// Ground-truth travel times sampled at fixed percentile ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateValues {
    /// Values at ranks {0, 100}.
    pub min_max: [f64; 2],
    /// Values at ranks {0, 50, 100}.
    pub min_med_max: [f64; 3],
    /// Values at ranks {0, 25, 50, 75, 100}.
    pub percentiles: [f64; 5],
}

/// Which aggregate vector a calibrator instance interpolates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateType {
    MinMax,
    MinMedMax,
    Percentiles,
}

impl AggregateType {
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name {
            "min_max" => Ok(AggregateType::MinMax),
            "min_med_max" => Ok(AggregateType::MinMedMax),
            "percentiles" => Ok(AggregateType::Percentiles),
            other => Err(Error::BadAggregateType(other.to_string())),
        }
    }

    /// The percentile ranks the vector is sampled at.
    pub fn ranks(&self) -> &'static [f64] {
        match self {
            AggregateType::MinMax => &[0.0, 100.0],
            AggregateType::MinMedMax => &[0.0, 50.0, 100.0],
            AggregateType::Percentiles => &[0.0, 25.0, 50.0, 75.0, 100.0],
        }
    }

    /// The matching vector out of `values`.
    pub fn select<'a>(&self, values: &'a AggregateValues) -> &'a [f64] {
        match self {
            AggregateType::MinMax => &values.min_max,
            AggregateType::MinMedMax => &values.min_med_max,
            AggregateType::Percentiles => &values.percentiles,
        }
    }
}

/// The in-memory index, loaded once at startup and immutable afterwards.
pub struct HashIndex {
    entries: HashMap<String, AggregateValues>,
}

impl HashIndex {
    /// Reads the binary index at `path`. Duplicate keys keep the last
    /// occurrence; any truncated or malformed record is fatal.
    pub fn load(path: &str) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::IndexFormat {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let mut reader = BufReader::new(file);

        let num_entries = read_u64(&mut reader, path)?;
        info!("loading hash index with {num_entries} entries from {path}");

        let mut entries = HashMap::new();
        for _ in 0..num_entries {
            let key_len = read_u32(&mut reader, path)? as usize;
            let mut key_bytes = vec![0u8; key_len];
            reader.read_exact(&mut key_bytes).map_err(|e| Error::IndexFormat {
                path: path.to_string(),
                reason: format!("short read in key: {e}"),
            })?;
            let key = String::from_utf8(key_bytes).map_err(|_| Error::IndexFormat {
                path: path.to_string(),
                reason: "key is not valid UTF-8".to_string(),
            })?;

            let mut values = [0.0f64; 10];
            for value in values.iter_mut() {
                *value = read_f64(&mut reader, path)?;
            }

            entries.insert(
                key,
                AggregateValues {
                    min_max: [values[0], values[1]],
                    min_med_max: [values[2], values[3], values[4]],
                    percentiles: [values[5], values[6], values[7], values[8], values[9]],
                },
            );
        }

        info!("loaded {} aggregate entries", entries.len());
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Result<&AggregateValues, Error> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_u64<R: Read>(reader: &mut R, path: &str) -> Result<u64, Error> {
    let mut buf = [0u8; 8];
    read_bytes(reader, &mut buf, path)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R, path: &str) -> Result<u32, Error> {
    let mut buf = [0u8; 4];
    read_bytes(reader, &mut buf, path)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64<R: Read>(reader: &mut R, path: &str) -> Result<f64, Error> {
    let mut buf = [0u8; 8];
    read_bytes(reader, &mut buf, path)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_bytes<R: Read>(reader: &mut R, buf: &mut [u8], path: &str) -> Result<(), Error> {
    reader.read_exact(buf).map_err(|e| Error::IndexFormat {
        path: path.to_string(),
        reason: format!("short read: {e}"),
    })
}
