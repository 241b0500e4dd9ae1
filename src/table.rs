//! Per-zone-pair sorted ETA tables and the rank search over them.
//!
//! Each table is a flat file of fixed-size records sorted non-decreasing by
//! the `f64` ETA field; the record count is the file size divided by the
//! record size. Tables are opened per call and closed before returning, so a
//! calibrator instance never holds a table handle between queries.

use crate::error::Error;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub const DEFAULT_RECORD_SIZE: u64 = 8;
pub const DEFAULT_ETA_OFFSET: u64 = 0;

/// A record located in a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordRef {
    pub index: u64,
    pub eta: f64,
}

/// Outcome of searching a zone-pair table for a routing-engine estimate.
///
/// `lower` is set for every non-empty table: the exact hit, the snapped
/// boundary record, or the last record below the target. `upper` is set only
/// when the target fell strictly between two records, in which case
/// `upper.index == lower.index + 1` and `lower.eta < target < upper.eta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub total_records: u64,
    pub lower: Option<RecordRef>,
    pub upper: Option<RecordRef>,
}

/// Reads ETA tables named `<zone1>_<zone2>.bin` under a common directory.
pub struct EtaTableReader {
    dir: PathBuf,
    record_size: u64,
    eta_offset: u64,
}

impl EtaTableReader {
    pub fn new(dir: impl Into<PathBuf>, record_size: u64, eta_offset: u64) -> Self {
        Self {
            dir: dir.into(),
            record_size,
            eta_offset,
        }
    }

    /// The table file backing a zone pair.
    pub fn table_path(&self, zone1: &str, zone2: &str) -> PathBuf {
        self.dir.join(format!("{zone1}_{zone2}.bin"))
    }

    /// Binary-searches the zone pair's table for `target` seconds.
    ///
    /// An exact hit fills only `lower`; a target outside the table's range
    /// snaps to the nearest boundary record; otherwise the two bracketing
    /// records are returned. An empty table yields no neighbors at all.
    pub fn binary_search(&self, zone1: &str, zone2: &str, target: f64) -> Result<SearchResult, Error> {
        let path = self.table_path(zone1, zone2);
        let mut file = File::open(&path).map_err(|e| table_io(&path, e.to_string()))?;
        let file_size = file
            .metadata()
            .map_err(|e| table_io(&path, e.to_string()))?
            .len();
        let total_records = file_size / self.record_size;

        if total_records == 0 {
            return Ok(SearchResult {
                total_records: 0,
                lower: None,
                upper: None,
            });
        }

        let mut lo: i64 = 0;
        let mut hi: i64 = total_records as i64 - 1;
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let mid_eta = self.read_eta(&mut file, &path, mid as u64)?;
            if mid_eta == target {
                return Ok(SearchResult {
                    total_records,
                    lower: Some(RecordRef {
                        index: mid as u64,
                        eta: mid_eta,
                    }),
                    upper: None,
                });
            } else if mid_eta < target {
                lo = mid + 1;
            } else {
                hi = mid - 1;
            }
        }

        // No exact hit: lo is the first record above the target, hi = lo - 1
        // the last one below it.
        if lo >= total_records as i64 {
            // Above the table's maximum; snap to the last record.
            let index = total_records - 1;
            let eta = self.read_eta(&mut file, &path, index)?;
            return Ok(SearchResult {
                total_records,
                lower: Some(RecordRef { index, eta }),
                upper: None,
            });
        }
        if hi < 0 {
            // Below the table's minimum; snap to the first record.
            let eta = self.read_eta(&mut file, &path, 0)?;
            return Ok(SearchResult {
                total_records,
                lower: Some(RecordRef { index: 0, eta }),
                upper: None,
            });
        }

        let lower_eta = self.read_eta(&mut file, &path, hi as u64)?;
        let upper_eta = self.read_eta(&mut file, &path, lo as u64)?;
        Ok(SearchResult {
            total_records,
            lower: Some(RecordRef {
                index: hi as u64,
                eta: lower_eta,
            }),
            upper: Some(RecordRef {
                index: lo as u64,
                eta: upper_eta,
            }),
        })
    }

    fn read_eta(&self, file: &mut File, path: &Path, record_idx: u64) -> Result<f64, Error> {
        file.seek(SeekFrom::Start(record_idx * self.record_size + self.eta_offset))
            .map_err(|e| table_io(path, e.to_string()))?;
        let mut buf = [0u8; 8];
        file.read_exact(&mut buf)
            .map_err(|e| table_io(path, format!("short read at record {record_idx}: {e}")))?;
        Ok(f64::from_le_bytes(buf))
    }
}

fn table_io(path: &Path, reason: String) -> Error {
    Error::EtaTableIo {
        path: path.display().to_string(),
        reason,
    }
}
