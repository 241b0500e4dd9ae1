//! Zone shapes loaded from a CSV of WKT geometries.
//!
//! Each row after the header is `zone_id,geometry_wkt` where the geometry is
//! a `POLYGON` or `MULTIPOLYGON`, optionally double-quoted. Only outer rings
//! are kept; holes are dropped. Malformed rows are skipped with a warning so
//! a single bad record cannot abort loading.

use crate::error::Error;
use crate::geometry::{BBox, Point, Polygon};
use log::{info, warn};

/// Tolerance when deciding whether a ring is already closed.
const RING_EPS: f64 = 1e-9;

/// A labeled spatial region made of one or more polygons.
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: String,
    pub polygons: Vec<Polygon>,
    pub bbox: BBox,
}

impl Zone {
    /// A point belongs to the zone iff it is inside the bbox and inside at
    /// least one polygon.
    pub fn contains(&self, p: Point) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        self.polygons.iter().any(|poly| poly.contains(p))
    }
}

/// Loads all zones from `path`, preserving file order.
///
/// A file that yields no valid zone at all is an error; individual bad rows
/// only warn.
pub fn load_zones(path: &str) -> Result<Vec<Zone>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::ZoneFileParse {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    let mut zones = Vec::new();
    let mut row = 0usize;
    for record in reader.records() {
        row += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping zone row {row}: {e}");
                continue;
            }
        };

        let id = match record.get(0) {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                warn!("skipping zone row {row}: missing zone id");
                continue;
            }
        };
        if record.len() < 2 {
            warn!("skipping zone row {row}: missing geometry");
            continue;
        }
        // An unquoted WKT field gets split on its inner commas; everything
        // after the id is the geometry.
        let wkt = record.iter().skip(1).collect::<Vec<_>>().join(",");
        let wkt = trim_quotes(&wkt);

        let polygons = match parse_wkt(wkt) {
            Ok(polygons) => polygons,
            Err(reason) => {
                warn!("skipping zone {id} at row {row}: {reason}");
                continue;
            }
        };

        let mut bbox = BBox::default();
        for polygon in &polygons {
            for vertex in &polygon.vertices {
                bbox.expand(*vertex);
            }
        }

        zones.push(Zone { id, polygons, bbox });
        if row % 100 == 0 {
            info!("loaded {row} zone rows...");
        }
    }

    if zones.is_empty() {
        return Err(Error::ZoneFileParse {
            path: path.to_string(),
            reason: "no valid zones".to_string(),
        });
    }
    info!("loaded {} zones from {path}", zones.len());
    Ok(zones)
}

/// Strips surrounding whitespace and double-quotes.
fn trim_quotes(s: &str) -> &str {
    s.trim_matches(|c: char| c == '"' || c.is_whitespace())
}

fn parse_wkt(wkt: &str) -> Result<Vec<Polygon>, String> {
    let head: String = wkt.chars().take(12).collect::<String>().to_ascii_uppercase();
    if head.starts_with("MULTIPOLYGON") {
        parse_multipolygon(wkt)
    } else if head.starts_with("POLYGON") {
        parse_polygon(wkt).map(|polygon| vec![polygon])
    } else {
        let prefix: String = wkt.chars().take(24).collect();
        Err(format!("unsupported WKT type: {prefix}..."))
    }
}

/// `POLYGON ((lon lat, lon lat, ...))`, possibly followed by hole rings.
fn parse_polygon(wkt: &str) -> Result<Polygon, String> {
    let open = wkt.find("((").ok_or("malformed POLYGON: missing '(('")?;
    let (ring, _) = outer_ring(wkt, open).ok_or("malformed POLYGON: unterminated ring")?;
    let polygon = parse_ring(ring);
    if polygon.vertices.is_empty() {
        return Err("POLYGON ring has no coordinates".to_string());
    }
    Ok(polygon)
}

/// `MULTIPOLYGON (((...)), ((...)), ...)`; each `((...))` group contributes
/// one outer ring.
fn parse_multipolygon(wkt: &str) -> Result<Vec<Polygon>, String> {
    if !wkt.contains("(((") {
        return Err("malformed MULTIPOLYGON: missing '((('".to_string());
    }

    let mut polygons = Vec::new();
    let mut pos = 0usize;
    while let Some(open) = wkt[pos..].find("((") {
        let open = pos + open;
        let Some((ring, close)) = outer_ring(wkt, open) else {
            break;
        };
        let polygon = parse_ring(ring);
        if !polygon.vertices.is_empty() {
            polygons.push(polygon);
        }
        pos = close + 1;
    }

    if polygons.is_empty() {
        return Err("MULTIPOLYGON has no parseable rings".to_string());
    }
    Ok(polygons)
}

/// Returns the outer-ring text of the paren group opening at `open_idx`, and
/// the byte index of the `)` closing that ring. Hole rings after the first
/// `)` are never visited: the next search for `((` skips over their single
/// parens.
fn outer_ring(text: &str, open_idx: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let mut start = open_idx;
    while start < bytes.len() && (bytes[start] == b'(' || bytes[start].is_ascii_whitespace()) {
        start += 1;
    }
    let close = text[start..].find(')')? + start;
    Some((&text[start..close], close))
}

/// Parses `lon lat, lon lat, ...` and closes the ring if needed. Tokens that
/// do not parse as a coordinate pair are skipped.
fn parse_ring(text: &str) -> Polygon {
    let mut vertices = Vec::new();
    for token in text.split(',') {
        let mut coords = token.split_whitespace();
        if let (Some(lon), Some(lat)) = (coords.next(), coords.next()) {
            if let (Ok(lon), Ok(lat)) = (lon.parse::<f64>(), lat.parse::<f64>()) {
                vertices.push(Point::new(lon, lat));
            }
        }
    }

    if vertices.len() >= 3 {
        let first = vertices[0];
        let last = vertices[vertices.len() - 1];
        if !first.close_to(&last, RING_EPS) {
            vertices.push(first);
        }
    }
    Polygon { vertices }
}
