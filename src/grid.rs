//! Uniform-grid spatial index over zones.
//!
//! The grid covers the padded union of all zone bounding boxes. Each cell
//! lists the zones whose bbox overlaps it, in load order, so lookups only
//! run the full point-in-polygon test against a handful of candidates.

use crate::geometry::Point;
use crate::zones::Zone;

/// Degrees of slack added around the global bounds.
const GRID_PADDING: f64 = 0.1;

pub const DEFAULT_CELLS_PER_DEGREE: u32 = 10;

pub struct GridIndex {
    zones: Vec<Zone>,
    /// Row-major `grid_y x grid_x` cells of zone indices.
    cells: Vec<Vec<usize>>,
    min_lon: f64,
    min_lat: f64,
    cell_width: f64,
    cell_height: f64,
    grid_x: usize,
    grid_y: usize,
}

impl GridIndex {
    /// Builds the index over `zones`, which must be non-empty. Each zone is
    /// registered in every cell its bbox touches.
    pub fn new(zones: Vec<Zone>, cells_per_degree: u32) -> Self {
        let mut min_lon = 180.0f64;
        let mut max_lon = -180.0f64;
        let mut min_lat = 90.0f64;
        let mut max_lat = -90.0f64;
        for zone in &zones {
            min_lon = min_lon.min(zone.bbox.min_lon);
            max_lon = max_lon.max(zone.bbox.max_lon);
            min_lat = min_lat.min(zone.bbox.min_lat);
            max_lat = max_lat.max(zone.bbox.max_lat);
        }
        min_lon -= GRID_PADDING;
        max_lon += GRID_PADDING;
        min_lat -= GRID_PADDING;
        max_lat += GRID_PADDING;

        let grid_x = ((max_lon - min_lon) * f64::from(cells_per_degree)) as usize + 1;
        let grid_y = ((max_lat - min_lat) * f64::from(cells_per_degree)) as usize + 1;
        let cell_width = (max_lon - min_lon) / grid_x as f64;
        let cell_height = (max_lat - min_lat) / grid_y as f64;

        let cell_of = |value: f64, origin: f64, size: f64, count: usize| -> usize {
            (((value - origin) / size).floor() as i64).clamp(0, count as i64 - 1) as usize
        };

        let mut cells = vec![Vec::new(); grid_x * grid_y];
        for (i, zone) in zones.iter().enumerate() {
            let min_x = cell_of(zone.bbox.min_lon, min_lon, cell_width, grid_x);
            let max_x = cell_of(zone.bbox.max_lon, min_lon, cell_width, grid_x);
            let min_y = cell_of(zone.bbox.min_lat, min_lat, cell_height, grid_y);
            let max_y = cell_of(zone.bbox.max_lat, min_lat, cell_height, grid_y);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    cells[y * grid_x + x].push(i);
                }
            }
        }

        Self {
            zones,
            cells,
            min_lon,
            min_lat,
            cell_width,
            cell_height,
            grid_x,
            grid_y,
        }
    }

    /// Returns the id of the first loaded zone containing `p`, or `None`
    /// when the point is outside the grid or in no zone.
    pub fn locate(&self, p: Point) -> Option<&str> {
        let x = ((p.lon - self.min_lon) / self.cell_width).floor();
        let y = ((p.lat - self.min_lat) / self.cell_height).floor();
        if x < 0.0 || y < 0.0 || x >= self.grid_x as f64 || y >= self.grid_y as f64 {
            return None;
        }

        let cell = &self.cells[y as usize * self.grid_x + x as usize];
        cell.iter()
            .map(|&i| &self.zones[i])
            .find(|zone| zone.contains(p))
            .map(|zone| zone.id.as_str())
    }
}
