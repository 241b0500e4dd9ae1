/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether two points coincide within `eps` on both axes.
    pub(crate) fn close_to(&self, other: &Point, eps: f64) -> bool {
        (self.lon - other.lon).abs() < eps && (self.lat - other.lat).abs() < eps
    }
}

/// Axis-aligned bounding box in degrees.
///
/// Starts out as an empty sentinel (`min > max`) that the first `expand`
/// overwrites; after any non-empty sequence of expansions `min <= max` holds
/// on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Default for BBox {
    fn default() -> Self {
        Self {
            min_lon: 180.0,
            max_lon: -180.0,
            min_lat: 90.0,
            max_lat: -90.0,
        }
    }
}

impl BBox {
    /// Grows the box to cover `p`.
    pub fn expand(&mut self, p: Point) {
        if p.lon < self.min_lon {
            self.min_lon = p.lon;
        }
        if p.lon > self.max_lon {
            self.max_lon = p.lon;
        }
        if p.lat < self.min_lat {
            self.min_lat = p.lat;
        }
        if p.lat > self.max_lat {
            self.max_lat = p.lat;
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.lon >= self.min_lon && p.lon <= self.max_lon && p.lat >= self.min_lat && p.lat <= self.max_lat
    }
}

/// A closed ring of vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    /// Even-odd ray-cast containment test.
    ///
    /// Counts crossings of the horizontal ray starting at `p` with the ring's
    /// edges; an odd count means inside. Rings with fewer than three vertices
    /// contain nothing. Points exactly on an edge resolve deterministically
    /// but either way.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.lat > p.lat) != (vj.lat > p.lat)
                && p.lon < (vj.lon - vi.lon) * (p.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}
