//! Planar coordinate type.
//!
//! Inputs are projected (e.g. British National Grid) so all distance math is
//! plain Euclidean in metres; no geodetic correction is needed.  `f64` keeps
//! centimetre precision at national extents (~10⁶ m).

/// A projected coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub easting:  f64,
    pub northing: f64,
}

impl Coord {
    #[inline]
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance_m(self, other: Coord) -> f64 {
        self.distance_2(other).sqrt()
    }

    /// Squared Euclidean distance.  Cheaper than `distance_m` for ordering.
    #[inline]
    pub fn distance_2(self, other: Coord) -> f64 {
        let de = self.easting - other.easting;
        let dn = self.northing - other.northing;
        de * de + dn * dn
    }

    /// Axis-aligned box test: `true` if `self` lies within `half_width` of
    /// `center` along both axes (boundary inclusive).
    #[inline]
    pub fn within_box(self, center: Coord, half_width: f64) -> bool {
        (self.easting - center.easting).abs() <= half_width
            && (self.northing - center.northing).abs() <= half_width
    }

    /// `false` if either component is NaN or infinite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.easting.is_finite() && self.northing.is_finite()
    }

    /// `[easting, northing]`, the point layout used by the R-tree indexes.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.easting, self.northing]
    }
}

impl From<[f64; 2]> for Coord {
    fn from([easting, northing]: [f64; 2]) -> Self {
        Self { easting, northing }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.easting, self.northing)
    }
}
