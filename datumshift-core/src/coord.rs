//! Coordinate and shift value types
//!
//! Public coordinates are east-positive longitude, latitude, both in degrees,
//! plus ellipsoidal height in meters.

/// Seconds of arc per degree
pub const SECONDS_PER_DEGREE: f64 = 3600.0;

/// A geographic coordinate, east-positive degrees and meters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Longitude in degrees, positive east
    pub lng: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Ellipsoidal height in meters
    #[cfg_attr(feature = "serde", serde(default))]
    pub hgt: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub const fn new(lng: f64, lat: f64, hgt: f64) -> Self {
        Self { lng, lat, hgt }
    }

    /// Create a 2D coordinate (height zero)
    pub const fn lng_lat(lng: f64, lat: f64) -> Self {
        Self { lng, lat, hgt: 0.0 }
    }

    /// Return a copy with longitude and latitude replaced, keeping height
    pub const fn with_horizontal(self, lng: f64, lat: f64) -> Self {
        Self {
            lng,
            lat,
            hgt: self.hgt,
        }
    }

    /// Apply a shift vector to the horizontal components
    pub fn shifted(self, shift: ShiftVector) -> Self {
        self.with_horizontal(self.lng + shift.lng, self.lat + shift.lat)
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite() && self.hgt.is_finite()
    }
}

/// A horizontal shift in degrees, east-positive longitude
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShiftVector {
    /// Longitude shift in degrees, positive east
    pub lng: f64,
    /// Latitude shift in degrees, positive north
    pub lat: f64,
}

impl ShiftVector {
    /// The zero shift
    pub const ZERO: ShiftVector = ShiftVector { lng: 0.0, lat: 0.0 };

    /// Create a new shift vector
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Build from native grid values (arc seconds, positive west longitude)
    pub fn from_native_seconds(lng_west: f64, lat: f64) -> Self {
        Self {
            lng: -lng_west / SECONDS_PER_DEGREE,
            lat: lat / SECONDS_PER_DEGREE,
        }
    }

    /// Longitude shift in arc seconds, positive east
    pub fn lng_seconds(&self) -> f64 {
        self.lng * SECONDS_PER_DEGREE
    }

    /// Latitude shift in arc seconds
    pub fn lat_seconds(&self) -> f64 {
        self.lat * SECONDS_PER_DEGREE
    }

    /// True if both components are exactly zero
    pub fn is_zero(&self) -> bool {
        self.lng == 0.0 && self.lat == 0.0
    }
}

/// Axis-aligned geographic rectangle, closed on all sides
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    /// Minimum longitude
    pub min_lng: f64,
    /// Minimum latitude
    pub min_lat: f64,
    /// Maximum longitude
    pub max_lng: f64,
    /// Maximum latitude
    pub max_lat: f64,
}

impl Extent {
    /// Create a new extent
    pub const fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// An extent containing nothing, neutral for [`Extent::union`]
    pub const fn empty() -> Self {
        Self {
            min_lng: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lng: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    /// Closed containment test
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Smallest extent covering both
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Strict interior overlap; rectangles sharing only an edge do not overlap
    pub fn overlaps(&self, other: &Extent) -> bool {
        self.min_lng < other.max_lng
            && other.min_lng < self.max_lng
            && self.min_lat < other.max_lat
            && other.min_lat < self.max_lat
    }

    /// True if no point is contained
    pub fn is_empty(&self) -> bool {
        self.min_lng > self.max_lng || self.min_lat > self.max_lat
    }
}
