//! Planar coordinates.
//!
//! Benchmark instances live on a flat grid and travel time equals euclidean
//! distance (unit speed), so everything here is plain `f64` geometry.

/// A point on the instance plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance, which is also the travel time between the points.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point reached after covering `fraction` of the segment `self → other`.
    ///
    /// `(1 - λ)·self + λ·other`; `fraction` is not clamped.
    #[inline]
    pub fn lerp(self, other: Point, fraction: f64) -> Point {
        Point {
            x: (1.0 - fraction) * self.x + fraction * other.x,
            y: (1.0 - fraction) * self.y + fraction * other.y,
        }
    }

    #[inline]
    pub fn as_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// `true` when `a` and `b` differ by at most `eps`.
#[inline]
pub fn float_equality(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
