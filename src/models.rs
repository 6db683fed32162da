use crate::color::Color;

/// A pixel location, origin top-left, y increasing downward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoordinate {
    pub x: u32,
    pub y: u32,
}

impl PixelCoordinate {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn as_point(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

/// Pixels collected for one label during a classification scan
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPointSet {
    pub label: String,
    pub points: Vec<PixelCoordinate>,
}

impl LabeledPointSet {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Mean position of one cluster, in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert to a bottom-left origin
    pub fn flip_y(&self, height: u32) -> (f64, f64) {
        (self.x, height as f64 - self.y)
    }

    /// Nearest pixel, for drawing
    pub fn pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<[f64; 2]> for Centroid {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

/// Clustered result for one label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCentroids {
    pub label: String,
    /// Average of the label's reference colors, used for markers
    pub color: Color,
    pub centroids: Vec<Centroid>,
}
