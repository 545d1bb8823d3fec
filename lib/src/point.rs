use serde::{Deserialize, Serialize};

/// A single sample of a trace.
///
/// A point whose x is NaN is a discontinuation: it marks a gap in the series
/// that must never be bridged or averaged over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRecord", into = "PointRecord")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn discontinuation() -> Self {
        Point {
            x: f64::NAN,
            y: f64::NAN,
        }
    }

    pub fn is_discontinuation(&self) -> bool {
        self.x.is_nan()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

// Wire shape of a Point. JSON has no NaN, so a discontinuation travels as
// missing coordinates: `null` in JSON, empty fields in CSV.
#[derive(Debug, Serialize, Deserialize)]
struct PointRecord {
    x: Option<f64>,
    y: Option<f64>,
}

impl From<PointRecord> for Point {
    fn from(r: PointRecord) -> Self {
        match r.x {
            Some(x) if !x.is_nan() => Point {
                x,
                y: r.y.unwrap_or(f64::NAN),
            },
            _ => Point::discontinuation(),
        }
    }
}

impl From<Point> for PointRecord {
    fn from(p: Point) -> Self {
        if p.is_discontinuation() {
            return PointRecord { x: None, y: None };
        }
        PointRecord {
            x: Some(p.x),
            y: Some(p.y).filter(|y| !y.is_nan()),
        }
    }
}

/// Closed interval of x values, used by range-aware strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XRange {
    pub min: f64,
    pub max: f64,
}

impl XRange {
    pub fn new(min: f64, max: f64) -> Self {
        XRange { min, max }
    }
}
