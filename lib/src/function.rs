use crate::error::{AccumulationError, Result};
use crate::point::Point;

// An AccumulationFunction folds a window of points into one representative
// point. Points are added one at a time; flush returns the result for the
// window and resets the function to its empty state.
pub trait AccumulationFunction {
    // Short identifier used in logs and on the command line.
    fn name(&self) -> &'static str;

    // Folds point into the current window. Discontinuations are rejected with
    // AccumulationError::DiscontinuationAccumulated: callers must pass them
    // through verbatim instead.
    fn add(&mut self, point: &Point) -> Result<()>;

    // Returns the representative point of the current window, or None if
    // nothing was added since the last flush.
    fn flush(&mut self) -> Result<Option<Point>>;
}

/// Arithmetic mean of x and y over the window.
#[derive(Debug, Clone, Default)]
pub struct ArithmeticMean {
    sum_x: f64,
    sum_y: f64,
    count: usize,
}

impl ArithmeticMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points folded since the last flush.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl AccumulationFunction for ArithmeticMean {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn add(&mut self, point: &Point) -> Result<()> {
        if point.is_discontinuation() {
            return Err(AccumulationError::DiscontinuationAccumulated);
        }
        self.sum_x += point.x;
        self.sum_y += point.y;
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<Option<Point>> {
        if self.count == 0 {
            return Ok(None);
        }
        let n = self.count as f64;
        let mean = Point::new(self.sum_x / n, self.sum_y / n);
        *self = Self::default();
        Ok(Some(mean))
    }
}

/// Keeps the point with the greatest y. Ties keep the earliest point.
#[derive(Debug, Clone, Default)]
pub struct MaxY {
    best: Option<Point>,
}

impl MaxY {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccumulationFunction for MaxY {
    fn name(&self) -> &'static str {
        "max-y"
    }

    fn add(&mut self, point: &Point) -> Result<()> {
        keep_extreme(&mut self.best, point, |candidate, best| candidate > best)
    }

    fn flush(&mut self) -> Result<Option<Point>> {
        Ok(self.best.take())
    }
}

/// Keeps the point with the least y. Ties keep the earliest point.
#[derive(Debug, Clone, Default)]
pub struct MinY {
    best: Option<Point>,
}

impl MinY {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccumulationFunction for MinY {
    fn name(&self) -> &'static str {
        "min-y"
    }

    fn add(&mut self, point: &Point) -> Result<()> {
        keep_extreme(&mut self.best, point, |candidate, best| candidate < best)
    }

    fn flush(&mut self) -> Result<Option<Point>> {
        Ok(self.best.take())
    }
}

fn keep_extreme(
    best: &mut Option<Point>,
    point: &Point,
    wins: fn(f64, f64) -> bool,
) -> Result<()> {
    if point.is_discontinuation() {
        return Err(AccumulationError::DiscontinuationAccumulated);
    }
    match *best {
        Some(b) if !wins(point.y, b.y) => {}
        _ => *best = Some(*point),
    }
    Ok(())
}

/// Placeholder for strategies that never accumulate.
///
/// Every call fails with [`AccumulationError::Unsupported`]; it is not an
/// identity function and must not be driven by an iterator that decimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bypass;

impl AccumulationFunction for Bypass {
    fn name(&self) -> &'static str {
        "bypass"
    }

    fn add(&mut self, _point: &Point) -> Result<()> {
        Err(AccumulationError::Unsupported("bypass accumulation"))
    }

    fn flush(&mut self) -> Result<Option<Point>> {
        Err(AccumulationError::Unsupported("bypass accumulation"))
    }
}
