use std::iter::Copied;
use std::slice;

use crate::error::{AccumulationError, Result};
use crate::function::AccumulationFunction;
use crate::iter::AccumulatingIterator;
use crate::point::{Point, XRange};

/// Policy that decides which source points are folded into each output
/// point.
///
/// The function carried by a strategy is a prototype: every call to
/// [`AccumulationStrategy::accumulate`] works on a fresh clone of it, so a
/// single strategy can serve any number of rendering passes.
#[derive(Debug, Clone)]
pub enum AccumulationStrategy<F> {
    /// Folds runs of consecutive points in source order. Makes no assumption
    /// about x ordering.
    ConsecutiveCount(F),
    /// Splits `range` into one bucket per visible point and folds the points
    /// whose x falls in each bucket. Requires ascending x.
    ///
    /// Not implemented yet: selecting it fails with
    /// [`AccumulationError::NotImplemented`]. A complete version keeps output
    /// x ascending, never folds across a discontinuation, and interpolates
    /// (never extrapolates) boundary points at the range edges.
    DensityWithRange { function: F, range: XRange },
}

impl<F> AccumulationStrategy<F>
where
    F: AccumulationFunction + Clone,
{
    pub fn function(&self) -> &F {
        match self {
            AccumulationStrategy::ConsecutiveCount(function) => function,
            AccumulationStrategy::DensityWithRange { function, .. } => function,
        }
    }

    /// Wraps `source`, which holds `total` points, in an iterator yielding at
    /// most about `amount_visible` points.
    pub fn accumulate<I>(
        &self,
        source: I,
        amount_visible: usize,
        total: usize,
    ) -> Result<AccumulatingIterator<I::IntoIter, F>>
    where
        I: IntoIterator<Item = Point>,
    {
        match self {
            AccumulationStrategy::ConsecutiveCount(function) => Ok(AccumulatingIterator::new(
                source.into_iter(),
                function.clone(),
                amount_visible,
                total,
            )),
            AccumulationStrategy::DensityWithRange { .. } => Err(
                AccumulationError::NotImplemented("density-with-range accumulation"),
            ),
        }
    }

    pub fn accumulate_slice<'a>(
        &self,
        points: &'a [Point],
        amount_visible: usize,
    ) -> Result<AccumulatingIterator<Copied<slice::Iter<'a, Point>>, F>> {
        self.accumulate(points.iter().copied(), amount_visible, points.len())
    }
}
