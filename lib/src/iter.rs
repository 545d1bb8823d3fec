use std::iter::{FusedIterator, Peekable};

use tracing::debug;

use crate::error::{AccumulationError, Result};
use crate::function::AccumulationFunction;
use crate::point::Point;

/// Number of source points folded into each output point.
///
/// The first and last points are always passed through, so they are left out
/// of the budget. Degenerate inputs (`total <= 2` or `amount_visible <= 2`)
/// disable decimation.
pub fn count_per_next(total: usize, amount_visible: usize) -> usize {
    if total > 2 && amount_visible > 2 {
        let (n, k) = (total - 2, amount_visible - 2);
        n / k + usize::from(n % k != 0)
    } else {
        1
    }
}

/// Decimates a point sequence by folding consecutive windows of points
/// through an [`AccumulationFunction`].
///
/// Guarantees:
///
/// * the first and last source points are yielded unmodified;
/// * discontinuations are never folded, and a run of consecutive
///   discontinuations is collapsed into one;
/// * a window cut short by a discontinuation yields its accumulated point
///   first and the discontinuation on the following call.
///
/// Items are `Result`s: a misbehaving accumulation function is reported once
/// and the iterator is exhausted afterwards.
#[derive(Debug)]
pub struct AccumulatingIterator<I: Iterator<Item = Point>, F> {
    source: Peekable<I>,
    function: F,
    count_per_next: usize,
    started: bool,
    previous_discontinuation: bool,
    last: Option<Point>,
    pending_discontinuation: Option<Point>,
    failed: bool,
}

impl<I, F> AccumulatingIterator<I, F>
where
    I: Iterator<Item = Point>,
    F: AccumulationFunction,
{
    /// `total` is the number of points in `source`; it must be known up front
    /// to size the accumulation windows.
    pub fn new(source: I, function: F, amount_visible: usize, total: usize) -> Self {
        let count_per_next = count_per_next(total, amount_visible);
        debug!(
            total,
            amount_visible,
            count_per_next,
            function = function.name(),
            "accumulating points"
        );
        AccumulatingIterator {
            source: source.peekable(),
            function,
            count_per_next,
            started: false,
            previous_discontinuation: false,
            last: None,
            pending_discontinuation: None,
            failed: false,
        }
    }

    pub fn count_per_next(&self) -> usize {
        self.count_per_next
    }

    /// Whether another point remains to be yielded, either from the source or
    /// from an internal buffer.
    pub fn has_next(&mut self) -> bool {
        self.skip_collapsed();
        !self.failed
            && (self.pending_discontinuation.is_some()
                || self.last.is_some()
                || self.source.peek().is_some())
    }

    // Drops discontinuations that would collapse into the one just yielded,
    // so a trailing run of them does not look like another point.
    fn skip_collapsed(&mut self) {
        if !self.started || !self.previous_discontinuation {
            return;
        }
        while self.source.next_if(Point::is_discontinuation).is_some() {}
    }

    fn next_point(&mut self) -> Result<Option<Point>> {
        if !self.started {
            self.started = true;
            let first = self.source.next();
            self.previous_discontinuation = first.map_or(false, |p| p.is_discontinuation());
            return Ok(first);
        }

        if let Some(discontinuation) = self.pending_discontinuation.take() {
            return Ok(Some(discontinuation));
        }

        let mut budget = self.count_per_next;
        let mut folded = 0;
        while budget > 0 {
            let Some(point) = self.source.next() else {
                break;
            };

            if point.is_discontinuation() {
                if self.previous_discontinuation {
                    continue;
                }
                self.previous_discontinuation = true;
                return match self.function.flush()? {
                    None => Ok(Some(point)),
                    Some(accumulated) => {
                        self.pending_discontinuation = Some(point);
                        Ok(Some(accumulated))
                    }
                };
            }

            self.previous_discontinuation = false;
            if self.source.peek().is_some() {
                self.function.add(&point)?;
                folded += 1;
            } else {
                self.last = Some(point);
            }
            budget -= 1;
        }

        if let Some(accumulated) = self.function.flush()? {
            return Ok(Some(accumulated));
        }
        if let Some(last) = self.last.take() {
            return Ok(Some(last));
        }
        if folded > 0 {
            return Err(AccumulationError::EmptyAccumulation { folded });
        }
        Ok(None)
    }
}

impl<I, F> Iterator for AccumulatingIterator<I, F>
where
    I: Iterator<Item = Point>,
    F: AccumulationFunction,
{
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_point() {
            Ok(point) => point.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<I, F> FusedIterator for AccumulatingIterator<I, F>
where
    I: Iterator<Item = Point>,
    F: AccumulationFunction,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{ArithmeticMean, Bypass, MaxY};

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, i as f64)).collect()
    }

    fn run(source: &[Point], amount_visible: usize) -> Vec<Point> {
        AccumulatingIterator::new(
            source.iter().copied(),
            ArithmeticMean::new(),
            amount_visible,
            source.len(),
        )
        .collect::<Result<Vec<_>>>()
        .unwrap()
    }

    fn discontinuations(points: &[Point]) -> usize {
        points.iter().filter(|p| p.is_discontinuation()).count()
    }

    #[test]
    fn count_per_next_budget() {
        assert_eq!(count_per_next(10, 4), 4);
        assert_eq!(count_per_next(1000, 50), 21);
        assert_eq!(count_per_next(3, 10), 1);
        assert_eq!(count_per_next(2, 100), 1);
        assert_eq!(count_per_next(100, 2), 1);
        assert_eq!(count_per_next(100, 0), 1);
        assert_eq!(count_per_next(0, 0), 1);
        assert_eq!(count_per_next(100, usize::MAX), 1);
        assert_eq!(count_per_next(usize::MAX, usize::MAX), 1);
        assert_eq!(count_per_next(usize::MAX, 3), usize::MAX - 2);
    }

    #[test]
    fn huge_visible_amount_passes_everything() {
        let source = line(100);
        assert_eq!(run(&source, usize::MAX), source);
    }

    #[test]
    fn end_to_end_means() {
        let out = run(&line(10), 4);
        assert_eq!(
            out,
            vec![
                Point::new(0.0, 0.0),
                Point::new(2.5, 2.5),
                Point::new(6.5, 6.5),
                Point::new(9.0, 9.0),
            ]
        );
    }

    #[test]
    fn empty_source() {
        assert!(run(&[], 10).is_empty());
        let mut it =
            AccumulatingIterator::new(std::iter::empty::<Point>(), ArithmeticMean::new(), 4, 0);
        assert!(!it.has_next());
        assert!(it.next().is_none());
    }

    #[test]
    fn single_and_two_points() {
        assert_eq!(run(&line(1), 4), line(1));
        assert_eq!(run(&line(2), 4), line(2));
    }

    #[test]
    fn preserves_first_and_last() {
        for n in 1..40 {
            let source: Vec<Point> = (0..n)
                .map(|i| Point::new(i as f64, ((i * 7) % 5) as f64))
                .collect();
            for k in 0..12 {
                let out = run(&source, k);
                assert_eq!(out.first(), source.first(), "n={} k={}", n, k);
                assert_eq!(out.last(), source.last(), "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn reduces_point_count() {
        let out = run(&line(1000), 50);
        assert_eq!(out.len(), 50);

        let out = run(&line(10_000), 100);
        assert!(out.len() <= 100, "got {} points", out.len());
    }

    #[test]
    fn window_mean_is_exact() {
        let source = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 4.0),
            Point::new(3.0, -2.0),
            Point::new(5.0, 10.0),
            Point::new(6.0, 1.0),
        ];
        // countPerNext = ceil(3 / 1) = 3: points 1..3 fold, the last passes through.
        let out = run(&source, 3);
        assert_eq!(
            out,
            vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(6.0, 1.0)]
        );
    }

    #[test]
    fn discontinuation_cuts_window() {
        let mut source = line(10);
        source[5] = Point::discontinuation();
        let out = run(&source, 4);

        assert_eq!(out.len(), 5);
        assert_eq!(out[0], Point::new(0.0, 0.0));
        assert_eq!(out[1], Point::new(2.5, 2.5));
        assert!(out[2].is_discontinuation());
        assert_eq!(out[3], Point::new(7.0, 7.0));
        assert_eq!(out[4], Point::new(9.0, 9.0));
    }

    #[test]
    fn pending_discontinuation_follows_accumulated_point() {
        let mut source = line(10);
        source[3] = Point::discontinuation();
        let out = run(&source, 4);

        assert_eq!(discontinuations(&out), 1);
        let gap = out.iter().position(|p| p.is_discontinuation()).unwrap();
        assert_eq!(out[gap - 1], Point::new(1.5, 1.5));
        assert!(out[..gap].iter().all(|p| p.x < 3.0));
        assert!(out[gap + 1..].iter().all(|p| p.x > 3.0));
        assert_eq!(out.last(), Some(&Point::new(9.0, 9.0)));
    }

    #[test]
    fn no_window_spans_a_discontinuation() {
        for gap in 1..49 {
            let mut source = line(50);
            source[gap] = Point::discontinuation();
            for k in [3, 5, 8, 13] {
                let out = run(&source, k);
                assert_eq!(discontinuations(&out), 1, "gap={} k={}", gap, k);
                let at = out.iter().position(|p| p.is_discontinuation()).unwrap();
                assert!(out[..at].iter().all(|p| p.x < gap as f64));
                assert!(out[at + 1..].iter().all(|p| p.x > gap as f64));
            }
        }
    }

    #[test]
    fn consecutive_discontinuations_collapse() {
        let mut source = line(12);
        for i in 4..7 {
            source[i] = Point::discontinuation();
        }
        let out = run(&source, 4);
        assert_eq!(discontinuations(&out), 1);
        assert_eq!(out.len(), 5);
        assert_eq!(out[1], Point::new(2.0, 2.0));
        assert!(out[2].is_discontinuation());
        assert_eq!(out[3], Point::new(8.5, 8.5));
        assert_eq!(out[4], Point::new(11.0, 11.0));

        let out = run(&source, 100);
        assert_eq!(discontinuations(&out), 1);
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn trailing_discontinuations_collapse() {
        let source = vec![
            Point::new(0.0, 0.0),
            Point::discontinuation(),
            Point::discontinuation(),
        ];
        let out = run(&source, 10);
        assert_eq!(out.len(), 2);
        assert!(out[1].is_discontinuation());
    }

    #[test]
    fn leading_discontinuation_passes_through() {
        let source = vec![
            Point::discontinuation(),
            Point::discontinuation(),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        let out = run(&source, 10);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_discontinuation());
        assert_eq!(&out[1..], &source[2..]);
    }

    #[test]
    fn small_source_passes_through() {
        let source = vec![
            Point::new(0.0, 1.0),
            Point::discontinuation(),
            Point::new(2.0, 3.0),
        ];
        let mut it =
            AccumulatingIterator::new(source.iter().copied(), ArithmeticMean::new(), 10, 3);
        assert_eq!(it.count_per_next(), 1);
        let out = it.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], source[0]);
        assert!(out[1].is_discontinuation());
        assert_eq!(out[2], source[2]);
    }

    #[test]
    fn has_next_until_last_point_drained() {
        let source = line(10);
        let mut it = AccumulatingIterator::new(source.into_iter(), ArithmeticMean::new(), 4, 10);
        let mut seen = 0;
        while it.has_next() {
            assert!(it.next().unwrap().is_ok());
            seen += 1;
        }
        assert_eq!(seen, 4);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn has_next_false_after_trailing_discontinuations() {
        let source = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::discontinuation(),
            Point::discontinuation(),
        ];
        let mut it = AccumulatingIterator::new(source.into_iter(), ArithmeticMean::new(), 10, 4);
        let mut out = Vec::new();
        while it.has_next() {
            out.push(it.next().unwrap().unwrap());
        }
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], Point::new(1.0, 1.0));
        assert!(out[2].is_discontinuation());
        assert!(!it.has_next());
        assert!(it.next().is_none());
    }

    #[test]
    fn has_next_sees_point_after_collapsed_run() {
        let source = vec![
            Point::new(0.0, 0.0),
            Point::discontinuation(),
            Point::discontinuation(),
            Point::new(3.0, 3.0),
        ];
        let mut it = AccumulatingIterator::new(source.into_iter(), ArithmeticMean::new(), 10, 4);
        let mut out = Vec::new();
        while it.has_next() {
            out.push(it.next().unwrap().unwrap());
        }
        assert_eq!(out.len(), 3);
        assert!(out[1].is_discontinuation());
        assert_eq!(out[2], Point::new(3.0, 3.0));
    }

    #[test]
    fn other_functions_plug_in() {
        let source: Vec<Point> = [0.0, 5.0, 1.0, 2.0, 9.0, 3.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, y)| Point::new(i as f64, *y))
            .collect();
        // countPerNext = ceil(5 / 2) = 3
        let out = AccumulatingIterator::new(source.iter().copied(), MaxY::new(), 4, 7)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            out,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 5.0),
                Point::new(4.0, 9.0),
                Point::new(6.0, 4.0),
            ]
        );
    }

    #[test]
    fn bypass_function_fails_loudly() {
        let mut it = AccumulatingIterator::new(line(5).into_iter(), Bypass, 3, 5);
        assert_eq!(it.next(), Some(Ok(Point::new(0.0, 0.0))));
        assert!(matches!(
            it.next(),
            Some(Err(AccumulationError::Unsupported(_)))
        ));
        assert!(!it.has_next());
        assert!(it.next().is_none());
    }

    #[derive(Default)]
    struct Forgetful;

    impl AccumulationFunction for Forgetful {
        fn name(&self) -> &'static str {
            "forgetful"
        }

        fn add(&mut self, _point: &Point) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<Option<Point>> {
            Ok(None)
        }
    }

    #[test]
    fn empty_accumulation_is_reported() {
        let mut it = AccumulatingIterator::new(line(5).into_iter(), Forgetful, 3, 5);
        assert_eq!(it.count_per_next(), 3);
        assert_eq!(it.next(), Some(Ok(Point::new(0.0, 0.0))));
        assert_eq!(
            it.next(),
            Some(Err(AccumulationError::EmptyAccumulation { folded: 3 }))
        );
        assert!(it.next().is_none());
    }
}
