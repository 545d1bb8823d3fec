use clap::{Args, ValueEnum};
use decimator::{
    AccumulationFunction, AccumulationStrategy, ArithmeticMean, MaxY, MinY, Point, XRange,
};
use eyre::Result;
use tracing::debug;

use crate::io::{read_points, write_points, Encoding};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Function {
    /// Arithmetic mean of x and y
    Mean,
    /// Point with the greatest y
    MaxY,
    /// Point with the least y
    MinY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Fold runs of consecutive points
    Consecutive,
    /// Fold points per x bucket (ascending x only)
    Density,
}

#[derive(Args, Debug)]
pub struct Opts {
    /// Maximum number of visible points
    #[clap(long, short = 'n', env = "DECIMATOR_POINTS", default_value_t = 1000)]
    pub points: usize,

    /// Accumulation function
    #[clap(long, value_enum, env = "DECIMATOR_FUNCTION", default_value_t = Function::Mean)]
    pub function: Function,

    /// Accumulation strategy
    #[clap(long, value_enum, env = "DECIMATOR_STRATEGY", default_value_t = Strategy::Consecutive)]
    pub strategy: Strategy,

    /// Visible x range for the density strategy, "min,max" [default: data extent]
    #[clap(long, value_parser = parse_range)]
    pub range: Option<XRange>,

    /// Output encoding
    #[clap(long, value_enum, default_value_t = Encoding::Json)]
    pub to: Encoding,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

pub async fn decimate(opts: &Opts) -> Result<()> {
    let points = read_points(&opts.files).await?;

    let decimated = match opts.function {
        Function::Mean => accumulate(opts, &points, ArithmeticMean::new())?,
        Function::MaxY => accumulate(opts, &points, MaxY::new())?,
        Function::MinY => accumulate(opts, &points, MinY::new())?,
    };
    debug!(
        input = points.len(),
        output = decimated.len(),
        visible = opts.points,
        "decimated trace"
    );

    write_points(&opts.output, opts.to.into(), &decimated).await
}

fn accumulate<F>(opts: &Opts, points: &[Point], function: F) -> Result<Vec<Point>>
where
    F: AccumulationFunction + Clone,
{
    let strategy = match opts.strategy {
        Strategy::Consecutive => AccumulationStrategy::ConsecutiveCount(function),
        Strategy::Density => AccumulationStrategy::DensityWithRange {
            function,
            range: opts.range.unwrap_or_else(|| data_range(points)),
        },
    };
    let decimated = strategy
        .accumulate_slice(points, opts.points)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(decimated)
}

fn parse_range(s: &str) -> Result<XRange, String> {
    let (min, max) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"min,max\", got {:?}", s))?;
    let min: f64 = min.trim().parse().map_err(|e| format!("bad min: {}", e))?;
    let max: f64 = max.trim().parse().map_err(|e| format!("bad max: {}", e))?;
    if min.is_nan() || max.is_nan() || min > max {
        return Err(format!("empty range: {} > {}", min, max));
    }
    Ok(XRange::new(min, max))
}

// Extent of the x values of all regular points; (0, 0) when there are none.
fn data_range(points: &[Point]) -> XRange {
    let mut xs = points
        .iter()
        .filter(|p| !p.is_discontinuation())
        .map(|p| p.x);
    let Some(first) = xs.next() else {
        return XRange::new(0.0, 0.0);
    };
    let (min, max) = xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
    XRange::new(min, max)
}
